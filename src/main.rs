use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn, LevelFilter};

use fragment_paste::{
    read_validated, Assembler, AssemblyConfig, AssemblyReport, LogSink, ReadSourceError,
    DEFAULT_MAX_SEQUENCE_COUNT, DEFAULT_MAX_SEQUENCE_LENGTH,
};

const EXIT_SUCCESS: u8 = 0;
/// Exit status for rejected input records.
const EXIT_INPUT_ERROR: u8 = 1;
/// Exit status for anything else that goes wrong.
const EXIT_FAILURE: u8 = 2;

/// Reconstruct one sequence from DNA fragments that overlap by more than half their length
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// FASTA/FASTQ (optionally gzipped) or one-per-line file of overlapping fragments
    #[arg(short = 'f', long = "fasta-file")]
    fasta_file: PathBuf,

    /// Maximum number of sequences expected in the input; also caps reduction passes
    #[arg(short = 'c', long, default_value_t = DEFAULT_MAX_SEQUENCE_COUNT)]
    max_seq_count: usize,

    /// Maximum length of a sequence allowed in the input
    #[arg(short = 'l', long, default_value_t = DEFAULT_MAX_SEQUENCE_LENGTH)]
    max_seq_len: usize,

    /// Optional output FASTA path for the assembled sequence
    #[arg(long)]
    output_fasta: Option<PathBuf>,

    /// Wrap assembled FASTA lines to this width (0 = no-wrap)
    #[arg(long, default_value_t = 60)]
    fasta_line_width: usize,

    /// Optional JSON file receiving the assembly outcome and counters
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Write log output to this file instead of stderr (defaults to debug level)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Verbose/info output (default: quiet)
    #[arg(long, short = 'v', alias = "info")]
    verbose: bool,

    /// Debug output
    #[arg(long)]
    debug: bool,

    /// Trace output
    #[arg(long)]
    trace: bool,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        if self.trace {
            LevelFilter::Trace
        } else if self.debug {
            LevelFilter::Debug
        } else if self.verbose {
            LevelFilter::Info
        } else if self.log_file.is_some() {
            LevelFilter::Debug
        } else {
            LevelFilter::Error
        }
    }

    fn config(&self) -> AssemblyConfig {
        AssemblyConfig {
            max_sequence_count: self.max_seq_count,
            max_sequence_length: self.max_seq_len,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = init_logging(&args) {
        eprintln!("Failed to set up logging: {error:?}");
        return ExitCode::from(EXIT_FAILURE);
    }

    let result = run_pipeline(&args);
    match &result {
        Ok(report) => println!("{}", report.outcome),
        Err(error) => match input_error(error) {
            Some(input_error) => {
                log::error!("{input_error}");
                eprintln!("{input_error}");
            }
            None => {
                log::error!("{error:?}");
                eprintln!("Assembly failed: {error:?}");
            }
        },
    }
    ExitCode::from(exit_status(&result))
}

/// The rejected-record error behind `error`, if that is what stopped the run.
fn input_error(error: &anyhow::Error) -> Option<&ReadSourceError> {
    error
        .downcast_ref::<ReadSourceError>()
        .filter(|source| source.is_validation())
}

/// Process exit status for a pipeline result. An unreconstructable input is a
/// result, so it exits 0 like an assembled one.
fn exit_status(result: &Result<AssemblyReport>) -> u8 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(error) if input_error(error).is_some() => EXIT_INPUT_ERROR,
        Err(_) => EXIT_FAILURE,
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(args.log_level()).parse_default_env();

    if let Some(path) = &args.log_file {
        create_parent_dirs(path)?;
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init()?;
    Ok(())
}

fn run_pipeline(args: &Args) -> Result<AssemblyReport> {
    let config = args.config();
    info!("fragment-paste");
    info!("input: {}", args.fasta_file.display());

    let records = read_validated(&args.fasta_file, config.max_sequence_length)
        .with_context(|| format!("Failed to open {}", args.fasta_file.display()))?;

    let mut assembler = Assembler::new(config, LogSink);
    for record in records {
        let record = record?;
        debug!("read {} ({} bp)", record.id, record.sequence.len());
        assembler.ingest(record.sequence);
    }

    let stats = *assembler.stats();
    if stats.sequences_ingested > config.max_sequence_count {
        warn!(
            "Read {} sequences, more than the expected maximum of {}",
            stats.sequences_ingested, config.max_sequence_count
        );
    }
    info!(
        "Read {} sequences, {} merged while reading, {} partial fragments",
        stats.sequences_ingested,
        stats.ingestion_merges,
        assembler.fragments().len()
    );

    let report = assembler.finish()?;
    info!(
        "Reduction finished after {} passes ({} merge attempts in total)",
        report.stats.reduction_passes, report.stats.merge_attempts
    );

    if let Some(path) = &args.output_fasta {
        match report.outcome.sequence() {
            Some(sequence) => {
                let header = format!(
                    "assembled_from_{}",
                    args.fasta_file
                        .file_name()
                        .unwrap_or_else(|| "input".as_ref())
                        .to_string_lossy()
                );
                write_fasta(path, &header, sequence, args.fasta_line_width)?;
                info!("Assembled sequence written to {}", path.display());
            }
            None => warn!("No assembled sequence; {} not written", path.display()),
        }
    }

    if let Some(path) = &args.report_json {
        create_parent_dirs(path)?;
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writeln!(file, "{}", serde_json::to_string_pretty(&report)?)?;
        info!("Assembly report written to {}", path.display());
    }

    Ok(report)
}

fn create_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn write_fasta(path: &Path, header: &str, sequence: &str, line_width: usize) -> Result<()> {
    create_parent_dirs(path)?;
    let mut fh =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    writeln!(fh, ">{header}")?;
    if line_width == 0 {
        writeln!(fh, "{sequence}")?;
    } else {
        let mut i = 0;
        let seq_len = sequence.len();
        while i < seq_len {
            let end = std::cmp::min(i + line_width, seq_len);
            writeln!(fh, "{}", &sequence[i..end])?;
            i = end;
        }
    }
    Ok(())
}
