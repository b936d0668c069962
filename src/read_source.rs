//! Sequence-file input and the per-record validation boundary.
//!
//! Records come from FASTA, FASTQ or plain one-sequence-per-line files, any of
//! them optionally gzip-compressed. The format is read off the content; the
//! file name only decides for empty files. Validation is kept separate from parsing
//! so callers can check each record as it arrives and stop at the first bad one.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bio::io::{fasta, fastq};
use flate2::read::MultiGzDecoder;

/// A record rejected before it reaches the assembler.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("INPUT ERROR. Non-DNA sequence in {id}: {sequence}")]
    NonDna { id: String, sequence: String },
    #[error("INPUT ERROR. Sequence {id} longer than: {max} ({length} bp)")]
    TooLong {
        id: String,
        length: usize,
        max: usize,
    },
}

/// Errors returned while reading sequence files.
#[derive(thiserror::Error, Debug)]
pub enum ReadSourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed FASTQ record: {0}")]
    Fastq(#[from] fastq::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ReadSourceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// One (identifier, sequence) pair as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub sequence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFormat {
    Fastq,
    Fasta,
    Lines,
}

impl SequenceFormat {
    /// Guess the format from the file extension, looking through `.gz`/`.bgz`.
    pub fn infer(path: &Path) -> Self {
        let mut ext = lowercase_extension(path);

        if ext == "gz" || ext == "bgz" {
            if let Some(stem) = path.file_stem() {
                ext = lowercase_extension(Path::new(stem));
            }
        }

        match ext.as_str() {
            "fastq" | "fq" => Self::Fastq,
            "fasta" | "fa" | "fna" => Self::Fasta,
            _ => Self::Lines,
        }
    }

    /// Tell the format from the first non-blank byte: `>` is FASTA, `@` is
    /// FASTQ, anything else is one sequence per line. `None` for blank input.
    ///
    /// Nothing past the leading blank run is consumed.
    pub fn sniff(reader: &mut dyn BufRead) -> std::io::Result<Option<Self>> {
        loop {
            let buf = reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(None);
            }
            let first = buf.iter().copied().find(|b| !b.is_ascii_whitespace());
            let blank = buf.len();
            match first {
                Some(b'>') => return Ok(Some(Self::Fasta)),
                Some(b'@') => return Ok(Some(Self::Fastq)),
                Some(_) => return Ok(Some(Self::Lines)),
                None => reader.consume(blank),
            }
        }
    }
}

fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default()
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("bgz"))
        .unwrap_or(false)
}

fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, ReadSourceError> {
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Check a raw sequence against the alphabet {A, C, G, T} and `max_len`.
///
/// Symbols are compared verbatim, so lowercase bases are rejected, as is an
/// empty sequence.
pub fn validate_sequence(id: &str, sequence: &str, max_len: usize) -> Result<(), ValidationError> {
    let is_dna = !sequence.is_empty()
        && sequence
            .bytes()
            .all(|b| matches!(b, b'A' | b'C' | b'G' | b'T'));
    if !is_dna {
        return Err(ValidationError::NonDna {
            id: id.to_string(),
            sequence: sequence.to_string(),
        });
    }
    if sequence.len() > max_len {
        return Err(ValidationError::TooLong {
            id: id.to_string(),
            length: sequence.len(),
            max: max_len,
        });
    }
    Ok(())
}

fn from_fasta(record: std::io::Result<fasta::Record>) -> Result<SequenceRecord, ReadSourceError> {
    let record = record?;
    Ok(SequenceRecord {
        id: record.id().to_string(),
        sequence: String::from_utf8_lossy(record.seq()).into_owned(),
    })
}

fn from_fastq(record: Result<fastq::Record, fastq::Error>) -> Result<SequenceRecord, ReadSourceError> {
    let record = record?;
    Ok(SequenceRecord {
        id: record.id().to_string(),
        sequence: String::from_utf8_lossy(record.seq()).into_owned(),
    })
}

/// Stream the records of `path` in file order.
pub fn read_records(
    path: &Path,
) -> Result<Box<dyn Iterator<Item = Result<SequenceRecord, ReadSourceError>>>, ReadSourceError> {
    let mut reader = open_reader(path)?;
    let format = match SequenceFormat::sniff(&mut reader)? {
        Some(format) => format,
        None => SequenceFormat::infer(path),
    };

    let records: Box<dyn Iterator<Item = Result<SequenceRecord, ReadSourceError>>> =
        match format {
            SequenceFormat::Fasta => {
                Box::new(fasta::Reader::new(reader).records().map(from_fasta))
            }
            SequenceFormat::Fastq => {
                Box::new(fastq::Reader::new(reader).records().map(from_fastq))
            }
            SequenceFormat::Lines => Box::new(
                reader
                    .lines()
                    .enumerate()
                    .filter_map(|(idx, line)| match line {
                        Ok(line) => {
                            let trimmed = line.trim();
                            if trimmed.is_empty() {
                                None
                            } else {
                                Some(Ok(SequenceRecord {
                                    id: format!("line_{}", idx + 1),
                                    sequence: trimmed.to_string(),
                                }))
                            }
                        }
                        Err(err) => Some(Err(ReadSourceError::Io(err))),
                    }),
            ),
        };

    Ok(records)
}

/// Like [`read_records`], but every record is validated as it is read.
///
/// The first invalid record surfaces as [`ReadSourceError::Validation`];
/// callers are expected to stop there.
pub fn read_validated(
    path: &Path,
    max_len: usize,
) -> Result<impl Iterator<Item = Result<SequenceRecord, ReadSourceError>>, ReadSourceError> {
    let records = read_records(path)?;
    Ok(records.map(move |record| -> Result<SequenceRecord, ReadSourceError> {
        let record = record?;
        validate_sequence(&record.id, &record.sequence, max_len)?;
        Ok(record)
    }))
}
