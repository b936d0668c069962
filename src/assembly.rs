//! Incremental ingestion and greedy reduction of fragments into one sequence.

use std::fmt;

use serde::Serialize;

use crate::diagnostics::{AssemblyEvent, DiagnosticSink, LogSink};
use crate::fragment::Fragment;

/// Default bound on the number of input sequences, also the reduction ceiling.
pub const DEFAULT_MAX_SEQUENCE_COUNT: usize = 50;

/// Default bound on the length of a single input sequence.
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 1000;

/// Text reported when the fragments cannot be folded into one sequence.
pub const NOT_RECONSTRUCTABLE_MESSAGE: &str = "Input sequences not reconstructable.";

/// Limits that govern ingestion and reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyConfig {
    /// Expected upper bound on input sequences. Also the number of reduction
    /// passes allowed; each pass glues one fragment, so more than
    /// `max_sequence_count + 1` fragments left after ingestion cannot all be
    /// glued and the run ends `NotReconstructable` at the limit.
    pub max_sequence_count: usize,
    /// Longest sequence accepted at the validation boundary.
    pub max_sequence_length: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            max_sequence_count: DEFAULT_MAX_SEQUENCE_COUNT,
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
        }
    }
}

/// Errors raised by the driver itself. An unsolvable input is not one of
/// them; see [`AssemblyOutcome::NotReconstructable`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("no input sequences to assemble")]
    NoFragments,
}

/// Counters gathered over one assembly run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyStats {
    pub sequences_ingested: usize,
    /// Sequences folded into an existing fragment while reading.
    pub ingestion_merges: usize,
    pub fragments_after_ingestion: usize,
    pub reduction_passes: usize,
    /// Every `try_extend` call, across both phases.
    pub merge_attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssemblyOutcome {
    Assembled { sequence: String },
    NotReconstructable { remaining: usize },
}

impl AssemblyOutcome {
    pub fn is_assembled(&self) -> bool {
        matches!(self, Self::Assembled { .. })
    }

    pub fn sequence(&self) -> Option<&str> {
        match self {
            Self::Assembled { sequence } => Some(sequence),
            Self::NotReconstructable { .. } => None,
        }
    }
}

/// Renders the assembled sequence, or the fixed failure message.
impl fmt::Display for AssemblyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assembled { sequence } => f.write_str(sequence),
            Self::NotReconstructable { .. } => f.write_str(NOT_RECONSTRUCTABLE_MESSAGE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblyReport {
    pub outcome: AssemblyOutcome,
    pub stats: AssemblyStats,
}

/// Owns the working collection of fragments.
///
/// Sequences are fed one at a time through [`Assembler::ingest`], which folds
/// each into the first existing fragment that accepts it. [`Assembler::finish`]
/// then reduces what is left to a single fragment. Each assembler is used for
/// exactly one run; nothing is shared between runs.
#[derive(Debug)]
pub struct Assembler<S: DiagnosticSink = LogSink> {
    config: AssemblyConfig,
    fragments: Vec<Fragment>,
    stats: AssemblyStats,
    sink: S,
}

impl Assembler<LogSink> {
    pub fn with_config(config: AssemblyConfig) -> Self {
        Self::new(config, LogSink)
    }
}

impl<S: DiagnosticSink> Assembler<S> {
    pub fn new(config: AssemblyConfig, sink: S) -> Self {
        Self {
            config,
            fragments: Vec::new(),
            stats: AssemblyStats::default(),
            sink,
        }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Current working collection, in scan order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn stats(&self) -> &AssemblyStats {
        &self.stats
    }

    /// Add one validated sequence.
    ///
    /// Existing fragments are tried in collection order and the first one that
    /// accepts the new fragment absorbs it. Otherwise it joins the collection.
    pub fn ingest(&mut self, sequence: impl Into<String>) {
        let incoming = Fragment::new(sequence);
        self.stats.sequences_ingested += 1;

        for existing in self.fragments.iter_mut() {
            self.stats.merge_attempts += 1;
            if existing.try_extend(&incoming, &mut self.sink) {
                self.stats.ingestion_merges += 1;
                return;
            }
        }

        self.fragments.push(incoming);
        self.sink.record(&AssemblyEvent::Appended {
            sequence: self.fragments[self.fragments.len() - 1].sequence(),
            fragments: self.fragments.len(),
        });
    }

    /// Reduce the collection to one fragment.
    ///
    /// The most recently added fragment becomes the base. Each pass scans the
    /// remaining fragments by index, glues the first one that fits onto the
    /// base, removes it and starts over. A pass that glues nothing, or running
    /// out of passes (`max_sequence_count`), ends with
    /// [`AssemblyOutcome::NotReconstructable`].
    pub fn finish(mut self) -> Result<AssemblyReport, AssemblyError> {
        self.stats.fragments_after_ingestion = self.fragments.len();
        let mut remaining = std::mem::take(&mut self.fragments);
        let mut base = remaining.pop().ok_or(AssemblyError::NoFragments)?;

        self.sink.record(&AssemblyEvent::BaseSelected {
            sequence: base.sequence(),
            remaining: remaining.len(),
        });

        let ceiling = self.config.max_sequence_count;
        while !remaining.is_empty() {
            if self.stats.reduction_passes >= ceiling {
                return Ok(self.stalled(remaining.len(), Some(ceiling)));
            }
            self.stats.reduction_passes += 1;

            let absorbed = remaining.iter().position(|candidate| {
                self.stats.merge_attempts += 1;
                base.try_extend(candidate, &mut self.sink)
            });

            match absorbed {
                Some(idx) => {
                    remaining.remove(idx);
                }
                None => return Ok(self.stalled(remaining.len(), None)),
            }
        }

        Ok(AssemblyReport {
            outcome: AssemblyOutcome::Assembled {
                sequence: base.into_sequence(),
            },
            stats: self.stats,
        })
    }

    fn stalled(&mut self, remaining: usize, pass_limit: Option<usize>) -> AssemblyReport {
        self.sink.record(&AssemblyEvent::Stalled {
            remaining,
            passes: self.stats.reduction_passes,
            pass_limit,
        });
        AssemblyReport {
            outcome: AssemblyOutcome::NotReconstructable { remaining },
            stats: self.stats,
        }
    }
}

/// Ingest every sequence in order and reduce, logging through [`LogSink`].
pub fn assemble<I, T>(sequences: I, config: AssemblyConfig) -> Result<AssemblyReport, AssemblyError>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut assembler = Assembler::with_config(config);
    for sequence in sequences {
        assembler.ingest(sequence);
    }
    assembler.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NullSink;

    fn run(sequences: &[&str]) -> AssemblyReport {
        let mut assembler = Assembler::new(AssemblyConfig::default(), NullSink);
        for seq in sequences {
            assembler.ingest(*seq);
        }
        assembler.finish().expect("non-empty input")
    }

    #[test]
    fn pair_merges_during_ingestion() {
        let mut assembler = Assembler::new(AssemblyConfig::default(), NullSink);
        assembler.ingest("AACCGG");
        assembler.ingest("CCGGTT");
        assert_eq!(assembler.fragments().len(), 1);
        assert_eq!(assembler.fragments()[0].sequence(), "AACCGGTT");
        assert_eq!(assembler.stats().ingestion_merges, 1);

        let report = assembler.finish().unwrap();
        assert_eq!(report.outcome.sequence(), Some("AACCGGTT"));
        assert_eq!(report.stats.fragments_after_ingestion, 1);
        assert_eq!(report.stats.reduction_passes, 0);
    }

    #[test]
    fn reports_not_reconstructable() {
        let report = run(&["AACCGG", "CGGTTT"]);
        assert_eq!(
            report.outcome,
            AssemblyOutcome::NotReconstructable { remaining: 1 }
        );
        assert_eq!(report.outcome.to_string(), NOT_RECONSTRUCTABLE_MESSAGE);
        assert_eq!(report.stats.reduction_passes, 1);
    }

    #[test]
    fn chains_three_fragments_in_every_order() {
        let pieces = ["AACCGG", "CCGGTT", "GGTTAA"];
        let orders = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        for order in orders {
            let input: Vec<&str> = order.iter().map(|&i| pieces[i]).collect();
            let report = run(&input);
            assert_eq!(
                report.outcome.sequence(),
                Some("AACCGGTTAA"),
                "order {order:?}"
            );
        }
    }

    #[test]
    fn reduction_glues_fragments_left_apart_at_ingestion() {
        // First and last pieces cannot meet, so two fragments survive ingestion.
        let mut assembler = Assembler::new(AssemblyConfig::default(), NullSink);
        assembler.ingest("AACCGG");
        assembler.ingest("GGTTAA");
        assert_eq!(assembler.fragments().len(), 2);
        assembler.ingest("CCGGTT");
        assert_eq!(assembler.fragments().len(), 2);

        let report = assembler.finish().unwrap();
        assert_eq!(report.outcome.sequence(), Some("AACCGGTTAA"));
        assert_eq!(report.stats.fragments_after_ingestion, 2);
        assert_eq!(report.stats.reduction_passes, 1);
    }

    #[test]
    fn empty_collection_is_an_error() {
        let assembler = Assembler::new(AssemblyConfig::default(), NullSink);
        assert_eq!(assembler.finish().unwrap_err(), AssemblyError::NoFragments);
    }

    #[test]
    fn single_fragment_is_returned_as_is() {
        let report = run(&["ACGTACGT"]);
        assert_eq!(report.outcome.to_string(), "ACGTACGT");
    }

    #[test]
    fn zero_ceiling_stops_before_any_pass() {
        let config = AssemblyConfig {
            max_sequence_count: 0,
            ..AssemblyConfig::default()
        };
        let mut assembler = Assembler::new(config, NullSink);
        for seq in ["AACCGG", "GGTTAA", "CCGGTT"] {
            assembler.ingest(seq);
        }
        let report = assembler.finish().unwrap();
        assert!(!report.outcome.is_assembled());
        assert_eq!(report.stats.reduction_passes, 0);
    }

    #[test]
    fn ceiling_bounds_reduction_passes() {
        // Four pieces that never overlap each other.
        let config = AssemblyConfig {
            max_sequence_count: 1,
            ..AssemblyConfig::default()
        };
        let mut assembler = Assembler::new(config, NullSink);
        for seq in ["AAAAAA", "CCCCCC", "GGGGGG", "TTTTTT"] {
            assembler.ingest(seq);
        }
        let report = assembler.finish().unwrap();
        assert_eq!(
            report.outcome,
            AssemblyOutcome::NotReconstructable { remaining: 3 }
        );
        assert!(report.stats.reduction_passes <= 1);
    }

    #[test]
    fn repeated_runs_agree() {
        let input = ["GGTTAA", "AACCGG", "CCGGTT"];
        let first = run(&input);
        let second = run(&input);
        assert_eq!(first, second);
    }

    #[test]
    fn sink_sees_appends_merges_and_failure() {
        let mut events: Vec<String> = Vec::new();
        let mut assembler = Assembler::new(AssemblyConfig::default(), &mut events);
        assembler.ingest("AACCGG");
        assembler.ingest("CCGGTT");
        assembler.ingest("TTTTTTTT");
        let report = assembler.finish().unwrap();
        assert!(!report.outcome.is_assembled());

        assert!(events[0].starts_with("no overlap for AACCGG"));
        assert!(events[1].starts_with("paste on RHS"));
        assert!(events[2].starts_with("no overlap for TTTTTTTT"));
        assert!(events[3].starts_with("reducing from base TTTTTTTT"));
        assert!(events[4].starts_with(NOT_RECONSTRUCTABLE_MESSAGE));
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn assemble_convenience_runs_both_phases() {
        let report = assemble(["CCGGTT", "GGTTAA", "AACCGG"], AssemblyConfig::default()).unwrap();
        assert_eq!(report.outcome.sequence(), Some("AACCGGTTAA"));
        assert_eq!(report.stats.sequences_ingested, 3);
        assert!(report.stats.merge_attempts >= 2);
    }

    #[test]
    fn report_serialises_with_status_tag() {
        let report = run(&["AACCGG", "CCGGTT"]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["status"], "assembled");
        assert_eq!(json["outcome"]["sequence"], "AACCGGTT");
        assert_eq!(json["stats"]["sequences_ingested"], 2);
    }
}
