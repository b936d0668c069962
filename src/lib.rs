//! fragment_paste library
//!
//! Reconstructs one sequence from DNA fragments whose true neighbours overlap
//! by more than half of the shorter fragment. The crate exposes the exact
//! longest-common-substring matcher, the fragment splice rule, and the greedy
//! reduction driver, together with the FASTA/FASTQ reading and validation
//! boundary used by the CLI.

pub mod assembly;
pub mod diagnostics;
pub mod fragment;
pub mod overlap;
pub mod read_source;

pub use assembly::{
    assemble, Assembler, AssemblyConfig, AssemblyError, AssemblyOutcome, AssemblyReport,
    AssemblyStats, DEFAULT_MAX_SEQUENCE_COUNT, DEFAULT_MAX_SEQUENCE_LENGTH,
    NOT_RECONSTRUCTABLE_MESSAGE,
};
pub use diagnostics::{AssemblyEvent, DiagnosticSink, LogSink, NullSink};
pub use fragment::{overlap_threshold, Fragment, Side};
pub use overlap::{longest_common_substring, OverlapMatch};
pub use read_source::{
    read_records, read_validated, validate_sequence, ReadSourceError, SequenceFormat,
    SequenceRecord, ValidationError,
};
