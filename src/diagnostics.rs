//! Diagnostic sink handed to the assembler and merge step.
//!
//! The algorithm never logs on its own; it reports what happened through a
//! [`DiagnosticSink`]. The CLI uses [`LogSink`] to forward events to the `log`
//! facade, tests can collect rendered events in a `Vec<String>`.

use std::fmt;

use crate::fragment::Side;

/// Something noteworthy that happened while assembling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyEvent<'a> {
    /// `extension` was spliced onto `side` of `base`, producing `merged`.
    Extended {
        side: Side,
        base: &'a str,
        extension: &'a str,
        merged: &'a str,
        overlap: usize,
    },
    /// A newly read fragment matched nothing and was added to the collection.
    Appended { sequence: &'a str, fragments: usize },
    /// Reduction started from `sequence` with `remaining` other fragments.
    BaseSelected { sequence: &'a str, remaining: usize },
    /// Reduction stopped with fragments left over. `pass_limit` is set when
    /// the pass ceiling ended it rather than a pass that glued nothing.
    Stalled {
        remaining: usize,
        passes: usize,
        pass_limit: Option<usize>,
    },
}

impl fmt::Display for AssemblyEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extended {
                side,
                base,
                extension,
                merged,
                overlap,
            } => write!(
                f,
                "paste on {side} (overlap {overlap})\nself: {base}\next: {extension}\nnew self: {merged}"
            ),
            Self::Appended {
                sequence,
                fragments,
            } => write!(f, "no overlap for {sequence}; now {fragments} partial fragments"),
            Self::BaseSelected {
                sequence,
                remaining,
            } => write!(f, "reducing from base {sequence} with {remaining} fragments left"),
            Self::Stalled {
                remaining,
                passes,
                pass_limit,
            } => {
                write!(
                    f,
                    "Input sequences not reconstructable. {remaining} fragments left after {passes} passes"
                )?;
                if let Some(limit) = pass_limit {
                    write!(f, " (pass limit {limit} reached; raise max_sequence_count)")?;
                }
                Ok(())
            }
        }
    }
}

/// Receiver for assembly diagnostics.
pub trait DiagnosticSink {
    fn record(&mut self, event: &AssemblyEvent<'_>);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn record(&mut self, event: &AssemblyEvent<'_>) {
        (**self).record(event);
    }
}

/// Forwards events to the `log` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&mut self, event: &AssemblyEvent<'_>) {
        match event {
            AssemblyEvent::Appended { .. } => log::trace!("{event}"),
            AssemblyEvent::Stalled { .. } => log::error!("{event}"),
            _ => log::debug!("{event}"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _event: &AssemblyEvent<'_>) {}
}

/// Keeps the rendered text of each event.
impl DiagnosticSink for Vec<String> {
    fn record(&mut self, event: &AssemblyEvent<'_>) {
        self.push(event.to_string());
    }
}
