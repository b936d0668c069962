//! Fragments and the overlap splice rule.
//!
//! A [`Fragment`] is the best-known reconstruction of one contiguous region,
//! together with the minimum overlap needed to grow it on either side. The
//! per-side threshold follows the piece most recently glued on that side
//! (half its length plus one), not the accumulated fragment length, so a long
//! assembled fragment still accepts a short neighbour that overlaps enough.

use std::fmt;

use crate::diagnostics::{AssemblyEvent, DiagnosticSink};
use crate::overlap::{longest_common_substring, OverlapMatch};

/// Minimum overlap demanded of a neighbour next to a piece of `len` symbols.
#[inline]
pub fn overlap_threshold(len: usize) -> usize {
    len / 2 + 1
}

/// Which end of a fragment an extension was glued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("LHS"),
            Self::Right => f.write_str("RHS"),
        }
    }
}

/// A contiguous stretch of the reconstruction plus the overlap each side
/// demands of a new neighbour.
///
/// Fragments only grow: [`Fragment::try_extend`] absorbs a neighbour in place
/// and the assembler drops the absorbed one from its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    sequence: String,
    left_threshold: usize,
    right_threshold: usize,
}

impl Fragment {
    /// Wrap a validated sequence; both thresholds start at `len / 2 + 1`.
    pub fn new(sequence: impl Into<String>) -> Self {
        let sequence = sequence.into();
        let threshold = overlap_threshold(sequence.len());
        Self {
            sequence,
            left_threshold: threshold,
            right_threshold: threshold,
        }
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn into_sequence(self) -> String {
        self.sequence
    }

    /// Overlap required to extend this fragment on its left.
    pub fn left_threshold(&self) -> usize {
        self.left_threshold
    }

    /// Overlap required to extend this fragment on its right.
    pub fn right_threshold(&self) -> usize {
        self.right_threshold
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Try to paste `ext` onto the left or right of `self`.
    ///
    /// On success `self` absorbs `ext`, the threshold of the extended side is
    /// reset from `ext`'s length and `true` is returned; the caller is expected
    /// to drop `ext` from its collection. On failure neither fragment changes.
    /// The left test is tried first.
    pub fn try_extend<S>(&mut self, ext: &Fragment, sink: &mut S) -> bool
    where
        S: DiagnosticSink + ?Sized,
    {
        let hit = longest_common_substring(self.sequence.as_bytes(), ext.sequence.as_bytes());
        let Some(side) = self.extension_side(ext, &hit) else {
            return false;
        };

        let merged = self.splice(ext, &hit, side);
        sink.record(&AssemblyEvent::Extended {
            side,
            base: &self.sequence,
            extension: &ext.sequence,
            merged: &merged,
            overlap: hit.len,
        });

        let threshold = overlap_threshold(ext.len());
        match side {
            Side::Left => self.left_threshold = threshold,
            Side::Right => self.right_threshold = threshold,
        }
        self.sequence = merged;
        true
    }

    fn extension_side(&self, ext: &Fragment, hit: &OverlapMatch) -> Option<Side> {
        if hit.is_empty() {
            return None;
        }
        // The match has to run off the end of at least one of the two sequences.
        let reaches_end = hit.end_b() == ext.len() || hit.end_a() == self.len();
        if !reaches_end {
            return None;
        }

        if hit.pos_a == 0 && hit.len >= self.left_threshold && hit.len >= ext.right_threshold {
            Some(Side::Left)
        } else if hit.pos_b == 0
            && hit.len >= self.right_threshold
            && hit.len >= ext.left_threshold
        {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Build `prefix + match + tail`.
    ///
    /// The prefix comes from `ext` when gluing on the left and from `self`
    /// when gluing on the right. Past the match at most one of the two
    /// sequences has symbols left (`extension_side` guarantees one side runs
    /// out); the extension's tail is taken when it has any, otherwise self's.
    fn splice(&self, ext: &Fragment, hit: &OverlapMatch, side: Side) -> String {
        let own = self.sequence.as_str();
        let other = ext.sequence.as_str();

        let prefix = match side {
            Side::Left => &other[..hit.pos_b],
            Side::Right => &own[..hit.pos_a],
        };
        let shared = &own[hit.pos_a..hit.end_a()];
        let ext_tail = &other[hit.end_b()..];
        let own_tail = &own[hit.end_a()..];
        let tail = if ext_tail.is_empty() { own_tail } else { ext_tail };

        let mut merged = String::with_capacity(prefix.len() + shared.len() + tail.len());
        merged.push_str(prefix);
        merged.push_str(shared);
        merged.push_str(tail);
        merged
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}; {}; {}",
            self.sequence, self.left_threshold, self.right_threshold
        )
    }
}
