//! Exact longest-common-substring search used to locate fragment overlaps.

/// Location of the longest exact run shared by two sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlapMatch {
    /// Start of the run in the first sequence.
    pub pos_a: usize,
    /// Start of the run in the second sequence.
    pub pos_b: usize,
    /// Number of matching symbols (zero when nothing is shared).
    pub len: usize,
}

impl OverlapMatch {
    /// Exclusive end of the run in the first sequence.
    #[inline]
    pub fn end_a(&self) -> usize {
        self.pos_a + self.len
    }

    /// Exclusive end of the run in the second sequence.
    #[inline]
    pub fn end_b(&self) -> usize {
        self.pos_b + self.len
    }

    /// True when the two sequences share no symbol at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Find the longest contiguous run of symbols present in both `a` and `b`.
///
/// Classic dynamic programme over match lengths ending at `(i, j)`, kept to two
/// rows of `b.len() + 1` cells. Cells are visited in row-major order and the
/// best run is only replaced on a strictly longer match, so among runs of equal
/// length the one starting leftmost in `a` wins, then the one leftmost in `b`.
///
/// When nothing is shared the result is `OverlapMatch { pos_a: 0, pos_b: 0, len: 0 }`.
pub fn longest_common_substring(a: &[u8], b: &[u8]) -> OverlapMatch {
    let mut best = OverlapMatch::default();
    if a.is_empty() || b.is_empty() {
        return best;
    }

    let width = b.len() + 1;
    let mut prev = vec![0usize; width];
    let mut curr = vec![0usize; width];

    for (i, &sym_a) in a.iter().enumerate() {
        for (j, &sym_b) in b.iter().enumerate() {
            curr[j + 1] = if sym_a == sym_b { prev[j] + 1 } else { 0 };
            let run = curr[j + 1];
            if run > best.len {
                best = OverlapMatch {
                    pos_a: i + 1 - run,
                    pos_b: j + 1 - run,
                    len: run,
                };
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}
