//! Approximate String Similarity
//!
//! Scores are integers on a 0-100 scale built from matching blocks: the
//! longest common run of characters is found first, then the pieces left and
//! right of it are searched the same way. Two strings score
//! `2 * matched / (len_a + len_b)`.
//!
//! [`partial_ratio`] anchors a window the length of the shorter string at each
//! matching block of the longer one and keeps the best window, so `"pain"`
//! scores 100 against `"body pain"` and `"vomitting"` scores 88 against
//! `"vomiting"`.

use std::ops::Range;

/// Similarity score (0-100)
pub type Score = u8;

/// Highest possible score
pub const MAX_SCORE: Score = 100;

/// Window ratios above this count as an exact hit
const EXACT_CUTOFF: f64 = 0.995;

/// `size` equal chars starting at `a[a]` and `b[b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a: usize,
    b: usize,
    size: usize,
}

/// Best-window substring similarity (0-100)
///
/// Returns 0 when either side is empty.
pub fn partial_ratio(a: &str, b: &str) -> Score {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    let tail = Block {
        a: shorter.len(),
        b: longer.len(),
        size: 0,
    };

    let mut best = 0.0f64;
    for block in matching_blocks(shorter, longer)
        .into_iter()
        .chain(std::iter::once(tail))
    {
        let start = block.b.saturating_sub(block.a);
        let end = (start + shorter.len()).min(longer.len());
        let window = ratio(shorter, &longer[start..end]);
        if window > EXACT_CUTOFF {
            return MAX_SCORE;
        }
        best = best.max(window);
    }

    to_score(best)
}

/// Whole-sequence similarity in `[0, 1]`
fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched: usize = matching_blocks(a, b).iter().map(|m| m.size).sum();
    2.0 * matched as f64 / total as f64
}

/// Non-overlapping common runs, ordered by position
fn matching_blocks(a: &[char], b: &[char]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut pending = vec![(0..a.len(), 0..b.len())];

    while let Some((a_range, b_range)) = pending.pop() {
        let m = longest_match(a, b, a_range.clone(), b_range.clone());
        if m.size == 0 {
            continue;
        }
        if a_range.start < m.a && b_range.start < m.b {
            pending.push((a_range.start..m.a, b_range.start..m.b));
        }
        if m.a + m.size < a_range.end && m.b + m.size < b_range.end {
            pending.push((m.a + m.size..a_range.end, m.b + m.size..b_range.end));
        }
        blocks.push(m);
    }

    blocks.sort_unstable_by_key(|m| (m.a, m.b));
    blocks
}

/// Longest common run inside the given ranges
///
/// Ties go to the run that ends first in `a`, then first in `b`.
fn longest_match(a: &[char], b: &[char], a_range: Range<usize>, b_range: Range<usize>) -> Block {
    let mut best = Block {
        a: a_range.start,
        b: b_range.start,
        size: 0,
    };

    // run[j + 1]: length of the common run ending at b[j] on the current row
    let mut prev = vec![0usize; b_range.end + 1];
    let mut run = vec![0usize; b_range.end + 1];

    for i in a_range {
        for j in b_range.clone() {
            let k = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            run[j + 1] = k;
            if k > best.size {
                best = Block {
                    a: i + 1 - k,
                    b: j + 1 - k,
                    size: k,
                };
            }
        }
        std::mem::swap(&mut prev, &mut run);
    }

    best
}

fn to_score(similarity: f64) -> Score {
    (similarity.clamp(0.0, 1.0) * 100.0).round_ties_even() as Score
}
