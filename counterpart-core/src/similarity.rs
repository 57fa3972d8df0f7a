//! Fuzzy string scoring for the match engine
//!
//! Partial-ratio scoring: the shorter string is slid across the longer one
//! and the best window is scored by indel similarity (insertions and
//! deletions only, no substitutions). Char-based throughout so multi-byte
//! statement text scores the same as ASCII.

/// Longest common subsequence length using the two-row O(min(m,n)) space algorithm.
fn lcs_length(a: &[char], b: &[char]) -> usize {
    let (m, n) = (a.len(), b.len());
    if m == 0 || n == 0 {
        return 0;
    }

    // Keep the shorter sequence in the inner loop to minimise allocation.
    let (outer, inner) = if m >= n { (a, b) } else { (b, a) };
    let n = inner.len();

    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];

    for i in 1..=outer.len() {
        for j in 1..=n {
            curr[j] = if outer[i - 1] == inner[j - 1] {
                prev[j - 1] + 1
            } else {
                prev[j].max(curr[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Indel similarity in [0, 1]: `2 * LCS / (len(a) + len(b))`
fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * lcs_length(a, b)) as f64 / total as f64
}

/// Best-window similarity of the shorter string inside the longer, 0..100
///
/// Exact containment scores 100. Two empty strings score 100, one empty
/// scores 0. Symmetric in its arguments.
pub(crate) fn partial_ratio(s1: &str, s2: &str) -> f64 {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    if shorter.is_empty() {
        return if longer.is_empty() { 100.0 } else { 0.0 };
    }

    // A window ratio of 1.0 requires the window to equal the shorter string,
    // so containment is both a shortcut and the only way to score 100.
    if longer.windows(shorter.len()).any(|w| w == shorter.as_slice()) {
        return 100.0;
    }

    let mut best = 0.0f64;
    for window in longer.windows(shorter.len()) {
        let ratio = indel_ratio(shorter, window);
        if ratio > best {
            best = ratio;
        }
    }

    100.0 * best
}
