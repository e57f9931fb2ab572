//! Round-robin pairing generation for tournament matches
//!
//! Pairs are enumerated in positional order: for each `i`, every `j > i`.
//! The lower index always plays side A against that opponent.

/// Total number of matches in a round-robin of `participant_count` strategies
///
/// `C(n, 2)`; zero when fewer than two participants.
pub fn match_count(participant_count: usize) -> usize {
    if participant_count < 2 {
        return 0;
    }
    participant_count * (participant_count - 1) / 2
}

/// Every unordered pair `(i, j)` with `i < j`, each exactly once
pub fn round_robin_pairs(participant_count: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..participant_count).flat_map(move |i| (i + 1..participant_count).map(move |j| (i, j)))
}

/// Mutable access to two distinct elements of a slice
///
/// # Panics
/// If `i >= j` or `j` is out of bounds.
pub(crate) fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert!(i < j, "pair_mut: indices must be ordered ({} >= {})", i, j);
    let (head, tail) = items.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}
