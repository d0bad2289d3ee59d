//! Scope halving.

/// Split `codes` into two contiguous halves by count. The first half takes
/// the extra code when the count is odd.
pub fn halve(codes: &[String]) -> (Vec<String>, Vec<String>) {
    let mid = codes.len().div_ceil(2);
    let (a, b) = codes.split_at(mid);
    (a.to_vec(), b.to_vec())
}
