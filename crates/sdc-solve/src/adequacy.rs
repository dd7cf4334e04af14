//! Protection adequacy rule for a single additive constraint.

/// Minimum number of secondary suppressions a constraint needs.
///
/// `primary` is the number of primary-suppressed members and `available`
/// the number of members still eligible for secondary suppression.
///
/// * no primaries: nothing to protect;
/// * one primary: two companions, or every available cell if fewer exist;
/// * several primaries: one companion per primary, but never the whole
///   remaining constraint unless only one cell is left.
///
/// The result never exceeds `available`.
pub fn required_secondary(primary: usize, available: usize) -> usize {
    match primary {
        0 => 0,
        1 => available.min(2),
        p => p.min(available.saturating_sub(1).max(1)).min(available),
    }
}
