use crate::models::Venue;

/// Check if a venue may take part in matching at all
///
/// Verification is a hard eligibility filter applied before scoring,
/// never a soft scoring factor.
#[inline]
pub fn is_eligible(venue: &Venue) -> bool {
    venue.verified()
}
