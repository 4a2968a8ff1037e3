use crate::models::Borough;

/// Borough pairs close enough to earn partial location credit
const ADJACENT_BOROUGHS: &[(Borough, Borough)] = &[(Borough::Manhattan, Borough::Brooklyn)];

/// Check whether two distinct boroughs are in the adjacency table
///
/// The table is symmetric: the order of the arguments does not matter.
#[inline]
pub fn are_adjacent(a: Borough, b: Borough) -> bool {
    ADJACENT_BOROUGHS
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// Case-insensitive substring match of a neighborhood preference
/// against a venue's neighborhood
#[inline]
pub fn neighborhood_matches(preferred: &str, venue_neighborhood: &str) -> bool {
    venue_neighborhood
        .to_lowercase()
        .contains(&preferred.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_brooklyn_adjacent_both_ways() {
        assert!(are_adjacent(Borough::Manhattan, Borough::Brooklyn));
        assert!(are_adjacent(Borough::Brooklyn, Borough::Manhattan));
    }

    #[test]
    fn test_other_pairs_not_adjacent() {
        assert!(!are_adjacent(Borough::Manhattan, Borough::Queens));
        assert!(!are_adjacent(Borough::Bronx, Borough::StatenIsland));
        assert!(!are_adjacent(Borough::Queens, Borough::Brooklyn));
    }

    #[test]
    fn test_neighborhood_substring_case_insensitive() {
        assert!(neighborhood_matches("soho", "SoHo"));
        assert!(neighborhood_matches("Village", "West Village"));
        assert!(!neighborhood_matches("Tribeca", "SoHo"));
    }
}
