//! Rating to quality mapping.

use crate::types::{Quality, Rating};

/// Map a symbolic rating to a scheduler quality.
///
/// Matching is case-insensitive. Anything that is not one of `again`, `hard`,
/// `good` or `easy` maps to the quality of `good`. This is deliberate leniency
/// and it will hide typos in callers; use `str::parse::<Rating>()` first when
/// input has to be validated.
pub fn quality_of(rating: &str) -> Quality {
    rating
        .parse::<Rating>()
        .unwrap_or(Rating::Good)
        .quality()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn known_ratings_map_to_their_quality() {
        assert_eq!(quality_of("again").value(), 0);
        assert_eq!(quality_of("hard").value(), 1);
        assert_eq!(quality_of("good").value(), 2);
        assert_eq!(quality_of("easy").value(), 3);
    }

    #[test]
    fn mapping_ignores_case() {
        assert_eq!(quality_of("Again").value(), 0);
        assert_eq!(quality_of("HARD").value(), 1);
        assert_eq!(quality_of("eAsY").value(), 3);
    }

    #[test]
    fn unknown_rating_falls_back_to_good() {
        assert_eq!(quality_of("excellent"), Rating::Good.quality());
        assert_eq!(quality_of(""), Rating::Good.quality());
    }
}
