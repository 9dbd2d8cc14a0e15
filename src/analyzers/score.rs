use crate::analyzers::utility::ratio;

/// Days in the availability window of a listing.
pub const DAYS_PER_YEAR: f64 = 365.0;
/// Numerator of the price-efficiency term.
pub const PRICE_SCALE: f64 = 1000.0;
/// Final multiplier applied to the product of the three terms.
pub const SCORE_SCALE: f64 = 100.0;

/// Composite value score of a neighbourhood.
///
/// ```text
/// (avg_availability / 365)
///   * (reviews_per_listing / max_reviews_per_listing)
///   * (1000 / avg_price)
///   * 100
/// ```
///
/// The terms multiply, so weakness on any one axis drives the score toward
/// zero. A zero `max_reviews_per_listing` or a zero `avg_price` yields 0.0.
pub fn value_score(
    avg_availability: f64,
    reviews_per_listing: f64,
    max_reviews_per_listing: f64,
    avg_price: f64,
) -> f64 {
    let availability = avg_availability / DAYS_PER_YEAR;
    let popularity = ratio(reviews_per_listing, max_reviews_per_listing);
    let price_efficiency = ratio(PRICE_SCALE, avg_price);

    availability * popularity * price_efficiency * SCORE_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_score_formula() {
        let score = value_score(225.0, 25.0, 25.0, 110.0);
        let expected = (225.0 / 365.0) * 1.0 * (1000.0 / 110.0) * 100.0;
        assert_eq!(score, expected);
        assert!((score - 560.399).abs() < 0.01);
    }

    #[test]
    fn test_zero_global_demand_is_zero_not_nan() {
        let score = value_score(300.0, 0.0, 0.0, 80.0);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_any_weak_axis_sinks_score() {
        assert_eq!(value_score(0.0, 10.0, 10.0, 50.0), 0.0);
        assert_eq!(value_score(365.0, 0.0, 10.0, 50.0), 0.0);
        assert!(value_score(365.0, 10.0, 10.0, 200_000.0) < 1.0);
    }
}
