/// Percentile rank of each value, in input order, scaled to (0, 100].
///
/// Ranks are 1-based over the ascending order and divided by the number of
/// values. Tied values share the average rank of their run, so a unique
/// maximum maps to 100 while a tied maximum falls just below it.
pub fn percentile_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && values[order[end]] == values[order[start]] {
            end += 1;
        }

        // mean of the 1-based ranks start + 1 ..= end
        let pct = ((start + 1 + end) as f64 / 2.0) / n as f64 * 100.0;
        for &i in &order[start..end] {
            ranks[i] = pct;
        }

        start = end;
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_distinct_values() {
        assert_eq!(percentile_ranks(&[560.4, 3.65]), vec![100.0, 50.0]);
    }

    #[test]
    fn test_ties_share_average_percentile() {
        let ranks = percentile_ranks(&[1.0, 5.0, 5.0, 9.0]);
        assert_eq!(ranks, vec![25.0, 62.5, 62.5, 100.0]);
    }

    #[test]
    fn test_tied_minimum_below_distinct_maximum() {
        let ranks = percentile_ranks(&[2.0, 8.0, 2.0]);
        assert_eq!(ranks, vec![50.0, 100.0, 50.0]);
    }

    #[test]
    fn test_all_equal_share_middle_rank() {
        // (n + 1) / (2n) * 100
        let ranks = percentile_ranks(&[0.0, 0.0, 0.0]);
        for r in &ranks {
            assert!((r - 200.0 / 3.0).abs() < 1e-9);
        }

        assert_eq!(percentile_ranks(&[4.0, 4.0]), vec![75.0, 75.0]);
    }

    #[test]
    fn test_tied_maximum_falls_below_hundred() {
        let ranks = percentile_ranks(&[3.0, 7.0, 7.0]);
        assert!((ranks[0] - 100.0 / 3.0).abs() < 1e-9);
        assert!((ranks[1] - 250.0 / 3.0).abs() < 1e-9);
        assert_eq!(ranks[1], ranks[2]);
    }

    #[test]
    fn test_unsorted_input_keeps_input_order() {
        let ranks = percentile_ranks(&[9.0, 1.0, 5.0, 5.0, 0.0]);
        assert_eq!(ranks, vec![100.0, 40.0, 70.0, 70.0, 20.0]);
    }

    #[test]
    fn test_single_value() {
        assert_eq!(percentile_ranks(&[42.0]), vec![100.0]);
    }

    #[test]
    fn test_empty() {
        assert!(percentile_ranks(&[]).is_empty());
    }
}
