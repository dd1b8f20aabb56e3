// src/dataset/metrics.rs
//
// Derived-metric helpers shared by every view. All pure; none mutate input.

use crate::dataset::types::{IndicatorKind, IndicatorSeries};

/// Sum of all yearly values; an empty series sums to 0.0.
pub fn sum_indicator<K: IndicatorKind>(series: &IndicatorSeries<K>) -> f64 {
    series.yearly_values.iter().map(|v| v.value).sum()
}

/// Mean of values over `year_lo..=year_hi`.
///
/// Returns 0.0 when no entries fall in the range. That deliberately conflates
/// "no data" with a true zero, which is the behavior consumers are built
/// around.
pub fn mean_over_range<K: IndicatorKind>(
    series: &IndicatorSeries<K>,
    year_lo: i32,
    year_hi: i32,
) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in &series.yearly_values {
        if (year_lo..=year_hi).contains(&v.year) {
            sum += v.value;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Last reading by year order, or `None` for an empty series. Callers pick
/// their own sentinel for the missing case.
pub fn latest_value<K: IndicatorKind>(series: &IndicatorSeries<K>) -> Option<f64> {
    series.yearly_values.last().map(|v| v.value)
}

/// Scale an absolute value to a per-area rate.
///
/// Returns `None` when the area is missing, zero, or non-finite; the caller
/// must drop the country from its output rather than chart an Infinity or
/// NaN.
pub fn normalize_by_area(value: f64, area: Option<f64>, scale_factor: f64) -> Option<f64> {
    match area {
        Some(a) if a != 0.0 && a.is_finite() => Some(value * scale_factor / a),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::types::{DisasterKind, YearValue};

    fn series(points: &[(i32, f64)]) -> IndicatorSeries<DisasterKind> {
        IndicatorSeries {
            kind: DisasterKind::Flood,
            yearly_values: points
                .iter()
                .map(|&(year, value)| YearValue { year, value })
                .collect(),
        }
    }

    #[test]
    fn sum_of_empty_series_is_zero() {
        assert_eq!(sum_indicator(&series(&[])), 0.0);
    }

    #[test]
    fn sum_adds_all_years() {
        assert_eq!(sum_indicator(&series(&[(2000, 5.0), (2001, 3.0)])), 8.0);
    }

    #[test]
    fn mean_over_range_filters_years() {
        let s = series(&[(1990, 10.0), (2000, 20.0), (2010, 30.0)]);
        assert_eq!(mean_over_range(&s, 1995, 2010), 25.0);
    }

    #[test]
    fn mean_over_empty_range_is_zero() {
        let s = series(&[(1990, 10.0)]);
        assert_eq!(mean_over_range(&s, 2000, 2005), 0.0);
        assert_eq!(mean_over_range(&series(&[]), 1990, 2020), 0.0);
    }

    #[test]
    fn latest_value_takes_last_year() {
        let s = series(&[(1990, 1.0), (2019, 7.5)]);
        assert_eq!(latest_value(&s), Some(7.5));
        assert_eq!(latest_value(&series(&[])), None);
    }

    #[test]
    fn normalize_skips_zero_or_missing_area() {
        assert_eq!(normalize_by_area(50.0, Some(0.0), 100.0), None);
        assert_eq!(normalize_by_area(50.0, None, 100.0), None);
        assert_eq!(normalize_by_area(50.0, Some(f64::NAN), 100.0), None);
        assert_eq!(normalize_by_area(50.0, Some(25.0), 100.0), Some(200.0));
    }
}
