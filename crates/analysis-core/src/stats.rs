//! Small numeric helpers shared by the scoring engines.

use statrs::statistics::Statistics;

/// Mean of a data slice, 0 when empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.mean()
}

/// Sample standard deviation, 0 with fewer than two values.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    data.std_dev()
}

/// Simple returns (fractions) between consecutive prices.
pub fn returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Percentage change over the last `period` bars, `None` without enough history.
pub fn pct_change(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() <= period {
        return None;
    }
    let last = prices[prices.len() - 1];
    let base = prices[prices.len() - 1 - period];
    if base == 0.0 {
        return None;
    }
    Some((last - base) / base * 100.0)
}

/// Linear interpolation through `(x, y)` breakpoints sorted by `x`.
///
/// Inputs outside the breakpoint range take the nearest end value, so the
/// result is bounded by the breakpoint outputs.
pub fn piecewise_linear(x: f64, points: &[(f64, f64)]) -> f64 {
    let Some(&(first_x, first_y)) = points.first() else {
        return 0.0;
    };
    if x <= first_x {
        return first_y;
    }
    for w in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (w[0], w[1]);
        if x <= x1 {
            if (x1 - x0).abs() < f64::EPSILON {
                return y1;
            }
            return y0 + (y1 - y0) * (x - x0) / (x1 - x0);
        }
    }
    points[points.len() - 1].1
}

/// Map a signed value to 0-100 with 0 → 50, saturating smoothly.
pub fn tanh_score(value: f64, scale: f64) -> f64 {
    if scale <= 0.0 {
        return 50.0;
    }
    50.0 + 50.0 * (value / scale).tanh()
}

/// Weighted mean over the entries whose value is present.
///
/// Weights of missing entries are dropped and the rest renormalized;
/// `None` when nothing is present or the remaining weights sum to zero.
pub fn weighted_mean(entries: &[(Option<f64>, f64)]) -> Option<f64> {
    let (sum, total) = entries
        .iter()
        .filter_map(|(value, weight)| value.map(|v| (v * weight, *weight)))
        .fold((0.0, 0.0), |(s, t), (vw, w)| (s + vw, t + w));
    if total <= 0.0 {
        None
    } else {
        Some(sum / total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_std_dev() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(std_dev(&data), 2.138, epsilon = 0.001);
        assert_eq!(std_dev(&[1.0]), 0.0);
    }

    #[test]
    fn test_pct_change() {
        let prices = vec![100.0, 105.0, 110.0];
        assert_relative_eq!(pct_change(&prices, 2).unwrap(), 10.0);
        assert!(pct_change(&prices, 3).is_none());
    }

    #[test]
    fn test_piecewise_linear_bounded() {
        let points = [(0.0, 0.0), (10.0, 100.0)];
        assert_eq!(piecewise_linear(-5.0, &points), 0.0);
        assert_eq!(piecewise_linear(5.0, &points), 50.0);
        assert_eq!(piecewise_linear(50.0, &points), 100.0);
    }

    #[test]
    fn test_tanh_score_centered() {
        assert_eq!(tanh_score(0.0, 5.0), 50.0);
        assert!(tanh_score(100.0, 5.0) <= 100.0);
        assert!(tanh_score(-100.0, 5.0) >= 0.0);
        assert!(tanh_score(2.0, 5.0) > tanh_score(1.0, 5.0));
    }

    #[test]
    fn test_weighted_mean_renormalizes() {
        let value = weighted_mean(&[(Some(80.0), 0.5), (None, 0.3), (Some(40.0), 0.2)]).unwrap();
        assert_relative_eq!(value, (80.0 * 0.5 + 40.0 * 0.2) / 0.7);
        assert!(weighted_mean(&[(None, 1.0)]).is_none());
    }
}
