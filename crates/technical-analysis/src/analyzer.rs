use analysis_core::{stats, ComponentScore, IndicatorSet, PriceSeries};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::indicators::*;

/// Indicator periods
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub sma_short: usize,
    pub sma_long: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub adx_period: usize,
    pub volume_period: usize,
    /// Bars treated as one trading year (52-week range, volatility window).
    pub year_bars: usize,
    /// Bars averaged for the recent daily-return trend.
    pub trend_bars: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            sma_short: 20,
            sma_long: 50,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            adx_period: 14,
            volume_period: 20,
            year_bars: 252,
            trend_bars: 10,
        }
    }
}

pub struct TechnicalAnalysisEngine {
    config: IndicatorConfig,
}

impl TechnicalAnalysisEngine {
    pub fn new() -> Self {
        Self::with_config(IndicatorConfig::default())
    }

    pub fn with_config(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Snapshot every indicator at the tail of `series`.
    ///
    /// Indicators without enough history are left as `None`.
    pub fn compute_indicators(&self, series: &PriceSeries) -> IndicatorSet {
        let cfg = &self.config;
        let bars = series.bars();
        let closes = series.closes();
        let volumes = series.volumes();

        let macd_result = macd(&closes, cfg.macd_fast, cfg.macd_slow, cfg.macd_signal);
        let bb = bollinger_bands(&closes, cfg.bollinger_period, cfg.bollinger_std_dev);

        let daily_returns = stats::returns(&closes);
        let recent_trend = (daily_returns.len() >= cfg.trend_bars && cfg.trend_bars > 0)
            .then(|| stats::mean(&daily_returns[daily_returns.len() - cfg.trend_bars..]));
        let vol_window = &daily_returns[daily_returns.len().saturating_sub(cfg.year_bars)..];
        let daily_volatility = (vol_window.len() >= 2).then(|| stats::std_dev(vol_window));

        let indicators = IndicatorSet {
            last_close: series.last_close(),
            rsi: rsi(&closes, cfg.rsi_period).last().copied(),
            // MACD line and signal are reported together or not at all
            macd_line: macd_result.signal_line.last().and(macd_result.macd_line.last().copied()),
            macd_signal: macd_result.signal_line.last().copied(),
            macd_histogram: macd_result.histogram.last().copied(),
            sma_20: sma(&closes, cfg.sma_short).last().copied(),
            sma_50: sma(&closes, cfg.sma_long).last().copied(),
            bb_upper: bb.upper.last().copied(),
            bb_middle: bb.middle.last().copied(),
            bb_lower: bb.lower.last().copied(),
            adx: adx(bars, cfg.adx_period).adx.last().copied(),
            volume_ratio: volume_ratio(&volumes, cfg.volume_period),
            volume_trend: volume_trend(&volumes, 5, 25),
            return_5d: stats::pct_change(&closes, 5),
            return_20d: stats::pct_change(&closes, 20),
            recent_trend,
            daily_volatility,
            week52_position: range_position(bars, cfg.year_bars),
        };

        let missing = indicators.unavailable();
        if !missing.is_empty() {
            tracing::debug!(
                "{} bars: indicators unavailable: {}",
                series.len(),
                missing.join(", ")
            );
        }

        indicators
    }

    /// Points-based technical score over the available indicators.
    ///
    /// Each indicator contributes `(points, max_points)`; unavailable ones are
    /// left out of both sums. Returns `None` when nothing is available.
    pub fn score(&self, ind: &IndicatorSet) -> Option<ComponentScore> {
        let mut signals: Vec<(&'static str, f64, f64)> = Vec::new();

        if let Some(rsi) = ind.rsi {
            let points = if (40.0..=60.0).contains(&rsi) {
                20.0
            } else if rsi > 30.0 && rsi < 70.0 {
                15.0
            } else if rsi <= 30.0 {
                10.0
            } else {
                0.0
            };
            signals.push(("rsi", points, 20.0));
        }

        if let (Some(line), Some(signal)) = (ind.macd_line, ind.macd_signal) {
            signals.push(("macd", if line > signal { 15.0 } else { 0.0 }, 15.0));
        }

        match (ind.last_close, ind.sma_20, ind.sma_50) {
            (Some(price), Some(short), Some(long)) => {
                let points = if price > short && short > long {
                    25.0
                } else if price > short {
                    15.0
                } else {
                    0.0
                };
                signals.push(("moving_averages", points, 25.0));
            }
            (Some(price), Some(short), None) => {
                signals.push(("moving_averages", if price > short { 15.0 } else { 0.0 }, 15.0));
            }
            _ => {}
        }

        if let (Some(price), Some(upper), Some(middle), Some(lower)) =
            (ind.last_close, ind.bb_upper, ind.bb_middle, ind.bb_lower)
        {
            let points = if price > lower && price < upper {
                if price > middle { 20.0 } else { 10.0 }
            } else {
                0.0
            };
            signals.push(("bollinger", points, 20.0));
        }

        if let Some(ratio) = ind.volume_ratio {
            signals.push(("volume", if ratio > 1.0 { 10.0 } else { 0.0 }, 10.0));
        }

        if let Some(adx) = ind.adx {
            signals.push(("adx", if adx > 25.0 { 10.0 } else { 0.0 }, 10.0));
        }

        let max_points: f64 = signals.iter().map(|(_, _, max)| max).sum();
        if max_points <= 0.0 {
            return None;
        }
        let points: f64 = signals.iter().map(|(_, p, _)| p).sum();

        let breakdown: serde_json::Map<String, serde_json::Value> = signals
            .iter()
            .map(|(name, p, max)| (name.to_string(), json!({ "points": p, "max": max })))
            .collect();

        Some(ComponentScore::new(
            points / max_points * 100.0,
            json!({
                "rsi": ind.rsi,
                "macd": ind.macd_line,
                "macd_signal": ind.macd_signal,
                "sma_20": ind.sma_20,
                "sma_50": ind.sma_50,
                "bb_position": ind.bollinger_position(),
                "volume_ratio": ind.volume_ratio,
                "adx": ind.adx,
                "breakdown": breakdown,
            }),
        ))
    }
}

impl Default for TechnicalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::Bar;
    use chrono::{Duration, TimeZone, Utc};

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000_000.0 + (i % 7) as f64 * 50_000.0,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn test_short_series_marks_indicators_unavailable() {
        let engine = TechnicalAnalysisEngine::new();
        let series = series_from_closes(&[100.0, 101.0, 102.0, 101.5, 103.0]);
        let ind = engine.compute_indicators(&series);

        assert!(ind.rsi.is_none());
        assert!(ind.sma_20.is_none());
        assert!(ind.macd_line.is_none());
        assert!(ind.adx.is_none());
        assert_eq!(ind.last_close, Some(103.0));
        assert!(ind.week52_position.is_some());
    }

    #[test]
    fn test_empty_series_has_no_score() {
        let engine = TechnicalAnalysisEngine::new();
        let ind = engine.compute_indicators(&PriceSeries::default());
        assert!(engine.score(&ind).is_none());
    }

    #[test]
    fn test_full_history_populates_indicators() {
        let engine = TechnicalAnalysisEngine::new();
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.2).collect();
        let ind = engine.compute_indicators(&series_from_closes(&closes));

        assert!(ind.unavailable().is_empty());
        assert!(ind.volume_trend.is_some());
        assert!(ind.daily_volatility.unwrap() > 0.0);
        let score = engine.score(&ind).unwrap();
        assert!((0.0..=100.0).contains(&score.value()));
    }

    #[test]
    fn test_score_renormalizes_over_available_indicators() {
        let engine = TechnicalAnalysisEngine::new();
        // Only RSI (neutral band, full points) and volume (below average, zero points)
        let ind = IndicatorSet {
            last_close: Some(100.0),
            rsi: Some(50.0),
            volume_ratio: Some(0.8),
            ..Default::default()
        };
        let score = engine.score(&ind).unwrap();
        assert!((score.value() - 20.0 / 30.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_bullish_stack_scores_high() {
        let engine = TechnicalAnalysisEngine::new();
        let ind = IndicatorSet {
            last_close: Some(110.0),
            rsi: Some(55.0),
            macd_line: Some(1.2),
            macd_signal: Some(0.8),
            sma_20: Some(105.0),
            sma_50: Some(100.0),
            bb_upper: Some(115.0),
            bb_middle: Some(105.0),
            bb_lower: Some(95.0),
            adx: Some(30.0),
            volume_ratio: Some(1.4),
            ..Default::default()
        };
        assert_eq!(engine.score(&ind).unwrap().value(), 100.0);
    }
}
