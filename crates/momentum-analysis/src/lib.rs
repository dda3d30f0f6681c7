use analysis_core::{stats, ComponentScore, PriceSeries};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One lookback horizon of the momentum blend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumHorizon {
    pub name: String,
    pub bars: usize,
    /// Return (percent) that maps to roughly 88 on the score scale.
    pub scale_pct: f64,
    pub weight: f64,
}

impl MomentumHorizon {
    fn new(name: &str, bars: usize, scale_pct: f64, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            bars,
            scale_pct,
            weight,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConfig {
    pub horizons: Vec<MomentumHorizon>,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            horizons: vec![
                MomentumHorizon::new("short", 5, 5.0, 0.5),
                MomentumHorizon::new("medium", 20, 10.0, 0.3),
                MomentumHorizon::new("long", 60, 20.0, 0.2),
            ],
        }
    }
}

pub struct MomentumAnalysisEngine {
    config: MomentumConfig,
}

impl MomentumAnalysisEngine {
    pub fn new() -> Self {
        Self::with_config(MomentumConfig::default())
    }

    pub fn with_config(config: MomentumConfig) -> Self {
        Self { config }
    }

    /// Trend score over short, medium and long lookbacks.
    ///
    /// Each horizon's percentage return maps through `50 + 50·tanh(r/scale)`,
    /// so a flat price scores 50 and extreme moves saturate inside [0, 100].
    /// Horizons longer than the history are skipped and the remaining weights
    /// renormalized; `None` when not even the shortest one fits.
    pub fn score_momentum(&self, series: &PriceSeries) -> Option<ComponentScore> {
        let closes = series.closes();

        let horizons: Vec<(&MomentumHorizon, Option<f64>)> = self
            .config
            .horizons
            .iter()
            .map(|h| (h, stats::pct_change(&closes, h.bars)))
            .collect();

        let entries: Vec<(Option<f64>, f64)> = horizons
            .iter()
            .map(|(h, ret)| (ret.map(|r| stats::tanh_score(r, h.scale_pct)), h.weight))
            .collect();

        let Some(value) = stats::weighted_mean(&entries) else {
            tracing::debug!("momentum undefined: {} bars", closes.len());
            return None;
        };

        let mut breakdown = serde_json::Map::new();
        for ((h, ret), (score, _)) in horizons.iter().zip(entries.iter()) {
            breakdown.insert(
                h.name.clone(),
                json!({ "bars": h.bars, "return_pct": ret, "score": score }),
            );
        }

        Some(ComponentScore::new(value, json!({ "horizons": breakdown })))
    }
}

impl Default for MomentumAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::Bar;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PriceSeries::new(
            closes
                .iter()
                .enumerate()
                .map(|(i, &close)| Bar {
                    timestamp: start + Duration::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1_000.0,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_flat_prices_score_fifty() {
        let engine = MomentumAnalysisEngine::new();
        let score = engine.score_momentum(&series(&[100.0; 80])).unwrap();
        assert_relative_eq!(score.value(), 50.0);
    }

    #[test]
    fn test_uptrend_beats_downtrend() {
        let engine = MomentumAnalysisEngine::new();
        let up: Vec<f64> = (0..80).map(|i| 100.0 + i as f64).collect();
        let down: Vec<f64> = (0..80).map(|i| 200.0 - i as f64).collect();

        let up_score = engine.score_momentum(&series(&up)).unwrap().value();
        let down_score = engine.score_momentum(&series(&down)).unwrap().value();
        assert!(up_score > 50.0);
        assert!(down_score < 50.0);
    }

    #[test]
    fn test_short_history_uses_short_horizon_only() {
        let engine = MomentumAnalysisEngine::new();
        // 10 bars: only the 5-bar return is defined, +5%
        let mut closes = vec![100.0; 5];
        closes.extend(vec![105.0; 5]);
        let score = engine.score_momentum(&series(&closes)).unwrap();
        assert_relative_eq!(score.value(), 50.0 + 50.0 * 1.0f64.tanh(), epsilon = 1e-9);
        assert!(score.inputs()["horizons"]["long"]["score"].is_null());
    }

    #[test]
    fn test_too_short_is_undefined() {
        let engine = MomentumAnalysisEngine::new();
        assert!(engine.score_momentum(&series(&[100.0, 101.0, 102.0])).is_none());
        assert!(engine.score_momentum(&PriceSeries::default()).is_none());
    }

    #[test]
    fn test_extreme_moves_stay_bounded() {
        let engine = MomentumAnalysisEngine::new();
        let moon: Vec<f64> = (0..80).map(|i| 1.2f64.powi(i)).collect();
        let score = engine.score_momentum(&series(&moon)).unwrap().value();
        assert!(score <= 100.0 && score > 99.0);
    }
}
