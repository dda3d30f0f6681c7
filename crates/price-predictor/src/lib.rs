//! Multi-horizon price projections.
//!
//! Short horizons extrapolate the recent drift with damping and a volatility
//! cap. The 12-month horizon leans on the fundamental and composite scores,
//! blended with trailing growth and bounded by historical volatility.

use analysis_core::{
    stats, AnalysisError, HorizonForecast, IndicatorSet, OverallScore, Outlook, Prediction,
    PriceSeries,
};
use serde::{Deserialize, Serialize};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Multiplier pulling the one-day extrapolation toward zero.
    pub tomorrow_damping: f64,
    /// Daily σ used when the series is too short to measure one.
    pub fallback_daily_volatility: f64,
    /// Share of one daily σ added per 50 points of momentum above neutral.
    pub momentum_tilt: f64,
    pub week_days: f64,
    pub week_damping: f64,
    /// Week projection is capped at this many `σ·√week_days`.
    pub week_sigma_multiple: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
    /// Projected 12-month move for a perfect (100) driver score.
    pub max_score_upside: f64,
    /// Weight of the score-driven estimate; trailing growth gets the rest.
    pub score_driven_weight: f64,
    /// `(bars, weight)` trailing growth windows, each annualised.
    pub growth_windows: Vec<(usize, f64)>,
    pub min_annual_volatility: f64,
    pub max_annual_volatility: f64,
    /// Bound on the 12-month move when volatility is unknown.
    pub default_annual_bound: f64,
    /// Outlook is Bullish above `+threshold`, Bearish below `-threshold`.
    pub outlook_threshold: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            tomorrow_damping: 0.5,
            fallback_daily_volatility: 0.02,
            momentum_tilt: 0.25,
            week_days: 5.0,
            week_damping: 0.8,
            week_sigma_multiple: 1.5,
            min_confidence: 30.0,
            max_confidence: 90.0,
            max_score_upside: 0.30,
            score_driven_weight: 0.75,
            growth_windows: vec![(63, 0.5), (126, 0.3), (252, 0.2)],
            min_annual_volatility: 0.05,
            max_annual_volatility: 0.60,
            default_annual_bound: 0.30,
            outlook_threshold: 0.05,
        }
    }
}

pub struct PricePredictor {
    config: PredictorConfig,
}

impl PricePredictor {
    pub fn new() -> Self {
        Self::with_config(PredictorConfig::default())
    }

    pub fn with_config(config: PredictorConfig) -> Self {
        Self { config }
    }

    pub fn predict(
        &self,
        series: &PriceSeries,
        indicators: &IndicatorSet,
        overall: &OverallScore,
    ) -> Result<Prediction, AnalysisError> {
        let current_price = series
            .last_close()
            .filter(|p| *p > 0.0)
            .ok_or_else(|| AnalysisError::DataUnavailable("no usable last close".to_string()))?;

        let cfg = &self.config;
        let daily_sigma = indicators
            .daily_volatility
            .filter(|s| *s > 0.0)
            .unwrap_or(cfg.fallback_daily_volatility);

        let drift = self.daily_drift(indicators, overall.components.momentum, daily_sigma);

        let tomorrow = (drift * cfg.tomorrow_damping).clamp(-daily_sigma, daily_sigma);

        let week_cap = cfg.week_sigma_multiple * daily_sigma * cfg.week_days.sqrt();
        let week = (drift * cfg.week_days * cfg.week_damping).clamp(-week_cap, week_cap);

        let annualized_volatility = indicators
            .daily_volatility
            .filter(|s| *s > 0.0)
            .map(|s| s * TRADING_DAYS_PER_YEAR.sqrt());
        let long_term = self.long_term_fraction(series, overall, annualized_volatility);

        let long_term_outlook = if long_term > cfg.outlook_threshold {
            Outlook::Bullish
        } else if long_term < -cfg.outlook_threshold {
            Outlook::Bearish
        } else {
            Outlook::Neutral
        };

        let tomorrow_confidence = self.confidence(indicators);

        tracing::debug!(
            "prediction: tomorrow {:+.2}% ({:.0}% conf), week {:+.2}%, 12m {:+.2}% ({})",
            tomorrow * 100.0,
            tomorrow_confidence,
            week * 100.0,
            long_term * 100.0,
            long_term_outlook.to_label()
        );

        Ok(Prediction {
            tomorrow: HorizonForecast::from_fraction(current_price, tomorrow),
            tomorrow_confidence,
            week: HorizonForecast::from_fraction(current_price, week),
            long_term: HorizonForecast::from_fraction(current_price, long_term),
            long_term_outlook,
            annualized_volatility,
        })
    }

    /// Expected daily return before damping: recent mean return tilted by
    /// momentum and scaled by the volume trend.
    fn daily_drift(&self, ind: &IndicatorSet, momentum: Option<f64>, daily_sigma: f64) -> f64 {
        let trend = ind.recent_trend.unwrap_or(0.0);
        let tilt = momentum
            .map(|m| (m - 50.0) / 50.0 * daily_sigma * self.config.momentum_tilt)
            .unwrap_or(0.0);

        let volume_factor = match ind.volume_trend {
            Some(v) if v > 1.2 => 1.1,
            Some(v) if v < 0.8 => 0.9,
            _ => 1.0,
        };

        (trend + tilt) * volume_factor
    }

    /// Indicator agreement mapped into `[min_confidence, max_confidence]`.
    ///
    /// RSI side of 50, MACD vs signal, recent trend and price vs SMA-20 each
    /// vote bullish or bearish; unanimous votes give the ceiling, an even
    /// split or no votes at all give the floor.
    pub fn confidence(&self, ind: &IndicatorSet) -> f64 {
        let votes: Vec<bool> = [
            ind.rsi.map(|r| r > 50.0),
            ind.macd_line.zip(ind.macd_signal).map(|(l, s)| l > s),
            ind.recent_trend.map(|t| t > 0.0),
            ind.price_vs(ind.sma_20).map(|p| p > 0.0),
        ]
        .into_iter()
        .flatten()
        .collect();

        let cfg = &self.config;
        if votes.is_empty() {
            return cfg.min_confidence;
        }
        let bullish = votes.iter().filter(|v| **v).count() as f64;
        let bearish = votes.len() as f64 - bullish;
        let agreement = (bullish - bearish).abs() / votes.len() as f64;
        cfg.min_confidence + (cfg.max_confidence - cfg.min_confidence) * agreement
    }

    /// Annualised trailing growth, weighted over the windows the history covers.
    pub fn trailing_growth(&self, series: &PriceSeries) -> Option<f64> {
        let closes = series.closes();
        let entries: Vec<(Option<f64>, f64)> = self
            .config
            .growth_windows
            .iter()
            .map(|&(bars, weight)| {
                let annualised = stats::pct_change(&closes, bars)
                    .map(|pct| pct / 100.0 * TRADING_DAYS_PER_YEAR / bars as f64);
                (annualised, weight)
            })
            .collect();
        stats::weighted_mean(&entries)
    }

    fn long_term_fraction(
        &self,
        series: &PriceSeries,
        overall: &OverallScore,
        annualized_volatility: Option<f64>,
    ) -> f64 {
        let cfg = &self.config;

        let driver = stats::weighted_mean(&[
            (overall.components.fundamental, 1.0),
            (Some(overall.composite), 1.0),
        ])
        .unwrap_or(overall.composite);
        let score_driven = (driver - 50.0) / 50.0 * cfg.max_score_upside;

        let blended = match self.trailing_growth(series) {
            Some(growth) => {
                cfg.score_driven_weight * score_driven + (1.0 - cfg.score_driven_weight) * growth
            }
            None => score_driven,
        };

        let bound = annualized_volatility
            .map(|v| v.clamp(cfg.min_annual_volatility, cfg.max_annual_volatility))
            .unwrap_or(cfg.default_annual_bound);

        if blended.is_finite() {
            blended.clamp(-bound, bound)
        } else {
            0.0
        }
    }
}

impl Default for PricePredictor {
    fn default() -> Self {
        Self::new()
    }
}
