use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use fundamental_analysis::FundamentalScales;
use momentum_analysis::MomentumConfig;
use price_predictor::PredictorConfig;
use scoring_engine::{EntryThresholds, RecommendationPolicy, ScoringWeights};
use sentiment_analysis::SentimentConfig;
use smart_watchlist::RankingConfig;
use std::env;
use std::str::FromStr;
use technical_analysis::IndicatorConfig;

const MAX_PRICE_LOOKBACK_DAYS: i64 = 36_500;
const MAX_NEWS_WINDOW_DAYS: i64 = 365;
const MAX_CACHE_TTL_SECS: i64 = 86_400;

/// Every tunable of the engine in one place.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // Scoring policy
    pub weights: ScoringWeights,
    pub entry: EntryThresholds,
    pub recommendation: RecommendationPolicy,
    pub fundamental_scales: FundamentalScales,
    pub sentiment: SentimentConfig,
    pub momentum: MomentumConfig,
    pub predictor: PredictorConfig,
    pub ranking: RankingConfig,
    pub indicators: IndicatorConfig,

    // Orchestration
    pub price_lookback_days: i64,           // 365
    pub news_window: Duration,              // 7 days
    pub fetch_timeout: std::time::Duration, // per collaborator call
    pub cache_ttl: Duration,                // 5 minutes
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            entry: EntryThresholds::default(),
            recommendation: RecommendationPolicy::default(),
            fundamental_scales: FundamentalScales::default(),
            sentiment: SentimentConfig::default(),
            momentum: MomentumConfig::default(),
            predictor: PredictorConfig::default(),
            ranking: RankingConfig::default(),
            indicators: IndicatorConfig::default(),
            price_lookback_days: 365,
            news_window: Duration::days(7),
            fetch_timeout: std::time::Duration::from_secs(10),
            cache_ttl: Duration::seconds(300),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let weights = ScoringWeights {
            technical: env_or("SCORE_WEIGHT_TECHNICAL", defaults.weights.technical)?,
            fundamental: env_or("SCORE_WEIGHT_FUNDAMENTAL", defaults.weights.fundamental)?,
            sentiment: env_or("SCORE_WEIGHT_SENTIMENT", defaults.weights.sentiment)?,
            momentum: env_or("SCORE_WEIGHT_MOMENTUM", defaults.weights.momentum)?,
        };

        let recommendation = RecommendationPolicy {
            buy_score_threshold: env_or(
                "BUY_SCORE_THRESHOLD",
                defaults.recommendation.buy_score_threshold,
            )?,
            reject_score_threshold: env_or(
                "REJECT_SCORE_THRESHOLD",
                defaults.recommendation.reject_score_threshold,
            )?,
            stop_loss_fraction: env_or(
                "STOP_LOSS_FRACTION",
                defaults.recommendation.stop_loss_fraction,
            )?,
        };

        let news_window_days: i64 =
            env_or("NEWS_WINDOW_DAYS", defaults.news_window.num_days())?;
        let fetch_timeout_secs: u64 =
            env_or("FETCH_TIMEOUT_SECS", defaults.fetch_timeout.as_secs())?;
        let cache_ttl_secs: i64 = env_or("CACHE_TTL_SECS", defaults.cache_ttl.num_seconds())?;

        let news_window = Duration::try_days(news_window_days)
            .ok_or_else(|| anyhow!("NEWS_WINDOW_DAYS={} is out of range", news_window_days))?;
        let cache_ttl = Duration::try_seconds(cache_ttl_secs)
            .ok_or_else(|| anyhow!("CACHE_TTL_SECS={} is out of range", cache_ttl_secs))?;

        let config = Self {
            weights,
            recommendation,
            // The sentiment window and the news fetch window move together
            sentiment: SentimentConfig {
                window_days: news_window_days,
                ..defaults.sentiment
            },
            price_lookback_days: env_or("PRICE_LOOKBACK_DAYS", defaults.price_lookback_days)?,
            news_window,
            fetch_timeout: std::time::Duration::from_secs(fetch_timeout_secs),
            cache_ttl,
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate().context("Invalid scoring weights")?;
        self.recommendation
            .validate()
            .context("Invalid recommendation policy")?;
        anyhow::ensure!(
            self.price_lookback_days > 0 && self.price_lookback_days <= MAX_PRICE_LOOKBACK_DAYS,
            "PRICE_LOOKBACK_DAYS must be in 1..={}, got {}",
            MAX_PRICE_LOOKBACK_DAYS,
            self.price_lookback_days
        );
        anyhow::ensure!(
            self.news_window > Duration::zero()
                && self.news_window.num_days() <= MAX_NEWS_WINDOW_DAYS,
            "NEWS_WINDOW_DAYS must be in 1..={}",
            MAX_NEWS_WINDOW_DAYS
        );
        anyhow::ensure!(
            self.sentiment.window_days > 0 && self.sentiment.window_days <= MAX_NEWS_WINDOW_DAYS,
            "Sentiment window must be in 1..={} days, got {}",
            MAX_NEWS_WINDOW_DAYS,
            self.sentiment.window_days
        );
        anyhow::ensure!(
            !self.fetch_timeout.is_zero(),
            "FETCH_TIMEOUT_SECS must be positive"
        );
        anyhow::ensure!(
            self.cache_ttl >= Duration::zero()
                && self.cache_ttl.num_seconds() <= MAX_CACHE_TTL_SECS,
            "CACHE_TTL_SECS must be in 0..={}",
            MAX_CACHE_TTL_SECS
        );
        Ok(())
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Failed to parse {}={:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.weights, ScoringWeights::default());
        assert_eq!(config.cache_ttl.num_seconds(), 300);
        assert_eq!(config.news_window.num_days(), config.sentiment.window_days);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = EngineConfig::default();
        config.weights.momentum = -0.1;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.recommendation.stop_loss_fraction = 0.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.fetch_timeout = std::time::Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_windows() {
        let mut config = EngineConfig::default();
        config.price_lookback_days = i64::MAX / 10;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.price_lookback_days = MAX_PRICE_LOOKBACK_DAYS;
        assert!(config.validate().is_ok());

        let mut config = EngineConfig::default();
        config.news_window = Duration::days(MAX_NEWS_WINDOW_DAYS + 1);
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.sentiment.window_days = i64::MAX;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.cache_ttl = Duration::days(2);
        assert!(config.validate().is_err());
    }

    // One test owns the process environment so parallel tests never race on it
    #[test]
    fn test_from_env_overrides_and_errors() {
        env::set_var("SCORE_WEIGHT_MOMENTUM", "0.2");
        env::set_var("STOP_LOSS_FRACTION", "0.05");
        env::set_var("NEWS_WINDOW_DAYS", "3");
        env::set_var("CACHE_TTL_SECS", "60");

        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.weights.momentum, 0.2);
        assert_eq!(config.weights.technical, 0.35);
        assert_eq!(config.recommendation.stop_loss_fraction, 0.05);
        assert_eq!(config.news_window.num_days(), 3);
        assert_eq!(config.sentiment.window_days, 3);
        assert_eq!(config.cache_ttl.num_seconds(), 60);

        env::set_var("FETCH_TIMEOUT_SECS", "soon");
        assert!(EngineConfig::from_env().is_err());
        env::remove_var("FETCH_TIMEOUT_SECS");

        env::set_var("STOP_LOSS_FRACTION", "1.5");
        assert!(EngineConfig::from_env().is_err());
        env::set_var("STOP_LOSS_FRACTION", "0.05");

        // Values chrono cannot represent are errors, not panics
        env::set_var("NEWS_WINDOW_DAYS", "9999999999999");
        assert!(EngineConfig::from_env().is_err());
        env::set_var("NEWS_WINDOW_DAYS", "3");

        env::set_var("CACHE_TTL_SECS", &i64::MAX.to_string());
        assert!(EngineConfig::from_env().is_err());
        env::set_var("CACHE_TTL_SECS", "60");

        env::set_var("PRICE_LOOKBACK_DAYS", "922337203685477580");
        assert!(EngineConfig::from_env().is_err());
        env::remove_var("PRICE_LOOKBACK_DAYS");

        for key in [
            "SCORE_WEIGHT_MOMENTUM",
            "STOP_LOSS_FRACTION",
            "NEWS_WINDOW_DAYS",
            "CACHE_TTL_SECS",
        ] {
            env::remove_var(key);
        }
    }
}
