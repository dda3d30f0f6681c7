use async_trait::async_trait;
use chrono::Duration;

use crate::{AnalysisError, Fundamentals, NewsItem, PriceSeries};

/// Source of daily price history
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Fails with `AnalysisError::DataUnavailable` when no history can be supplied.
    async fn fetch_price_history(
        &self,
        symbol: &str,
        lookback_days: i64,
    ) -> Result<PriceSeries, AnalysisError>;
}

/// Source of fundamental ratios
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals, AnalysisError>;
}

/// Source of recent headlines. An empty list is a valid answer.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_recent_news(
        &self,
        symbol: &str,
        window: Duration,
    ) -> Result<Vec<NewsItem>, AnalysisError>;
}

/// Maps a headline to a polarity in [-1, 1]
pub trait PolarityScorer: Send + Sync {
    fn score_polarity(&self, text: &str) -> f64;
}
