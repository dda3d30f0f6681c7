//! In-memory market data for offline runs and tests.

use analysis_core::{
    AnalysisError, Fundamentals, FundamentalsProvider, NewsItem, NewsProvider,
    PriceHistoryProvider, PriceSeries,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;

/// Serves price history, fundamentals and news from maps keyed by symbol.
///
/// Symbols are matched case-insensitively.
#[derive(Default)]
pub struct InMemoryMarketData {
    prices: DashMap<String, PriceSeries>,
    fundamentals: DashMap<String, Fundamentals>,
    news: DashMap<String, Vec<NewsItem>>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_prices(&self, symbol: &str, series: PriceSeries) {
        self.prices.insert(symbol.to_uppercase(), series);
    }

    pub fn insert_fundamentals(&self, symbol: &str, fundamentals: Fundamentals) {
        self.fundamentals.insert(symbol.to_uppercase(), fundamentals);
    }

    pub fn insert_news(&self, symbol: &str, items: Vec<NewsItem>) {
        self.news.insert(symbol.to_uppercase(), items);
    }

    pub fn with_prices(self, symbol: &str, series: PriceSeries) -> Self {
        self.insert_prices(symbol, series);
        self
    }

    pub fn with_fundamentals(self, symbol: &str, fundamentals: Fundamentals) -> Self {
        self.insert_fundamentals(symbol, fundamentals);
        self
    }

    pub fn with_news(self, symbol: &str, items: Vec<NewsItem>) -> Self {
        self.insert_news(symbol, items);
        self
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.prices.iter().map(|e| e.key().clone()).collect();
        symbols.sort();
        symbols
    }
}

#[async_trait]
impl PriceHistoryProvider for InMemoryMarketData {
    /// Bars within `lookback_days` of the latest stored bar.
    async fn fetch_price_history(
        &self,
        symbol: &str,
        lookback_days: i64,
    ) -> Result<PriceSeries, AnalysisError> {
        let series = self
            .prices
            .get(&symbol.to_uppercase())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AnalysisError::DataUnavailable(format!("no price history for {}", symbol)))?;

        let Some(last) = series.last_timestamp() else {
            return Err(AnalysisError::DataUnavailable(format!(
                "empty price history for {}",
                symbol
            )));
        };
        let cutoff = Duration::try_days(lookback_days)
            .and_then(|span| last.checked_sub_signed(span))
            .ok_or_else(|| {
                AnalysisError::InvalidData(format!("lookback of {} days is out of range", lookback_days))
            })?;
        let bars = series
            .bars()
            .iter()
            .filter(|b| b.timestamp >= cutoff)
            .cloned()
            .collect();
        PriceSeries::new(bars)
    }
}

#[async_trait]
impl FundamentalsProvider for InMemoryMarketData {
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals, AnalysisError> {
        self.fundamentals
            .get(&symbol.to_uppercase())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AnalysisError::DataUnavailable(format!("no fundamentals for {}", symbol)))
    }
}

#[async_trait]
impl NewsProvider for InMemoryMarketData {
    /// Headlines published within `window` of now; unknown symbols have none.
    async fn fetch_recent_news(
        &self,
        symbol: &str,
        window: Duration,
    ) -> Result<Vec<NewsItem>, AnalysisError> {
        let cutoff = Utc::now()
            .checked_sub_signed(window)
            .ok_or_else(|| AnalysisError::InvalidData(format!("news window {} is out of range", window)))?;
        Ok(self
            .news
            .get(&symbol.to_uppercase())
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|item| item.published_utc >= cutoff)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
