use analysis_core::{
    AnalysisError, AnalysisResult, Fundamentals, FundamentalsProvider, NewsItem, NewsProvider,
    PolarityScorer, PriceHistoryProvider, PriceSeries,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sentiment_analysis::{score_headlines, LexiconPolarityScorer};
use smart_watchlist::ListKind;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::timeout;

pub mod config;
pub mod memory;
pub mod pipeline;
pub mod screener;

#[cfg(test)]
mod fixtures;

pub use config::EngineConfig;
pub use memory::InMemoryMarketData;
pub use pipeline::AnalysisEngines;
pub use screener::{ScreenFailure, ScreenerResult, StockScreener, StockUniverse};

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Per-symbol results of a batch, plus the symbols that failed and why.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<AnalysisResult>,
    pub failures: Vec<(String, AnalysisError)>,
}

/// Fetches inputs from the collaborators and runs the scoring pipeline.
pub struct AnalysisOrchestrator {
    prices: Arc<dyn PriceHistoryProvider>,
    fundamentals: Arc<dyn FundamentalsProvider>,
    news: Arc<dyn NewsProvider>,
    polarity: Arc<dyn PolarityScorer>,
    engines: AnalysisEngines,
    config: EngineConfig,
    /// Completed analyses per symbol (TTL from config)
    result_cache: DashMap<String, CacheEntry<AnalysisResult>>,
}

impl AnalysisOrchestrator {
    pub fn new(
        prices: Arc<dyn PriceHistoryProvider>,
        fundamentals: Arc<dyn FundamentalsProvider>,
        news: Arc<dyn NewsProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            prices,
            fundamentals,
            news,
            polarity: Arc::new(LexiconPolarityScorer::new()),
            engines: AnalysisEngines::from_config(&config),
            config,
            result_cache: DashMap::new(),
        }
    }

    /// Use one source for prices, fundamentals and news.
    pub fn from_source<S>(source: Arc<S>, config: EngineConfig) -> Self
    where
        S: PriceHistoryProvider + FundamentalsProvider + NewsProvider + 'static,
    {
        Self::new(source.clone(), source.clone(), source, config)
    }

    /// Replace the default lexicon headline scorer
    pub fn with_polarity_scorer(mut self, scorer: Arc<dyn PolarityScorer>) -> Self {
        self.polarity = scorer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engines(&self) -> &AnalysisEngines {
        &self.engines
    }

    /// Full analysis of one symbol.
    ///
    /// Price history is required; fundamentals and news are optional and a
    /// failure or timeout fetching them only drops their component.
    pub async fn analyze(&self, symbol: &str) -> Result<AnalysisResult, AnalysisError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(AnalysisError::InvalidData("empty symbol".to_string()));
        }

        if let Some(cached) = self.cached(&symbol) {
            tracing::debug!("Serving cached analysis for {}", symbol);
            return Ok(cached);
        }

        tracing::info!("Starting analysis for {}", symbol);

        let (series, fundamentals, news) = tokio::join!(
            self.fetch_prices(&symbol),
            self.fetch_fundamentals(&symbol),
            self.fetch_news(&symbol),
        );
        let series = series?;

        let as_of = Utc::now();
        let polarities = score_headlines(&news, self.polarity.as_ref());
        let result = self.engines.analyze_symbol(
            &symbol,
            &series,
            fundamentals.as_ref(),
            &polarities,
            as_of,
        )?;

        tracing::info!(
            "Analysis complete for {}: {:.1}/100 ({}), entry {}, {}",
            symbol,
            result.composite(),
            result.overall.rating.to_label(),
            result.entry_signal().to_label(),
            result.recommendation.decision.to_label()
        );

        self.result_cache.insert(
            symbol,
            CacheEntry {
                data: result.clone(),
                cached_at: as_of,
            },
        );
        Ok(result)
    }

    /// Analyze every symbol concurrently, one task per symbol.
    ///
    /// A failing symbol never fails the batch; it is reported in
    /// `failures`. Both lists come back sorted by symbol.
    pub async fn analyze_batch(self: &Arc<Self>, symbols: &[String]) -> BatchOutcome {
        let mut unique: Vec<String> = symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        unique.sort();
        unique.dedup();

        tracing::info!("Starting batch analysis of {} symbols", unique.len());

        let mut tasks = JoinSet::new();
        let mut task_symbols = HashMap::new();
        for symbol in unique {
            let orchestrator = Arc::clone(self);
            let task_symbol = symbol.clone();
            let handle = tasks.spawn(async move {
                let result = orchestrator.analyze(&task_symbol).await;
                (task_symbol, result)
            });
            task_symbols.insert(handle.id(), symbol);
        }

        let mut outcome = BatchOutcome::default();
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, (_symbol, Ok(result)))) => outcome.results.push(result),
                Ok((_, (symbol, Err(e)))) => {
                    tracing::warn!("Failed to analyze {}: {}", symbol, e);
                    outcome.failures.push((symbol, e));
                }
                Err(e) => {
                    // Panicked or cancelled task: still report its symbol
                    let symbol = task_symbols
                        .remove(&e.id())
                        .unwrap_or_else(|| format!("task {}", e.id()));
                    tracing::error!("Task error for {}: {}", symbol, e);
                    outcome
                        .failures
                        .push((symbol, AnalysisError::TaskFailed(e.to_string())));
                }
            }
        }

        outcome.results.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        outcome.failures.sort_by(|a, b| a.0.cmp(&b.0));

        tracing::info!(
            "Batch complete: {} analyzed, {} failed",
            outcome.results.len(),
            outcome.failures.len()
        );
        outcome
    }

    /// Order results into the named list, best first.
    pub fn rank<'a>(
        &self,
        results: &'a [AnalysisResult],
        kind: ListKind,
        count: usize,
    ) -> Vec<&'a AnalysisResult> {
        self.engines.ranker.rank(results, kind, count)
    }

    /// Drop every cached analysis.
    pub fn clear_cache(&self) {
        self.result_cache.clear();
    }

    /// Fresh cached analysis, evicting the entry once it has expired.
    fn cached(&self, symbol: &str) -> Option<AnalysisResult> {
        let ttl = self.config.cache_ttl;
        let expired = |entry: &CacheEntry<AnalysisResult>| Utc::now() - entry.cached_at >= ttl;

        if self.result_cache.remove_if(symbol, |_, entry| expired(entry)).is_some() {
            tracing::debug!("Evicted expired analysis for {}", symbol);
            return None;
        }
        self.result_cache
            .get(symbol)
            .filter(|entry| !expired(entry.value()))
            .map(|entry| entry.data.clone())
    }

    async fn fetch_prices(&self, symbol: &str) -> Result<PriceSeries, AnalysisError> {
        match timeout(
            self.config.fetch_timeout,
            self.prices
                .fetch_price_history(symbol, self.config.price_lookback_days),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AnalysisError::DataUnavailable(format!(
                "price history for {} timed out after {:?}",
                symbol, self.config.fetch_timeout
            ))),
        }
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Option<Fundamentals> {
        match timeout(
            self.config.fetch_timeout,
            self.fundamentals.fetch_fundamentals(symbol),
        )
        .await
        {
            Ok(Ok(fundamentals)) => Some(fundamentals),
            Ok(Err(e)) => {
                tracing::warn!("Fundamentals unavailable for {}: {}", symbol, e);
                None
            }
            Err(_) => {
                tracing::warn!("Fundamentals fetch timed out for {}", symbol);
                None
            }
        }
    }

    async fn fetch_news(&self, symbol: &str) -> Vec<NewsItem> {
        match timeout(
            self.config.fetch_timeout,
            self.news.fetch_recent_news(symbol, self.config.news_window),
        )
        .await
        {
            Ok(Ok(items)) => items,
            Ok(Err(e)) => {
                tracing::warn!("News unavailable for {}: {}", symbol, e);
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("News fetch timed out for {}", symbol);
                Vec::new()
            }
        }
    }
}
