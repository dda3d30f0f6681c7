use super::AnalysisOrchestrator;
use analysis_core::AnalysisResult;
use serde::{Deserialize, Serialize};
use smart_watchlist::ListKind;
use std::sync::Arc;

/// A symbol the screen could not analyze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenFailure {
    pub symbol: String,
    pub reason: String,
    /// No data for the symbol, as opposed to data that produced no usable signal.
    pub missing_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerResult {
    pub list: ListKind,
    pub picks: Vec<AnalysisResult>,
    pub failures: Vec<ScreenFailure>,
    pub total_analyzed: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StockUniverse {
    Custom(Vec<String>),
    /// Large caps across sectors.
    Trending,
    Tech,
}

const TRENDING: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "TSLA", "AMD", "INTC", "CRM", // tech
    "JPM", "BAC", "WFC", "GS", "MS", "V", "MA", "PYPL", // finance
    "JNJ", "UNH", "PFE", "ABBV", "TMO", "MRK", // healthcare
    "WMT", "HD", "DIS", "NKE", "SBUX", "MCD", "COST", // consumer
    "XOM", "CVX", "COP", // energy
    "BA", "CAT", "GE", // industrials
];

const TECH: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "GOOG", "AMZN", "META", "NVDA", "TSLA", "AMD", "INTC", "CRM",
    "ADBE", "NFLX", "ORCL", "CSCO", "AVGO", "QCOM", "TXN", "AMAT", "MU", "SNOW", "PLTR", "COIN",
];

impl StockUniverse {
    pub fn get_symbols(&self) -> Vec<String> {
        match self {
            StockUniverse::Custom(symbols) => symbols.clone(),
            StockUniverse::Trending => TRENDING.iter().map(|s| s.to_string()).collect(),
            StockUniverse::Tech => TECH.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Universe a list is normally drawn from.
    pub fn for_list(kind: ListKind) -> Self {
        match kind {
            ListKind::Tech => StockUniverse::Tech,
            _ => StockUniverse::Trending,
        }
    }
}

pub struct StockScreener {
    orchestrator: Arc<AnalysisOrchestrator>,
}

impl StockScreener {
    pub fn new(orchestrator: Arc<AnalysisOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Analyze the universe in parallel, then keep the best `count` for `kind`.
    pub async fn screen(
        &self,
        universe: StockUniverse,
        kind: ListKind,
        count: usize,
    ) -> ScreenerResult {
        let symbols = universe.get_symbols();

        tracing::info!("Starting {} screen of {} symbols", kind, symbols.len());

        let outcome = self.orchestrator.analyze_batch(&symbols).await;
        let total_analyzed = outcome.results.len() + outcome.failures.len();

        let picks: Vec<AnalysisResult> = self
            .orchestrator
            .rank(&outcome.results, kind, count)
            .into_iter()
            .cloned()
            .collect();

        let failures = outcome
            .failures
            .iter()
            .map(|(symbol, e)| ScreenFailure {
                symbol: symbol.clone(),
                reason: e.to_string(),
                missing_data: e.is_missing_data(),
            })
            .collect();

        tracing::info!(
            "Screen complete: {}/{} symbols analyzed, returning top {}",
            outcome.results.len(),
            total_analyzed,
            picks.len()
        );

        ScreenerResult {
            list: kind,
            picks,
            failures,
            total_analyzed,
            timestamp: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_fundamentals, trending_series};
    use crate::{EngineConfig, InMemoryMarketData};

    fn screener() -> StockScreener {
        let data = InMemoryMarketData::new()
            .with_prices("NVDA", trending_series(300, 400.0, 0.003))
            .with_fundamentals("NVDA", sample_fundamentals())
            .with_prices("XOM", trending_series(300, 100.0, 0.001))
            .with_prices("INTC", trending_series(300, 40.0, -0.003))
            .with_fundamentals("INTC", sample_fundamentals());
        let orchestrator = AnalysisOrchestrator::from_source(Arc::new(data), EngineConfig::default());
        StockScreener::new(Arc::new(orchestrator))
    }

    #[test]
    fn test_universes() {
        let trending = StockUniverse::Trending.get_symbols();
        assert_eq!(trending.len(), 37);
        assert_eq!(trending[0], "AAPL");
        assert_eq!(StockUniverse::Tech.get_symbols().len(), 23);
        assert_eq!(StockUniverse::for_list(ListKind::Tech), StockUniverse::Tech);
        assert_eq!(StockUniverse::for_list(ListKind::Value), StockUniverse::Trending);

        let custom = StockUniverse::Custom(vec!["ABC".to_string()]);
        assert_eq!(custom.get_symbols(), vec!["ABC"]);
    }

    #[tokio::test]
    async fn test_screen_top_picks() {
        let result = screener()
            .screen(StockUniverse::Custom(vec![
                "NVDA".into(),
                "XOM".into(),
                "INTC".into(),
                "MISSING".into(),
            ]), ListKind::TopPicks, 2)
            .await;

        assert_eq!(result.list, ListKind::TopPicks);
        assert_eq!(result.total_analyzed, 4);
        assert_eq!(result.picks.len(), 2);
        assert!(result.picks[0].composite() >= result.picks[1].composite());
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].symbol, "MISSING");
        assert!(result.failures[0].missing_data);
    }

    #[tokio::test]
    async fn test_screen_tech_filters_sector() {
        let result = screener()
            .screen(StockUniverse::Tech, ListKind::Tech, 10)
            .await;

        // Only NVDA and INTC have data, and both carry the technology sector tag
        let symbols: Vec<&str> = result.picks.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols.len(), 2);
        assert!(symbols.contains(&"NVDA") && symbols.contains(&"INTC"));
        assert_eq!(result.failures.len(), 21);
    }

    #[tokio::test]
    async fn test_screen_empty_universe() {
        let result = screener()
            .screen(StockUniverse::Custom(Vec::new()), ListKind::BuyNow, 5)
            .await;
        assert!(result.picks.is_empty());
        assert_eq!(result.total_analyzed, 0);
    }
}
