//! List Ranking Module
//!
//! Selects and orders analysis results for each named list.

use analysis_core::{stats, AnalysisResult};
use serde::{Deserialize, Serialize};

use crate::models::ListKind;

/// Filters applied by specific lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Value list keeps composites strictly above this.
    pub value_min_composite: f64,
    /// Long-term list keeps composites strictly above this.
    pub long_term_min_composite: f64,
    /// Sector tag the tech list filters on (case-insensitive).
    pub tech_sector: String,
    /// Gainers list keeps predicted next-day moves (percent) strictly above this.
    pub gainers_min_change: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            value_min_composite: 50.0,
            long_term_min_composite: 60.0,
            tech_sector: "Technology".to_string(),
            gainers_min_change: 0.0,
        }
    }
}

/// Orders analysis results into named lists
pub struct WatchlistRanker {
    config: RankingConfig,
}

impl Default for WatchlistRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchlistRanker {
    pub fn new() -> Self {
        Self::with_config(RankingConfig::default())
    }

    pub fn with_config(config: RankingConfig) -> Self {
        Self { config }
    }

    /// Sort key for `kind`, `None` when the result does not belong on the list.
    pub fn sort_key(&self, result: &AnalysisResult, kind: ListKind) -> Option<f64> {
        let composite = result.composite();
        let components = &result.overall.components;
        let key = match kind {
            ListKind::TopPicks => Some(composite),
            ListKind::Gainers => {
                let change = result.prediction.tomorrow.change_pct;
                (change > self.config.gainers_min_change).then_some(change)
            }
            ListKind::Value => {
                if composite > self.config.value_min_composite {
                    components.fundamental
                } else {
                    None
                }
            }
            ListKind::Tech => result
                .is_sector(&self.config.tech_sector)
                .then_some(composite),
            ListKind::Weekly => Some(result.prediction.week.change_pct),
            ListKind::Monthly => {
                stats::weighted_mean(&[(components.momentum, 1.0), (components.technical, 1.0)])
            }
            ListKind::LongTerm => {
                if composite > self.config.long_term_min_composite {
                    stats::weighted_mean(&[(components.fundamental, 1.0), (Some(composite), 1.0)])
                } else {
                    None
                }
            }
            ListKind::BuyNow => result.entry_signal().is_favorable().then_some(composite),
        };
        key.filter(|k| k.is_finite())
    }

    /// At most `count` results for `kind`, best first.
    ///
    /// Ties on the list key fall back to composite score (descending), then
    /// symbol (ascending), so the order is fully deterministic. Results are
    /// returned by reference and never modified.
    pub fn rank<'a>(
        &self,
        results: &'a [AnalysisResult],
        kind: ListKind,
        count: usize,
    ) -> Vec<&'a AnalysisResult> {
        let mut keyed: Vec<(f64, &AnalysisResult)> = results
            .iter()
            .filter_map(|r| self.sort_key(r, kind).map(|key| (key, r)))
            .collect();

        keyed.sort_by(|(ka, a), (kb, b)| {
            kb.total_cmp(ka)
                .then_with(|| b.composite().total_cmp(&a.composite()))
                .then_with(|| a.symbol.cmp(&b.symbol))
        });

        tracing::debug!(
            "{} list: {} of {} results eligible",
            kind,
            keyed.len(),
            results.len()
        );

        keyed.into_iter().take(count).map(|(_, r)| r).collect()
    }
}
