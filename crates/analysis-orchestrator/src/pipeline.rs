//! Single-symbol scoring pipeline.
//!
//! Pure: takes already-fetched inputs and returns the full analysis without
//! touching any collaborator.

use analysis_core::{
    AnalysisError, AnalysisResult, ComponentScore, ComponentValues, Fundamentals, NewsPolarity,
    PriceSeries,
};
use chrono::{DateTime, Utc};
use fundamental_analysis::FundamentalAnalysisEngine;
use momentum_analysis::MomentumAnalysisEngine;
use price_predictor::PricePredictor;
use scoring_engine::{CompositeScorer, EntryClassifier, RecommendationEngine};
use sentiment_analysis::SentimentAnalysisEngine;
use smart_watchlist::WatchlistRanker;
use technical_analysis::TechnicalAnalysisEngine;

use crate::config::EngineConfig;

/// One instance of every engine, configured together.
pub struct AnalysisEngines {
    pub technical: TechnicalAnalysisEngine,
    pub fundamental: FundamentalAnalysisEngine,
    pub sentiment: SentimentAnalysisEngine,
    pub momentum: MomentumAnalysisEngine,
    pub composite: CompositeScorer,
    pub entry: EntryClassifier,
    pub predictor: PricePredictor,
    pub recommendation: RecommendationEngine,
    pub ranker: WatchlistRanker,
}

impl Default for AnalysisEngines {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl AnalysisEngines {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            technical: TechnicalAnalysisEngine::with_config(config.indicators.clone()),
            fundamental: FundamentalAnalysisEngine::with_scales(config.fundamental_scales.clone()),
            sentiment: SentimentAnalysisEngine::with_config(config.sentiment.clone()),
            momentum: MomentumAnalysisEngine::with_config(config.momentum.clone()),
            composite: CompositeScorer::with_weights(config.weights),
            entry: EntryClassifier::with_thresholds(config.entry.clone()),
            predictor: PricePredictor::with_config(config.predictor.clone()),
            recommendation: RecommendationEngine::with_policy(config.recommendation.clone()),
            ranker: WatchlistRanker::with_config(config.ranking.clone()),
        }
    }

    /// Score, classify, predict and recommend for one symbol.
    ///
    /// Missing fundamentals or news only drop their component; the call fails
    /// when there is no usable price or no component could be scored at all.
    pub fn analyze_symbol(
        &self,
        symbol: &str,
        series: &PriceSeries,
        fundamentals: Option<&Fundamentals>,
        news: &[NewsPolarity],
        as_of: DateTime<Utc>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let current_price = series
            .last_close()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| AnalysisError::DataUnavailable(format!("no usable price for {}", symbol)))?;

        let indicators = self.technical.compute_indicators(series);

        let technical = self.technical.score(&indicators);
        let fundamental = fundamentals.and_then(|f| self.fundamental.score_fundamentals(f));
        let sentiment = self.sentiment.score_sentiment(news, &indicators, as_of);
        let momentum = self.momentum.score_momentum(series);

        let components = ComponentValues {
            technical: technical.as_ref().map(ComponentScore::value),
            fundamental: fundamental.as_ref().map(ComponentScore::value),
            sentiment: sentiment.score.as_ref().map(ComponentScore::value),
            momentum: momentum.as_ref().map(ComponentScore::value),
        };
        tracing::debug!(
            "{} components: technical={:?} fundamental={:?} sentiment={:?} momentum={:?}",
            symbol,
            components.technical,
            components.fundamental,
            components.sentiment,
            components.momentum
        );

        let overall = self.composite.combine(components).map_err(|e| match e {
            AnalysisError::AllComponentsUndefined(_) => AnalysisError::AllComponentsUndefined(
                format!("no component could be scored for {}", symbol),
            ),
            other => other,
        })?;

        let entry = self.entry.assess(overall.composite, &indicators);
        let prediction = self.predictor.predict(series, &indicators, &overall)?;
        let recommendation = self.recommendation.should_buy(
            &overall,
            entry.signal,
            sentiment.label,
            current_price,
            prediction.long_term.fraction(),
        )?;

        Ok(AnalysisResult {
            symbol: symbol.to_string(),
            sector: fundamentals.and_then(|f| f.sector.clone()),
            timestamp: as_of,
            current_price,
            overall,
            sentiment,
            entry,
            prediction,
            recommendation,
            indicators,
        })
    }
}
