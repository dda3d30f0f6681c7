use analysis_core::{
    stats, ComponentScore, IndicatorSet, NewsItem, NewsPolarity, PolarityScorer,
    SentimentAssessment, SentimentLabel,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub mod lexicon;
pub use lexicon::LexiconPolarityScorer;

/// News/market blend policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Age at which a headline's weight halves.
    pub half_life_hours: f64,
    /// Headlines older than this are ignored.
    pub window_days: i64,
    /// Item count at which news dominates the blend.
    pub min_news_items: usize,
    /// News weight once `min_news_items` is reached.
    pub news_weight: f64,
    /// News weight with fewer items than `min_news_items`.
    pub sparse_news_weight: f64,
    /// Polarity above `+threshold` counts as positive, below `-threshold` as negative.
    pub polarity_threshold: f64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            half_life_hours: 48.0,
            window_days: 7,
            min_news_items: 3,
            news_weight: 0.6,
            sparse_news_weight: 0.25,
            polarity_threshold: 0.1,
        }
    }
}

/// Polarity for each headline, scored by an external scorer.
pub fn score_headlines(items: &[NewsItem], scorer: &dyn PolarityScorer) -> Vec<NewsPolarity> {
    items
        .iter()
        .map(|item| NewsPolarity {
            polarity: scorer.score_polarity(&item.text()).clamp(-1.0, 1.0),
            published_utc: item.published_utc,
        })
        .collect()
}

pub struct SentimentAnalysisEngine {
    config: SentimentConfig,
}

impl SentimentAnalysisEngine {
    pub fn new() -> Self {
        Self::with_config(SentimentConfig::default())
    }

    pub fn with_config(config: SentimentConfig) -> Self {
        Self { config }
    }

    /// Market-derived sentiment from price/volume behaviour.
    ///
    /// Starts neutral at 50 and moves with the 20-day return, the volume trend
    /// and the moving-average stack. `None` when none of those are available.
    pub fn market_sentiment(&self, ind: &IndicatorSet) -> Option<f64> {
        let mut sentiment: f64 = 50.0;
        let mut used = false;

        if let Some(ret) = ind.return_20d {
            used = true;
            sentiment += match ret {
                r if r > 10.0 => 20.0,
                r if r > 5.0 => 10.0,
                r if r > 0.0 => 5.0,
                r if r < -10.0 => -20.0,
                r if r < -5.0 => -10.0,
                r if r < 0.0 => -5.0,
                _ => 0.0,
            };
        }

        if let Some(ratio) = ind.volume_trend {
            used = true;
            if ratio > 1.5 {
                sentiment += 10.0;
            } else if ratio > 1.2 {
                sentiment += 5.0;
            } else if ratio < 0.8 {
                sentiment -= 5.0;
            }
        }

        if let (Some(price), Some(short), Some(long)) = (ind.last_close, ind.sma_20, ind.sma_50) {
            used = true;
            if price > short && short > long {
                sentiment += 10.0;
            } else if price < short && short < long {
                sentiment -= 10.0;
            }
        }

        used.then(|| sentiment.clamp(0.0, 100.0))
    }

    /// Combine headline polarities with market signals.
    ///
    /// Headlines outside the recency window are dropped; the rest are averaged
    /// with exponential recency decay and rescaled from [-1, 1] to [0, 100].
    /// Headlines dated after `as_of` count as brand new.
    pub fn score_sentiment(
        &self,
        news: &[NewsPolarity],
        indicators: &IndicatorSet,
        as_of: DateTime<Utc>,
    ) -> SentimentAssessment {
        let cfg = &self.config;
        let window = Duration::try_days(cfg.window_days).unwrap_or(Duration::MAX);

        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        let (mut positive_count, mut negative_count, mut neutral_count) = (0, 0, 0);

        for item in news {
            let age = as_of - item.published_utc;
            if age > window || !item.polarity.is_finite() {
                continue;
            }
            let age_hours = (age.num_minutes() as f64 / 60.0).max(0.0);
            let recency_weight = 0.5_f64.powf(age_hours / cfg.half_life_hours);
            let polarity = item.polarity.clamp(-1.0, 1.0);

            weighted_sum += polarity * recency_weight;
            total_weight += recency_weight;

            if polarity > cfg.polarity_threshold {
                positive_count += 1;
            } else if polarity < -cfg.polarity_threshold {
                negative_count += 1;
            } else {
                neutral_count += 1;
            }
        }

        let news_count = positive_count + negative_count + neutral_count;
        let avg_polarity = (total_weight > 0.0).then(|| weighted_sum / total_weight);
        let news_score = avg_polarity.map(|p| (p + 1.0) / 2.0 * 100.0);
        let market_score = self.market_sentiment(indicators);

        let news_weight = match news_count {
            0 => 0.0,
            n if n >= cfg.min_news_items => cfg.news_weight,
            _ => cfg.sparse_news_weight,
        };
        let blended = stats::weighted_mean(&[
            (news_score, news_weight),
            (market_score, 1.0 - news_weight),
        ])
        // Market signals missing entirely: news stands alone
        .or(news_score);

        let score = blended.map(|value| {
            ComponentScore::new(
                value,
                json!({
                    "news_score": news_score,
                    "market_score": market_score,
                    "news_weight": news_weight,
                    "avg_polarity": avg_polarity,
                    "news_count": news_count,
                }),
            )
        });

        let label = score
            .as_ref()
            .map(|s| SentimentLabel::from_score(s.value()))
            .unwrap_or(SentimentLabel::Neutral);

        if let Some(s) = &score {
            tracing::debug!(
                "sentiment {:.1} ({}) from {} headlines",
                s.value(),
                label.to_label(),
                news_count
            );
        }

        SentimentAssessment {
            score,
            label,
            news_count,
            positive_count,
            negative_count,
            neutral_count,
        }
    }
}

impl Default for SentimentAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
