use analysis_core::{
    AnalysisError, Decision, EntrySignal, OverallScore, Recommendation, SentimentLabel,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationPolicy {
    /// Composite score at or above which a favorable entry becomes YES.
    pub buy_score_threshold: f64,
    /// Composite score below which the answer is NO.
    pub reject_score_threshold: f64,
    /// Stop-loss distance below the current price, as a fraction.
    pub stop_loss_fraction: f64,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            buy_score_threshold: 65.0,
            reject_score_threshold: 50.0,
            stop_loss_fraction: 0.075,
        }
    }
}

/// Smallest stop-loss distance that still lands strictly below the price.
pub const MIN_STOP_LOSS_FRACTION: f64 = 1e-6;

impl RecommendationPolicy {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.stop_loss_fraction >= MIN_STOP_LOSS_FRACTION && self.stop_loss_fraction < 1.0) {
            return Err(AnalysisError::InvalidData(format!(
                "stop-loss fraction must be in [{}, 1), got {}",
                MIN_STOP_LOSS_FRACTION, self.stop_loss_fraction
            )));
        }
        if self.reject_score_threshold > self.buy_score_threshold {
            return Err(AnalysisError::InvalidData(format!(
                "reject threshold {} is above buy threshold {}",
                self.reject_score_threshold, self.buy_score_threshold
            )));
        }
        Ok(())
    }
}

/// What the decision rules look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInputs {
    pub composite: f64,
    pub entry: EntrySignal,
    pub sentiment: SentimentLabel,
}

pub struct DecisionRule {
    pub name: &'static str,
    pub decision: Decision,
    pub reason: &'static str,
    pub matches: fn(&DecisionInputs, &RecommendationPolicy) -> bool,
}

/// Buy decision table, first match wins.
pub const DECISION_RULES: &[DecisionRule] = &[
    DecisionRule {
        name: "strong-score-favorable-entry",
        decision: Decision::Yes,
        reason: "strong score with a favorable entry point",
        matches: |i, p| i.composite >= p.buy_score_threshold && i.entry.is_favorable(),
    },
    DecisionRule {
        name: "low-score",
        decision: Decision::No,
        reason: "score too low to justify a position",
        matches: |i, p| i.composite < p.reject_score_threshold,
    },
    DecisionRule {
        name: "wait-bearish-sentiment",
        decision: Decision::No,
        reason: "poor entry timing while sentiment is bearish",
        matches: |i, _| i.entry == EntrySignal::WaitForBetterEntry && i.sentiment.is_bearish(),
    },
    DecisionRule {
        name: "mixed",
        decision: Decision::Maybe,
        reason: "signals are mixed; consider a smaller position or wait for confirmation",
        matches: |_, _| true,
    },
];

pub struct RecommendationEngine {
    policy: RecommendationPolicy,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self::with_policy(RecommendationPolicy::default())
    }

    pub fn with_policy(policy: RecommendationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RecommendationPolicy {
        &self.policy
    }

    pub fn first_match(&self, inputs: &DecisionInputs) -> &'static DecisionRule {
        DECISION_RULES
            .iter()
            .find(|rule| (rule.matches)(inputs, &self.policy))
            .unwrap_or(&DECISION_RULES[DECISION_RULES.len() - 1])
    }

    /// YES/NO/MAYBE with target, stop-loss and a rationale.
    ///
    /// The target is `current_price × (1 + long_term_fraction)` and the stop
    /// sits `stop_loss_fraction` below the current price. The rationale is a
    /// pure function of the score tier, entry signal and sentiment label.
    pub fn should_buy(
        &self,
        overall: &OverallScore,
        entry: EntrySignal,
        sentiment: SentimentLabel,
        current_price: f64,
        long_term_fraction: f64,
    ) -> Result<Recommendation, AnalysisError> {
        if !(current_price.is_finite() && current_price > 0.0) {
            return Err(AnalysisError::InvalidData(format!(
                "current price must be positive, got {}",
                current_price
            )));
        }
        self.policy.validate()?;

        let inputs = DecisionInputs {
            composite: overall.composite,
            entry,
            sentiment,
        };
        let rule = self.first_match(&inputs);
        tracing::debug!("decision rule '{}' -> {}", rule.name, rule.decision.to_label());

        let fraction = if long_term_fraction.is_finite() { long_term_fraction } else { 0.0 };
        let target_price = current_price * (1.0 + fraction);
        let stop_loss = current_price * (1.0 - self.policy.stop_loss_fraction);
        if stop_loss >= current_price {
            return Err(AnalysisError::InvalidData(format!(
                "stop-loss {} is not below current price {}",
                stop_loss, current_price
            )));
        }
        let upside_pct = fraction * 100.0;
        let downside_pct = self.policy.stop_loss_fraction * 100.0;
        let risk_reward = if upside_pct > 0.0 { upside_pct / downside_pct } else { 0.0 };

        let score_tier = if overall.composite >= self.policy.buy_score_threshold {
            "strong"
        } else if overall.composite >= self.policy.reject_score_threshold {
            "moderate"
        } else {
            "weak"
        };

        let rationale = format!(
            "{}: {} composite score {:.1}/100 ({}, {} stars); entry: {}; sentiment: {}. {}.",
            rule.decision.to_label(),
            score_tier,
            overall.composite,
            overall.rating.to_label(),
            overall.stars,
            entry.to_label(),
            sentiment.to_label(),
            capitalize(rule.reason),
        );

        Ok(Recommendation {
            decision: rule.decision,
            target_price,
            stop_loss,
            upside_pct,
            downside_pct,
            risk_reward,
            rationale,
        })
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
