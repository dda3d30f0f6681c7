use analysis_core::{EntryAssessment, EntrySignal, IndicatorSet};
use serde::{Deserialize, Serialize};

/// Cut-offs used by the entry rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryThresholds {
    pub strong_min_score: f64,
    pub strong_max_rsi: f64,
    pub strong_max_week52: f64,
    pub overbought_rsi: f64,
    pub near_high_week52: f64,
    pub favorable_min_score: f64,
    pub favorable_max_rsi: f64,
    pub favorable_max_week52: f64,
    pub mixed_min_score: f64,
}

impl Default for EntryThresholds {
    fn default() -> Self {
        Self {
            strong_min_score: 70.0,
            strong_max_rsi: 60.0,
            strong_max_week52: 85.0,
            overbought_rsi: 70.0,
            near_high_week52: 90.0,
            favorable_min_score: 60.0,
            favorable_max_rsi: 45.0,
            favorable_max_week52: 40.0,
            mixed_min_score: 50.0,
        }
    }
}

/// Snapshot the entry rules look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryInputs {
    pub composite: f64,
    pub rsi: Option<f64>,
    pub week52_position: Option<f64>,
    /// Mean daily return over the recent bars.
    pub short_trend: Option<f64>,
}

impl EntryInputs {
    pub fn from_indicators(composite: f64, ind: &IndicatorSet) -> Self {
        Self {
            composite,
            rsi: ind.rsi,
            week52_position: ind.week52_position,
            short_trend: ind.recent_trend,
        }
    }
}

/// One row of the entry decision table.
pub struct EntryRule {
    pub name: &'static str,
    pub signal: EntrySignal,
    pub matches: fn(&EntryInputs, &EntryThresholds) -> bool,
}

/// Entry decision table, evaluated top to bottom; the first match wins.
///
/// A rule that needs an unavailable indicator does not match.
pub const ENTRY_RULES: &[EntryRule] = &[
    EntryRule {
        name: "strong-setup",
        signal: EntrySignal::StrongBuyNow,
        matches: |i, t| {
            i.composite >= t.strong_min_score
                && i.rsi.is_some_and(|r| r <= t.strong_max_rsi)
                && i.week52_position.is_some_and(|p| p < t.strong_max_week52)
        },
    },
    EntryRule {
        name: "overbought",
        signal: EntrySignal::WaitForBetterEntry,
        matches: |i, t| i.rsi.is_some_and(|r| r >= t.overbought_rsi),
    },
    EntryRule {
        name: "near-high",
        signal: EntrySignal::WaitForBetterEntry,
        matches: |i, t| i.week52_position.is_some_and(|p| p >= t.near_high_week52),
    },
    EntryRule {
        name: "favorable",
        signal: EntrySignal::GoodEntryPoint,
        matches: |i, t| {
            i.composite >= t.favorable_min_score
                && (i.rsi.is_some_and(|r| r < t.favorable_max_rsi)
                    || i.week52_position.is_some_and(|p| p < t.favorable_max_week52)
                    || i.short_trend.is_some_and(|s| s > 0.0))
        },
    },
    EntryRule {
        name: "mixed",
        signal: EntrySignal::ConsiderBuying,
        matches: |i, t| i.composite >= t.mixed_min_score,
    },
    EntryRule {
        name: "weak",
        signal: EntrySignal::WaitForBetterEntry,
        matches: |_, _| true,
    },
];

pub struct EntryClassifier {
    thresholds: EntryThresholds,
}

impl EntryClassifier {
    pub fn new() -> Self {
        Self::with_thresholds(EntryThresholds::default())
    }

    pub fn with_thresholds(thresholds: EntryThresholds) -> Self {
        Self { thresholds }
    }

    /// The first rule in `ENTRY_RULES` that matches.
    pub fn first_match(&self, inputs: &EntryInputs) -> &'static EntryRule {
        ENTRY_RULES
            .iter()
            .find(|rule| (rule.matches)(inputs, &self.thresholds))
            // The table ends in a catch-all
            .unwrap_or(&ENTRY_RULES[ENTRY_RULES.len() - 1])
    }

    pub fn classify_entry(&self, inputs: &EntryInputs) -> EntrySignal {
        self.first_match(inputs).signal
    }

    /// Classify and report the context the decision was made on.
    pub fn assess(&self, composite: f64, ind: &IndicatorSet) -> EntryAssessment {
        let inputs = EntryInputs::from_indicators(composite, ind);
        let rule = self.first_match(&inputs);
        tracing::debug!("entry rule '{}' -> {}", rule.name, rule.signal.to_label());

        EntryAssessment {
            signal: rule.signal,
            rule: rule.name.to_string(),
            rsi: ind.rsi,
            week52_position: ind.week52_position,
            price_vs_sma20: ind.price_vs(ind.sma_20),
            price_vs_sma50: ind.price_vs(ind.sma_50),
        }
    }
}

impl Default for EntryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(composite: f64, rsi: f64, week52: f64, trend: f64) -> EntryInputs {
        EntryInputs {
            composite,
            rsi: Some(rsi),
            week52_position: Some(week52),
            short_trend: Some(trend),
        }
    }

    fn rule_name(i: EntryInputs) -> &'static str {
        EntryClassifier::new().first_match(&i).name
    }

    #[test]
    fn test_strong_setup() {
        let c = EntryClassifier::new();
        assert_eq!(c.classify_entry(&inputs(75.0, 50.0, 60.0, 0.001)), EntrySignal::StrongBuyNow);
        assert_eq!(rule_name(inputs(70.0, 60.0, 84.9, -0.01)), "strong-setup");
    }

    #[test]
    fn test_overbought_waits_despite_high_score() {
        let c = EntryClassifier::new();
        assert_eq!(c.classify_entry(&inputs(90.0, 75.0, 50.0, 0.01)), EntrySignal::WaitForBetterEntry);
        assert_eq!(rule_name(inputs(90.0, 75.0, 50.0, 0.01)), "overbought");
    }

    #[test]
    fn test_near_high_waits() {
        assert_eq!(rule_name(inputs(90.0, 55.0, 95.0, 0.01)), "near-high");
    }

    #[test]
    fn test_favorable_entry() {
        let c = EntryClassifier::new();
        // RSI 65 blocks strong-setup, positive trend makes it favorable
        assert_eq!(c.classify_entry(&inputs(72.0, 65.0, 60.0, 0.002)), EntrySignal::GoodEntryPoint);
        // Oversold with a falling trend
        assert_eq!(c.classify_entry(&inputs(62.0, 40.0, 60.0, -0.01)), EntrySignal::GoodEntryPoint);
    }

    #[test]
    fn test_mixed_and_weak() {
        let c = EntryClassifier::new();
        assert_eq!(c.classify_entry(&inputs(62.0, 55.0, 60.0, -0.01)), EntrySignal::ConsiderBuying);
        assert_eq!(c.classify_entry(&inputs(55.0, 30.0, 10.0, 0.01)), EntrySignal::ConsiderBuying);
        assert_eq!(c.classify_entry(&inputs(40.0, 30.0, 10.0, 0.01)), EntrySignal::WaitForBetterEntry);
        assert_eq!(rule_name(inputs(40.0, 30.0, 10.0, 0.01)), "weak");
    }

    #[test]
    fn test_unknown_indicators_fall_through() {
        let c = EntryClassifier::new();
        let blind = EntryInputs {
            composite: 85.0,
            rsi: None,
            week52_position: None,
            short_trend: None,
        };
        assert_eq!(c.classify_entry(&blind), EntrySignal::ConsiderBuying);
    }

    #[test]
    fn test_assess_reports_context() {
        let ind = IndicatorSet {
            last_close: Some(110.0),
            rsi: Some(50.0),
            sma_20: Some(100.0),
            week52_position: Some(70.0),
            ..Default::default()
        };
        let assessment = EntryClassifier::new().assess(80.0, &ind);
        assert_eq!(assessment.signal, EntrySignal::StrongBuyNow);
        assert_eq!(assessment.rule, "strong-setup");
        assert!((assessment.price_vs_sma20.unwrap() - 10.0).abs() < 1e-9);
        assert!(assessment.price_vs_sma50.is_none());
    }
}
