use analysis_core::PolarityScorer;
use std::collections::HashSet;

const POSITIVE_WORDS: &[&str] = &[
    "bullish", "rally", "surge", "gain", "gains", "profit", "growth", "beat", "beats",
    "upgrade", "outperform", "strong", "positive", "rise", "rises", "increase",
    "breakthrough", "innovation", "success", "exceed", "exceeds", "momentum",
    "buy", "recommend", "optimistic", "record", "high", "advance",
    // Financial-specific terms
    "dividend", "buyback", "repurchase", "accretive", "upside",
    "recovery", "rebound", "expansion", "robust", "accelerating",
    "overweight", "raised", "upgraded", "outpacing", "tailwind",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bearish", "decline", "declines", "loss", "losses", "fall", "falls", "plunge", "crash", "miss",
    "misses", "downgrade", "underperform", "weak", "negative", "drop", "drops", "decrease",
    "concern", "concerns", "risk", "fail", "disappoint", "disappointing", "slump", "sell",
    "warning", "pessimistic", "low", "retreat", "fear", "trouble",
    // Financial-specific terms
    "dilution", "dilutive", "headwind", "lawsuit", "litigation",
    "recall", "investigation", "probe", "default", "bankruptcy",
    "restructuring", "layoff", "layoffs", "downside", "overvalued", "bubble",
    "underweight", "lowered", "suspended", "downgraded",
];

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't",
    "wasn't", "weren't", "won't", "wouldn't", "couldn't", "shouldn't", "hardly",
    "barely", "neither", "nor", "without",
];

/// Word-list polarity scorer for financial headlines.
///
/// A sentiment word preceded by a negation within `negation_window` words has
/// its sign flipped. The net hit count `n` over `m` matched words maps to
/// `n / (m + 1)`, which stays strictly inside (-1, 1).
pub struct LexiconPolarityScorer {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    negation: HashSet<&'static str>,
    negation_window: usize,
}

impl LexiconPolarityScorer {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
            negation: NEGATION_WORDS.iter().copied().collect(),
            negation_window: 3,
        }
    }

    /// Net word count and number of sentiment words matched.
    fn count(&self, text: &str) -> (i32, usize) {
        let text_lower = text.to_lowercase();
        let words: Vec<&str> = text_lower
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '.' | '!' | '?' | ':' | '"' | '(' | ')'))
            .filter(|w| !w.is_empty())
            .collect();

        let negation_positions: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| self.negation.contains(*w))
            .map(|(i, _)| i)
            .collect();

        let mut net = 0;
        let mut matched = 0;
        for (i, word) in words.iter().enumerate() {
            let sign = if self.positive.contains(*word) {
                1
            } else if self.negative.contains(*word) {
                -1
            } else {
                continue;
            };

            let negated = negation_positions
                .iter()
                .any(|&neg_pos| neg_pos < i && i - neg_pos <= self.negation_window);

            net += if negated { -sign } else { sign };
            matched += 1;
        }

        (net, matched)
    }
}

impl Default for LexiconPolarityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for LexiconPolarityScorer {
    fn score_polarity(&self, text: &str) -> f64 {
        let (net, matched) = self.count(text);
        net as f64 / (matched as f64 + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_and_negative_headlines() {
        let scorer = LexiconPolarityScorer::new();
        assert!(scorer.score_polarity("Shares surge after record quarter, analysts upgrade") > 0.5);
        assert!(scorer.score_polarity("Stock plunges as lawsuit and probe weigh; downgrade follows") < -0.5);
    }

    #[test]
    fn test_negation_flips_sign() {
        let scorer = LexiconPolarityScorer::new();
        assert!(scorer.score_polarity("Results were strong") > 0.0);
        assert!(scorer.score_polarity("Results were not strong") < 0.0);
    }

    #[test]
    fn test_neutral_text_is_zero() {
        let scorer = LexiconPolarityScorer::new();
        assert_eq!(scorer.score_polarity("Company schedules annual meeting"), 0.0);
        assert_eq!(scorer.score_polarity(""), 0.0);
    }

    #[test]
    fn test_polarity_is_bounded() {
        let scorer = LexiconPolarityScorer::new();
        let text = "gain ".repeat(500);
        let p = scorer.score_polarity(&text);
        assert!(p < 1.0 && p > 0.99);
    }
}
