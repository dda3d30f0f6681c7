use analysis_core::{stats, AnalysisError, ComponentValues, OverallScore, Rating};
use serde::{Deserialize, Serialize};

/// Relative weight of each component in the composite.
///
/// Weights need not sum to one: the composite divides by the total weight of
/// the components that are actually defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub technical: f64,
    pub fundamental: f64,
    pub sentiment: f64,
    pub momentum: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            technical: 0.35,
            fundamental: 0.35,
            sentiment: 0.20,
            momentum: 0.10,
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let all = [
            ("technical", self.technical),
            ("fundamental", self.fundamental),
            ("sentiment", self.sentiment),
            ("momentum", self.momentum),
        ];
        if let Some((name, w)) = all.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(AnalysisError::InvalidData(format!(
                "{} weight must be a non-negative number, got {}",
                name, w
            )));
        }
        if all.iter().map(|(_, w)| w).sum::<f64>() <= 0.0 {
            return Err(AnalysisError::InvalidData(
                "scoring weights sum to zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective weights after dropping undefined components, summing to 1.
    pub fn effective(&self, components: &ComponentValues) -> ComponentValues {
        let pairs = [
            (components.technical, self.technical),
            (components.fundamental, self.fundamental),
            (components.sentiment, self.sentiment),
            (components.momentum, self.momentum),
        ];
        let total: f64 = pairs
            .iter()
            .filter(|(v, _)| v.is_some())
            .map(|(_, w)| w)
            .sum();
        let share = |(v, w): (Option<f64>, f64)| {
            v.filter(|_| total > 0.0).map(|_| w / total)
        };
        ComponentValues {
            technical: share(pairs[0]),
            fundamental: share(pairs[1]),
            sentiment: share(pairs[2]),
            momentum: share(pairs[3]),
        }
    }
}

pub struct CompositeScorer {
    weights: ScoringWeights,
}

impl CompositeScorer {
    pub fn new() -> Self {
        Self::with_weights(ScoringWeights::default())
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Weighted composite of the defined components.
    ///
    /// An undefined component's weight is redistributed proportionally over
    /// the others. Fails with `AllComponentsUndefined` when no component
    /// carries a positive weight.
    pub fn combine(&self, components: ComponentValues) -> Result<OverallScore, AnalysisError> {
        let usable = |v: Option<f64>| v.filter(|x| x.is_finite()).map(|x| x.clamp(0.0, 100.0));
        let components = ComponentValues {
            technical: usable(components.technical),
            fundamental: usable(components.fundamental),
            sentiment: usable(components.sentiment),
            momentum: usable(components.momentum),
        };

        let w = &self.weights;
        let composite = stats::weighted_mean(&[
            (components.technical, w.technical),
            (components.fundamental, w.fundamental),
            (components.sentiment, w.sentiment),
            (components.momentum, w.momentum),
        ])
        .ok_or_else(|| {
            AnalysisError::AllComponentsUndefined(
                "technical, fundamental, sentiment and momentum are all unavailable".to_string(),
            )
        })?
        .clamp(0.0, 100.0);

        let rating = Rating::from_score(composite);
        tracing::debug!(
            "composite {:.2} -> {} ({} stars)",
            composite,
            rating.to_label(),
            rating.stars()
        );

        Ok(OverallScore {
            components,
            composite,
            stars: rating.stars(),
            rating,
        })
    }
}

impl Default for CompositeScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn all(t: f64, f: f64, s: f64, m: f64) -> ComponentValues {
        ComponentValues {
            technical: Some(t),
            fundamental: Some(f),
            sentiment: Some(s),
            momentum: Some(m),
        }
    }

    #[test]
    fn test_documented_scenario() {
        let overall = CompositeScorer::new().combine(all(82.3, 76.8, 75.2, 80.1)).unwrap();
        let expected = 0.35 * 82.3 + 0.35 * 76.8 + 0.20 * 75.2 + 0.10 * 80.1;
        assert_relative_eq!(overall.composite, expected, epsilon = 1e-9);
        assert_eq!(overall.stars, 4);
        assert_eq!(overall.rating, Rating::Buy);
    }

    #[test]
    fn test_missing_fundamentals_renormalizes() {
        let components = ComponentValues {
            technical: Some(80.0),
            fundamental: None,
            sentiment: Some(60.0),
            momentum: Some(40.0),
        };
        let overall = CompositeScorer::new().combine(components).unwrap();
        let expected = (0.35 * 80.0 + 0.20 * 60.0 + 0.10 * 40.0) / 0.65;
        assert_relative_eq!(overall.composite, expected, epsilon = 1e-9);

        let eff = ScoringWeights::default().effective(&components);
        let sum = eff.technical.unwrap() + eff.sentiment.unwrap() + eff.momentum.unwrap();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        assert!(eff.fundamental.is_none());
    }

    #[test]
    fn test_all_undefined_fails() {
        let result = CompositeScorer::new().combine(ComponentValues::default());
        assert!(matches!(result, Err(AnalysisError::AllComponentsUndefined(_))));
    }

    #[test]
    fn test_composite_stays_bounded() {
        let scorer = CompositeScorer::new();
        for &(t, f, s, m) in &[(0.0, 0.0, 0.0, 0.0), (100.0, 100.0, 100.0, 100.0), (100.0, 0.0, 100.0, 0.0)] {
            let c = scorer.combine(all(t, f, s, m)).unwrap().composite;
            assert!((0.0..=100.0).contains(&c));
        }
        // Out-of-range inputs are clamped before weighting
        let c = scorer.combine(all(150.0, -20.0, 100.0, 100.0)).unwrap().composite;
        assert!((0.0..=100.0).contains(&c));
    }

    #[test]
    fn test_custom_weights() {
        let scorer = CompositeScorer::with_weights(ScoringWeights {
            technical: 1.0,
            fundamental: 0.0,
            sentiment: 0.0,
            momentum: 0.0,
        });
        assert_relative_eq!(scorer.combine(all(70.0, 10.0, 10.0, 10.0)).unwrap().composite, 70.0);
    }

    #[test]
    fn test_weights_validation() {
        assert!(ScoringWeights::default().validate().is_ok());
        let negative = ScoringWeights { technical: -0.1, ..Default::default() };
        assert!(negative.validate().is_err());
        let zero = ScoringWeights { technical: 0.0, fundamental: 0.0, sentiment: 0.0, momentum: 0.0 };
        assert!(zero.validate().is_err());
    }
}
