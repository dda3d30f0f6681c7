use analysis_core::{stats::piecewise_linear, ComponentScore, Fundamentals};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// `(ratio value, sub-score)` breakpoints, ascending by ratio value.
pub type Breakpoints = Vec<(f64, f64)>;

/// Piecewise scales mapping each ratio to a 0-100 sub-score.
///
/// Values outside a scale's range take the nearest end score, so every
/// sub-score stays bounded no matter how extreme the reported ratio is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalScales {
    /// Positive P/E only; lower is better down to the first breakpoint.
    pub pe_ratio: Breakpoints,
    /// Score for a zero or negative P/E (losses).
    pub negative_pe_score: f64,
    pub peg_ratio: Breakpoints,
    pub negative_peg_score: f64,
    pub price_to_book: Breakpoints,
    pub negative_book_score: f64,
    pub debt_to_equity: Breakpoints,
    pub roe: Breakpoints,
    pub profit_margin: Breakpoints,
    pub operating_margin: Breakpoints,
    pub revenue_growth: Breakpoints,
    pub dividend_yield: Breakpoints,
    pub beta: Breakpoints,
}

impl Default for FundamentalScales {
    fn default() -> Self {
        Self {
            pe_ratio: vec![(10.0, 100.0), (25.0, 60.0), (35.0, 40.0), (60.0, 10.0)],
            negative_pe_score: 10.0,
            peg_ratio: vec![(1.0, 100.0), (2.0, 65.0), (3.0, 35.0), (5.0, 10.0)],
            negative_peg_score: 20.0,
            price_to_book: vec![(1.0, 100.0), (3.0, 70.0), (5.0, 40.0), (10.0, 10.0)],
            negative_book_score: 10.0,
            debt_to_equity: vec![(0.0, 100.0), (0.5, 90.0), (1.0, 70.0), (2.0, 35.0), (4.0, 5.0)],
            roe: vec![(-0.10, 0.0), (0.0, 20.0), (0.05, 40.0), (0.10, 65.0), (0.15, 85.0), (0.30, 100.0)],
            profit_margin: vec![(-0.10, 0.0), (0.0, 25.0), (0.05, 45.0), (0.10, 65.0), (0.20, 90.0), (0.35, 100.0)],
            operating_margin: vec![(-0.10, 0.0), (0.0, 25.0), (0.10, 55.0), (0.20, 80.0), (0.35, 100.0)],
            revenue_growth: vec![(-0.20, 0.0), (0.0, 40.0), (0.05, 55.0), (0.10, 70.0), (0.20, 90.0), (0.40, 100.0)],
            dividend_yield: vec![(0.0, 50.0), (0.02, 75.0), (0.04, 90.0), (0.08, 100.0)],
            beta: vec![(0.8, 90.0), (1.0, 75.0), (1.5, 50.0), (2.5, 20.0), (3.5, 10.0)],
        }
    }
}

pub struct FundamentalAnalysisEngine {
    scales: FundamentalScales,
}

impl FundamentalAnalysisEngine {
    pub fn new() -> Self {
        Self::with_scales(FundamentalScales::default())
    }

    pub fn with_scales(scales: FundamentalScales) -> Self {
        Self { scales }
    }

    /// Sub-score for one named ratio, `None` for unknown names.
    pub fn sub_score(&self, name: &str, value: f64) -> Option<f64> {
        let s = &self.scales;
        let score = match name {
            "pe_ratio" if value <= 0.0 => s.negative_pe_score,
            "pe_ratio" => piecewise_linear(value, &s.pe_ratio),
            "peg_ratio" if value <= 0.0 => s.negative_peg_score,
            "peg_ratio" => piecewise_linear(value, &s.peg_ratio),
            "price_to_book" if value <= 0.0 => s.negative_book_score,
            "price_to_book" => piecewise_linear(value, &s.price_to_book),
            "debt_to_equity" => piecewise_linear(value, &s.debt_to_equity),
            "roe" => piecewise_linear(value, &s.roe),
            "profit_margin" => piecewise_linear(value, &s.profit_margin),
            "operating_margin" => piecewise_linear(value, &s.operating_margin),
            "revenue_growth" => piecewise_linear(value, &s.revenue_growth),
            "dividend_yield" => piecewise_linear(value, &s.dividend_yield),
            "beta" => piecewise_linear(value, &s.beta),
            _ => return None,
        };
        Some(score.clamp(0.0, 100.0))
    }

    /// `(name, value, sub-score)` for each ratio the provider disclosed.
    pub fn sub_scores(&self, fundamentals: &Fundamentals) -> Vec<(&'static str, f64, f64)> {
        fundamentals
            .ratios()
            .into_iter()
            .filter_map(|(name, value)| {
                let v = value?;
                Some((name, v, self.sub_score(name, v)?))
            })
            .collect()
    }

    /// Mean of the available sub-scores.
    ///
    /// Undisclosed ratios are skipped rather than scored as zero. `None` when
    /// not a single ratio is available, so the composite can drop this
    /// component instead of averaging in a fake value.
    pub fn score_fundamentals(&self, fundamentals: &Fundamentals) -> Option<ComponentScore> {
        let subs = self.sub_scores(fundamentals);
        if subs.is_empty() {
            return None;
        }

        let mean = subs.iter().map(|(_, _, s)| s).sum::<f64>() / subs.len() as f64;

        let metrics_map: serde_json::Map<String, serde_json::Value> = subs
            .iter()
            .map(|(name, value, sub)| (name.to_string(), json!({ "value": value, "score": sub })))
            .collect();

        tracing::debug!(
            "fundamental score {:.1} from {}/10 ratios",
            mean,
            subs.len()
        );

        Some(ComponentScore::new(
            mean,
            json!({
                "ratios": metrics_map,
                "available": subs.len(),
                "sector": fundamentals.sector,
            }),
        ))
    }
}

impl Default for FundamentalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
