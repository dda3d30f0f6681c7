use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// OHLCV bar data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Ordered price history for one symbol.
///
/// Bars are strictly ascending by timestamp. The series is read-only once
/// built; indicators operate on its tail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, AnalysisError> {
        if let Some(pos) = bars.windows(2).position(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(AnalysisError::InvalidData(format!(
                "bars must be strictly ascending by timestamp (violation at index {})",
                pos + 1
            )));
        }
        if bars.iter().any(|b| !b.close.is_finite() || !b.volume.is_finite()) {
            return Err(AnalysisError::InvalidData(
                "bars contain non-finite close or volume".to_string(),
            ));
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.last().map(|b| b.timestamp)
    }

    /// Fail with `InsufficientHistory` unless at least `needed` bars exist.
    pub fn require(&self, needed: usize) -> Result<(), AnalysisError> {
        if self.bars.len() < needed {
            Err(AnalysisError::InsufficientHistory {
                needed,
                available: self.bars.len(),
            })
        } else {
            Ok(())
        }
    }
}

/// Company ratios as reported by a fundamentals provider.
///
/// Every ratio is optional: `None` means the provider did not disclose it and
/// is never treated as zero. Percent-like values are fractions (0.15 = 15%),
/// `debt_to_equity` is a plain ratio (1.5 = 150%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub pe_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub roe: Option<f64>,
    pub profit_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    #[serde(default)]
    pub sector: Option<String>,
}

impl Fundamentals {
    /// Named ratio values in a fixed order. Non-finite values count as absent.
    pub fn ratios(&self) -> [(&'static str, Option<f64>); 10] {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        [
            ("pe_ratio", finite(self.pe_ratio)),
            ("peg_ratio", finite(self.peg_ratio)),
            ("price_to_book", finite(self.price_to_book)),
            ("debt_to_equity", finite(self.debt_to_equity)),
            ("roe", finite(self.roe)),
            ("profit_margin", finite(self.profit_margin)),
            ("operating_margin", finite(self.operating_margin)),
            ("revenue_growth", finite(self.revenue_growth)),
            ("dividend_yield", finite(self.dividend_yield)),
            ("beta", finite(self.beta)),
        ]
    }

    pub fn available_count(&self) -> usize {
        self.ratios().iter().filter(|(_, v)| v.is_some()).count()
    }
}

/// News headline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: Option<String>,
    pub published_utc: DateTime<Utc>,
}

impl NewsItem {
    /// Text handed to the polarity scorer.
    pub fn text(&self) -> String {
        match &self.summary {
            Some(summary) if !summary.is_empty() => format!("{}. {}", self.title, summary),
            _ => self.title.clone(),
        }
    }
}

/// A headline's polarity in [-1, 1] with its publication time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewsPolarity {
    pub polarity: f64,
    pub published_utc: DateTime<Utc>,
}

/// Indicator snapshot of a price series tail.
///
/// `None` marks an indicator that could not be computed from the available
/// history; it is never replaced by a made-up number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub last_close: Option<f64>,
    pub rsi: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub adx: Option<f64>,
    /// Latest volume divided by its 20-bar average.
    pub volume_ratio: Option<f64>,
    /// Mean of the last 5 volumes divided by the mean of the 25 before them.
    pub volume_trend: Option<f64>,
    /// Percentage return over 5 bars.
    pub return_5d: Option<f64>,
    /// Percentage return over 20 bars.
    pub return_20d: Option<f64>,
    /// Mean daily return (fraction) over the last 10 bars.
    pub recent_trend: Option<f64>,
    /// Standard deviation of daily returns (fraction) over up to 252 bars.
    pub daily_volatility: Option<f64>,
    /// Position of the last close in the trailing 52-week low/high range, 0-100.
    pub week52_position: Option<f64>,
}

impl IndicatorSet {
    /// Bollinger %B scaled to 0-100 (50 when the bands collapse).
    pub fn bollinger_position(&self) -> Option<f64> {
        let (price, upper, lower) = (self.last_close?, self.bb_upper?, self.bb_lower?);
        let width = upper - lower;
        if width.abs() < f64::EPSILON {
            Some(50.0)
        } else {
            Some((price - lower) / width * 100.0)
        }
    }

    /// Percentage distance of the last close from a moving average.
    pub fn price_vs(&self, average: Option<f64>) -> Option<f64> {
        let (price, avg) = (self.last_close?, average?);
        if avg == 0.0 {
            None
        } else {
            Some((price / avg - 1.0) * 100.0)
        }
    }

    /// Names of the indicators that could not be computed.
    pub fn unavailable(&self) -> Vec<&'static str> {
        [
            ("rsi", self.rsi.is_none()),
            ("macd", self.macd_line.is_none() || self.macd_signal.is_none()),
            ("sma_20", self.sma_20.is_none()),
            ("sma_50", self.sma_50.is_none()),
            ("bollinger", self.bb_upper.is_none()),
            ("adx", self.adx.is_none()),
            ("volume_ratio", self.volume_ratio.is_none()),
        ]
        .into_iter()
        .filter(|(_, missing)| *missing)
        .map(|(name, _)| name)
        .collect()
    }
}

/// A 0-100 score plus the raw values that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    value: f64,
    inputs: serde_json::Value,
}

impl ComponentScore {
    /// Builds a score, clamping into [0, 100]. Non-finite values become 50.
    pub fn new(value: f64, inputs: serde_json::Value) -> Self {
        let value = if value.is_finite() { value.clamp(0.0, 100.0) } else { 50.0 };
        Self { value, inputs }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn inputs(&self) -> &serde_json::Value {
        &self.inputs
    }
}

/// Rating label derived from the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
    StrongSell,
    Sell,
    Hold,
    Buy,
    StrongBuy,
}

impl Rating {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 80.0 => Rating::StrongBuy,
            s if s >= 65.0 => Rating::Buy,
            s if s >= 50.0 => Rating::Hold,
            s if s >= 35.0 => Rating::Sell,
            _ => Rating::StrongSell,
        }
    }

    /// Star count, 1 to 5.
    pub fn stars(&self) -> u8 {
        match self {
            Rating::StrongBuy => 5,
            Rating::Buy => 4,
            Rating::Hold => 3,
            Rating::Sell => 2,
            Rating::StrongSell => 1,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Rating::StrongBuy => "Strong Buy",
            Rating::Buy => "Buy",
            Rating::Hold => "Hold",
            Rating::Sell => "Sell",
            Rating::StrongSell => "Strong Sell",
        }
    }
}

/// The four component scores, each possibly undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentValues {
    pub technical: Option<f64>,
    pub fundamental: Option<f64>,
    pub sentiment: Option<f64>,
    pub momentum: Option<f64>,
}

/// Weighted composite plus its derived star count and rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallScore {
    pub components: ComponentValues,
    pub composite: f64,
    pub stars: u8,
    pub rating: Rating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    VeryBearish,
    Bearish,
    Neutral,
    Bullish,
    VeryBullish,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 75.0 => SentimentLabel::VeryBullish,
            s if s >= 60.0 => SentimentLabel::Bullish,
            s if s >= 40.0 => SentimentLabel::Neutral,
            s if s >= 25.0 => SentimentLabel::Bearish,
            _ => SentimentLabel::VeryBearish,
        }
    }

    pub fn is_bearish(&self) -> bool {
        matches!(self, SentimentLabel::Bearish | SentimentLabel::VeryBearish)
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            SentimentLabel::VeryBullish => "Very Bullish",
            SentimentLabel::Bullish => "Bullish",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Bearish => "Bearish",
            SentimentLabel::VeryBearish => "Very Bearish",
        }
    }
}

/// Outcome of the sentiment aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAssessment {
    /// `None` when neither news nor market signals were usable.
    pub score: Option<ComponentScore>,
    pub label: SentimentLabel,
    pub news_count: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntrySignal {
    StrongBuyNow,
    GoodEntryPoint,
    ConsiderBuying,
    WaitForBetterEntry,
}

impl EntrySignal {
    /// Strong Buy Now or Good Entry Point.
    pub fn is_favorable(&self) -> bool {
        matches!(self, EntrySignal::StrongBuyNow | EntrySignal::GoodEntryPoint)
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            EntrySignal::StrongBuyNow => "Strong Buy Now",
            EntrySignal::GoodEntryPoint => "Good Entry Point",
            EntrySignal::ConsiderBuying => "Consider Buying",
            EntrySignal::WaitForBetterEntry => "Wait for Better Entry",
        }
    }
}

/// Entry classification with the context it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryAssessment {
    pub signal: EntrySignal,
    /// Name of the decision rule that fired.
    pub rule: String,
    pub rsi: Option<f64>,
    pub week52_position: Option<f64>,
    pub price_vs_sma20: Option<f64>,
    pub price_vs_sma50: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outlook {
    Bearish,
    Neutral,
    Bullish,
}

impl Outlook {
    pub fn to_label(&self) -> &'static str {
        match self {
            Outlook::Bullish => "Bullish",
            Outlook::Neutral => "Neutral",
            Outlook::Bearish => "Bearish",
        }
    }
}

/// Projection for one horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonForecast {
    /// Signed percentage change, e.g. 1.5 for +1.5%.
    pub change_pct: f64,
    /// current price × (1 + change_pct / 100)
    pub price: f64,
}

impl HorizonForecast {
    pub fn from_fraction(current_price: f64, fraction: f64) -> Self {
        Self {
            change_pct: fraction * 100.0,
            price: current_price * (1.0 + fraction),
        }
    }

    pub fn fraction(&self) -> f64 {
        self.change_pct / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub tomorrow: HorizonForecast,
    /// Confidence in the tomorrow projection, 0-100.
    pub tomorrow_confidence: f64,
    pub week: HorizonForecast,
    pub long_term: HorizonForecast,
    pub long_term_outlook: Outlook,
    /// Annualized volatility (fraction) used to bound the long-term projection.
    pub annualized_volatility: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Yes,
    No,
    Maybe,
}

impl Decision {
    pub fn to_label(&self) -> &'static str {
        match self {
            Decision::Yes => "YES",
            Decision::No => "NO",
            Decision::Maybe => "MAYBE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub decision: Decision,
    pub target_price: f64,
    pub stop_loss: f64,
    pub upside_pct: f64,
    pub downside_pct: f64,
    pub risk_reward: f64,
    pub rationale: String,
}

/// Full analysis of one symbol at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    #[serde(default)]
    pub sector: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub current_price: f64,
    pub overall: OverallScore,
    pub sentiment: SentimentAssessment,
    pub entry: EntryAssessment,
    pub prediction: Prediction,
    pub recommendation: Recommendation,
    pub indicators: IndicatorSet,
}

impl AnalysisResult {
    pub fn composite(&self) -> f64 {
        self.overall.composite
    }

    pub fn entry_signal(&self) -> EntrySignal {
        self.entry.signal
    }

    pub fn is_sector(&self, sector: &str) -> bool {
        self.sector
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(sector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(day: i64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.timestamp_opt(day * 86_400, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_price_series_rejects_unordered_bars() {
        let result = PriceSeries::new(vec![bar(2, 10.0), bar(1, 11.0)]);
        assert!(matches!(result, Err(AnalysisError::InvalidData(_))));

        let result = PriceSeries::new(vec![bar(1, 10.0), bar(1, 11.0)]);
        assert!(matches!(result, Err(AnalysisError::InvalidData(_))));
    }

    #[test]
    fn test_price_series_require() {
        let series = PriceSeries::new(vec![bar(1, 10.0), bar(2, 11.0)]).unwrap();
        assert!(series.require(2).is_ok());
        assert_eq!(
            series.require(15),
            Err(AnalysisError::InsufficientHistory { needed: 15, available: 2 })
        );
    }

    #[test]
    fn test_rating_breakpoints() {
        assert_eq!(Rating::from_score(80.0).stars(), 5);
        assert_eq!(Rating::from_score(79.99).stars(), 4);
        assert_eq!(Rating::from_score(65.0).stars(), 4);
        assert_eq!(Rating::from_score(50.0).stars(), 3);
        assert_eq!(Rating::from_score(35.0).stars(), 2);
        assert_eq!(Rating::from_score(34.99).stars(), 1);
        assert_eq!(Rating::from_score(0.0).to_label(), "Strong Sell");
    }

    #[test]
    fn test_stars_monotonic() {
        let mut prev = 0;
        for i in 0..=1000 {
            let stars = Rating::from_score(i as f64 / 10.0).stars();
            assert!(stars >= prev);
            prev = stars;
        }
    }

    #[test]
    fn test_sentiment_label_thresholds() {
        assert_eq!(SentimentLabel::from_score(75.0), SentimentLabel::VeryBullish);
        assert_eq!(SentimentLabel::from_score(60.0), SentimentLabel::Bullish);
        assert_eq!(SentimentLabel::from_score(40.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(25.0), SentimentLabel::Bearish);
        assert_eq!(SentimentLabel::from_score(24.9), SentimentLabel::VeryBearish);
    }

    #[test]
    fn test_component_score_clamps() {
        assert_eq!(ComponentScore::new(140.0, serde_json::json!({})).value(), 100.0);
        assert_eq!(ComponentScore::new(-3.0, serde_json::json!({})).value(), 0.0);
        assert_eq!(ComponentScore::new(f64::NAN, serde_json::json!({})).value(), 50.0);
    }

    #[test]
    fn test_fundamentals_absent_is_not_zero() {
        let f = Fundamentals {
            pe_ratio: Some(0.0),
            roe: Some(f64::NAN),
            ..Default::default()
        };
        assert_eq!(f.available_count(), 1);
    }

    #[test]
    fn test_bollinger_position() {
        let set = IndicatorSet {
            last_close: Some(105.0),
            bb_upper: Some(110.0),
            bb_lower: Some(90.0),
            ..Default::default()
        };
        assert_eq!(set.bollinger_position(), Some(75.0));
        assert!(IndicatorSet::default().bollinger_position().is_none());
    }
}
