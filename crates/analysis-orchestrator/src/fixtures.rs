use analysis_core::{Bar, Fundamentals, NewsItem, PriceSeries};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Daily bars drifting by `daily_drift` with a small deterministic wobble.
pub fn trending_series(len: usize, start: f64, daily_drift: f64) -> PriceSeries {
    series_ending_at(len, start, daily_drift, Utc.timestamp_opt(1_700_000_000, 0).unwrap())
}

pub fn series_ending_at(
    len: usize,
    start: f64,
    daily_drift: f64,
    end: DateTime<Utc>,
) -> PriceSeries {
    let bars = (0..len)
        .map(|i| {
            let close = start * (1.0 + daily_drift).powi(i as i32)
                * (1.0 + 0.01 * (i as f64 / 3.0).sin());
            Bar {
                timestamp: end - Duration::days((len - 1 - i) as i64),
                open: close * 0.998,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000_000.0 + ((i % 7) as f64) * 25_000.0,
            }
        })
        .collect();
    PriceSeries::new(bars).unwrap()
}

pub fn sample_fundamentals() -> Fundamentals {
    Fundamentals {
        pe_ratio: Some(24.0),
        peg_ratio: Some(1.4),
        price_to_book: Some(6.0),
        debt_to_equity: Some(0.8),
        roe: Some(0.28),
        profit_margin: Some(0.24),
        operating_margin: Some(0.30),
        revenue_growth: Some(0.12),
        dividend_yield: Some(0.005),
        beta: Some(1.1),
        sector: Some("Technology".to_string()),
    }
}

pub fn headline(title: &str, published_utc: DateTime<Utc>) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        summary: None,
        published_utc,
    }
}
