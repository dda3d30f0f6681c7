//! Named watchlists

use analysis_core::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which list to build from a batch of analysis results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListKind {
    /// Highest composite scores.
    TopPicks,
    /// Largest predicted one-day gains.
    Gainers,
    /// Strongest fundamentals among decently scored symbols.
    Value,
    /// Technology sector by composite score.
    Tech,
    /// Largest predicted one-week gains.
    Weekly,
    /// Momentum and technical blend.
    Monthly,
    /// Fundamental and composite blend, higher score floor.
    LongTerm,
    /// Favorable entry signals only.
    BuyNow,
}

impl ListKind {
    pub const ALL: [ListKind; 8] = [
        ListKind::TopPicks,
        ListKind::Gainers,
        ListKind::Value,
        ListKind::Tech,
        ListKind::Weekly,
        ListKind::Monthly,
        ListKind::LongTerm,
        ListKind::BuyNow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::TopPicks => "top-picks",
            ListKind::Gainers => "gainers",
            ListKind::Value => "value",
            ListKind::Tech => "tech",
            ListKind::Weekly => "weekly",
            ListKind::Monthly => "monthly",
            ListKind::LongTerm => "long-term",
            ListKind::BuyNow => "buy-now",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ListKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| AnalysisError::InvalidData(format!("unknown list kind '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_names() {
        for kind in ListKind::ALL {
            assert_eq!(kind.as_str().parse::<ListKind>().unwrap(), kind);
        }
        assert_eq!("Long_Term".parse::<ListKind>().unwrap(), ListKind::LongTerm);
        assert!("penny-stocks".parse::<ListKind>().is_err());
    }

    #[test]
    fn test_serde_uses_cli_names() {
        assert_eq!(serde_json::to_string(&ListKind::BuyNow).unwrap(), "\"buy-now\"");
    }
}
