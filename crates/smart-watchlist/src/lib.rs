//! Smart Watchlist Module
//!
//! Builds the named stock lists (top picks, gainers, value, ...) from a batch
//! of per-symbol analysis results.

pub mod models;
pub mod ranker;

pub use models::ListKind;
pub use ranker::{RankingConfig, WatchlistRanker};
