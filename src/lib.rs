//! Heuristic "BS score" for short claims.
//!
//! [`scoring`] maps a claim to an [`AnalysisResult`] with a 0-100 score, a
//! verdict, and categorized notes. [`history`] keeps the last 30 results in a
//! persistent key-value store. Both are independent; the binary wires them
//! together.

pub mod config;
pub mod history;
pub mod output;
pub mod scoring;

pub use history::{HistoryStore, KeyValueStore};
pub use scoring::{analyze, AnalysisResult, Analyzer, Verdict};
