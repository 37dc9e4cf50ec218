pub mod config;
pub mod engine;
pub mod rules;
pub mod validation;
pub mod verdict;

pub use config::*;
pub use engine::{
    analyze, analyze_at, AnalysisResult, Analyzer, Evaluation, RuleContribution, ScoreBreakdown,
};
pub use rules::{NoteCategory, NOTE_FALLBACK};
pub use validation::validate_scoring;
pub use verdict::Verdict;
