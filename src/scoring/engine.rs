use anyhow::Result;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::{ScoringConfig, VerdictThresholds, DEFAULT_BASE_SCORE};
use super::rules::{build_rules, NoteCategory, Rule, NOTE_FALLBACK};
use super::verdict::Verdict;

lazy_static! {
    static ref DEFAULT_ANALYZER: Analyzer =
        Analyzer::new(&ScoringConfig::default()).expect("built-in scoring rules must compile");
}

/// Outcome of analyzing one claim. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub claim: String,
    pub bs_score: u8,
    pub verdict: Verdict,
    pub red_flags: Vec<String>,
    pub fallacies: Vec<String>,
    pub context_notes: Vec<String>,
    pub source_notes: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn notes(&self, category: NoteCategory) -> &[String] {
        match category {
            NoteCategory::RedFlags => &self.red_flags,
            NoteCategory::Fallacies => &self.fallacies,
            NoteCategory::Context => &self.context_notes,
            NoteCategory::Sources => &self.source_notes,
        }
    }

    fn notes_mut(&mut self, category: NoteCategory) -> &mut Vec<String> {
        match category {
            NoteCategory::RedFlags => &mut self.red_flags,
            NoteCategory::Fallacies => &mut self.fallacies,
            NoteCategory::Context => &mut self.context_notes,
            NoteCategory::Sources => &mut self.source_notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleContribution {
    pub label: String, // e.g. "urgency", "source_mention"
    pub delta: i32,
    pub before: i32, // Score before this rule, unclamped
    pub after: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub base_score: i32,
    pub rules: Vec<RuleContribution>,
    /// Sum before clamping to 0..=100
    pub raw_score: i32,
}

impl ScoreBreakdown {
    pub fn clamped(&self) -> bool {
        !(0..=100).contains(&self.raw_score)
    }
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub result: AnalysisResult,
    pub breakdown: ScoreBreakdown,
}

/// Table-driven claim scorer.
#[derive(Debug, Clone)]
pub struct Analyzer {
    base_score: i32,
    thresholds: VerdictThresholds,
    rules: Vec<Rule>,
}

impl Default for Analyzer {
    fn default() -> Self {
        DEFAULT_ANALYZER.clone()
    }
}

impl Analyzer {
    /// Build an analyzer, compiling every configured pattern.
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        Ok(Self {
            base_score: config.base_score.unwrap_or(DEFAULT_BASE_SCORE),
            thresholds: config.thresholds.unwrap_or_default(),
            rules: build_rules(config)?,
        })
    }

    pub fn analyze(&self, claim: &str) -> AnalysisResult {
        self.evaluate(claim).result
    }

    pub fn analyze_at(&self, claim: &str, checked_at: DateTime<Utc>) -> AnalysisResult {
        self.evaluate_at(claim, checked_at).result
    }

    pub fn evaluate(&self, claim: &str) -> Evaluation {
        self.evaluate_at(claim, Utc::now())
    }

    /// Run every rule in order, accumulate deltas, then backfill empty
    /// categories and clamp.
    pub fn evaluate_at(&self, claim: &str, checked_at: DateTime<Utc>) -> Evaluation {
        let mut score = self.base_score;
        let mut contributions = Vec::new();
        let mut result = AnalysisResult {
            claim: claim.to_string(),
            bs_score: 0,
            verdict: Verdict::LegitLeaning,
            red_flags: Vec::new(),
            fallacies: Vec::new(),
            context_notes: Vec::new(),
            source_notes: Vec::new(),
            checked_at,
        };

        for rule in &self.rules {
            if let Some(outcome) = rule.evaluate(claim) {
                let before = score;
                score = score.saturating_add(outcome.delta);
                debug!(rule = outcome.label, delta = outcome.delta, score, "rule fired");
                result.notes_mut(outcome.category).push(outcome.note.to_string());
                contributions.push(RuleContribution {
                    label: outcome.label.to_string(),
                    delta: outcome.delta,
                    before,
                    after: score,
                });
            }
        }

        for category in NoteCategory::ALL {
            let notes = result.notes_mut(category);
            if notes.is_empty() {
                notes.push(NOTE_FALLBACK.to_string());
            }
        }

        let bs_score = score.clamp(0, 100) as u8;
        result.bs_score = bs_score;
        result.verdict = self.thresholds.classify(bs_score);

        Evaluation {
            result,
            breakdown: ScoreBreakdown {
                base_score: self.base_score,
                rules: contributions,
                raw_score: score,
            },
        }
    }
}

/// Score a claim with the built-in rule table.
pub fn analyze(claim: &str) -> AnalysisResult {
    DEFAULT_ANALYZER.analyze(claim)
}

/// Like [`analyze`] but with a caller-supplied timestamp.
pub fn analyze_at(claim: &str, checked_at: DateTime<Utc>) -> AnalysisResult {
    DEFAULT_ANALYZER.analyze_at(claim, checked_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::rules::{
        NOTE_BARE_NUMBERS, NOTE_CERTAINTY, NOTE_CONSPIRACY, NOTE_MISSING_CITATION,
        NOTE_NO_MECHANISM, NOTE_SHORT_CLAIM, NOTE_SOURCE_MENTION, NOTE_URGENCY, NOTE_VAGUE_GROUP,
    };
    use crate::scoring::RuleWeights;

    fn labels(breakdown: &ScoreBreakdown) -> Vec<&str> {
        breakdown.rules.iter().map(|r| r.label.as_str()).collect()
    }

    fn assert_invariants(result: &AnalysisResult) {
        assert!(result.bs_score <= 100);
        for category in NoteCategory::ALL {
            assert!(!result.notes(category).is_empty(), "{:?} empty", category);
        }
        assert_eq!(result.verdict, Verdict::from_score(result.bs_score));
    }

    #[test]
    fn test_tiny_claim() {
        let eval = Analyzer::default().evaluate("ok");
        let result = &eval.result;

        // base 35 + short 15 + missing citation 20 + no mechanism 8
        assert_eq!(result.bs_score, 78);
        assert_eq!(result.verdict, Verdict::TotalBs);
        assert_eq!(
            result.context_notes,
            vec![NOTE_SHORT_CLAIM.to_string(), NOTE_NO_MECHANISM.to_string()]
        );
        assert_eq!(result.source_notes, vec![NOTE_MISSING_CITATION.to_string()]);
        assert_eq!(result.red_flags, vec![NOTE_FALLBACK.to_string()]);
        assert_eq!(result.fallacies, vec![NOTE_FALLBACK.to_string()]);
        assert_eq!(
            labels(&eval.breakdown),
            vec!["short_claim", "missing_citation", "no_mechanism"]
        );
    }

    #[test]
    fn test_hype_claim() {
        let result = analyze("Breaking: they don't want you to know the shocking truth about vaccines");

        assert_eq!(result.bs_score, 81);
        assert_eq!(result.verdict, Verdict::TotalBs);
        assert_eq!(result.red_flags, vec![NOTE_URGENCY.to_string()]);
        assert_eq!(result.fallacies, vec![NOTE_VAGUE_GROUP.to_string()]);
        assert_eq!(result.context_notes, vec![NOTE_NO_MECHANISM.to_string()]);
        assert_eq!(result.source_notes, vec![NOTE_MISSING_CITATION.to_string()]);
    }

    #[test]
    fn test_cited_claim_lands_on_band_edge() {
        let result = analyze(
            "A 2023 peer-reviewed study (source: nature.com) found a 12% increase due to altered soil pH",
        );

        assert_eq!(result.bs_score, 25);
        assert_eq!(result.verdict, Verdict::NeedsFactCheck);
        assert_eq!(result.source_notes, vec![NOTE_SOURCE_MENTION.to_string()]);
        assert_eq!(result.context_notes, vec![NOTE_FALLBACK.to_string()]);
        assert_eq!(result.red_flags, vec![NOTE_FALLBACK.to_string()]);
        assert_eq!(result.fallacies, vec![NOTE_FALLBACK.to_string()]);
    }

    #[test]
    fn test_conspiracy_and_certainty_stack() {
        let result = analyze("Everyone knows the deep state is always lying to us");

        // 35 + certainty 15 + conspiracy 20 + missing citation 20 + no mechanism 8
        assert_eq!(result.bs_score, 98);
        assert_eq!(result.red_flags, vec![NOTE_CONSPIRACY.to_string()]);
        assert_eq!(
            result.fallacies,
            vec![NOTE_CERTAINTY.to_string(), NOTE_VAGUE_GROUP.to_string()]
        );
    }

    #[test]
    fn test_numbers_without_methodology() {
        let result = analyze("Prices went up 300 times since data started, how odd");

        // "data" counts as a source token, "how" satisfies the causal check
        assert_eq!(result.bs_score, 35 - 10 + 10);
        assert_eq!(result.context_notes, vec![NOTE_BARE_NUMBERS.to_string()]);
    }

    #[test]
    fn test_score_clamps_high() {
        let eval = Analyzer::default().evaluate("never 9 cover-up wake up");

        assert_eq!(eval.breakdown.raw_score, 141);
        assert!(eval.breakdown.clamped());
        assert_eq!(eval.result.bs_score, 100);
        assert_eq!(eval.result.verdict, Verdict::TotalBs);
    }

    #[test]
    fn test_score_clamps_low() {
        let config = ScoringConfig {
            base_score: Some(0),
            ..ScoringConfig::default()
        };
        let analyzer = Analyzer::new(&config).unwrap();
        let eval = analyzer.evaluate("The 2023 study explains this happens because of pH");

        assert_eq!(eval.breakdown.raw_score, -10);
        assert_eq!(eval.result.bs_score, 0);
        assert_eq!(eval.result.verdict, Verdict::LegitLeaning);
    }

    #[test]
    fn test_empty_claim_does_not_panic() {
        let result = analyze("");
        assert_eq!(result.claim, "");
        assert_eq!(result.bs_score, 78);
        assert_invariants(&result);
    }

    #[test]
    fn test_invariants_over_assorted_inputs() {
        let long = "long claim ".repeat(500);
        let inputs = [
            "",
            " ",
            "a",
            "🚨🚨🚨",
            "WAKE UP!!! The globalist cover-up is GUARANTEED, 100 out of 100 people are saying so",
            "According to experts at https://example.org the data shows 40% growth because of rain",
            "Nobody ever explains where the money went",
            long.as_str(),
        ];
        for input in inputs {
            assert_invariants(&analyze(input));
        }
    }

    #[test]
    fn test_idempotent_apart_from_timestamp() {
        let claim = "They say the mainstream media lies about 5G";
        let a = analyze(claim);
        let b = analyze(claim);

        assert_eq!(a.bs_score, b.bs_score);
        assert_eq!(a.verdict, b.verdict);
        assert_eq!(a.red_flags, b.red_flags);
        assert_eq!(a.fallacies, b.fallacies);
        assert_eq!(a.context_notes, b.context_notes);
        assert_eq!(a.source_notes, b.source_notes);
    }

    #[test]
    fn test_analyze_at_uses_given_timestamp() {
        let when = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let result = analyze_at("ok", when);
        assert_eq!(result.checked_at, when);
    }

    #[test]
    fn test_claim_kept_verbatim() {
        let claim = "  Spaces AND Case  ";
        assert_eq!(analyze(claim).claim, claim);
    }

    #[test]
    fn test_custom_weights() {
        let config = ScoringConfig {
            weights: Some(RuleWeights {
                short_claim: Some(0),
                urgency: None,
                certainty: None,
                conspiracy: None,
                missing_citation: Some(1),
                source_mention: None,
                bare_numbers: None,
                no_mechanism: Some(0),
                vague_group: Some(5),
            }),
            ..ScoringConfig::default()
        };
        let analyzer = Analyzer::new(&config).unwrap();

        // short 0 + missing citation 1 + no mechanism 0 + vague group 5
        assert_eq!(analyzer.analyze("they lied").bs_score, 41);
    }

    #[test]
    fn test_extreme_weights_saturate_instead_of_overflowing() {
        let config = ScoringConfig {
            weights: Some(RuleWeights {
                short_claim: Some(i32::MAX),
                ..RuleWeights::default()
            }),
            ..ScoringConfig::default()
        };
        let eval = Analyzer::new(&config).unwrap().evaluate("ok");

        assert_eq!(eval.breakdown.raw_score, i32::MAX);
        assert_eq!(eval.result.bs_score, 100);
        assert_eq!(eval.result.verdict, Verdict::TotalBs);

        let config = ScoringConfig {
            base_score: Some(0),
            weights: Some(RuleWeights {
                source_mention: Some(i32::MIN),
                ..RuleWeights::default()
            }),
            ..ScoringConfig::default()
        };
        let eval = Analyzer::new(&config)
            .unwrap()
            .evaluate("The 2023 study explains this happens because of pH");

        assert_eq!(eval.breakdown.raw_score, i32::MIN);
        assert_eq!(eval.result.bs_score, 0);
    }

    #[test]
    fn test_custom_thresholds_drive_verdict() {
        let config = ScoringConfig {
            thresholds: Some(VerdictThresholds {
                needs_fact_check: 80,
                suspicious: 90,
                total_bs: 95,
            }),
            ..ScoringConfig::default()
        };
        let analyzer = Analyzer::new(&config).unwrap();
        let result = analyzer.analyze("ok");

        assert_eq!(result.bs_score, 78);
        assert_eq!(result.verdict, Verdict::LegitLeaning);
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(analyze("ok")).unwrap();
        for key in [
            "claim",
            "bsScore",
            "verdict",
            "redFlags",
            "fallacies",
            "contextNotes",
            "sourceNotes",
            "checkedAt",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["verdict"], "total BS");
    }
}
