use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::config::{RulePatterns, ScoringConfig, DEFAULT_SHORT_CLAIM_LENGTH};

pub const NOTE_SHORT_CLAIM: &str = "too short to verify";
pub const NOTE_URGENCY: &str = "hype/urgency language";
pub const NOTE_CERTAINTY: &str = "overgeneralization wording";
pub const NOTE_CONSPIRACY: &str = "conspiracy framing, no testable evidence";
pub const NOTE_MISSING_CITATION: &str = "no clear citation detected";
pub const NOTE_SOURCE_MENTION: &str = "possible source mention; verify credibility";
pub const NOTE_BARE_NUMBERS: &str = "numbers without methodological context";
pub const NOTE_NO_MECHANISM: &str = "no causal mechanism explained";
pub const NOTE_VAGUE_GROUP: &str = "vague authority / hasty generalization";

/// Inserted into any category no rule wrote to.
pub const NOTE_FALLBACK: &str = "no pattern detected in this category";

/// The four note lists a rule can write into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteCategory {
    RedFlags,
    Fallacies,
    Context,
    Sources,
}

impl NoteCategory {
    pub const ALL: [NoteCategory; 4] = [
        NoteCategory::RedFlags,
        NoteCategory::Fallacies,
        NoteCategory::Context,
        NoteCategory::Sources,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            NoteCategory::RedFlags => "Red flags",
            NoteCategory::Fallacies => "Fallacies",
            NoteCategory::Context => "Missing context",
            NoteCategory::Sources => "Source signals",
        }
    }
}

/// Predicate over the raw claim text.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Fewer than N characters
    ShorterThan(usize),
    Matches(Regex),
    Lacks(Regex),
    Any(Vec<Condition>),
    All(Vec<Condition>),
}

impl Condition {
    pub fn holds(&self, claim: &str) -> bool {
        match self {
            Condition::ShorterThan(n) => claim.chars().count() < *n,
            Condition::Matches(re) => re.is_match(claim),
            Condition::Lacks(re) => !re.is_match(claim),
            Condition::Any(conditions) => conditions.iter().any(|c| c.holds(claim)),
            Condition::All(conditions) => conditions.iter().all(|c| c.holds(claim)),
        }
    }
}

/// What happens to the score and the notes when a rule branch is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub label: &'static str,
    pub delta: i32,
    pub category: NoteCategory,
    pub note: &'static str,
}

/// One row of the rule table.
///
/// `otherwise` turns the rule into a two-branch exclusive check: exactly one of
/// `on_match` / `otherwise` fires.
#[derive(Debug, Clone)]
pub struct Rule {
    pub condition: Condition,
    pub on_match: Outcome,
    pub otherwise: Option<Outcome>,
}

impl Rule {
    fn single(condition: Condition, on_match: Outcome) -> Self {
        Self {
            condition,
            on_match,
            otherwise: None,
        }
    }

    /// The branch taken for this claim, if any.
    pub fn evaluate(&self, claim: &str) -> Option<&Outcome> {
        if self.condition.holds(claim) {
            Some(&self.on_match)
        } else {
            self.otherwise.as_ref()
        }
    }
}

/// Compile a vocabulary pattern. Matching is always case-insensitive.
pub fn compile_pattern(name: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .with_context(|| format!("Invalid pattern for '{}': {}", name, pattern))
}

fn pattern(patterns: &RulePatterns, name: &'static str) -> Result<Regex> {
    let source = patterns
        .entries()
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, p)| p.to_string())
        .with_context(|| format!("No pattern configured for '{}'", name))?;
    compile_pattern(name, &source)
}

/// Build the ordered rule table from configuration.
///
/// Order matters: notes within a category appear in this order.
pub fn build_rules(config: &ScoringConfig) -> Result<Vec<Rule>> {
    let weights = config.weights.clone().unwrap_or_default().resolved();
    let patterns = config.patterns.clone().unwrap_or_default().resolved();
    let short_len = config.short_claim_length.unwrap_or(DEFAULT_SHORT_CLAIM_LENGTH);
    let digit = Regex::new("[0-9]").context("Invalid digit pattern")?;

    let rules = vec![
        Rule::single(
            Condition::ShorterThan(short_len),
            Outcome {
                label: "short_claim",
                delta: weights.short_claim.unwrap_or_default(),
                category: NoteCategory::Context,
                note: NOTE_SHORT_CLAIM,
            },
        ),
        Rule::single(
            Condition::Matches(pattern(&patterns, "urgency")?),
            Outcome {
                label: "urgency",
                delta: weights.urgency.unwrap_or_default(),
                category: NoteCategory::RedFlags,
                note: NOTE_URGENCY,
            },
        ),
        Rule::single(
            Condition::Matches(pattern(&patterns, "certainty")?),
            Outcome {
                label: "certainty",
                delta: weights.certainty.unwrap_or_default(),
                category: NoteCategory::Fallacies,
                note: NOTE_CERTAINTY,
            },
        ),
        Rule::single(
            Condition::Matches(pattern(&patterns, "conspiracy")?),
            Outcome {
                label: "conspiracy",
                delta: weights.conspiracy.unwrap_or_default(),
                category: NoteCategory::RedFlags,
                note: NOTE_CONSPIRACY,
            },
        ),
        Rule {
            condition: Condition::Any(vec![
                Condition::Matches(pattern(&patterns, "vague_attribution")?),
                Condition::Lacks(pattern(&patterns, "source_token")?),
            ]),
            on_match: Outcome {
                label: "missing_citation",
                delta: weights.missing_citation.unwrap_or_default(),
                category: NoteCategory::Sources,
                note: NOTE_MISSING_CITATION,
            },
            otherwise: Some(Outcome {
                label: "source_mention",
                delta: weights.source_mention.unwrap_or_default(),
                category: NoteCategory::Sources,
                note: NOTE_SOURCE_MENTION,
            }),
        },
        Rule::single(
            Condition::All(vec![
                Condition::Matches(digit),
                Condition::Lacks(pattern(&patterns, "methodology")?),
            ]),
            Outcome {
                label: "bare_numbers",
                delta: weights.bare_numbers.unwrap_or_default(),
                category: NoteCategory::Context,
                note: NOTE_BARE_NUMBERS,
            },
        ),
        Rule::single(
            Condition::Lacks(pattern(&patterns, "causal")?),
            Outcome {
                label: "no_mechanism",
                delta: weights.no_mechanism.unwrap_or_default(),
                category: NoteCategory::Context,
                note: NOTE_NO_MECHANISM,
            },
        ),
        Rule::single(
            Condition::Matches(pattern(&patterns, "vague_group")?),
            Outcome {
                label: "vague_group",
                delta: weights.vague_group.unwrap_or_default(),
                category: NoteCategory::Fallacies,
                note: NOTE_VAGUE_GROUP,
            },
        ),
    ];

    Ok(rules)
}
