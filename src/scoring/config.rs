use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_SCORE: i32 = 35;
pub const DEFAULT_SHORT_CLAIM_LENGTH: usize = 25;

/// Main scoring configuration.
///
/// Every field is optional; anything left unset falls back to the built-in
/// rule table. Patterns are regular expressions and are always matched
/// case-insensitively.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   base_score: 35
///   short_claim_length: 25
///   thresholds: { needs_fact_check: 25, suspicious: 50, total_bs: 75 }
///   weights:
///     urgency: 18
///     source_mention: -10
///   patterns:
///     conspiracy: "cover-up|deep state|chemtrails"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Score every claim starts from before rules apply (default: 35)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_score: Option<i32>,

    /// Claims with fewer characters than this are flagged as too short (default: 25)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_claim_length: Option<usize>,

    /// Lower bounds of the verdict bands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<VerdictThresholds>,

    /// Score deltas per rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<RuleWeights>,

    /// Vocabulary patterns per rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<RulePatterns>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: Some(DEFAULT_BASE_SCORE),
            short_claim_length: Some(DEFAULT_SHORT_CLAIM_LENGTH),
            thresholds: Some(VerdictThresholds::default()),
            weights: Some(RuleWeights::default()),
            patterns: Some(RulePatterns::default()),
        }
    }
}

/// Verdict band boundaries. Each value is the inclusive lower bound of its band;
/// anything below `needs_fact_check` is legit-leaning.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VerdictThresholds {
    pub needs_fact_check: u8,
    pub suspicious: u8,
    pub total_bs: u8,
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            needs_fact_check: 25,
            suspicious: 50,
            total_bs: 75,
        }
    }
}

/// Score delta applied when a rule fires.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuleWeights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_claim: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certainty: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conspiracy: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_citation: Option<i32>,
    /// Credit for a link or a study/report/data/source mention
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_mention: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bare_numbers: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_mechanism: Option<i32>,
    /// Qualitative only by default (0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vague_group: Option<i32>,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            short_claim: Some(15),
            urgency: Some(18),
            certainty: Some(15),
            conspiracy: Some(20),
            missing_citation: Some(20),
            source_mention: Some(-10),
            bare_numbers: Some(10),
            no_mechanism: Some(8),
            vague_group: Some(0),
        }
    }
}

impl RuleWeights {
    /// Fill unset weights from the defaults.
    pub fn resolved(&self) -> RuleWeights {
        let d = RuleWeights::default();
        RuleWeights {
            short_claim: self.short_claim.or(d.short_claim),
            urgency: self.urgency.or(d.urgency),
            certainty: self.certainty.or(d.certainty),
            conspiracy: self.conspiracy.or(d.conspiracy),
            missing_citation: self.missing_citation.or(d.missing_citation),
            source_mention: self.source_mention.or(d.source_mention),
            bare_numbers: self.bare_numbers.or(d.bare_numbers),
            no_mechanism: self.no_mechanism.or(d.no_mechanism),
            vague_group: self.vague_group.or(d.vague_group),
        }
    }

    /// (name, weight) pairs for every weight that is set.
    pub fn entries(&self) -> Vec<(&'static str, i32)> {
        [
            ("short_claim", self.short_claim),
            ("urgency", self.urgency),
            ("certainty", self.certainty),
            ("conspiracy", self.conspiracy),
            ("missing_citation", self.missing_citation),
            ("source_mention", self.source_mention),
            ("bare_numbers", self.bare_numbers),
            ("no_mechanism", self.no_mechanism),
            ("vague_group", self.vague_group),
        ]
        .into_iter()
        .filter_map(|(name, weight)| weight.map(|w| (name, w)))
        .collect()
    }
}

/// Regular expressions for each vocabulary check.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RulePatterns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certainty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conspiracy: Option<String>,
    /// Hearsay phrasing that counts as "no citation" even when a source word appears
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vague_attribution: Option<String>,
    /// Link-like tokens and citation words
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_token: Option<String>,
    /// Words that give numbers methodological context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub causal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vague_group: Option<String>,
}

impl Default for RulePatterns {
    fn default() -> Self {
        Self {
            urgency: Some(
                "shocking|exposed|they don't want you to know|must read|breaking|wake up"
                    .to_string(),
            ),
            certainty: Some(
                "always|never|everyone knows|guaranteed|proven once and for all".to_string(),
            ),
            conspiracy: Some("cover-up|deep state|globalist|mainstream media lies".to_string()),
            vague_attribution: Some(
                "according to experts|people are saying|a friend told me".to_string(),
            ),
            source_token: Some(r"http|www\.|study|report|data|source".to_string()),
            methodology: Some("year|%|percent|study|sample|source".to_string()),
            causal: Some("who|what|when|where|how|because|due to".to_string()),
            vague_group: Some("they|them|everyone|nobody".to_string()),
        }
    }
}

impl RulePatterns {
    /// Fill unset patterns from the defaults.
    pub fn resolved(&self) -> RulePatterns {
        let d = RulePatterns::default();
        RulePatterns {
            urgency: self.urgency.clone().or(d.urgency),
            certainty: self.certainty.clone().or(d.certainty),
            conspiracy: self.conspiracy.clone().or(d.conspiracy),
            vague_attribution: self.vague_attribution.clone().or(d.vague_attribution),
            source_token: self.source_token.clone().or(d.source_token),
            methodology: self.methodology.clone().or(d.methodology),
            causal: self.causal.clone().or(d.causal),
            vague_group: self.vague_group.clone().or(d.vague_group),
        }
    }

    /// (name, pattern) pairs for every pattern that is set.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("urgency", &self.urgency),
            ("certainty", &self.certainty),
            ("conspiracy", &self.conspiracy),
            ("vague_attribution", &self.vague_attribution),
            ("source_token", &self.source_token),
            ("methodology", &self.methodology),
            ("causal", &self.causal),
            ("vague_group", &self.vague_group),
        ]
        .into_iter()
        .filter_map(|(name, pattern)| pattern.as_deref().map(|p| (name, p)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_config() {
        let config = ScoringConfig::default();

        assert_eq!(config.base_score, Some(35));
        assert_eq!(config.short_claim_length, Some(25));
        assert_eq!(config.thresholds, Some(VerdictThresholds::default()));
        assert_eq!(config.weights.unwrap().source_mention, Some(-10));
    }

    #[test]
    fn test_scoring_config_serde_roundtrip() {
        let config = ScoringConfig::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: ScoringConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_scoring_config_parse() {
        let yaml = r#"
base_score: 40
weights:
  urgency: 25
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.base_score, Some(40));
        assert!(config.thresholds.is_none());
        assert!(config.patterns.is_none());

        let weights = config.weights.unwrap();
        assert_eq!(weights.urgency, Some(25));
        assert!(weights.conspiracy.is_none());
    }

    #[test]
    fn test_empty_scoring_config_parse() {
        let config: ScoringConfig = serde_saphyr::from_str("{}").unwrap();
        assert!(config.base_score.is_none());
        assert!(config.short_claim_length.is_none());
        assert!(config.weights.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "base_scroe: 10\n";
        assert!(serde_saphyr::from_str::<ScoringConfig>(yaml).is_err());
    }

    #[test]
    fn test_weights_resolved_fills_gaps() {
        let weights = RuleWeights {
            short_claim: None,
            urgency: Some(1),
            certainty: None,
            conspiracy: None,
            missing_citation: None,
            source_mention: None,
            bare_numbers: None,
            no_mechanism: None,
            vague_group: Some(5),
        };
        let resolved = weights.resolved();
        assert_eq!(resolved.urgency, Some(1));
        assert_eq!(resolved.vague_group, Some(5));
        assert_eq!(resolved.short_claim, Some(15));
        assert_eq!(resolved.source_mention, Some(-10));
        assert_eq!(weights.entries(), vec![("urgency", 1), ("vague_group", 5)]);
        assert_eq!(RuleWeights::default().entries().len(), 9);
    }

    #[test]
    fn test_pattern_entries_skip_unset() {
        let patterns = RulePatterns {
            urgency: Some("hype".to_string()),
            certainty: None,
            conspiracy: None,
            vague_attribution: None,
            source_token: None,
            methodology: None,
            causal: None,
            vague_group: None,
        };
        assert_eq!(patterns.entries(), vec![("urgency", "hype")]);
        assert_eq!(RulePatterns::default().entries().len(), 8);
    }
}
