use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::VerdictThresholds;

/// Coarse four-band label derived from the BS score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "legit-leaning")]
    LegitLeaning,
    #[serde(rename = "needs fact-check")]
    NeedsFactCheck,
    #[serde(rename = "suspicious")]
    Suspicious,
    #[serde(rename = "total BS")]
    TotalBs,
}

impl Verdict {
    /// Map a score onto the default bands (25 / 50 / 75).
    pub fn from_score(score: u8) -> Self {
        VerdictThresholds::default().classify(score)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::LegitLeaning => "legit-leaning",
            Verdict::NeedsFactCheck => "needs fact-check",
            Verdict::Suspicious => "suspicious",
            Verdict::TotalBs => "total BS",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Verdict::LegitLeaning => "✅",
            Verdict::NeedsFactCheck => "🤔",
            Verdict::Suspicious => "⚠️",
            Verdict::TotalBs => "🚨",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VerdictThresholds {
    /// Bands are exclusive and ascending; each threshold is inclusive on its lower edge.
    pub fn classify(&self, score: u8) -> Verdict {
        if score < self.needs_fact_check {
            Verdict::LegitLeaning
        } else if score < self.suspicious {
            Verdict::NeedsFactCheck
        } else if score < self.total_bs {
            Verdict::Suspicious
        } else {
            Verdict::TotalBs
        }
    }
}
