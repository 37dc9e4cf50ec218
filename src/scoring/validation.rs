use super::config::ScoringConfig;
use super::rules::compile_pattern;

/// Largest magnitude a single rule weight may have.
pub const MAX_WEIGHT: i32 = 100;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(base) = config.base_score {
        if !(0..=100).contains(&base) {
            errors.push(format!("scoring.base_score: must be between 0 and 100, got {}", base));
        }
    }

    if let Some(thresholds) = config.thresholds {
        if thresholds.needs_fact_check >= thresholds.suspicious
            || thresholds.suspicious >= thresholds.total_bs
        {
            errors.push(format!(
                "scoring.thresholds: must be strictly ascending, got {} / {} / {}",
                thresholds.needs_fact_check, thresholds.suspicious, thresholds.total_bs
            ));
        }
        if thresholds.total_bs > 100 {
            errors.push(format!(
                "scoring.thresholds.total_bs: must be at most 100, got {}",
                thresholds.total_bs
            ));
        }
    }

    if let Some(ref weights) = config.weights {
        for (name, weight) in weights.entries() {
            if !(-MAX_WEIGHT..=MAX_WEIGHT).contains(&weight) {
                errors.push(format!(
                    "scoring.weights.{}: must be between {} and {}, got {}",
                    name, -MAX_WEIGHT, MAX_WEIGHT, weight
                ));
            }
        }
    }

    if let Some(ref patterns) = config.patterns {
        for (name, pattern) in patterns.entries() {
            if pattern.is_empty() {
                // An empty regex matches everything
                errors.push(format!("scoring.patterns.{}: must not be empty", name));
            } else if let Err(e) = compile_pattern(name, pattern) {
                errors.push(format!("scoring.patterns.{}: {:#}", name, e));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
