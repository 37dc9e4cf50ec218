use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::scoring::{AnalysisResult, NoteCategory, ScoreBreakdown, Verdict};

const METER_WIDTH: usize = 20;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Collapse every whitespace run, newlines included, into one space.
fn flatten_claim(claim: &str) -> String {
    claim.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fit a claim on one line of at most `max_chars` characters.
///
/// Long claims are cut back to the last whole word that fits and end in `…`.
/// A single word wider than the line is cut mid-word.
pub fn truncate_claim(claim: &str, max_chars: usize) -> String {
    let flat = flatten_claim(claim);
    if flat.chars().count() <= max_chars {
        return flat;
    }
    if max_chars == 0 {
        return String::new();
    }

    // One column goes to the ellipsis
    let end = flat
        .char_indices()
        .nth(max_chars - 1)
        .map_or(flat.len(), |(i, _)| i);
    let head = &flat[..end];
    let head = if flat[end..].starts_with(' ') {
        head
    } else {
        head.rsplit_once(' ').map_or(head, |(words, _)| words)
    };
    format!("{}…", head.trim_end())
}

/// Text meter, e.g. `[##########----------]` for 50.
pub fn format_meter(score: u8) -> String {
    let filled = (score.min(100) as usize * METER_WIDTH + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(METER_WIDTH - filled))
}

fn paint_verdict(text: &str, verdict: Verdict) -> String {
    match verdict {
        Verdict::LegitLeaning => text.green().bold().to_string(),
        Verdict::NeedsFactCheck => text.yellow().bold().to_string(),
        Verdict::Suspicious => text.bright_red().bold().to_string(),
        Verdict::TotalBs => text.red().bold().to_string(),
    }
}

/// Multi-line report for one analysis: verdict, meter, then the four note lists.
pub fn format_analysis(result: &AnalysisResult, use_colors: bool) -> String {
    let headline = format!(
        "{} {} - BS Score: {}/100",
        result.verdict.emoji(),
        result.verdict,
        result.bs_score
    );
    let meter = format_meter(result.bs_score);

    let mut lines = Vec::new();
    if use_colors {
        lines.push(paint_verdict(&headline, result.verdict));
        lines.push(paint_verdict(&meter, result.verdict));
        lines.push(format!("{}", format!("\"{}\"", result.claim).dimmed()));
    } else {
        lines.push(headline);
        lines.push(meter);
        lines.push(format!("\"{}\"", result.claim));
    }

    for category in NoteCategory::ALL {
        lines.push(String::new());
        if use_colors {
            lines.push(category.title().bold().to_string());
        } else {
            lines.push(category.title().to_string());
        }
        for note in result.notes(category) {
            lines.push(format!("  - {}", note));
        }
    }

    lines.join("\n")
}

/// Per-rule score walk-through for verbose mode.
pub fn format_breakdown(breakdown: &ScoreBreakdown) -> String {
    let mut lines = vec![format!("  Base score: {}", breakdown.base_score)];
    for rule in &breakdown.rules {
        lines.push(format!(
            "  {:<18} {:>+4}  ({} -> {})",
            rule.label, rule.delta, rule.before, rule.after
        ));
    }
    if breakdown.clamped() {
        lines.push(format!(
            "  Raw total {} clamped to {}",
            breakdown.raw_score,
            breakdown.raw_score.clamp(0, 100)
        ));
    }
    lines.join("\n")
}

/// Plain-text summary handed to any share/copy mechanism. Always three lines.
pub fn format_share_text(result: &AnalysisResult) -> String {
    format!(
        "BS Detector Verdict: {}\nScore: {}/100\nClaim: \"{}\"",
        result.verdict, result.bs_score, result.claim
    )
}

/// Format history as a table: index, score, verdict, claim, age.
/// Newest first, no headers. `stored` is the size of the whole history, so an
/// empty `entries` can tell "nothing yet" apart from "nothing matched".
pub fn format_history(
    entries: &[AnalysisResult],
    stored: usize,
    use_colors: bool,
    now: DateTime<Utc>,
) -> String {
    if entries.is_empty() {
        if stored > 0 {
            return format!("No checks match ({} in history).", stored);
        }
        return "No checks yet. Analyze your first claim with `bs-detector check`.".to_string();
    }

    let term_width = get_terminal_width();

    // Index 3 + score 7 + verdict 16 + age 5, plus separators
    let verdict_width = 16;
    let fixed_width = 3 + 1 + 7 + 2 + verdict_width + 2 + 2 + 5;

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format!("{:>3}/100", entry.bs_score);
            let verdict_str = format!("{:<width$}", entry.verdict.as_str(), width = verdict_width);
            let age = format_age(now - entry.checked_at);

            let claim = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_claim(&entry.claim, width - fixed_width)
                }
                Some(_) => truncate_claim(&entry.claim, 20),
                None => flatten_claim(&entry.claim),
            };

            if use_colors {
                format!(
                    "{} {}  {}  {}  {}",
                    index_str.dimmed(),
                    score_str.bold(),
                    paint_verdict(&verdict_str, entry.verdict),
                    claim,
                    age.dimmed()
                )
            } else {
                format!(
                    "{} {}  {}  {}  {}",
                    index_str, score_str, verdict_str, claim, age
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Largest unit first; ages under a minute (or from a skewed clock) read "now".
const AGE_UNITS: [(i64, &str); 4] = [(7 * 86_400, "w"), (86_400, "d"), (3_600, "h"), (60, "m")];

/// Compact age of a history entry, e.g. "5m", "3h", "2d", "1w".
pub fn format_age(age: Duration) -> String {
    let seconds = age.num_seconds();
    AGE_UNITS
        .iter()
        .find(|(unit, _)| seconds >= *unit)
        .map(|(unit, suffix)| format!("{}{}", seconds / unit, suffix))
        .unwrap_or_else(|| "now".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::analyze_at;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn sample(claim: &str, hours_ago: i64) -> AnalysisResult {
        analyze_at(claim, fixed_now() - Duration::hours(hours_ago))
    }

    #[test]
    fn test_share_text_is_three_lines() {
        let result = sample("ok", 0);
        assert_eq!(
            format_share_text(&result),
            "BS Detector Verdict: total BS\nScore: 78/100\nClaim: \"ok\""
        );
        assert_eq!(format_share_text(&result).lines().count(), 3);
    }

    #[test]
    fn test_format_analysis_plain() {
        let result = sample("Breaking: they don't want you to know the shocking truth about vaccines", 0);
        let output = format_analysis(&result, false);

        assert!(output.starts_with("🚨 total BS - BS Score: 81/100"));
        assert!(output.contains("Red flags\n  - hype/urgency language"));
        assert!(output.contains("Fallacies\n  - vague authority / hasty generalization"));
        assert!(output.contains("Missing context\n  - no causal mechanism explained"));
        assert!(output.contains("Source signals\n  - no clear citation detected"));
    }

    #[test]
    fn test_format_meter() {
        assert_eq!(format_meter(0), format!("[{}]", "-".repeat(20)));
        assert_eq!(format_meter(100), format!("[{}]", "#".repeat(20)));
        assert_eq!(format_meter(50), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
    }

    #[test]
    fn test_format_breakdown_lists_rules() {
        let eval = crate::scoring::Analyzer::default().evaluate("never 9 cover-up wake up");
        let output = format_breakdown(&eval.breakdown);

        assert!(output.starts_with("  Base score: 35"));
        assert!(output.contains("urgency"));
        assert!(output.contains("+18"));
        assert!(output.contains("Raw total 141 clamped to 100"));
    }

    #[test]
    fn test_format_history_empty() {
        assert_eq!(
            format_history(&[], 0, false, fixed_now()),
            "No checks yet. Analyze your first claim with `bs-detector check`."
        );
    }

    #[test]
    fn test_format_history_nothing_matched() {
        assert_eq!(
            format_history(&[], 12, false, fixed_now()),
            "No checks match (12 in history)."
        );
    }

    #[test]
    fn test_format_history_rows() {
        let entries = vec![sample("newest claim", 0), sample("older claim", 26)];
        let output = format_history(&entries, entries.len(), false, fixed_now());
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1."));
        assert!(lines[0].contains("newest claim"));
        assert!(lines[0].ends_with("now"));
        assert!(lines[1].starts_with(" 2."));
        assert!(lines[1].contains("older claim"));
        assert!(lines[1].ends_with("1d"));
    }

    #[test]
    fn test_format_history_flattens_newlines() {
        let entries = vec![sample("line one\nline two", 0)];
        let output = format_history(&entries, entries.len(), false, fixed_now());
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn test_truncate_claim_short() {
        assert_eq!(truncate_claim("Short", 10), "Short");
    }

    #[test]
    fn test_truncate_claim_on_word_boundary() {
        assert_eq!(truncate_claim("This is a very long claim", 10), "This is a…");
        assert_eq!(truncate_claim("one two three", 9), "one two…");
    }

    #[test]
    fn test_truncate_claim_collapses_whitespace() {
        assert_eq!(truncate_claim("breaking\n\n  news\ttoday", 40), "breaking news today");
    }

    #[test]
    fn test_truncate_claim_long_word() {
        assert_eq!(truncate_claim("Supercalifragilistic", 6), "Super…");
        assert_eq!(truncate_claim("🚨🚨🚨🚨🚨🚨", 5), "🚨🚨🚨🚨…");
    }

    #[test]
    fn test_truncate_claim_very_narrow() {
        assert_eq!(truncate_claim("abcdef", 1), "…");
        assert_eq!(truncate_claim("abcdef", 0), "");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::seconds(30)), "now");
        assert_eq!(format_age(Duration::minutes(30)), "30m");
        assert_eq!(format_age(Duration::hours(3)), "3h");
        assert_eq!(format_age(Duration::days(2)), "2d");
        assert_eq!(format_age(Duration::weeks(2)), "2w");
        assert_eq!(format_age(Duration::days(10)), "1w");
        assert_eq!(format_age(Duration::minutes(-5)), "now");
    }
}
