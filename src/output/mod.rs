pub mod formatter;

pub use formatter::{
    format_age, format_analysis, format_breakdown, format_history, format_meter,
    format_share_text, should_use_colors, truncate_claim,
};
