//! Utility functions and helpers.

pub mod http;
pub mod log;

/// Shorten `text` to at most `max_chars` characters for log output,
/// collapsing whitespace so multi-line posts stay on one log line.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut short: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}
