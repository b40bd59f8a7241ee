//! Display formatting for lap times, gaps and driver names

use crate::transform::normalizer::UNKNOWN_DRIVER;

/// Format a lap or sector time as `M:SS.mmm`.
///
/// Absent and non-positive times render as `-`.
pub fn format_time(ms: Option<i64>) -> String {
    match ms {
        Some(ms) if ms > 0 => {
            let minutes = ms / 60_000;
            let seconds = (ms % 60_000) / 1_000;
            let millis = ms % 1_000;
            format!("{minutes}:{seconds:02}.{millis:03}")
        }
        _ => "-".to_string(),
    }
}

/// Format a gap to the leader as `+S.mmm`.
///
/// Absent and negative gaps render as `-`.
pub fn format_delta(ms: Option<i64>) -> String {
    match ms {
        Some(ms) if ms >= 0 => format!("+{}.{:03}", ms / 1_000, ms % 1_000),
        _ => "-".to_string(),
    }
}

/// Normalize a raw driver name for display.
///
/// Whitespace is collapsed and every word is title-cased, including the parts
/// of hyphenated and apostrophe names (`o'connor-smith` → `O'Connor-Smith`).
/// A blank name becomes `Unknown`.
pub fn normalize_driver_name(raw: &str) -> String {
    let words: Vec<String> = raw.split_whitespace().map(title_case_word).collect();
    if words.is_empty() {
        return UNKNOWN_DRIVER.to_string();
    }
    words.join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut result = String::with_capacity(word.len());
    let mut at_part_start = true;

    for ch in word.chars() {
        if matches!(ch, '-' | '\'' | '’') {
            result.push(ch);
            at_part_start = true;
        } else if at_part_start {
            result.extend(ch.to_uppercase());
            at_part_start = false;
        } else {
            result.extend(ch.to_lowercase());
        }
    }

    result
}
