//! Text keys used to compare roster rows with leaderboard entries

/// Minimum number of shared car tokens for a declared car to match.
pub const MIN_CAR_TOKEN_OVERLAP: usize = 2;

/// Trim and lowercase.
pub fn normalize_text(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Driver name key that ignores case, spacing and word order.
///
/// `"  Ivanov   IVAN "` and `"ivan ivanov"` both become `"ivan ivanov"`.
pub fn to_name_key(value: &str) -> String {
    let normalized = normalize_text(value);
    let mut words: Vec<&str> = normalized.split_whitespace().collect();
    words.sort_unstable();
    words.join(" ")
}

/// Split a car name into comparable tokens.
///
/// Tokens are lowercase, separated by whitespace, `-` or `_`. Single
/// characters and four digit years are dropped.
pub fn to_car_tokens(car: &str) -> Vec<String> {
    normalize_text(car)
        .split(|ch: char| ch.is_whitespace() || ch == '-' || ch == '_')
        .filter(|token| token.chars().count() > 1 && !is_year(token))
        .map(str::to_string)
        .collect()
}

fn is_year(token: &str) -> bool {
    token.len() == 4 && token.bytes().all(|byte| byte.is_ascii_digit())
}

/// Whether a roster car column names an actual car.
///
/// Empty and `-` mean no car was declared.
pub fn has_declared_car(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "-"
}

/// Whether `left` and `right` share at least `min_overlap` tokens.
///
/// Stops scanning as soon as the threshold is reached.
pub fn has_car_token_overlap(left: &[String], right: &[String], min_overlap: usize) -> bool {
    if left.is_empty() || right.is_empty() {
        return false;
    }

    let mut count = 0;
    for token in left {
        if right.contains(token) {
            count += 1;
            if count >= min_overlap {
                return true;
            }
        }
    }
    false
}
