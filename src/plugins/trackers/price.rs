use regex::Regex;
use std::sync::LazyLock;

use crate::models::UNKNOWN;

// ASCII only: other Unicode digits (full-width, Arabic-Indic) are ignored
static DIGIT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit run pattern is valid"));

/// Turns a displayed price into an integer amount.
///
/// Dots are thousands separators in the watched stores (`Gs. 3.500.000`), so
/// they are stripped rather than read as a decimal point. Every remaining digit
/// run is concatenated. Only ASCII digits count. Returns `None` when no
/// digits are left or the amount does not fit an `i64`.
pub fn normalize_price(text: &str) -> Option<i64> {
    if text == UNKNOWN {
        return None;
    }

    let without_separators = text.replace('.', "");
    let digits: String = DIGIT_RUNS
        .find_iter(&without_separators)
        .map(|m| m.as_str())
        .collect();

    if digits.is_empty() {
        return None;
    }

    digits.parse().ok()
}

/// Renders a normalized amount with dot thousands separators, e.g. `3.500.000`.
pub fn format_price(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
