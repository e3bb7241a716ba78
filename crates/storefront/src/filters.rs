//! Template filters shared across the storefront pages.
//!
//! Askama resolves `{{ value|name }}` against this module. Everything here is
//! presentation trivia that does not belong in handlers: footer years, card
//! excerpts, count labels.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{Datelike, Utc};

/// Longest card copy before [`excerpt`] cuts it.
const CARD_COPY_LIMIT: usize = 140;

/// Footer copyright year.
///
/// Filters always receive a value, so pass a throwaway: `{{ ""|current_year }}`.
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    Ok(Utc::now().year())
}

/// Shorten owner-written copy to fit a card tile.
///
/// Cuts at a word boundary near 140 characters and appends an ellipsis:
/// `{{ description|excerpt }}`.
#[askama::filter_fn]
pub fn excerpt(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(shorten(&value.to_string(), CARD_COPY_LIMIT))
}

/// Label a product count: `0 products`, `1 product`, `7 products`.
#[askama::filter_fn]
pub fn product_count(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let count = value.to_string();
    let noun = if count == "1" { "product" } else { "products" };
    Ok(format!("{count} {noun}"))
}

/// Cut `text` at the last word boundary within `limit` characters.
fn shorten(text: &str, limit: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let prefix: String = text.chars().take(limit).collect();
    let head = match prefix.rfind(char::is_whitespace) {
        Some(pos) => prefix.get(..pos).unwrap_or(&prefix),
        None => &prefix,
    };
    format!("{}…", head.trim_end())
}

#[cfg(test)]
mod tests {
    use super::shorten;

    #[test]
    fn test_short_text_passes_through() {
        assert_eq!(shorten("Hand-poured candles.", 140), "Hand-poured candles.");
        assert_eq!(shorten("  padded  ", 140), "padded");
    }

    #[test]
    fn test_long_text_cuts_at_a_word() {
        let text = "word ".repeat(40);
        assert_eq!(shorten(&text, 22), "word word word word…");
    }

    #[test]
    fn test_unbroken_text_gets_a_hard_cut() {
        let text = "a".repeat(200);
        let cut = shorten(&text, 10);
        assert_eq!(cut.chars().count(), 11);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_multibyte_text_never_splits_a_char() {
        let text = "héllo wörld ".repeat(30);
        let cut = shorten(&text, 25);
        assert!(cut.ends_with('…'));
        assert!(text.starts_with(cut.trim_end_matches('…').trim_end()));
    }
}
