//! Utilities for sanitizing user input and remote error messages.
//!
//! Filter values typed into the datastore search UI end up inside the query
//! string, so they are cleaned before compilation. Response bodies of failed
//! requests are cleaned and truncated before they are put into error messages.

use crate::config::MAX_ERROR_MESSAGE_LENGTH;

/// Typographic quotes that word processors substitute for `"`.
const STYLIZED_QUOTES: [char; 4] = ['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'];

/// Substrings that would let a filter value inject function queries.
const DISALLOWED_SUBSTRINGS: [&str; 2] = ["{!func}", "_val_"];

/// Cleans a free-text filter value before it is placed in a query.
///
/// Replaces `“ ” « »` with a plain `"` and removes every occurrence of
/// `{!func}` and `_val_`.
///
/// Removal is a single left-to-right pass per substring, so input built to
/// reassemble a disallowed substring after removal (`_va_val_l_`) is not
/// caught. The datastore search UI behaves the same way.
pub fn sanitize_query_string(value: &str) -> String {
    let mut cleaned: String = value
        .chars()
        .map(|c| if STYLIZED_QUOTES.contains(&c) { '"' } else { c })
        .collect();
    for disallowed in DISALLOWED_SUBSTRINGS {
        cleaned = cleaned.replace(disallowed, "");
    }
    cleaned
}

/// Sanitizes an error message by removing control characters.
///
/// Control characters (0x00-0x1F, except newline/tab/carriage return) can garble
/// terminal output. This function removes them while preserving readability.
pub fn sanitize_error_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code >= 0x20 // Printable ASCII starts at 0x20 (space)
                || code == 0x09 // Tab
                || code == 0x0A // Newline
                || code == 0x0D // Carriage return
        })
        .collect()
}

/// Sanitizes and truncates an error message to `MAX_ERROR_MESSAGE_LENGTH` characters.
///
/// Leading and trailing whitespace is trimmed. A truncated message ends with a
/// note carrying its original length.
pub fn sanitize_and_truncate_error_message(message: &str) -> String {
    let sanitized = sanitize_error_message(message.trim());
    let length = sanitized.chars().count();

    if length > MAX_ERROR_MESSAGE_LENGTH {
        let keep = MAX_ERROR_MESSAGE_LENGTH.saturating_sub(50);
        let head: String = sanitized.chars().take(keep).collect();
        format!("{}... (truncated, original length: {} chars)", head, length)
    } else {
        sanitized
    }
}
