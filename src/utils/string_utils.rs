//! UTF-8-safe string truncation utilities.
//!
//! Used to cap page body text before it is handed to the response validator
//! and before it is persisted in an outcome record, without risking a panic
//! on a multi-byte character boundary.

/// Safely truncate a string to a maximum number of CHARACTERS (not bytes).
///
/// # Examples
/// ```
/// # use national_treasure::utils::string_utils::safe_truncate_chars;
/// assert_eq!(safe_truncate_chars("Hello, World!", 5), "Hello");
/// assert_eq!(safe_truncate_chars("Hi", 100), "Hi");
/// ```
#[inline]
#[must_use]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}
