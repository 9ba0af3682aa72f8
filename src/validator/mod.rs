//! Response validator: turns the post-navigation state of a page into a
//! typed [`store::OutcomeResult`] classification.
//!
//! A pure function over already-captured response state (no I/O), grounded
//! in the pattern-table classification style used by the page extractor's
//! block-page detection, generalized here into a single ordered pattern set
//! that is data rather than a chain of ad hoc `if` branches.

pub mod patterns;

use crate::store::OutcomeResult;
use crate::utils::safe_truncate_chars;
use patterns::{default_patterns, is_captcha_tag, is_rate_limit_tag, BlockPattern, PatternLocation};

/// The response state a completed navigation produces, as the capture
/// pipeline assembles it after a behavior run settles.
pub struct ValidationInput<'a> {
    pub status: u16,
    pub title: &'a str,
    pub body_text: &'a str,
    pub headers: &'a [(String, String)],
    pub cookies: &'a [String],
    pub min_content_length: usize,
}

/// Outcome of validating a response, with the block attribution (if any)
/// that caused it.
pub struct Validation {
    pub result: OutcomeResult,
    pub block_service: Option<String>,
}

/// Classify a completed navigation's response state.
///
/// 1. A 4xx/5xx status is always `blocked` with attribution `http_<status>`.
/// 2. The ordered pattern set is walked; the first match wins.
/// 3. Short, error-flavored bodies below `min_content_length` are `empty`.
/// 4. Anything else is `ok`.
pub fn validate(input: &ValidationInput<'_>) -> Validation {
    if input.status >= 400 {
        return Validation {
            result: OutcomeResult::Blocked,
            block_service: Some(format!("http_{}", input.status)),
        };
    }

    let body_owned = input.body_text.to_lowercase();
    let body_lower = safe_truncate_chars(&body_owned, 64 * 1024);
    let title_lower = input.title.to_lowercase();

    for pattern in default_patterns() {
        if pattern_matches(pattern, &body_lower, &title_lower, input.headers, input.cookies) {
            let result = if is_captcha_tag(pattern.service_tag) {
                OutcomeResult::Captcha
            } else if is_rate_limit_tag(pattern.service_tag) {
                OutcomeResult::RateLimited
            } else {
                OutcomeResult::Blocked
            };
            return Validation {
                result,
                block_service: Some(pattern.service_tag.to_string()),
            };
        }
    }

    if body_lower.chars().count() < input.min_content_length
        && ["error", "denied", "forbidden"]
            .iter()
            .any(|needle| body_lower.contains(needle))
    {
        return Validation {
            result: OutcomeResult::Empty,
            block_service: None,
        };
    }

    Validation {
        result: OutcomeResult::Ok,
        block_service: None,
    }
}

fn pattern_matches(
    pattern: &BlockPattern,
    body_lower: &str,
    title_lower: &str,
    headers: &[(String, String)],
    cookies: &[String],
) -> bool {
    match pattern.location {
        PatternLocation::Body => body_lower.contains(pattern.text),
        PatternLocation::Title => title_lower.contains(pattern.text),
        PatternLocation::Header => headers
            .iter()
            .any(|(name, _)| name.to_lowercase() == pattern.text),
        PatternLocation::Cookie => cookies
            .iter()
            .any(|cookie| cookie.to_lowercase().contains(pattern.text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(
        status: u16,
        title: &'a str,
        body_text: &'a str,
        headers: &'a [(String, String)],
        cookies: &'a [String],
    ) -> ValidationInput<'a> {
        ValidationInput {
            status,
            title,
            body_text,
            headers,
            cookies,
            min_content_length: 500,
        }
    }

    #[test]
    fn http_error_status_is_blocked() {
        let v = validate(&input(503, "", "normal page content here", &[], &[]));
        assert_eq!(v.result, OutcomeResult::Blocked);
        assert_eq!(v.block_service.as_deref(), Some("http_503"));
    }

    #[test]
    fn recaptcha_body_signature_is_captcha() {
        let v = validate(&input(
            200,
            "Verify you are human",
            "please solve the recaptcha challenge to continue",
            &[],
            &[],
        ));
        assert_eq!(v.result, OutcomeResult::Captcha);
        assert_eq!(v.block_service.as_deref(), Some("recaptcha"));
    }

    #[test]
    fn perimeterx_cookie_signature_is_blocked() {
        let cookies = vec!["_pxhd=abc123".to_string()];
        let v = validate(&input(200, "", "some long page body here...", &[], &cookies));
        assert_eq!(v.result, OutcomeResult::Blocked);
        assert_eq!(v.block_service.as_deref(), Some("perimeterx"));
    }

    #[test]
    fn short_error_body_is_empty() {
        let v = validate(&input(200, "", "access denied", &[], &[]));
        assert_eq!(v.result, OutcomeResult::Empty);
        assert!(v.block_service.is_none());
    }

    #[test]
    fn normal_long_body_is_ok() {
        let body = "a".repeat(600);
        let v = validate(&input(200, "Home", &body, &[], &[]));
        assert_eq!(v.result, OutcomeResult::Ok);
    }

    #[test]
    fn earlier_pattern_wins_tie_break() {
        // A body containing both a recaptcha signature and a generic
        // cloudflare phrase should classify as recaptcha (listed first).
        let v = validate(&input(
            200,
            "",
            "checking your browser before accessing this recaptcha protected site",
            &[],
            &[],
        ));
        assert_eq!(v.block_service.as_deref(), Some("recaptcha"));
    }
}
