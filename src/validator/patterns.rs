//! The ordered pattern set consulted by the validator. Entries are data, not
//! code: adding a new anti-bot signature is a new row here, not a new match
//! arm.

/// Where in the response a pattern's text is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternLocation {
    Body,
    Title,
    Header,
    Cookie,
}

/// One recognized block signature. `text` is matched as a lowercased
/// substring for `Body`/`Title`/`Cookie`; for `Header` it is the header name
/// and only presence is checked.
#[derive(Debug, Clone, Copy)]
pub struct BlockPattern {
    pub service_tag: &'static str,
    pub location: PatternLocation,
    pub text: &'static str,
}

/// Whether `service_tag` should be classified as a CAPTCHA challenge rather
/// than a generic block.
pub fn is_captcha_tag(service_tag: &str) -> bool {
    matches!(service_tag, "recaptcha" | "hcaptcha" | "turnstile")
}

/// Whether `service_tag` indicates a rate-limit response rather than a
/// generic block.
pub fn is_rate_limit_tag(service_tag: &str) -> bool {
    service_tag == "rate-limit"
}

/// Default, ordered pattern set. Order is a tie-break: earlier entries are
/// more specific and win over later, more general ones.
pub fn default_patterns() -> &'static [BlockPattern] {
    const PATTERNS: &[BlockPattern] = &[
        BlockPattern {
            service_tag: "recaptcha",
            location: PatternLocation::Body,
            text: "recaptcha",
        },
        BlockPattern {
            service_tag: "hcaptcha",
            location: PatternLocation::Body,
            text: "hcaptcha",
        },
        BlockPattern {
            service_tag: "turnstile",
            location: PatternLocation::Body,
            text: "cf-turnstile",
        },
        BlockPattern {
            service_tag: "cloudflare",
            location: PatternLocation::Title,
            text: "attention required",
        },
        BlockPattern {
            service_tag: "cloudflare",
            location: PatternLocation::Body,
            text: "checking your browser before accessing",
        },
        BlockPattern {
            service_tag: "cloudflare",
            location: PatternLocation::Header,
            text: "cf-mitigated",
        },
        BlockPattern {
            service_tag: "cloudfront",
            location: PatternLocation::Header,
            text: "x-cache",
        },
        BlockPattern {
            service_tag: "perimeterx",
            location: PatternLocation::Cookie,
            text: "_px",
        },
        BlockPattern {
            service_tag: "perimeterx",
            location: PatternLocation::Body,
            text: "press & hold",
        },
        BlockPattern {
            service_tag: "datadome",
            location: PatternLocation::Cookie,
            text: "datadome",
        },
        BlockPattern {
            service_tag: "akamai",
            location: PatternLocation::Header,
            text: "akamai-bot-protection",
        },
        BlockPattern {
            service_tag: "imperva",
            location: PatternLocation::Cookie,
            text: "visid_incap",
        },
        BlockPattern {
            service_tag: "imperva",
            location: PatternLocation::Body,
            text: "incapsula incident id",
        },
        BlockPattern {
            service_tag: "rate-limit",
            location: PatternLocation::Body,
            text: "rate limit exceeded",
        },
        BlockPattern {
            service_tag: "rate-limit",
            location: PatternLocation::Title,
            text: "too many requests",
        },
    ];
    PATTERNS
}
