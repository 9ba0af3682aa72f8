//! Record types persisted by the outcome store and job queue.

use serde::{Deserialize, Serialize};

/// Current payload schema version for every record type in this module.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadlessKind {
    Shell,
    NewHeadless,
    LegacyHeadless,
    Visible,
}

impl HeadlessKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HeadlessKind::Shell => "shell",
            HeadlessKind::NewHeadless => "new-headless",
            HeadlessKind::LegacyHeadless => "legacy-headless",
            HeadlessKind::Visible => "visible",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "shell" => HeadlessKind::Shell,
            "legacy-headless" => HeadlessKind::LegacyHeadless,
            "visible" => HeadlessKind::Visible,
            _ => HeadlessKind::NewHeadless,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitStrategy {
    NetworkIdle,
    DomContentLoaded,
    Load,
}

impl WaitStrategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WaitStrategy::NetworkIdle => "networkidle",
            WaitStrategy::DomContentLoaded => "domcontentloaded",
            WaitStrategy::Load => "load",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "domcontentloaded" => WaitStrategy::DomContentLoaded,
            "load" => WaitStrategy::Load,
            _ => WaitStrategy::NetworkIdle,
        }
    }
}

/// A named bundle of browser tunables considered by the bandit as an arm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub id: String,
    pub name: String,
    pub headless_kind: HeadlessKind,
    pub viewport_w: u32,
    pub viewport_h: u32,
    pub user_agent: String,
    pub stealth: bool,
    pub wait_strategy: WaitStrategy,
    pub timeout_ms: u64,
    pub attempts: u64,
    pub successes: u64,
    pub last_success: Option<i64>,
    pub last_failure: Option<i64>,
}

impl Configuration {
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempts as f64
        }
    }
}

/// Per-domain aggregate learned from outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainRecord {
    pub domain: String,
    pub best_config_id: Option<String>,
    pub confidence: f64,
    pub min_delay_ms: u64,
    pub max_per_minute: u32,
    pub first_seen: i64,
    pub last_updated: i64,
    pub sample_count: u64,
}

/// Typed classification of a completed page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeResult {
    Ok,
    Blocked,
    Captcha,
    Timeout,
    RateLimited,
    Empty,
    Error,
}

impl OutcomeResult {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeResult::Ok => "ok",
            OutcomeResult::Blocked => "blocked",
            OutcomeResult::Captcha => "captcha",
            OutcomeResult::Timeout => "timeout",
            OutcomeResult::RateLimited => "rate_limited",
            OutcomeResult::Empty => "empty",
            OutcomeResult::Error => "error",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "ok" => OutcomeResult::Ok,
            "captcha" => OutcomeResult::Captcha,
            "timeout" => OutcomeResult::Timeout,
            "rate_limited" => OutcomeResult::RateLimited,
            "empty" => OutcomeResult::Empty,
            "blocked" => OutcomeResult::Blocked,
            _ => OutcomeResult::Error,
        }
    }

    /// Whether this result counts as a bandit success for its arm.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, OutcomeResult::Ok)
    }
}

/// One recorded attempt for a domain/configuration pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub id: String,
    pub ts: i64,
    pub domain: String,
    pub url: String,
    pub config_id: String,
    pub result: OutcomeResult,
    pub block_service: Option<String>,
    pub http_status: Option<u16>,
    pub response_ms: Option<u64>,
    pub content_length: Option<u64>,
    pub page_title: Option<String>,
    pub hour: u8,
    pub weekday: u8,
    pub schema_version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimilarityKind {
    Tld,
    Technology,
    Behavior,
}

impl SimilarityKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SimilarityKind::Tld => "tld",
            SimilarityKind::Technology => "technology",
            SimilarityKind::Behavior => "behavior",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "technology" => SimilarityKind::Technology,
            "behavior" => SimilarityKind::Behavior,
            _ => SimilarityKind::Tld,
        }
    }
}

/// A weighted similarity edge between two domains, used only for cold start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSimilarity {
    pub domain_a: String,
    pub domain_b: String,
    pub score: f64,
    pub kind: SimilarityKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
    Dead,
}

impl JobStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
            JobStatus::Dead => "dead",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "running" => JobStatus::Running,
            "done" => JobStatus::Done,
            "failed" => JobStatus::Failed,
            "dead" => JobStatus::Dead,
            _ => JobStatus::Pending,
        }
    }
}

/// A durable unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub queue: String,
    pub job_type: String,
    pub payload: serde_json::Value,
    pub priority: i64,
    pub status: JobStatus,
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_error: Option<String>,
    pub result: Option<serde_json::Value>,
    pub created_at: i64,
    pub available_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub locked_by: Option<String>,
    pub locked_at: Option<i64>,
    pub lease_deadline: Option<i64>,
    pub depends_on: Option<String>,
    pub schema_version: u32,
}

/// Snapshot of a job whose attempts were exhausted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetterRecord {
    pub id: String,
    pub job_id: String,
    pub queue: String,
    pub payload: serde_json::Value,
    pub error: String,
    pub attempts: u32,
    pub died_at: i64,
    pub schema_version: u32,
}
