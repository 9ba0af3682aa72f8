//! DDL for the durable store.
//!
//! Schema creation runs inline on pool open, the same way
//! `link_index::LinkIndex::open` issues its `CREATE TABLE IF NOT EXISTS`
//! statements — this is schema definition, not a migration framework.

pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS configurations (
    id                     TEXT PRIMARY KEY,
    name                   TEXT NOT NULL,
    headless_kind          TEXT NOT NULL,
    viewport_w             INTEGER NOT NULL,
    viewport_h             INTEGER NOT NULL,
    user_agent             TEXT NOT NULL,
    stealth                INTEGER NOT NULL,
    wait_strategy          TEXT NOT NULL,
    timeout_ms             INTEGER NOT NULL,
    attempts               INTEGER NOT NULL DEFAULT 0,
    successes              INTEGER NOT NULL DEFAULT 0,
    last_success           INTEGER,
    last_failure           INTEGER
);

CREATE TABLE IF NOT EXISTS domains (
    domain                 TEXT PRIMARY KEY,
    best_config_id         TEXT,
    confidence             REAL NOT NULL DEFAULT 0.0,
    min_delay_ms           INTEGER NOT NULL DEFAULT 0,
    max_per_minute         INTEGER NOT NULL DEFAULT 60,
    first_seen             INTEGER NOT NULL,
    last_updated           INTEGER NOT NULL,
    sample_count           INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS outcomes (
    id                     TEXT PRIMARY KEY,
    ts                     INTEGER NOT NULL,
    domain                 TEXT NOT NULL,
    url                    TEXT NOT NULL,
    config_id              TEXT NOT NULL,
    result                 TEXT NOT NULL,
    block_service          TEXT,
    http_status            INTEGER,
    response_ms            INTEGER,
    content_length         INTEGER,
    page_title             TEXT,
    hour                   INTEGER NOT NULL,
    weekday                INTEGER NOT NULL,
    schema_version         INTEGER NOT NULL DEFAULT 1
);
CREATE INDEX IF NOT EXISTS idx_outcomes_domain ON outcomes(domain, ts DESC);
CREATE INDEX IF NOT EXISTS idx_outcomes_config ON outcomes(config_id);

CREATE TABLE IF NOT EXISTS similarity (
    domain_a               TEXT NOT NULL,
    domain_b               TEXT NOT NULL,
    score                  REAL NOT NULL,
    kind                   TEXT NOT NULL,
    PRIMARY KEY (domain_a, domain_b)
);

CREATE TABLE IF NOT EXISTS jobs (
    id                     TEXT PRIMARY KEY,
    queue                  TEXT NOT NULL,
    type                   TEXT NOT NULL,
    payload                TEXT NOT NULL,
    priority               INTEGER NOT NULL DEFAULT 0,
    status                 TEXT NOT NULL,
    attempts               INTEGER NOT NULL DEFAULT 0,
    max_attempts           INTEGER NOT NULL,
    last_error             TEXT,
    result                 TEXT,
    created_at             INTEGER NOT NULL,
    available_at           INTEGER NOT NULL,
    started_at             INTEGER,
    completed_at           INTEGER,
    locked_by              TEXT,
    locked_at              INTEGER,
    lease_deadline         INTEGER,
    depends_on             TEXT,
    schema_version         INTEGER NOT NULL DEFAULT 1
);
CREATE INDEX IF NOT EXISTS idx_jobs_claim ON jobs(status, priority DESC, available_at ASC);
CREATE INDEX IF NOT EXISTS idx_jobs_depends_on ON jobs(depends_on);

CREATE TABLE IF NOT EXISTS dead_letter (
    id                     TEXT PRIMARY KEY,
    job_id                 TEXT NOT NULL,
    queue                  TEXT NOT NULL,
    payload                TEXT NOT NULL,
    error                  TEXT NOT NULL,
    attempts               INTEGER NOT NULL,
    died_at                INTEGER NOT NULL,
    schema_version         INTEGER NOT NULL DEFAULT 1
);
";
