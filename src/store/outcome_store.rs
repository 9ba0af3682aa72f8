//! Outcome recording and arm-statistics queries.
//!
//! The append-plus-aggregate-update in `record` follows the transactional
//! upsert pattern in `link_index::LinkIndex::register_page`: one
//! `sqlx` transaction covers the outcome insert, the configuration counter
//! update, and the domain record upsert, so a reader never observes a
//! partial write.

use std::collections::HashMap;

use chrono::{Datelike, Timelike, Utc};

use super::{now_ts, DomainRecord, Outcome, OutcomeResult, Store, StoreResult};

/// Weighted arm statistics as consumed by the bandit's Beta posterior.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArmStats {
    pub weighted_successes: f64,
    pub weighted_failures: f64,
    pub last_success: Option<i64>,
    pub total_observations: f64,
}

impl Store {
    /// Append an outcome and update the configuration's and domain's
    /// aggregate counters in one transaction.
    pub async fn record_outcome(&self, outcome: &Outcome) -> StoreResult<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            "INSERT INTO outcomes (id, ts, domain, url, config_id, result, block_service, \
             http_status, response_ms, content_length, page_title, hour, weekday, schema_version) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .bind(&outcome.id)
        .bind(outcome.ts)
        .bind(&outcome.domain)
        .bind(&outcome.url)
        .bind(&outcome.config_id)
        .bind(outcome.result.as_str())
        .bind(&outcome.block_service)
        .bind(outcome.http_status.map(i64::from))
        .bind(outcome.response_ms.map(|v| v as i64))
        .bind(outcome.content_length.map(|v| v as i64))
        .bind(&outcome.page_title)
        .bind(i64::from(outcome.hour))
        .bind(i64::from(outcome.weekday))
        .bind(i64::from(outcome.schema_version))
        .execute(&mut *tx)
        .await?;

        let succeeded = i64::from(outcome.result.is_success());
        sqlx::query(
            "UPDATE configurations SET attempts = attempts + 1, \
             successes = successes + ?1, \
             last_success = CASE WHEN ?1 = 1 THEN ?2 ELSE last_success END, \
             last_failure = CASE WHEN ?1 = 0 THEN ?2 ELSE last_failure END \
             WHERE id = ?3",
        )
        .bind(succeeded)
        .bind(outcome.ts)
        .bind(&outcome.config_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO domains (domain, best_config_id, confidence, min_delay_ms, \
             max_per_minute, first_seen, last_updated, sample_count) \
             VALUES (?1, NULL, 0.0, 0, 60, ?2, ?2, 1) \
             ON CONFLICT(domain) DO UPDATE SET \
             last_updated = excluded.last_updated, \
             sample_count = domains.sample_count + 1",
        )
        .bind(&outcome.domain)
        .bind(outcome.ts)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Weighted per-arm success/failure counts for a domain, with exponential
    /// time-decay applied so recent outcomes dominate stale ones.
    pub async fn arm_stats(
        &self,
        domain: &str,
        half_life_days: f64,
    ) -> StoreResult<HashMap<String, ArmStats>> {
        let rows: Vec<(String, String, i64)> =
            sqlx::query_as("SELECT config_id, result, ts FROM outcomes WHERE domain = ?1")
                .bind(domain)
                .fetch_all(self.pool())
                .await?;

        let now = now_ts();
        let mut stats: HashMap<String, ArmStats> = HashMap::new();

        for (config_id, result, ts) in rows {
            let age_days = ((now - ts).max(0) as f64) / 86_400.0;
            let weight = (-std::f64::consts::LN_2 * age_days / half_life_days.max(1e-6)).exp();
            let entry = stats.entry(config_id).or_default();
            let result = OutcomeResult::parse(&result);
            if result.is_success() {
                entry.weighted_successes += weight;
                entry.last_success = Some(entry.last_success.map_or(ts, |l| l.max(ts)));
            } else {
                entry.weighted_failures += weight;
            }
            entry.total_observations += weight;
        }

        Ok(stats)
    }

    /// Most recent `limit` outcomes for a domain, newest first.
    pub async fn recent_outcomes(&self, domain: &str, limit: i64) -> StoreResult<Vec<Outcome>> {
        let rows: Vec<OutcomeRow> = sqlx::query_as(
            "SELECT id, ts, domain, url, config_id, result, block_service, http_status, \
             response_ms, content_length, page_title, hour, weekday, schema_version \
             FROM outcomes WHERE domain = ?1 ORDER BY ts DESC LIMIT ?2",
        )
        .bind(domain)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Success rate computed over every outcome for `domain` older than the
    /// most recent `recent_window` outcomes.
    pub async fn historical_success_rate(
        &self,
        domain: &str,
        recent_window: i64,
    ) -> StoreResult<Option<f64>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT result FROM outcomes WHERE domain = ?1 ORDER BY ts DESC \
             LIMIT -1 OFFSET ?2",
        )
        .bind(domain)
        .bind(recent_window)
        .fetch_all(self.pool())
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }
        let successes = rows
            .iter()
            .filter(|(r,)| OutcomeResult::parse(r).is_success())
            .count();
        Ok(Some(successes as f64 / rows.len() as f64))
    }

    /// Block attributions observed historically (outside the recent window)
    /// for a domain, used by drift detection's new-block-service signal.
    pub async fn historical_block_services(
        &self,
        domain: &str,
        recent_window: i64,
    ) -> StoreResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT block_service FROM outcomes WHERE domain = ?1 \
             AND block_service IS NOT NULL \
             AND ts NOT IN (SELECT ts FROM outcomes WHERE domain = ?1 ORDER BY ts DESC LIMIT ?2)",
        )
        .bind(domain)
        .bind(recent_window)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    /// Update a domain's learned best configuration and confidence after a
    /// new arm dominates the previous best.
    pub async fn update_domain_best(
        &self,
        domain: &str,
        config_id: &str,
        confidence: f64,
    ) -> StoreResult<()> {
        sqlx::query(
            "UPDATE domains SET best_config_id = ?1, confidence = ?2, last_updated = ?3 \
             WHERE domain = ?4",
        )
        .bind(config_id)
        .bind(confidence)
        .bind(now_ts())
        .bind(domain)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Fetch a domain's learned record, if any outcome has ever been recorded
    /// for it.
    pub async fn domain_record(&self, domain: &str) -> StoreResult<Option<DomainRecord>> {
        let row: Option<DomainRow> = sqlx::query_as(
            "SELECT domain, best_config_id, confidence, min_delay_ms, max_per_minute, \
             first_seen, last_updated, sample_count FROM domains WHERE domain = ?1",
        )
        .bind(domain)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Into::into))
    }

    /// Globally-best default configuration by overall success rate, used
    /// for cold start when a domain has no similar neighbors.
    pub async fn global_best_configuration(&self) -> StoreResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM configurations WHERE attempts > 0 \
             ORDER BY (CAST(successes AS REAL) / attempts) DESC LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(|(id,)| id))
    }
}

#[derive(sqlx::FromRow)]
struct OutcomeRow {
    id: String,
    ts: i64,
    domain: String,
    url: String,
    config_id: String,
    result: String,
    block_service: Option<String>,
    http_status: Option<i64>,
    response_ms: Option<i64>,
    content_length: Option<i64>,
    page_title: Option<String>,
    hour: i64,
    weekday: i64,
    schema_version: i64,
}

impl From<OutcomeRow> for Outcome {
    fn from(row: OutcomeRow) -> Self {
        Outcome {
            id: row.id,
            ts: row.ts,
            domain: row.domain,
            url: row.url,
            config_id: row.config_id,
            result: OutcomeResult::parse(&row.result),
            block_service: row.block_service,
            http_status: row.http_status.map(|v| v as u16),
            response_ms: row.response_ms.map(|v| v as u64),
            content_length: row.content_length.map(|v| v as u64),
            page_title: row.page_title,
            hour: row.hour as u8,
            weekday: row.weekday as u8,
            schema_version: row.schema_version as u32,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DomainRow {
    domain: String,
    best_config_id: Option<String>,
    confidence: f64,
    min_delay_ms: i64,
    max_per_minute: i64,
    first_seen: i64,
    last_updated: i64,
    sample_count: i64,
}

impl From<DomainRow> for DomainRecord {
    fn from(row: DomainRow) -> Self {
        DomainRecord {
            domain: row.domain,
            best_config_id: row.best_config_id,
            confidence: row.confidence,
            min_delay_ms: row.min_delay_ms as u64,
            max_per_minute: row.max_per_minute as u32,
            first_seen: row.first_seen,
            last_updated: row.last_updated,
            sample_count: row.sample_count as u64,
        }
    }
}

/// Build an `Outcome` stamped with the current time's hour/weekday fields,
/// as the capture pipeline does when reporting a finished attempt.
pub fn outcome_now(
    id: String,
    domain: String,
    url: String,
    config_id: String,
    result: OutcomeResult,
    block_service: Option<String>,
    http_status: Option<u16>,
    response_ms: Option<u64>,
    content_length: Option<u64>,
    page_title: Option<String>,
) -> Outcome {
    let now = Utc::now();
    Outcome {
        id,
        ts: now.timestamp(),
        domain,
        url,
        config_id,
        result,
        block_service,
        http_status,
        response_ms,
        content_length,
        page_title,
        hour: now.hour() as u8,
        weekday: now.weekday().num_days_from_monday() as u8,
        schema_version: super::SCHEMA_VERSION,
    }
}
