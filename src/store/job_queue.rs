//! Durable priority job queue: lease-based claims, exponential-backoff
//! retries, dependency gating, and a dead-letter sink.
//!
//! The backoff math (`base * 2^(attempts-1)`, capped) mirrors
//! `search::errors::RetryConfig::delay_for_attempt`. Claiming uses a
//! conditional `UPDATE ... WHERE status = 'pending'` so two workers racing
//! on the same row never both win the lease, the same row-level compare-and-
//! swap idiom SQLite transactions give `link_index::LinkIndex`'s upserts.
//!
//! `fail` and `fail_after` share one dead-letter-or-reschedule path and
//! differ only in how the retry delay is computed: `fail` derives it from
//! the generic backoff schedule, `fail_after` takes it from the caller (the
//! worker, for policy-block failures, uses the domain's learned rate
//! discipline instead).

use uuid::Uuid;

use super::{now_ts, DeadLetterRecord, Job, JobStatus, Store, StoreError, StoreResult};

impl Store {
    /// Enqueue a new job. `depends_on`, when set, must name another job's id;
    /// the queue will not surface this job to `claim` until that job is done.
    #[allow(clippy::too_many_arguments)]
    pub async fn enqueue(
        &self,
        queue: &str,
        job_type: &str,
        payload: serde_json::Value,
        priority: i64,
        max_attempts: u32,
        depends_on: Option<&str>,
    ) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = now_ts();
        let payload_text = serde_json::to_string(&payload)?;

        sqlx::query(
            "INSERT INTO jobs (id, queue, type, payload, priority, status, attempts, \
             max_attempts, created_at, available_at, depends_on, schema_version) \
             VALUES (?1, ?2, ?3, ?4, ?5, 'pending', 0, ?6, ?7, ?7, ?8, ?9)",
        )
        .bind(&id)
        .bind(queue)
        .bind(job_type)
        .bind(&payload_text)
        .bind(priority)
        .bind(i64::from(max_attempts))
        .bind(now)
        .bind(depends_on)
        .bind(i64::from(super::SCHEMA_VERSION))
        .execute(self.pool())
        .await?;

        Ok(id)
    }

    /// Atomically claim the highest-priority, earliest-available, dependency-
    /// satisfied pending job in `queue` and lease it to `worker_id` for
    /// `lease_seconds`. Returns `None` if nothing is claimable.
    pub async fn claim(
        &self,
        queue: &str,
        worker_id: &str,
        lease_seconds: i64,
    ) -> StoreResult<Option<Job>> {
        let now = now_ts();

        let candidate: Option<(String,)> = sqlx::query_as(
            "SELECT j.id FROM jobs j WHERE j.queue = ?1 AND j.status = 'pending' \
             AND j.available_at <= ?2 \
             AND (j.depends_on IS NULL OR EXISTS ( \
                 SELECT 1 FROM jobs d WHERE d.id = j.depends_on AND d.status = 'done')) \
             ORDER BY j.priority DESC, j.available_at ASC LIMIT 1",
        )
        .bind(queue)
        .bind(now)
        .fetch_optional(self.pool())
        .await?;

        let Some((id,)) = candidate else {
            return Ok(None);
        };

        let lease_deadline = now + lease_seconds;
        let result = sqlx::query(
            "UPDATE jobs SET status = 'running', attempts = attempts + 1, \
             started_at = ?1, locked_by = ?2, locked_at = ?1, lease_deadline = ?3 \
             WHERE id = ?4 AND status = 'pending'",
        )
        .bind(now)
        .bind(worker_id)
        .bind(lease_deadline)
        .bind(&id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            // Lost the race to another worker between the select and the
            // conditional update; the caller should simply poll again.
            return Ok(None);
        }

        self.get_job(&id).await
    }

    /// Extend a running job's lease. Fails silently (no rows touched) if the
    /// job is no longer owned by `worker_id`.
    pub async fn heartbeat(
        &self,
        job_id: &str,
        worker_id: &str,
        lease_seconds: i64,
    ) -> StoreResult<()> {
        let now = now_ts();
        let result = sqlx::query(
            "UPDATE jobs SET lease_deadline = ?1 \
             WHERE id = ?2 AND locked_by = ?3 AND status = 'running'",
        )
        .bind(now + lease_seconds)
        .bind(job_id)
        .bind(worker_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OwnershipMismatch {
                job_id: job_id.to_string(),
                worker_id: worker_id.to_string(),
            });
        }
        Ok(())
    }

    /// Mark a job done with its result payload.
    pub async fn succeed(
        &self,
        job_id: &str,
        worker_id: &str,
        result: serde_json::Value,
    ) -> StoreResult<()> {
        let now = now_ts();
        let result_text = serde_json::to_string(&result)?;
        let affected = sqlx::query(
            "UPDATE jobs SET status = 'done', result = ?1, completed_at = ?2 \
             WHERE id = ?3 AND locked_by = ?4",
        )
        .bind(result_text)
        .bind(now)
        .bind(job_id)
        .bind(worker_id)
        .execute(self.pool())
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(StoreError::OwnershipMismatch {
                job_id: job_id.to_string(),
                worker_id: worker_id.to_string(),
            });
        }
        Ok(())
    }

    /// Report a failed attempt. If attempts remain, reschedule with
    /// exponential backoff; otherwise move the job to the dead letter table.
    pub async fn fail(
        &self,
        job_id: &str,
        worker_id: &str,
        error: &str,
        retry_base_seconds: i64,
        retry_cap_seconds: i64,
    ) -> StoreResult<()> {
        let job = self.lock_for_failure(job_id, worker_id).await?;
        let delay = retry_delay(job.attempts, retry_base_seconds, retry_cap_seconds);
        self.reschedule_or_dead_letter(job, error, delay).await
    }

    /// Report a failed attempt using an explicit retry delay instead of the
    /// generic exponential backoff schedule. Used for policy-block failures
    /// (rate limits, captchas, outright blocks), where the domain's own rate
    /// discipline already knows a safer wait than a blind backoff would.
    pub async fn fail_after(
        &self,
        job_id: &str,
        worker_id: &str,
        error: &str,
        delay_seconds: i64,
    ) -> StoreResult<()> {
        let job = self.lock_for_failure(job_id, worker_id).await?;
        self.reschedule_or_dead_letter(job, error, delay_seconds).await
    }

    async fn lock_for_failure(&self, job_id: &str, worker_id: &str) -> StoreResult<Job> {
        let job = self
            .get_job(job_id)
            .await?
            .ok_or_else(|| StoreError::JobNotFound(job_id.to_string()))?;

        if job.locked_by.as_deref() != Some(worker_id) {
            return Err(StoreError::OwnershipMismatch {
                job_id: job_id.to_string(),
                worker_id: worker_id.to_string(),
            });
        }
        Ok(job)
    }

    async fn reschedule_or_dead_letter(&self, job: Job, error: &str, delay: i64) -> StoreResult<()> {
        if job.attempts >= job.max_attempts {
            self.dead_letter(&job, error).await?;
            return Ok(());
        }

        let now = now_ts();
        sqlx::query(
            "UPDATE jobs SET status = 'pending', last_error = ?1, available_at = ?2, \
             locked_by = NULL, locked_at = NULL, lease_deadline = NULL \
             WHERE id = ?3",
        )
        .bind(error)
        .bind(now + delay.max(0))
        .bind(&job.id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Reclaim jobs whose lease has expired without a heartbeat, returning
    /// them to `pending` so another worker can claim them. Counts as an
    /// attempt in its own right, same as an explicit `fail`, so a worker
    /// that silently dies mid-lease still drives the job toward
    /// `max_attempts` instead of leasing forever without progress.
    pub async fn recover_stale(&self) -> StoreResult<u64> {
        let now = now_ts();
        let result = sqlx::query(
            "UPDATE jobs SET status = 'pending', attempts = attempts + 1, \
             locked_by = NULL, locked_at = NULL, lease_deadline = NULL \
             WHERE status = 'running' AND lease_deadline IS NOT NULL AND lease_deadline < ?1",
        )
        .bind(now)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    /// Move a dead-lettered job back into the live queue with attempts reset.
    pub async fn retry_dead_letter(&self, dead_letter_id: &str) -> StoreResult<()> {
        let record: Option<DeadLetterRow> = sqlx::query_as(
            "SELECT id, job_id, queue, payload, error, attempts, died_at, schema_version \
             FROM dead_letter WHERE id = ?1",
        )
        .bind(dead_letter_id)
        .fetch_optional(self.pool())
        .await?;

        let record = record.ok_or_else(|| StoreError::JobNotFound(dead_letter_id.to_string()))?;
        let now = now_ts();

        let mut tx = self.pool().begin().await?;
        sqlx::query(
            "UPDATE jobs SET status = 'pending', attempts = 0, last_error = NULL, \
             available_at = ?1, locked_by = NULL, locked_at = NULL, lease_deadline = NULL \
             WHERE id = ?2",
        )
        .bind(now)
        .bind(&record.job_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM dead_letter WHERE id = ?1")
            .bind(dead_letter_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// List dead-lettered jobs for a queue, most recent first.
    pub async fn list_dead_letter(&self, queue: &str) -> StoreResult<Vec<DeadLetterRecord>> {
        let rows: Vec<DeadLetterRow> = sqlx::query_as(
            "SELECT id, job_id, queue, payload, error, attempts, died_at, schema_version \
             FROM dead_letter WHERE queue = ?1 ORDER BY died_at DESC",
        )
        .bind(queue)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn dead_letter(&self, job: &Job, error: &str) -> StoreResult<()> {
        let now = now_ts();
        let payload_text = serde_json::to_string(&job.payload)?;
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            "UPDATE jobs SET status = 'dead', last_error = ?1, completed_at = ?2 \
             WHERE id = ?3",
        )
        .bind(error)
        .bind(now)
        .bind(&job.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO dead_letter (id, job_id, queue, payload, error, attempts, died_at, \
             schema_version) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&job.id)
        .bind(&job.queue)
        .bind(payload_text)
        .bind(error)
        .bind(i64::from(job.attempts))
        .bind(now)
        .bind(i64::from(job.schema_version))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_job(&self, id: &str) -> StoreResult<Option<Job>> {
        let row: Option<JobRow> = sqlx::query_as(
            "SELECT id, queue, type, payload, priority, status, attempts, max_attempts, \
             last_error, result, created_at, available_at, started_at, completed_at, \
             locked_by, locked_at, lease_deadline, depends_on, schema_version \
             FROM jobs WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}

/// `base * 2^(attempts - 1)`, capped at `cap`. `attempts` is the number of
/// attempts already made (1-indexed), so the first retry waits `base`
/// seconds and the delay doubles on each subsequent failure.
fn retry_delay(attempts: u32, base: i64, cap: i64) -> i64 {
    let shift = attempts.saturating_sub(1).min(32);
    let factor = 1_i64.checked_shl(shift).unwrap_or(i64::MAX);
    base.saturating_mul(factor).min(cap)
}

#[derive(sqlx::FromRow)]
struct JobRow {
    id: String,
    queue: String,
    r#type: String,
    payload: String,
    priority: i64,
    status: String,
    attempts: i64,
    max_attempts: i64,
    last_error: Option<String>,
    result: Option<String>,
    created_at: i64,
    available_at: i64,
    started_at: Option<i64>,
    completed_at: Option<i64>,
    locked_by: Option<String>,
    locked_at: Option<i64>,
    lease_deadline: Option<i64>,
    depends_on: Option<String>,
    schema_version: i64,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: row.id,
            queue: row.queue,
            job_type: row.r#type,
            payload: serde_json::from_str(&row.payload)?,
            priority: row.priority,
            status: JobStatus::parse(&row.status),
            attempts: row.attempts as u32,
            max_attempts: row.max_attempts as u32,
            last_error: row.last_error,
            result: row.result.map(|r| serde_json::from_str(&r)).transpose()?,
            created_at: row.created_at,
            available_at: row.available_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
            locked_by: row.locked_by,
            locked_at: row.locked_at,
            lease_deadline: row.lease_deadline,
            depends_on: row.depends_on,
            schema_version: row.schema_version as u32,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DeadLetterRow {
    id: String,
    job_id: String,
    queue: String,
    payload: String,
    error: String,
    attempts: i64,
    died_at: i64,
    schema_version: i64,
}

impl TryFrom<DeadLetterRow> for DeadLetterRecord {
    type Error = StoreError;

    fn try_from(row: DeadLetterRow) -> Result<Self, Self::Error> {
        Ok(DeadLetterRecord {
            id: row.id,
            job_id: row.job_id,
            queue: row.queue,
            payload: serde_json::from_str(&row.payload)?,
            error: row.error,
            attempts: row.attempts as u32,
            died_at: row.died_at,
            schema_version: row.schema_version as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::retry_delay;

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(retry_delay(1, 30, 3600), 30);
        assert_eq!(retry_delay(2, 30, 3600), 60);
        assert_eq!(retry_delay(3, 30, 3600), 120);
        assert_eq!(retry_delay(20, 30, 3600), 3600);
    }
}
