//! The configuration catalog: named browser tunable bundles the learner
//! treats as bandit arms.

use super::{Configuration, HeadlessKind, Store, StoreResult, WaitStrategy};

impl Store {
    /// Insert a configuration into the catalog if it does not already
    /// exist, leaving its counters untouched if it does.
    #[allow(clippy::too_many_arguments)]
    pub async fn ensure_configuration(
        &self,
        id: &str,
        name: &str,
        headless_kind: HeadlessKind,
        viewport_w: u32,
        viewport_h: u32,
        user_agent: &str,
        stealth: bool,
        wait_strategy: WaitStrategy,
        timeout_ms: u64,
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO configurations (id, name, headless_kind, viewport_w, viewport_h, \
             user_agent, stealth, wait_strategy, timeout_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(id)
        .bind(name)
        .bind(headless_kind.as_str())
        .bind(viewport_w)
        .bind(viewport_h)
        .bind(user_agent)
        .bind(stealth)
        .bind(wait_strategy.as_str())
        .bind(timeout_ms as i64)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn get_configuration(&self, id: &str) -> StoreResult<Option<Configuration>> {
        let row: Option<ConfigurationRow> = sqlx::query_as(
            "SELECT id, name, headless_kind, viewport_w, viewport_h, user_agent, stealth, \
             wait_strategy, timeout_ms, attempts, successes, last_success, last_failure \
             FROM configurations WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Into::into))
    }

    pub async fn list_configurations(&self) -> StoreResult<Vec<Configuration>> {
        let rows: Vec<ConfigurationRow> = sqlx::query_as(
            "SELECT id, name, headless_kind, viewport_w, viewport_h, user_agent, stealth, \
             wait_strategy, timeout_ms, attempts, successes, last_success, last_failure \
             FROM configurations",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(sqlx::FromRow)]
struct ConfigurationRow {
    id: String,
    name: String,
    headless_kind: String,
    viewport_w: i64,
    viewport_h: i64,
    user_agent: String,
    stealth: bool,
    wait_strategy: String,
    timeout_ms: i64,
    attempts: i64,
    successes: i64,
    last_success: Option<i64>,
    last_failure: Option<i64>,
}

impl From<ConfigurationRow> for Configuration {
    fn from(row: ConfigurationRow) -> Self {
        Configuration {
            id: row.id,
            name: row.name,
            headless_kind: HeadlessKind::parse(&row.headless_kind),
            viewport_w: row.viewport_w as u32,
            viewport_h: row.viewport_h as u32,
            user_agent: row.user_agent,
            stealth: row.stealth,
            wait_strategy: WaitStrategy::parse(&row.wait_strategy),
            timeout_ms: row.timeout_ms as u64,
            attempts: row.attempts as u64,
            successes: row.successes as u64,
            last_success: row.last_success,
            last_failure: row.last_failure,
        }
    }
}

/// The built-in starter catalog seeded on first run, spanning the axes the
/// bandit explores: headless mode, stealth, and wait strategy.
pub fn default_catalog() -> Vec<Configuration> {
    let base = |id: &str, name: &str, headless: HeadlessKind, stealth: bool, wait: WaitStrategy| {
        Configuration {
            id: id.to_string(),
            name: name.to_string(),
            headless_kind: headless,
            viewport_w: crate::utils::DEFAULT_VIEWPORT_WIDTH,
            viewport_h: crate::utils::DEFAULT_VIEWPORT_HEIGHT,
            user_agent: crate::utils::CHROME_USER_AGENT.to_string(),
            stealth,
            wait_strategy: wait,
            timeout_ms: 30_000,
            attempts: 0,
            successes: 0,
            last_success: None,
            last_failure: None,
        }
    };

    vec![
        base(
            "headless-plain",
            "Headless, no stealth, network-idle wait",
            HeadlessKind::NewHeadless,
            false,
            WaitStrategy::NetworkIdle,
        ),
        base(
            "headless-stealth",
            "Headless with stealth evasions, network-idle wait",
            HeadlessKind::NewHeadless,
            true,
            WaitStrategy::NetworkIdle,
        ),
        base(
            "headless-stealth-dom",
            "Headless with stealth evasions, DOMContentLoaded wait",
            HeadlessKind::NewHeadless,
            true,
            WaitStrategy::DomContentLoaded,
        ),
        base(
            "headless-shell",
            "Chrome headless-shell, no stealth",
            HeadlessKind::Shell,
            false,
            WaitStrategy::Load,
        ),
        base(
            "visible-stealth",
            "Visible window with stealth evasions",
            HeadlessKind::Visible,
            true,
            WaitStrategy::NetworkIdle,
        ),
    ]
}
