//! Domain similarity graph used to seed new domains from the configuration
//! that already worked well on their nearest neighbors, instead of starting
//! every new domain from an uninformed prior.

use super::{DomainSimilarity, SimilarityKind, Store, StoreResult};

impl Store {
    /// Record (or update) a similarity edge. Edges are undirected; callers
    /// may insert either ordering and queries check both.
    pub async fn upsert_similarity(
        &self,
        domain_a: &str,
        domain_b: &str,
        score: f64,
        kind: SimilarityKind,
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO similarity (domain_a, domain_b, score, kind) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(domain_a, domain_b) DO UPDATE SET score = excluded.score, \
             kind = excluded.kind",
        )
        .bind(domain_a)
        .bind(domain_b)
        .bind(score)
        .bind(kind.as_str())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// The `limit` domains most similar to `domain`, highest score first,
    /// restricted to neighbors that already have a learned best
    /// configuration. Returns each neighbor's similarity edge, its best
    /// configuration id, and its own learned confidence in that
    /// configuration.
    pub async fn similar_domains_with_config(
        &self,
        domain: &str,
        limit: i64,
    ) -> StoreResult<Vec<(DomainSimilarity, String, f64)>> {
        let rows: Vec<(String, String, f64, String, String, f64)> = sqlx::query_as(
            "SELECT s.domain_a, s.domain_b, s.score, s.kind, d.best_config_id, d.confidence \
             FROM similarity s \
             JOIN domains d ON d.domain = CASE WHEN s.domain_a = ?1 THEN s.domain_b ELSE s.domain_a END \
             WHERE (s.domain_a = ?1 OR s.domain_b = ?1) AND d.best_config_id IS NOT NULL \
             ORDER BY s.score DESC LIMIT ?2",
        )
        .bind(domain)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(a, b, score, kind, config_id, confidence)| {
                (
                    DomainSimilarity {
                        domain_a: a,
                        domain_b: b,
                        score,
                        kind: SimilarityKind::parse(&kind),
                    },
                    config_id,
                    confidence,
                )
            })
            .collect())
    }
}
