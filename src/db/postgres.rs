use std::collections::HashMap;

use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::{
    error::{AppError, AppResult},
    models::{Algorithm, AlgorithmStats, FeedbackEvent, IssuedRecommendation, Recommendation},
    services::FeedbackSink,
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Feedback sink backed by the `recommendations` table
#[derive(Debug, Clone)]
pub struct PgFeedbackSink {
    pool: PgPool,
}

impl PgFeedbackSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[async_trait::async_trait]
impl FeedbackSink for PgFeedbackSink {
    async fn record_issued(
        &self,
        customer_id: &str,
        recommendations: &[Recommendation],
    ) -> AppResult<Vec<IssuedRecommendation>> {
        let issued: Vec<IssuedRecommendation> = recommendations
            .iter()
            .cloned()
            .map(|rec| IssuedRecommendation::issue(customer_id, rec))
            .collect();

        let mut tx = self.pool.begin().await?;
        for rec in &issued {
            sqlx::query(
                r#"
                INSERT INTO recommendations
                    (id, customer_id, product_id, algorithm, source, score, explanation, issued_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(rec.recommendation_id)
            .bind(&rec.customer_id)
            .bind(&rec.recommendation.product_id.0)
            .bind(rec.recommendation.algorithm.as_str())
            .bind(rec.recommendation.source.as_str())
            .bind(rec.recommendation.score)
            .bind(&rec.recommendation.explanation)
            .bind(rec.issued_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(issued)
    }

    async fn record_feedback(&self, event: &FeedbackEvent) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE recommendations
            SET clicked = clicked OR $2,
                purchased = purchased OR $3
            WHERE id = $1
            "#,
        )
        .bind(event.recommendation_id)
        .bind(event.clicked)
        .bind(event.purchased)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "recommendation {}",
                event.recommendation_id
            )));
        }

        Ok(())
    }

    async fn algorithm_stats(&self) -> AppResult<Vec<AlgorithmStats>> {
        let rows = sqlx::query(
            r#"
            SELECT algorithm,
                   COUNT(*) AS usage_count,
                   COUNT(*) FILTER (WHERE clicked) AS click_count,
                   COUNT(*) FILTER (WHERE purchased) AS purchase_count
            FROM recommendations
            GROUP BY algorithm
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = HashMap::new();
        for row in rows {
            let tag: String = row.try_get("algorithm")?;
            let Ok(algorithm) = tag.parse::<Algorithm>() else {
                tracing::warn!(algorithm = %tag, "Skipping stats for unknown algorithm");
                continue;
            };

            counts.insert(
                algorithm,
                (
                    count(row.try_get("usage_count")?),
                    count(row.try_get("click_count")?),
                    count(row.try_get("purchase_count")?),
                ),
            );
        }

        Ok(AlgorithmStats::zero_filled(&counts))
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
