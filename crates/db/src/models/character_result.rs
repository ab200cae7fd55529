use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::factor::FactorScoreboard;

#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "result_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResultStatus {
    #[default]
    Completed,
}

/// Scored outcome of one quiz response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedResult {
    #[ts(type = "Record<string, Record<string, number>>")]
    pub factor_scores: FactorScoreboard,
    pub character_type: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Stored result row, keyed by the originating response id
#[derive(Debug, Clone, FromRow)]
pub struct CharacterResult {
    pub response_id: Uuid,
    pub user_id: String,
    pub results: String, // JSON-serialized ProcessedResult
    pub status: ResultStatus,
    pub processed_at: DateTime<Utc>,
}

/// Result as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CharacterResultView {
    pub response_id: Uuid,
    pub user_id: String,
    pub results: ProcessedResult,
    pub status: ResultStatus,
    pub processed_at: DateTime<Utc>,
}

impl CharacterResult {
    pub fn parsed_results(&self) -> Result<ProcessedResult, serde_json::Error> {
        serde_json::from_str(&self.results)
    }

    pub fn into_view(self) -> Result<CharacterResultView, serde_json::Error> {
        let results = self.parsed_results()?;
        Ok(CharacterResultView {
            response_id: self.response_id,
            user_id: self.user_id,
            results,
            status: self.status,
            processed_at: self.processed_at,
        })
    }

    /// Insert or overwrite the result for `response_id`; the last write wins.
    pub async fn upsert<'e, E>(
        executor: E,
        response_id: Uuid,
        user_id: &str,
        results: &ProcessedResult,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, CharacterResult>(
            r#"
            INSERT INTO character_results (response_id, user_id, results, status, processed_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT(response_id) DO UPDATE SET
                user_id = excluded.user_id,
                results = excluded.results,
                status = excluded.status,
                processed_at = excluded.processed_at
            RETURNING response_id, user_id, results, status, processed_at
            "#,
        )
        .bind(response_id)
        .bind(user_id)
        .bind(Json(results))
        .bind(ResultStatus::Completed)
        .bind(results.timestamp)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_response_id(
        pool: &SqlitePool,
        response_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CharacterResult>(
            r#"
            SELECT response_id, user_id, results, status, processed_at
            FROM character_results
            WHERE response_id = $1
            "#,
        )
        .bind(response_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_latest_by_user_id(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CharacterResult>(
            r#"
            SELECT response_id, user_id, results, status, processed_at
            FROM character_results
            WHERE user_id = $1
            ORDER BY processed_at DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
