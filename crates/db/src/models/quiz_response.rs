use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Lifecycle of a submitted questionnaire
#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "response_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResponseStatus {
    #[default]
    Submitted,
    Processed,
}

/// One answer to one quiz question, stored as the client sent it.
///
/// `factor` and `pole` stay as strings here; they are checked against the
/// fixed axis table when the response is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct QuizAnswer {
    pub question: String,
    pub answer: String,
    pub factor: String,
    #[serde(rename = "type")]
    pub pole: String,
    #[ts(type = "number")]
    pub value: i64,
}

/// Answers keyed by question index.
pub type QuizAnswers = BTreeMap<String, QuizAnswer>;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct QuizResponse {
    pub id: Uuid,
    pub user_id: String,
    pub answers: String, // JSON-serialized QuizAnswers
    pub status: ResponseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl QuizResponse {
    /// Parse the answers column into a map
    pub fn parsed_answers(&self) -> Result<QuizAnswers, serde_json::Error> {
        serde_json::from_str(&self.answers)
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        user_id: &str,
        answers: &QuizAnswers,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, QuizResponse>(
            r#"
            INSERT INTO quiz_responses (id, user_id, answers)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, answers, status, created_at, updated_at, processed_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(Json(answers))
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, QuizResponse>(
            r#"
            SELECT id, user_id, answers, status, created_at, updated_at, processed_at
            FROM quiz_responses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, QuizResponse>(
            r#"
            SELECT id, user_id, answers, status, created_at, updated_at, processed_at
            FROM quiz_responses
            WHERE user_id = $1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Flag the response as processed. Returns the number of rows touched,
    /// zero when the response no longer exists.
    pub async fn mark_processed<'e, E>(
        executor: E,
        id: Uuid,
        processed_at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE quiz_responses
            SET status = $2,
                processed_at = $3,
                updated_at = datetime('now', 'subsec')
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(ResponseStatus::Processed)
        .bind(processed_at)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
