//! Service that scores stored quiz responses and persists the character result.

use std::collections::BTreeMap;

use chrono::Utc;
use db::models::{
    character_result::{CharacterResult, CharacterResultView, ProcessedResult},
    quiz_response::{QuizAnswers, QuizResponse},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    character_scorer::{self, ScoringError},
    question_catalogue::{self, CatalogueError},
};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("quiz response not found")]
    NotFound,
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
    #[error("malformed stored data: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Service for submitting quiz responses and classifying them
#[derive(Clone)]
pub struct CharacterProcessor {
    pool: SqlitePool,
}

impl CharacterProcessor {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Score the response and store its result.
    ///
    /// Reading the response, writing the result and flagging the response as
    /// processed happen in one transaction. Processing the same response again
    /// yields the same character and replaces the stored result.
    ///
    /// The transaction takes the write lock up front so concurrent calls queue
    /// on the busy timeout instead of failing a read-to-write upgrade.
    pub async fn process(
        &self,
        response_id: Uuid,
        user_id: &str,
    ) -> Result<ProcessedResult, ProcessError> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let Some(response) = QuizResponse::find_by_id(&mut *tx, response_id).await? else {
            warn!(response_id = %response_id, "Quiz response not found");
            return Err(ProcessError::NotFound);
        };

        let answers = response.parsed_answers()?;
        let classification = character_scorer::classify(&answers)?;

        let results = ProcessedResult {
            factor_scores: classification.scoreboard,
            character_type: classification.profile.name,
            description: classification.profile.description,
            timestamp: Utc::now(),
        };

        CharacterResult::upsert(&mut *tx, response_id, user_id, &results).await?;
        if QuizResponse::mark_processed(&mut *tx, response_id, results.timestamp).await? == 0 {
            return Err(ProcessError::NotFound);
        }
        tx.commit().await?;

        info!(
            response_id = %response_id,
            user_id = %user_id,
            code = %classification.code,
            answer_count = answers.len(),
            "Processed quiz response"
        );

        Ok(results)
    }

    /// Store a new response after checking every answer.
    pub async fn submit(
        &self,
        user_id: &str,
        answers: QuizAnswers,
    ) -> Result<QuizResponse, ProcessError> {
        character_scorer::validate_answers(&answers)?;

        let id = Uuid::new_v4();
        let response = QuizResponse::create(&self.pool, id, user_id, &answers).await?;

        info!(
            response_id = %id,
            user_id = %user_id,
            answer_count = answers.len(),
            "Stored quiz response"
        );
        Ok(response)
    }

    /// Store a response built from option keys picked in the catalogue.
    pub async fn submit_selections(
        &self,
        user_id: &str,
        selections: &BTreeMap<u32, Vec<String>>,
    ) -> Result<QuizResponse, ProcessError> {
        let answers = question_catalogue::build_answers(selections)?;
        debug!(user_id = %user_id, question_count = selections.len(), "Built answers from selections");
        self.submit(user_id, answers).await
    }

    pub async fn result(&self, response_id: Uuid) -> Result<CharacterResultView, ProcessError> {
        let result = CharacterResult::find_by_response_id(&self.pool, response_id)
            .await?
            .ok_or(ProcessError::NotFound)?;
        Ok(result.into_view()?)
    }

    pub async fn latest_result_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<CharacterResultView>, ProcessError> {
        CharacterResult::find_latest_by_user_id(&self.pool, user_id)
            .await?
            .map(|result| result.into_view().map_err(ProcessError::from))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use db::{
        DBService,
        models::{
            character_result::ResultStatus,
            factor::Factor,
            quiz_response::{QuizAnswer, ResponseStatus},
        },
    };

    use super::*;

    fn answer(factor: &str, pole: &str, value: i64) -> QuizAnswer {
        QuizAnswer {
            question: "q".to_string(),
            answer: "A".to_string(),
            factor: factor.to_string(),
            pole: pole.to_string(),
            value,
        }
    }

    fn reference_answers() -> QuizAnswers {
        QuizAnswers::from([
            ("0".to_string(), answer("A/H", "H", 2)),
            ("1".to_string(), answer("C/R", "C", 2)),
            ("2".to_string(), answer("O/S", "O", 2)),
        ])
    }

    async fn setup() -> (DBService, CharacterProcessor) {
        let db = DBService::in_memory().await.unwrap();
        let processor = CharacterProcessor::new(db.pool.clone());
        (db, processor)
    }

    #[tokio::test]
    async fn test_process_reference_response() {
        let (db, processor) = setup().await;
        let response = processor.submit("user-1", reference_answers()).await.unwrap();

        let results = processor.process(response.id, "user-1").await.unwrap();
        assert_eq!(results.character_type, "自由な賢者");
        assert_eq!(results.factor_scores.tally(Factor::AH, 'H'), 2);
        assert_eq!(results.factor_scores.tally(Factor::EI, 'I'), 0);

        let stored = QuizResponse::find_by_id(&db.pool, response.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ResponseStatus::Processed);

        let view = processor.result(response.id).await.unwrap();
        assert_eq!(view.user_id, "user-1");
        assert_eq!(view.status, ResultStatus::Completed);
        assert_eq!(view.results, results);
        assert_eq!(view.processed_at, results.timestamp);
    }

    #[tokio::test]
    async fn test_missing_response_writes_nothing() {
        let (db, processor) = setup().await;
        let missing = Uuid::new_v4();

        let err = processor.process(missing, "user-1").await.unwrap_err();
        assert!(matches!(err, ProcessError::NotFound));
        assert!(
            CharacterResult::find_by_response_id(&db.pool, missing)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_reprocessing_overwrites_with_same_character() {
        let (db, processor) = setup().await;
        let response = processor.submit("user-1", reference_answers()).await.unwrap();

        let first = processor.process(response.id, "user-1").await.unwrap();
        let second = processor.process(response.id, "user-1").await.unwrap();

        assert_eq!(first.character_type, second.character_type);
        assert_eq!(first.description, second.description);
        assert_eq!(first.factor_scores, second.factor_scores);

        let stored = CharacterResult::find_by_response_id(&db.pool, response.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.parsed_results().unwrap(), second);
    }

    #[tokio::test]
    async fn test_empty_answers_resolve_to_tie_break_character() {
        let (_db, processor) = setup().await;
        let response = processor.submit("user-1", QuizAnswers::new()).await.unwrap();

        let results = processor.process(response.id, "user-1").await.unwrap();
        assert_eq!(results.character_type, "自由な賢者");
        assert!(results.factor_scores.is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_answers() {
        let (db, processor) = setup().await;
        let mut answers = reference_answers();
        answers.insert("3".to_string(), answer("N/T", "O", 1));

        let err = processor.submit("user-1", answers).await.unwrap_err();
        assert!(matches!(err, ProcessError::Scoring(ScoringError::InvalidAnswer { .. })));
        assert!(
            QuizResponse::find_by_user_id(&db.pool, "user-1")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_invalid_stored_answers_roll_back() {
        let (db, processor) = setup().await;
        let id = Uuid::new_v4();
        let answers = QuizAnswers::from([("0".to_string(), answer("E/I", "E", -3))]);
        QuizResponse::create(&db.pool, id, "user-1", &answers)
            .await
            .unwrap();

        let err = processor.process(id, "user-1").await.unwrap_err();
        assert!(matches!(err, ProcessError::Scoring(_)));

        let stored = QuizResponse::find_by_id(&db.pool, id).await.unwrap().unwrap();
        assert_eq!(stored.status, ResponseStatus::Submitted);
        assert!(
            CharacterResult::find_by_response_id(&db.pool, id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_submit_selections_and_latest_result() {
        let (_db, processor) = setup().await;
        let selections = BTreeMap::from([
            (0, vec!["A".to_string()]),
            (2, vec!["A".to_string()]),
            (4, vec!["B".to_string()]),
            (6, vec!["B".to_string()]),
            (8, vec!["B".to_string()]),
        ]);

        let response = processor
            .submit_selections("user-2", &selections)
            .await
            .unwrap();
        processor.process(response.id, "user-2").await.unwrap();

        let latest = processor
            .latest_result_for_user("user-2")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.response_id, response.id);
        assert_eq!(latest.results.character_type, "几帳面な盛り上げ隊長");

        assert!(processor.latest_result_for_user("user-3").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_processing_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("quiz.sqlite").display());
        let db = DBService::new(&url).await.unwrap();
        let processor = CharacterProcessor::new(db.pool.clone());

        let shared = processor.submit("user-1", reference_answers()).await.unwrap().id;
        let mut ids = vec![shared; 16];
        for _ in 0..16 {
            ids.push(processor.submit("user-2", reference_answers()).await.unwrap().id);
        }

        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let processor = processor.clone();
                tokio::spawn(async move { processor.process(id, "user-1").await })
            })
            .collect();
        for handle in handles {
            let results = handle.await.unwrap().unwrap();
            assert_eq!(results.character_type, "自由な賢者");
        }

        let stored = QuizResponse::find_by_id(&db.pool, shared).await.unwrap().unwrap();
        assert_eq!(stored.status, ResponseStatus::Processed);
        db.pool.close().await;
    }

    #[tokio::test]
    async fn test_submit_rejects_oversized_values() {
        let (db, processor) = setup().await;
        let answers = QuizAnswers::from([
            ("0".to_string(), answer("E/I", "E", i64::MAX)),
            ("1".to_string(), answer("E/I", "E", i64::MAX)),
        ]);

        let err = processor.submit("user-1", answers).await.unwrap_err();
        assert!(matches!(err, ProcessError::Scoring(ScoringError::InvalidAnswer { .. })));
        assert!(
            QuizResponse::find_by_user_id(&db.pool, "user-1")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_result_not_found_before_processing() {
        let (_db, processor) = setup().await;
        let response = processor.submit("user-1", reference_answers()).await.unwrap();
        assert!(matches!(
            processor.result(response.id).await,
            Err(ProcessError::NotFound)
        ));
    }
}
