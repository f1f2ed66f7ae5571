use chrono::{DateTime, Utc};
use quiz_core::model::{Question, QuestionContent, QuestionId, SubjectId, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_question_row, options_to_json, question_id_from_i64};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn insert_questions(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        questions: &[QuestionContent],
        created_at: DateTime<Utc>,
    ) -> Result<Vec<QuestionId>, StorageError> {
        let subject_id = id_to_i64("subject_id", subject_id.value())?;
        let owner = owner.to_string();
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let exists = sqlx::query("SELECT 1 FROM subjects WHERE id = ?1 AND owner = ?2")
            .bind(subject_id)
            .bind(&owner)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        let mut ids = Vec::with_capacity(questions.len());
        for content in questions {
            let res = sqlx::query(
                r"
                INSERT INTO questions (
                    subject_id, question_text, options, correct_answer,
                    explanation, owner, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
            )
            .bind(subject_id)
            .bind(content.question_text())
            .bind(options_to_json(content.options())?)
            .bind(content.correct_answer())
            .bind(content.explanation())
            .bind(&owner)
            .bind(created_at)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
            ids.push(question_id_from_i64(res.last_insert_rowid())?);
        }

        tx.commit().await.map_err(conn)?;
        tracing::debug!(count = ids.len(), subject_id, "inserted question batch");
        Ok(ids)
    }

    async fn questions_for_subject(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, subject_id, question_text, options, correct_answer,
                   explanation, owner, created_at
            FROM questions
            WHERE subject_id = ?1 AND owner = ?2
            ORDER BY id ASC
            ",
        )
        .bind(id_to_i64("subject_id", subject_id.value())?)
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }
}
