use quiz_core::model::{AnswerRecord, SubjectId, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_answer_row};
use crate::repository::{AnswerRepository, StorageError};

#[async_trait::async_trait]
impl AnswerRepository for SqliteRepository {
    async fn append_answer(&self, answer: &AnswerRecord) -> Result<i64, StorageError> {
        let question_id = id_to_i64("question_id", answer.question_id.value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let exists = sqlx::query("SELECT 1 FROM questions WHERE id = ?1")
            .bind(question_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        let res = sqlx::query(
            r"
            INSERT INTO user_answers (
                question_id, selected_answer, is_correct, owner, answered_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(question_id)
        .bind(&answer.selected_answer)
        .bind(i64::from(answer.is_correct))
        .bind(answer.owner.to_string())
        .bind(answer.answered_at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(res.last_insert_rowid())
    }

    async fn answers_for_subject(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> Result<Vec<AnswerRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT a.question_id, a.selected_answer, a.is_correct, a.owner, a.answered_at
            FROM user_answers a
            JOIN questions q ON q.id = a.question_id
            WHERE q.subject_id = ?1 AND a.owner = ?2
            ORDER BY a.id ASC
            ",
        )
        .bind(id_to_i64("subject_id", subject_id.value())?)
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_answer_row).collect()
    }
}
