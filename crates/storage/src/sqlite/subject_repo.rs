use chrono::{DateTime, Utc};
use quiz_core::model::{Subject, SubjectId, SubjectName, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_subject_row, subject_id_from_i64};
use crate::repository::{StorageError, SubjectRepository, sort_by_name};

#[async_trait::async_trait]
impl SubjectRepository for SqliteRepository {
    async fn insert_subject(
        &self,
        owner: UserId,
        name: &SubjectName,
        created_at: DateTime<Utc>,
    ) -> Result<Subject, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO subjects (name, owner, created_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(name.as_str())
        .bind(owner.to_string())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        let id = subject_id_from_i64(res.last_insert_rowid())?;
        Ok(Subject::new(id, name.clone(), owner, created_at))
    }

    async fn get_subject(
        &self,
        owner: UserId,
        id: SubjectId,
    ) -> Result<Option<Subject>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, owner, created_at
            FROM subjects
            WHERE id = ?1 AND owner = ?2
            ",
        )
        .bind(id_to_i64("subject_id", id.value())?)
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_subject_row).transpose()
    }

    async fn list_subjects(&self, owner: UserId) -> Result<Vec<Subject>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, owner, created_at
            FROM subjects
            WHERE owner = ?1
            ",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        // NOCASE only folds ASCII, so order in Rust to match the in-memory backend.
        let mut subjects = rows
            .iter()
            .map(map_subject_row)
            .collect::<Result<Vec<_>, _>>()?;
        sort_by_name(&mut subjects);
        Ok(subjects)
    }
}
