use chrono::{DateTime, Utc};
use quiz_core::model::UserId;

use super::SqliteRepository;
use super::mapping::{conn, map_user_row};
use crate::repository::{StorageError, UserProfile, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn find_or_create_user(
        &self,
        email: &str,
        created_at: DateTime<Utc>,
    ) -> Result<UserProfile, StorageError> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(email) DO NOTHING
            ",
        )
        .bind(UserId::generate().to_string())
        .bind(email)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        let row = sqlx::query("SELECT id, email, created_at FROM users WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;

        map_user_row(&row)
    }
}
