use journey_core::model::{User, UserId};

use super::{
    mapping::{map_user_row, to_json},
    SqliteRepository,
};
use crate::repository::{StorageError, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        let profile = to_json(&user.profile)?;
        let preferences = to_json(&user.preferences)?;
        let document = to_json(&user.journey)?;

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query(
            r"
                INSERT INTO users (id, email, profile, preferences)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    email = excluded.email,
                    profile = excluded.profile,
                    preferences = excluded.preferences
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(profile)
        .bind(preferences)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query(
            r"
                INSERT INTO journeys (
                    user_id, current_day, total_days, streak, total_score,
                    last_lesson_date, document
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(user_id) DO UPDATE SET
                    current_day = excluded.current_day,
                    total_days = excluded.total_days,
                    streak = excluded.streak,
                    total_score = excluded.total_score,
                    last_lesson_date = excluded.last_lesson_date,
                    document = excluded.document
            ",
        )
        .bind(user.id.to_string())
        .bind(i64::from(user.journey.current_day()))
        .bind(i64::from(user.journey.total_days()))
        .bind(i64::from(user.journey.streak()))
        .bind(i64::from(user.journey.total_score()))
        .bind(user.journey.last_lesson_date())
        .bind(document)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    async fn get_user(&self, id: UserId) -> Result<User, StorageError> {
        let row = sqlx::query(
            r"
                SELECT u.id, u.email, u.profile, u.preferences, j.document
                FROM users u
                JOIN journeys j ON j.user_id = u.id
                WHERE u.id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_user_row(&row)
    }
}
