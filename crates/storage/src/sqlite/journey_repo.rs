use journey_core::model::{LearningJourney, UserId};
use sqlx::Row;

use super::{
    mapping::{journey_from_document, ser, to_json},
    SqliteRepository,
};
use crate::repository::{JourneyRepository, StorageError};

#[async_trait::async_trait]
impl JourneyRepository for SqliteRepository {
    async fn load_journey(&self, user_id: UserId) -> Result<LearningJourney, StorageError> {
        let row = sqlx::query("SELECT document FROM journeys WHERE user_id = ?1")
            .bind(user_id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .ok_or(StorageError::NotFound)?;

        journey_from_document(&row.try_get::<String, _>("document").map_err(ser)?)
    }

    async fn save_journey(
        &self,
        user_id: UserId,
        journey: &LearningJourney,
    ) -> Result<(), StorageError> {
        let document = to_json(journey)?;

        let result = sqlx::query(
            r"
                UPDATE journeys SET
                    current_day = ?2,
                    total_days = ?3,
                    streak = ?4,
                    total_score = ?5,
                    last_lesson_date = ?6,
                    document = ?7
                WHERE user_id = ?1
            ",
        )
        .bind(user_id.to_string())
        .bind(i64::from(journey.current_day()))
        .bind(i64::from(journey.total_days()))
        .bind(i64::from(journey.streak()))
        .bind(i64::from(journey.total_score()))
        .bind(journey.last_lesson_date())
        .bind(document)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
