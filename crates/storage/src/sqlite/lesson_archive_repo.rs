use chrono::{DateTime, Utc};
use journey_core::model::{Lesson, UserId};
use sqlx::Row;

use super::{
    mapping::{day_from_i64, day_to_i64, from_json, ser, to_json, user_id_from_str},
    SqliteRepository,
};
use crate::repository::{ArchivedLesson, LessonArchiveRepository, StorageError};

fn map_archive_row(row: &sqlx::sqlite::SqliteRow) -> Result<ArchivedLesson, StorageError> {
    Ok(ArchivedLesson {
        id: row.try_get("id").map_err(ser)?,
        user_id: user_id_from_str(&row.try_get::<String, _>("user_id").map_err(ser)?)?,
        day: day_from_i64(row.try_get::<i64, _>("day").map_err(ser)?)?,
        lesson: from_json(&row.try_get::<String, _>("lesson").map_err(ser)?)?,
        completed: row.try_get::<i64, _>("completed").map_err(ser)? != 0,
        archived_at: row.try_get("archived_at").map_err(ser)?,
    })
}

#[async_trait::async_trait]
impl LessonArchiveRepository for SqliteRepository {
    async fn append_lesson(
        &self,
        user_id: UserId,
        lesson: &Lesson,
        archived_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        let payload = to_json(lesson)?;

        let result = sqlx::query(
            r"
                INSERT INTO lesson_archive (user_id, day, lesson, completed, archived_at)
                VALUES (?1, ?2, ?3, 0, ?4)
            ",
        )
        .bind(user_id.to_string())
        .bind(day_to_i64(lesson.day))
        .bind(payload)
        .bind(archived_at)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    async fn mark_completed(&self, user_id: UserId, day: u32) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
                UPDATE lesson_archive SET completed = 1
                WHERE id = (
                    SELECT id FROM lesson_archive
                    WHERE user_id = ?1 AND day = ?2
                    ORDER BY id DESC
                    LIMIT 1
                )
            ",
        )
        .bind(user_id.to_string())
        .bind(day_to_i64(day))
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_lessons(&self, user_id: UserId) -> Result<Vec<ArchivedLesson>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, user_id, day, lesson, completed, archived_at
                FROM lesson_archive
                WHERE user_id = ?1
                ORDER BY id
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_archive_row).collect()
    }
}
