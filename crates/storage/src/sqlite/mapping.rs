use journey_core::model::{LearningJourney, Preferences, Profile, User, UserId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn user_id_from_str(s: &str) -> Result<UserId, StorageError> {
    s.parse::<UserId>().map_err(ser)
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(ser)
}

pub(crate) fn from_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

/// Reconstructs a journey from its persisted document, re-checking the
/// structural invariants rather than trusting the stored blob.
pub(crate) fn journey_from_document(raw: &str) -> Result<LearningJourney, StorageError> {
    let journey: LearningJourney = from_json(raw)?;
    journey.validate().map_err(ser)?;
    Ok(journey)
}

pub(crate) fn map_user_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
    let id = user_id_from_str(&row.try_get::<String, _>("id").map_err(ser)?)?;
    let email: String = row.try_get("email").map_err(ser)?;
    let profile: Profile = from_json(&row.try_get::<String, _>("profile").map_err(ser)?)?;
    let preferences: Preferences =
        from_json(&row.try_get::<String, _>("preferences").map_err(ser)?)?;
    let journey = journey_from_document(&row.try_get::<String, _>("document").map_err(ser)?)?;

    Ok(User {
        id,
        email,
        profile,
        preferences,
        journey,
    })
}

pub(crate) fn day_to_i64(day: u32) -> i64 {
    i64::from(day)
}

pub(crate) fn day_from_i64(v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid day: {v}")))
}
