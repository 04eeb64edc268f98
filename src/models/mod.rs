pub mod assignment;
pub mod course;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

pub use assignment::{
    Assignment, AssignmentPatch, AssignmentQuery, AssignmentStatus, AssignmentType,
    NewAssignmentRequest,
};
pub use course::{Course, CourseColor, NewCourseRequest};

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (leave as is)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Reads a nullable text column as an empty string.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads an optional timestamp where a blank string counts as absent.
pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<DateTime<Utc>>()
            .map(Some)
            .map_err(|_| D::Error::custom("must be a valid timestamp")),
        _ => Ok(None),
    }
}
