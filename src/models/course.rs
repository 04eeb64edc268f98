use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CourseColor {
    Slate,
    Rose,
    Orange,
    Amber,
    Yellow,
    Lime,
    Green,
    Teal,
    Cyan,
    Sky,
    Blue,
    #[default]
    Indigo,
    Violet,
    Purple,
    Pink,
}

impl CourseColor {
    pub const ALL: [CourseColor; 15] = [
        CourseColor::Slate,
        CourseColor::Rose,
        CourseColor::Orange,
        CourseColor::Amber,
        CourseColor::Yellow,
        CourseColor::Lime,
        CourseColor::Green,
        CourseColor::Teal,
        CourseColor::Cyan,
        CourseColor::Sky,
        CourseColor::Blue,
        CourseColor::Indigo,
        CourseColor::Violet,
        CourseColor::Purple,
        CourseColor::Pink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourseColor::Slate => "slate",
            CourseColor::Rose => "rose",
            CourseColor::Orange => "orange",
            CourseColor::Amber => "amber",
            CourseColor::Yellow => "yellow",
            CourseColor::Lime => "lime",
            CourseColor::Green => "green",
            CourseColor::Teal => "teal",
            CourseColor::Cyan => "cyan",
            CourseColor::Sky => "sky",
            CourseColor::Blue => "blue",
            CourseColor::Indigo => "indigo",
            CourseColor::Violet => "violet",
            CourseColor::Purple => "purple",
            CourseColor::Pink => "pink",
        }
    }
}

impl fmt::Display for CourseColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub code: String,
    #[serde(default)]
    pub color: CourseColor,
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Short label for badges and reminders: the course code, or the name when no code is set.
    pub fn short_label(&self) -> &str {
        if self.code.is_empty() {
            &self.name
        } else {
            &self.code
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub color: Option<CourseColor>,
}
