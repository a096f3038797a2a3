//! # Domain Models
//!
//! These structs represent the core entities of goalboard.
//! We use UUID v7 for time-ordered, globally unique identification.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account. Owns boards, categories, goals and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 PHC string; never leaves the process.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: Uuid,
    pub username: String,
}

/// Container grouping categories. Physically removable only once no category
/// references it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub title: String,
    pub is_deleted: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalCategory {
    pub id: Uuid,
    #[serde(rename = "board")]
    pub board_id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub title: String,
    pub is_deleted: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    #[serde(rename = "category")]
    pub category_id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: GoalStatus,
    pub priority: GoalPriority,
    pub due_date: Option<NaiveDate>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Goal {
    /// A goal is listed only while it is not archived and its category is
    /// not soft-deleted.
    pub fn is_visible_in(&self, category: &GoalCategory) -> bool {
        self.status != GoalStatus::Archived && !category.is_deleted
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalComment {
    pub id: Uuid,
    #[serde(rename = "goal")]
    pub goal_id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub text: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Goal lifecycle. `Archived` is terminal for every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    ToDo,
    InProgress,
    Done,
    Archived,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::ToDo => "to_do",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Done => "done",
            GoalStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "to_do" => Ok(GoalStatus::ToDo),
            "in_progress" => Ok(GoalStatus::InProgress),
            "done" => Ok(GoalStatus::Done),
            "archived" => Ok(GoalStatus::Archived),
            other => Err(format!("\"{other}\" is not a valid goal status.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl GoalPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalPriority::Low => "low",
            GoalPriority::Medium => "medium",
            GoalPriority::High => "high",
            GoalPriority::Critical => "critical",
        }
    }
}

impl fmt::Display for GoalPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(GoalPriority::Low),
            "medium" => Ok(GoalPriority::Medium),
            "high" => Ok(GoalPriority::High),
            "critical" => Ok(GoalPriority::Critical),
            other => Err(format!("\"{other}\" is not a valid goal priority.")),
        }
    }
}

// ── Write models ────────────────────────────────────────────────────────────
// Already validated; the owner is always the requester.

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBoard {
    pub user_id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub board_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub category_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: GoalStatus,
    pub priority: GoalPriority,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub goal_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalChanges {
    pub category_id: Option<Uuid>,
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub status: Option<GoalStatus>,
    pub priority: Option<GoalPriority>,
    /// `Some(None)` clears the due date.
    pub due_date: Option<Option<NaiveDate>>,
}
