use crate::models::comment::CommentView;
use crate::models::user::UserView;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task is yet to be started.
    New,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Done,
}

/// Represents a task row as stored in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: i32,
    pub status: TaskStatus,
    /// The user who created the task.
    pub author_id: i64,
    /// The user responsible for carrying it out. May be reassigned.
    pub executor_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(default)]
    pub priority: i32,

    pub status: TaskStatus,

    pub author_id: i64,

    pub executor_id: i64,
}

/// Input structure for the administrative full update of a task.
///
/// `executor_id` is accepted for compatibility with the creation payload but does not
/// reassign the task; use the dedicated assignment endpoint for that.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(default)]
    pub priority: i32,

    pub status: TaskStatus,

    pub executor_id: Option<i64>,
}

/// A task ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: i32,
    pub status: TaskStatus,
    pub author_id: i64,
    pub executor_id: i64,
}

impl From<TaskInput> for NewTask {
    fn from(input: TaskInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: input.status,
            author_id: input.author_id,
            executor_id: input.executor_id,
        }
    }
}

/// A task as returned by the API, with its author, executor and comments resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: i32,
    pub status: TaskStatus,
    pub author: UserView,
    pub executor: UserView,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters for `/tasks/author`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuthorQuery {
    pub author_id: i64,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 1000))]
    pub size: u32,
}

/// Query parameters for `/tasks/executor`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorQuery {
    pub executor_id: i64,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 1000))]
    pub size: u32,
}

/// Query parameters for `/tasks/title`.
#[derive(Debug, Deserialize, Validate)]
pub struct TitleQuery {
    pub title: String,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 1000))]
    pub size: u32,
}

fn default_page_size() -> u32 {
    10
}
