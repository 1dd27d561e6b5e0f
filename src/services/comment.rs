use crate::error::AppError;
use crate::models::{Comment, NewComment, User};
use crate::store::{CommentRepository, TaskRepository};
use std::sync::Arc;

/// The only entry point for creating comments.
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    tasks: Arc<dyn TaskRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, tasks: Arc<dyn TaskRepository>) -> Self {
        Self { comments, tasks }
    }

    /// Attaches a comment written by `author` to a task.
    pub async fn add_comment(
        &self,
        task_id: i64,
        content: &str,
        author: &User,
    ) -> Result<Comment, AppError> {
        if content.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Invalid input data: comment text must not be empty".into(),
            ));
        }

        if self.tasks.find_by_id(task_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Task with id {} not found", task_id)));
        }

        self.comments
            .insert(NewComment {
                content: content.to_string(),
                author_id: author.id,
                task_id,
            })
            .await
    }

    pub async fn list_for_task(&self, task_id: i64) -> Result<Vec<Comment>, AppError> {
        self.comments.list_for_task(task_id).await
    }
}
