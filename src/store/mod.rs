//! Persistence ports.
//!
//! Services depend on these traits only. [`postgres::PgStore`] is the production
//! backend; [`memory::MemoryStore`] backs tests and database-less runs.

pub mod memory;
pub mod postgres;

use crate::error::AppError;
use crate::models::{Comment, NewComment, NewTask, NewUser, Page, PageRequest, Task, User};
use async_trait::async_trait;
use std::sync::Arc;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// The credential store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user. Fails with `Conflict` if the email is taken.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, task: NewTask) -> Result<Task, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError>;
    async fn list(&self) -> Result<Vec<Task>, AppError>;
    /// Writes back title, description, priority, status and executor.
    async fn update(&self, task: &Task) -> Result<Task, AppError>;
    /// Deletes the task and its comments. Returns `false` if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
    async fn find_by_author(&self, author_id: i64, page: PageRequest) -> Result<Page<Task>, AppError>;
    async fn find_by_executor(
        &self,
        executor_id: i64,
        page: PageRequest,
    ) -> Result<Page<Task>, AppError>;
    /// Case-sensitive substring match on the title.
    async fn find_by_title_containing(
        &self,
        fragment: &str,
        page: PageRequest,
    ) -> Result<Page<Task>, AppError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: NewComment) -> Result<Comment, AppError>;
    /// Comments of a task in creation order.
    async fn list_for_task(&self, task_id: i64) -> Result<Vec<Comment>, AppError>;
}

/// The three repositories a running service needs, sharing one backend.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    pub fn postgres(store: PgStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            tasks: store.clone(),
            comments: store,
        }
    }

    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            tasks: store.clone(),
            comments: store,
        }
    }
}
