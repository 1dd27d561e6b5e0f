//! In-memory store implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{CommentRepository, TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::{Comment, NewComment, NewTask, NewUser, Page, PageRequest, Task, User};

#[derive(Default)]
struct State {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    comments: BTreeMap<i64, Comment>,
    next_user_id: i64,
    next_task_id: i64,
    next_comment_id: i64,
}

impl State {
    fn allocate(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// Keeps users, tasks and comments in ordered maps behind a single lock.
/// Ids are allocated sequentially from 1, like a `BIGSERIAL` column.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<'a, I>(tasks: I, page: PageRequest) -> Page<Task>
where
    I: Iterator<Item = &'a Task>,
{
    let matching: Vec<&Task> = tasks.collect();
    let total = matching.len() as u64;
    let content = matching
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    Page::new(content, page, total)
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email is already in use".into()));
        }
        let id = State::allocate(&mut state.next_user_id);
        let user = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn insert(&self, task: NewTask) -> Result<Task, AppError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&task.author_id) || !state.users.contains_key(&task.executor_id) {
            return Err(AppError::DatabaseError(
                "task references a user that does not exist".into(),
            ));
        }
        let id = State::allocate(&mut state.next_task_id);
        let now = Utc::now();
        let task = Task {
            id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            author_id: task.author_id,
            executor_id: task.executor_id,
            created_at: now,
            updated_at: now,
        };
        state.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        Ok(self.state.read().await.tasks.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Task>, AppError> {
        Ok(self.state.read().await.tasks.values().cloned().collect())
    }

    async fn update(&self, task: &Task) -> Result<Task, AppError> {
        let mut state = self.state.write().await;
        let stored = state
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.priority = task.priority;
        stored.status = task.status;
        stored.executor_id = task.executor_id;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        if state.tasks.remove(&id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|_, c| c.task_id != id);
        Ok(true)
    }

    async fn find_by_author(&self, author_id: i64, page: PageRequest) -> Result<Page<Task>, AppError> {
        let state = self.state.read().await;
        Ok(paginate(
            state.tasks.values().filter(|t| t.author_id == author_id),
            page,
        ))
    }

    async fn find_by_executor(
        &self,
        executor_id: i64,
        page: PageRequest,
    ) -> Result<Page<Task>, AppError> {
        let state = self.state.read().await;
        Ok(paginate(
            state.tasks.values().filter(|t| t.executor_id == executor_id),
            page,
        ))
    }

    async fn find_by_title_containing(
        &self,
        fragment: &str,
        page: PageRequest,
    ) -> Result<Page<Task>, AppError> {
        let state = self.state.read().await;
        Ok(paginate(
            state.tasks.values().filter(|t| t.title.contains(fragment)),
            page,
        ))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment, AppError> {
        let mut state = self.state.write().await;
        if !state.tasks.contains_key(&comment.task_id) {
            return Err(AppError::DatabaseError(
                "comment references a task that does not exist".into(),
            ));
        }
        let id = State::allocate(&mut state.next_comment_id);
        let comment = Comment {
            id,
            content: comment.content,
            author_id: comment.author_id,
            task_id: comment.task_id,
            created_at: Utc::now(),
        };
        state.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn list_for_task(&self, task_id: i64) -> Result<Vec<Comment>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .values()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect())
    }
}
