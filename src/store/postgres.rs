//! PostgreSQL store implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{CommentRepository, TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::{Comment, NewComment, NewTask, NewUser, Page, PageRequest, Task, User};

const USER_COLUMNS: &str = "id, email, password_hash, role, created_at";
const TASK_COLUMNS: &str =
    "id, title, description, priority, status, author_id, executor_id, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, content, author_id, task_id, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn task_page(
        &self,
        filter: &str,
        bind: TaskFilter<'_>,
        page: PageRequest,
    ) -> Result<Page<Task>, AppError> {
        let count_sql = format!("SELECT COUNT(*) FROM tasks WHERE {}", filter);
        let select_sql = format!(
            "SELECT {} FROM tasks WHERE {} ORDER BY id LIMIT $2 OFFSET $3",
            TASK_COLUMNS, filter
        );

        let (total, tasks) = match bind {
            TaskFilter::Id(id) => {
                let total: i64 = sqlx::query_scalar(&count_sql)
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
                let tasks = sqlx::query_as::<_, Task>(&select_sql)
                    .bind(id)
                    .bind(page.limit() as i64)
                    .bind(page.offset() as i64)
                    .fetch_all(&self.pool)
                    .await?;
                (total, tasks)
            }
            TaskFilter::Text(text) => {
                let total: i64 = sqlx::query_scalar(&count_sql)
                    .bind(text)
                    .fetch_one(&self.pool)
                    .await?;
                let tasks = sqlx::query_as::<_, Task>(&select_sql)
                    .bind(text)
                    .bind(page.limit() as i64)
                    .bind(page.offset() as i64)
                    .fetch_all(&self.pool)
                    .await?;
                (total, tasks)
            }
        };

        Ok(Page::new(tasks, page, total.max(0) as u64))
    }
}

enum TaskFilter<'a> {
    Id(i64),
    Text(&'a str),
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn insert(&self, task: NewTask) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, priority, status, author_id, executor_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            TASK_COLUMNS
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.priority)
            .bind(task.status)
            .bind(task.author_id)
            .bind(task.executor_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self) -> Result<Vec<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks ORDER BY id", TASK_COLUMNS);
        Ok(sqlx::query_as::<_, Task>(&sql).fetch_all(&self.pool).await?)
    }

    async fn update(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            "UPDATE tasks \
             SET title = $1, description = $2, priority = $3, status = $4, executor_id = $5, updated_at = NOW() \
             WHERE id = $6 \
             RETURNING {}",
            TASK_COLUMNS
        );
        // RowNotFound maps to AppError::NotFound.
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.priority)
            .bind(task.status)
            .bind(task.executor_id)
            .bind(task.id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        // Comments go with the task through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_author(&self, author_id: i64, page: PageRequest) -> Result<Page<Task>, AppError> {
        self.task_page("author_id = $1", TaskFilter::Id(author_id), page)
            .await
    }

    async fn find_by_executor(
        &self,
        executor_id: i64,
        page: PageRequest,
    ) -> Result<Page<Task>, AppError> {
        self.task_page("executor_id = $1", TaskFilter::Id(executor_id), page)
            .await
    }

    async fn find_by_title_containing(
        &self,
        fragment: &str,
        page: PageRequest,
    ) -> Result<Page<Task>, AppError> {
        self.task_page(
            "strpos(title, $1) > 0",
            TaskFilter::Text(fragment),
            page,
        )
        .await
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment, AppError> {
        let sql = format!(
            "INSERT INTO comments (content, author_id, task_id) VALUES ($1, $2, $3) RETURNING {}",
            COMMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(&comment.content)
            .bind(comment.author_id)
            .bind(comment.task_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_for_task(&self, task_id: i64) -> Result<Vec<Comment>, AppError> {
        let sql = format!(
            "SELECT {} FROM comments WHERE task_id = $1 ORDER BY id",
            COMMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(task_id)
            .fetch_all(&self.pool)
            .await?)
    }
}
