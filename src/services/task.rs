use crate::auth::Identity;
use crate::error::AppError;
use crate::models::{
    CommentView, NewTask, Page, PageRequest, Task, TaskInput, TaskStatus, TaskUpdate, TaskView,
    User, UserView,
};
use crate::services::comment::CommentService;
use crate::store::{TaskRepository, UserRepository};
use std::sync::Arc;
use validator::Validate;

/// How a mutation is authorized against the task's designated executor.
#[derive(Debug, Clone, Copy)]
pub enum Access<'a> {
    /// The acting identity must resolve to the user whose id is the executor id.
    Executor(&'a Identity),
    /// No ownership check. Used by the admin endpoints that act on behalf of any executor.
    Privileged,
}

pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    users: Arc<dyn UserRepository>,
    comments: CommentService,
}

impl TaskService {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        users: Arc<dyn UserRepository>,
        comments: CommentService,
    ) -> Self {
        Self {
            tasks,
            users,
            comments,
        }
    }

    /// Ownership check: the caller's email must belong to the user with `executor_id`.
    async fn authorize_executor(
        &self,
        access: Access<'_>,
        executor_id: Option<i64>,
    ) -> Result<(), AppError> {
        let identity = match access {
            Access::Privileged => return Ok(()),
            Access::Executor(identity) => identity,
        };

        let acting = self.users.find_by_email(&identity.subject).await?;
        match (acting, executor_id) {
            (Some(user), Some(executor_id)) if user.id == executor_id => Ok(()),
            _ => {
                log::warn!(
                    "Ownership check failed: {} is not executor {:?}",
                    identity.subject,
                    executor_id
                );
                Err(AppError::Forbidden(
                    "You are not authorized to perform this action on this task".into(),
                ))
            }
        }
    }

    async fn load_task(&self, task_id: i64) -> Result<Task, AppError> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    async fn load_user(&self, user_id: i64, role: &str) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} not found", role)))
    }

    /// Resolves author, executor and comments for the API representation.
    async fn view(&self, task: Task) -> Result<TaskView, AppError> {
        let author = self.load_user(task.author_id, "Author").await?;
        let executor = self.load_user(task.executor_id, "Executor").await?;
        let comments = self
            .comments
            .list_for_task(task.id)
            .await?
            .into_iter()
            .map(CommentView::from)
            .collect();

        Ok(TaskView {
            id: task.id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            author: UserView::from(&author),
            executor: UserView::from(&executor),
            comments,
            created_at: task.created_at,
            updated_at: task.updated_at,
        })
    }

    async fn views(&self, tasks: Vec<Task>) -> Result<Vec<TaskView>, AppError> {
        let mut views = Vec::with_capacity(tasks.len());
        for task in tasks {
            views.push(self.view(task).await?);
        }
        Ok(views)
    }

    async fn view_page(&self, page: Page<Task>) -> Result<Page<TaskView>, AppError> {
        let mut views = Vec::with_capacity(page.content.len());
        for task in page.content.iter().cloned() {
            views.push(self.view(task).await?);
        }
        Ok(page.with_content(views))
    }

    /// Creates a task. Both the executor and the author must exist.
    pub async fn add_task(&self, input: TaskInput) -> Result<TaskView, AppError> {
        input.validate()?;
        self.load_user(input.executor_id, "Executor").await?;
        self.load_user(input.author_id, "Author").await?;

        let task = self.tasks.insert(NewTask::from(input)).await?;
        log::info!("Created task {} '{}'", task.id, task.title);
        self.view(task).await
    }

    pub async fn find_all(&self) -> Result<Vec<TaskView>, AppError> {
        let tasks = self.tasks.list().await?;
        self.views(tasks).await
    }

    pub async fn delete_task(&self, task_id: i64) -> Result<(), AppError> {
        if !self.tasks.delete(task_id).await? {
            return Err(AppError::NotFound("Task not found".into()));
        }
        log::info!("Deleted task {}", task_id);
        Ok(())
    }

    pub async fn update_priority(
        &self,
        task_id: i64,
        executor_id: i64,
        priority: i32,
        access: Access<'_>,
    ) -> Result<TaskView, AppError> {
        self.authorize_executor(access, Some(executor_id)).await?;
        let mut task = self.load_task(task_id).await?;

        task.priority = priority;
        let task = self.tasks.update(&task).await?;
        self.view(task).await
    }

    pub async fn update_status(
        &self,
        task_id: i64,
        executor_id: i64,
        status: TaskStatus,
        access: Access<'_>,
    ) -> Result<TaskView, AppError> {
        self.authorize_executor(access, Some(executor_id)).await?;
        let mut task = self.load_task(task_id).await?;

        task.status = status;
        let task = self.tasks.update(&task).await?;
        self.view(task).await
    }

    /// Overwrites title, description, priority and status.
    /// The task is looked up before the ownership check.
    pub async fn update_task(
        &self,
        task_id: i64,
        update: TaskUpdate,
        access: Access<'_>,
    ) -> Result<TaskView, AppError> {
        update.validate()?;
        let mut task = self.load_task(task_id).await?;
        self.authorize_executor(access, update.executor_id).await?;

        task.title = update.title;
        task.description = update.description;
        task.priority = update.priority;
        task.status = update.status;
        let task = self.tasks.update(&task).await?;
        self.view(task).await
    }

    pub async fn assign_executor(&self, task_id: i64, executor_id: i64) -> Result<TaskView, AppError> {
        let mut task = self.load_task(task_id).await?;
        let executor = self.load_user(executor_id, "Executor").await?;

        task.executor_id = executor.id;
        let task = self.tasks.update(&task).await?;
        log::info!("Assigned task {} to {}", task.id, executor.email);
        self.view(task).await
    }

    /// Adds a comment authored by the executor and returns the updated task.
    pub async fn add_comment(
        &self,
        task_id: i64,
        executor_id: i64,
        text: &str,
        access: Access<'_>,
    ) -> Result<TaskView, AppError> {
        self.authorize_executor(access, Some(executor_id)).await?;
        let task = self.load_task(task_id).await?;
        let executor = self.load_user(executor_id, "Executor").await?;

        self.comments.add_comment(task.id, text, &executor).await?;
        let task = self.load_task(task_id).await?;
        self.view(task).await
    }

    pub async fn find_by_author(
        &self,
        author_id: i64,
        page: PageRequest,
    ) -> Result<Page<TaskView>, AppError> {
        let page = self.tasks.find_by_author(author_id, page).await?;
        self.view_page(page).await
    }

    pub async fn find_by_executor(
        &self,
        executor_id: i64,
        page: PageRequest,
    ) -> Result<Page<TaskView>, AppError> {
        let page = self.tasks.find_by_executor(executor_id, page).await?;
        self.view_page(page).await
    }

    pub async fn find_by_title(
        &self,
        title: &str,
        page: PageRequest,
    ) -> Result<Page<TaskView>, AppError> {
        let page = self.tasks.find_by_title_containing(title, page).await?;
        self.view_page(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permission::Permission;
    use crate::models::{NewUser, Role};
    use crate::store::MemoryStore;

    struct Fixture {
        service: TaskService,
        alice: User,
        bob: User,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let mut created = Vec::new();
        for email in ["alice@x.com", "bob@x.com"] {
            created.push(
                UserRepository::insert(
                    store.as_ref(),
                    NewUser {
                        email: email.into(),
                        password_hash: "hash".into(),
                        role: Role::User,
                    },
                )
                .await
                .unwrap(),
            );
        }
        let bob = created.pop().unwrap();
        let alice = created.pop().unwrap();
        let comments = CommentService::new(store.clone(), store.clone());
        Fixture {
            service: TaskService::new(store.clone(), store, comments),
            alice,
            bob,
        }
    }

    fn identity(user: &User) -> Identity {
        Identity {
            subject: user.email.clone(),
            permissions: [Permission::User].into_iter().collect(),
        }
    }

    fn input(author: &User, executor: &User) -> TaskInput {
        TaskInput {
            title: "Write report".into(),
            description: Some("Quarterly".into()),
            priority: 2,
            status: TaskStatus::New,
            author_id: author.id,
            executor_id: executor.id,
        }
    }

    #[actix_rt::test]
    async fn test_add_task_links_author_and_executor() {
        let f = fixture().await;
        let task = f.service.add_task(input(&f.alice, &f.bob)).await.unwrap();

        assert_eq!(task.author.id, f.alice.id);
        assert_eq!(task.executor.email, "bob@x.com");
        assert!(task.comments.is_empty());
    }

    #[actix_rt::test]
    async fn test_add_task_with_missing_author() {
        let f = fixture().await;
        let mut bad = input(&f.alice, &f.bob);
        bad.author_id = 404;

        match f.service.add_task(bad).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Author not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_ownership_check() {
        let f = fixture().await;
        let task = f.service.add_task(input(&f.alice, &f.bob)).await.unwrap();

        // Alice acting as Bob is rejected.
        let alice = identity(&f.alice);
        let result = f
            .service
            .update_status(task.id, f.bob.id, TaskStatus::Done, Access::Executor(&alice))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        // Bob acting as himself succeeds.
        let bob = identity(&f.bob);
        let updated = f
            .service
            .update_status(task.id, f.bob.id, TaskStatus::Done, Access::Executor(&bob))
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Done);
    }

    #[actix_rt::test]
    async fn test_privileged_access_skips_ownership_check() {
        let f = fixture().await;
        let task = f.service.add_task(input(&f.alice, &f.bob)).await.unwrap();

        let updated = f
            .service
            .add_comment(task.id, f.bob.id, "on it", Access::Privileged)
            .await
            .unwrap();
        assert_eq!(updated.comments.len(), 1);
        assert_eq!(updated.comments[0].author_id, f.bob.id);
    }

    #[actix_rt::test]
    async fn test_unknown_caller_is_denied() {
        let f = fixture().await;
        let task = f.service.add_task(input(&f.alice, &f.bob)).await.unwrap();
        let ghost = Identity {
            subject: "ghost@x.com".into(),
            permissions: [Permission::User].into_iter().collect(),
        };

        let result = f
            .service
            .update_priority(task.id, f.bob.id, 9, Access::Executor(&ghost))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[actix_rt::test]
    async fn test_update_task_without_executor_id_is_denied_for_executors() {
        let f = fixture().await;
        let task = f.service.add_task(input(&f.alice, &f.bob)).await.unwrap();
        let update = || TaskUpdate {
            title: "Renamed".into(),
            description: None,
            priority: 1,
            status: TaskStatus::InProgress,
            executor_id: None,
        };

        let bob = identity(&f.bob);
        assert!(matches!(
            f.service.update_task(task.id, update(), Access::Executor(&bob)).await,
            Err(AppError::Forbidden(_))
        ));

        let updated = f
            .service
            .update_task(task.id, update(), Access::Privileged)
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.executor.id, f.bob.id);
    }

    #[actix_rt::test]
    async fn test_assign_executor_and_delete() {
        let f = fixture().await;
        let task = f.service.add_task(input(&f.alice, &f.bob)).await.unwrap();

        let reassigned = f.service.assign_executor(task.id, f.alice.id).await.unwrap();
        assert_eq!(reassigned.executor.id, f.alice.id);
        assert!(matches!(
            f.service.assign_executor(task.id, 77).await,
            Err(AppError::NotFound(_))
        ));

        f.service.delete_task(task.id).await.unwrap();
        assert!(matches!(
            f.service.delete_task(task.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(f.service.find_all().await.unwrap().is_empty());
    }
}
