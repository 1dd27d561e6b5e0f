use crate::auth::password::hash_password_off_thread;
use crate::error::AppError;
use crate::models::{NewUser, User, UserInput};
use crate::store::UserRepository;
use std::sync::Arc;
use validator::Validate;

pub struct UserService {
    users: Arc<dyn UserRepository>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, bcrypt_cost: u32) -> Self {
        Self { users, bcrypt_cost }
    }

    /// Registers a new account.
    ///
    /// Fails with `ValidationError` for a malformed email or empty password and with
    /// `Conflict` if the email is already registered.
    pub async fn register(&self, input: UserInput) -> Result<User, AppError> {
        input.validate()?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email is already in use".into()));
        }

        let password_hash = hash_password_off_thread(input.password, self.bcrypt_cost).await?;
        let user = self
            .users
            .insert(NewUser {
                email: input.email,
                password_hash,
                role: input.role,
            })
            .await?;

        log::info!("Registered user {} with role {:?}", user.email, user.role);
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found with email {}", email)))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found with id {}", id)))
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.users.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::models::Role;
    use crate::store::MemoryStore;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryStore::new()), 4)
    }

    fn input(email: &str, password: &str) -> UserInput {
        UserInput {
            email: email.into(),
            password: password.into(),
            role: Role::User,
        }
    }

    #[actix_rt::test]
    async fn test_register_hashes_password() {
        let users = service();
        let user = users.register(input("a@x.com", "pw")).await.unwrap();

        assert_eq!(user.email, "a@x.com");
        assert_ne!(user.password_hash, "pw");
        assert!(verify_password("pw", &user.password_hash).unwrap());
        assert_eq!(users.find_by_email("a@x.com").await.unwrap().id, user.id);
    }

    #[actix_rt::test]
    async fn test_register_duplicate_email_conflicts() {
        let users = service();
        users.register(input("a@x.com", "pw")).await.unwrap();

        match users.register(input("a@x.com", "other")).await {
            Err(AppError::Conflict(_)) => {}
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_register_empty_password_is_invalid() {
        match service().register(input("a@x.com", "")).await {
            Err(AppError::ValidationError(_)) => {}
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_lookups_fail_with_not_found() {
        let users = service();
        assert!(matches!(
            users.find_by_id(42).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            users.find_by_email("ghost@x.com").await,
            Err(AppError::NotFound(_))
        ));
    }
}
