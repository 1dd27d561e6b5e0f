//! Resource services. They own the business rules and talk to the store traits only.

pub mod comment;
pub mod task;
pub mod user;

pub use comment::CommentService;
pub use task::{Access, TaskService};
pub use user::UserService;
