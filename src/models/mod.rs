pub mod comment;
pub mod page;
pub mod task;
pub mod user;

pub use comment::{Comment, CommentView, NewComment};
pub use page::{Page, PageRequest};
pub use task::{
    AuthorQuery, ExecutorQuery, NewTask, Task, TaskInput, TaskStatus, TaskUpdate, TaskView,
    TitleQuery,
};
pub use user::{NewUser, Role, User, UserInput, UserView};
