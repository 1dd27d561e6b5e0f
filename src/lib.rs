#![doc = "The `taskhub` library crate."]
#![doc = ""]
#![doc = "A role-based task-management REST backend. Users (ADMIN or USER) log in for a"]
#![doc = "signed access token; a request authorization middleware turns the bearer token"]
#![doc = "into an `Identity`, and per-endpoint permission checks plus executor ownership"]
#![doc = "checks decide what each caller may do with tasks and comments."]
#![doc = ""]
#![doc = "The binary (`main.rs`) only reads configuration, picks a store and serves"]
#![doc = "`app::AppContext`; the integration tests build the same context over"]
#![doc = "`store::MemoryStore`."]

pub mod app;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use app::AppContext;
pub use error::AppError;
