//! Core Tasker library (session, auth, tasks, config).

pub mod auth;
pub mod config;
pub mod logging;
pub mod session;
pub mod shared;
pub mod tasks;

pub use auth::{AuthError, AuthGateway, RestoreOutcome};
pub use session::{PendingIdentity, Session, SessionStore};
pub use tasks::{
    NewTask, Priority, Task, TaskError, TaskFilter, TaskGateway, TaskPatch, TaskSort, TaskStatus,
    TaskSummary, TaskViewModel,
};
