//! Tasks: data model, gateway backends, and the view model.

mod error;
mod gateway;
mod local;
mod model;
mod remote;
mod view;

pub use error::TaskError;
pub use gateway::TaskGateway;
pub use local::LocalStore;
pub use model::{NewTask, Priority, Task, TaskPatch, TaskStatus, generate_task_id, parse_deadline};
pub use remote::RemoteTasks;
pub use view::{
    Projection, TaskFilter, TaskSort, TaskSummary, TaskViewModel, collate, project,
};
