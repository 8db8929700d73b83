//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! Each one is a single gateway call (or a prompt); the runtime turns its
//! result into a `UiEvent` and feeds it back to the reducer.

use tasker_core::{NewTask, TaskPatch};

use crate::events::TaskAction;
use crate::state::Confirmation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    RestoreSession,
    SignUp {
        name: String,
        email: String,
        password: String,
    },
    Verify {
        code: String,
    },
    ResendCode,
    Login {
        email: String,
        password: String,
    },
    Logout,
    /// Clear the stored session after the task API stopped accepting it.
    DropSession,
    LoadTasks,
    CreateTask(NewTask),
    UpdateTask {
        id: String,
        patch: TaskPatch,
        action: TaskAction,
    },
    DeleteTask {
        id: String,
    },
    /// Ask the user; the answer arrives as `Gesture::Confirmed`.
    Confirm(Confirmation),
}

impl UiEffect {
    /// Short name for logs. Never includes credentials.
    pub fn name(&self) -> &'static str {
        match self {
            UiEffect::RestoreSession => "restore_session",
            UiEffect::SignUp { .. } => "sign_up",
            UiEffect::Verify { .. } => "verify",
            UiEffect::ResendCode => "resend_code",
            UiEffect::Login { .. } => "login",
            UiEffect::Logout => "logout",
            UiEffect::DropSession => "drop_session",
            UiEffect::LoadTasks => "load_tasks",
            UiEffect::CreateTask(_) => "create_task",
            UiEffect::UpdateTask { .. } => "update_task",
            UiEffect::DeleteTask { .. } => "delete_task",
            UiEffect::Confirm(_) => "confirm",
        }
    }
}
