//! Events fed to the reducer: user gestures and gateway outcomes.

use tasker_core::{
    AuthError, NewTask, PendingIdentity, RestoreOutcome, Session, Task, TaskError, TaskFilter,
    TaskPatch, TaskSort,
};

use crate::state::AuthForm;

/// One user action.
#[derive(Debug, Clone)]
pub enum Gesture {
    /// Page load; attempts to restore a persisted session.
    Started,
    ShowForm(AuthForm),
    SignUpSubmitted {
        name: String,
        email: String,
        password: String,
    },
    VerifySubmitted {
        code: String,
    },
    ResendClicked,
    LoginSubmitted {
        email: String,
        password: String,
    },
    LogoutClicked,
    FilterClicked(TaskFilter),
    SortChanged(TaskSort),
    AddSubmitted(NewTask),
    EditSubmitted {
        id: String,
        patch: TaskPatch,
    },
    CompleteClicked {
        id: String,
    },
    DeleteClicked {
        id: String,
    },
    RefreshClicked,
    /// Answer to the pending confirmation.
    Confirmed(bool),
    /// The current notice has been shown long enough.
    NoticeDismissed,
}

/// Which mutation a `TaskMutated` outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Create,
    Update,
    Complete,
    Delete,
}

impl TaskAction {
    pub fn success_text(self) -> &'static str {
        match self {
            TaskAction::Create => "Task created successfully!",
            TaskAction::Update => "Task updated successfully!",
            TaskAction::Complete => "Task marked as completed!",
            TaskAction::Delete => "Task deleted successfully!",
        }
    }

    pub fn failure_prefix(self) -> &'static str {
        match self {
            TaskAction::Create => "Failed to create task",
            TaskAction::Update | TaskAction::Complete => "Failed to update task",
            TaskAction::Delete => "Failed to delete task",
        }
    }
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    Gesture(Gesture),
    SessionRestored(RestoreOutcome),
    SignedUp(Result<PendingIdentity, AuthError>),
    Verified(Result<(), AuthError>),
    CodeResent(Result<Option<String>, AuthError>),
    LoggedIn(Result<Session, AuthError>),
    LoggedOut(Result<(), AuthError>),
    TasksLoaded(Result<Vec<Task>, TaskError>),
    TaskMutated {
        action: TaskAction,
        result: Result<(), TaskError>,
    },
}

impl From<Gesture> for UiEvent {
    fn from(gesture: Gesture) -> Self {
        UiEvent::Gesture(gesture)
    }
}
