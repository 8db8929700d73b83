//! Effect handlers.
//!
//! Each handler performs one gateway call and returns the outcome event.

use tasker_core::{NewTask, TaskPatch};

use super::Services;
use crate::events::{TaskAction, UiEvent};

pub async fn restore_session(services: &Services) -> UiEvent {
    UiEvent::SessionRestored(services.auth.restore_session().await)
}

pub async fn sign_up(services: &Services, name: &str, email: &str, password: &str) -> UiEvent {
    UiEvent::SignedUp(services.auth.sign_up(name, email, password).await)
}

pub async fn verify(services: &Services, code: &str) -> UiEvent {
    UiEvent::Verified(services.auth.verify(code).await)
}

pub async fn resend_code(services: &Services) -> UiEvent {
    UiEvent::CodeResent(services.auth.resend_verification().await)
}

pub async fn login(services: &Services, email: &str, password: &str) -> UiEvent {
    UiEvent::LoggedIn(services.auth.login(email, password).await)
}

pub async fn logout(services: &Services) -> UiEvent {
    UiEvent::LoggedOut(services.auth.logout().await)
}

pub fn drop_session(services: &Services) {
    if let Err(e) = services.auth.sessions().clear() {
        tracing::warn!(error = %e, "Failed to clear rejected session");
    }
}

pub async fn load_tasks(services: &Services) -> UiEvent {
    UiEvent::TasksLoaded(services.tasks.list().await)
}

pub async fn create_task(services: &Services, input: NewTask) -> UiEvent {
    UiEvent::TaskMutated {
        action: TaskAction::Create,
        result: services.tasks.create(input).await.map(|_| ()),
    }
}

pub async fn update_task(
    services: &Services,
    id: &str,
    patch: &TaskPatch,
    action: TaskAction,
) -> UiEvent {
    UiEvent::TaskMutated {
        action,
        result: services.tasks.update(id, patch).await.map(|_| ()),
    }
}

pub async fn delete_task(services: &Services, id: &str) -> UiEvent {
    UiEvent::TaskMutated {
        action: TaskAction::Delete,
        result: services.tasks.delete(id).await,
    }
}
