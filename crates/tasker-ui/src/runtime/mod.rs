//! Effect runtime.
//!
//! Owns the state and the gateways. `dispatch` runs the reducer, executes the
//! returned effects one at a time, and feeds each outcome back in until the
//! queue is empty. Gestures are therefore handled strictly in order.

mod handlers;

use std::collections::VecDeque;

use tasker_core::{AuthGateway, TaskGateway};

use crate::effects::UiEffect;
use crate::events::{Gesture, UiEvent};
use crate::state::AppState;
use crate::update;

/// Gateways the runtime drives.
#[derive(Debug, Clone)]
pub struct Services {
    pub auth: AuthGateway,
    pub tasks: TaskGateway,
}

/// Answers confirmation requests (delete, logout).
pub trait Prompter {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Gives the same answer to every prompt.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Prompter for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

pub struct Runtime<P> {
    state: AppState,
    services: Services,
    prompter: P,
}

impl<P: Prompter> Runtime<P> {
    pub fn new(services: Services, prompter: P) -> Self {
        Self {
            state: AppState::new(),
            services,
            prompter,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Restores any persisted session and loads tasks if one is found.
    pub async fn start(&mut self) {
        self.dispatch(Gesture::Started.into()).await;
    }

    pub async fn gesture(&mut self, gesture: Gesture) {
        self.dispatch(gesture.into()).await;
    }

    /// Processes `event` and every event its effects produce.
    pub async fn dispatch(&mut self, event: UiEvent) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let effects = update::update(&mut self.state, event);
            for effect in effects {
                if let Some(next) = self.execute_effect(effect).await {
                    queue.push_back(next);
                }
            }
        }
    }

    async fn execute_effect(&mut self, effect: UiEffect) -> Option<UiEvent> {
        tracing::debug!(effect = effect.name(), "Executing effect");
        let services = &self.services;
        let event = match effect {
            UiEffect::RestoreSession => handlers::restore_session(services).await,
            UiEffect::SignUp {
                name,
                email,
                password,
            } => handlers::sign_up(services, &name, &email, &password).await,
            UiEffect::Verify { code } => handlers::verify(services, &code).await,
            UiEffect::ResendCode => handlers::resend_code(services).await,
            UiEffect::Login { email, password } => {
                handlers::login(services, &email, &password).await
            }
            UiEffect::Logout => handlers::logout(services).await,
            UiEffect::DropSession => {
                handlers::drop_session(services);
                return None;
            }
            UiEffect::LoadTasks => handlers::load_tasks(services).await,
            UiEffect::CreateTask(input) => handlers::create_task(services, input).await,
            UiEffect::UpdateTask { id, patch, action } => {
                handlers::update_task(services, &id, &patch, action).await
            }
            UiEffect::DeleteTask { id } => handlers::delete_task(services, &id).await,
            UiEffect::Confirm(confirmation) => {
                let accepted = self.prompter.confirm(confirmation.prompt());
                Gesture::Confirmed(accepted).into()
            }
        };
        Some(event)
    }
}
