//! Reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(state, event)`
//! and executes the returned effects. Each gesture maps to exactly one view
//! model mutation or one gateway effect.

use tasker_core::{AuthError, RestoreOutcome, TaskError, TaskPatch};

use crate::effects::UiEffect;
use crate::events::{Gesture, TaskAction, UiEvent};
use crate::state::{AppState, AuthForm, Confirmation, Notice, Screen, UserInfo};

const SESSION_EXPIRED: &str = "Session expired. Please log in again.";

/// The main reducer function.
pub fn update(state: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Gesture(gesture) => handle_gesture(state, gesture),
        UiEvent::SessionRestored(outcome) => {
            state.loading = false;
            match outcome {
                RestoreOutcome::Restored(session) => {
                    state.user = Some(UserInfo::from(&session));
                    state.screen = Screen::Tasks;
                    vec![UiEffect::LoadTasks]
                }
                RestoreOutcome::NoSession => {
                    state.sign_out();
                    vec![]
                }
                RestoreOutcome::Expired => {
                    state.sign_out();
                    state.notify(Notice::error(SESSION_EXPIRED));
                    vec![]
                }
            }
        }
        UiEvent::SignedUp(result) => {
            state.loading = false;
            match result {
                Ok(_) => {
                    state.screen = Screen::Auth(AuthForm::Verify);
                    state.notify(Notice::success(
                        "Sign up successful! Please check your email for verification code.",
                    ));
                }
                Err(e) => state.notify(auth_error(&e, "Sign up failed")),
            }
            vec![]
        }
        UiEvent::Verified(result) => {
            state.loading = false;
            match result {
                Ok(()) => {
                    state.screen = Screen::Auth(AuthForm::Login);
                    state.notify(Notice::success("Email verified! You can now login."));
                }
                Err(e) => state.notify(auth_error(&e, "Verification failed")),
            }
            vec![]
        }
        UiEvent::CodeResent(result) => {
            state.loading = false;
            match result {
                Ok(_) => state.notify(Notice::success(
                    "Verification code resent! Check your email.",
                )),
                Err(e) => state.notify(auth_error(&e, "Failed to resend code")),
            }
            vec![]
        }
        UiEvent::LoggedIn(result) => {
            state.loading = false;
            match result {
                Ok(session) => {
                    state.user = Some(UserInfo::from(&session));
                    state.screen = Screen::Tasks;
                    state.notify(Notice::success("Login successful!"));
                    vec![UiEffect::LoadTasks]
                }
                Err(e) => {
                    state.notify(auth_error(&e, "Login failed"));
                    vec![]
                }
            }
        }
        UiEvent::LoggedOut(result) => {
            state.sign_out();
            match result {
                Ok(()) => state.notify(Notice::success("Logged out successfully")),
                Err(e) => state.notify(Notice::error(e.to_string())),
            }
            vec![]
        }
        UiEvent::TasksLoaded(result) => {
            state.loading = false;
            match result {
                Ok(tasks) => {
                    state.tasks.set_tasks(tasks);
                    vec![]
                }
                Err(e) if e.is_auth_failure() => session_lost(state),
                Err(e) => {
                    state.tasks.set_tasks(Vec::new());
                    state.notify(Notice::error(format!("Failed to load tasks: {e}")));
                    vec![]
                }
            }
        }
        UiEvent::TaskMutated { action, result } => {
            state.loading = false;
            match result {
                Ok(()) => {
                    state.notify(Notice::success(action.success_text()));
                    vec![UiEffect::LoadTasks]
                }
                Err(e) if e.is_auth_failure() => session_lost(state),
                Err(e) => {
                    state.notify(task_error(action, &e));
                    vec![]
                }
            }
        }
    }
}

fn handle_gesture(state: &mut AppState, gesture: Gesture) -> Vec<UiEffect> {
    match gesture {
        Gesture::Started => {
            state.loading = true;
            vec![UiEffect::RestoreSession]
        }
        Gesture::ShowForm(form) => {
            if !state.is_signed_in() {
                state.screen = Screen::Auth(form);
            }
            vec![]
        }
        Gesture::SignUpSubmitted {
            name,
            email,
            password,
        } => {
            state.loading = true;
            vec![UiEffect::SignUp {
                name,
                email,
                password,
            }]
        }
        Gesture::VerifySubmitted { code } => {
            state.loading = true;
            vec![UiEffect::Verify { code }]
        }
        Gesture::ResendClicked => {
            state.loading = true;
            vec![UiEffect::ResendCode]
        }
        Gesture::LoginSubmitted { email, password } => {
            state.loading = true;
            vec![UiEffect::Login { email, password }]
        }
        Gesture::LogoutClicked => request_confirmation(state, Confirmation::Logout),
        Gesture::FilterClicked(filter) => {
            state.tasks.set_filter(filter);
            vec![]
        }
        Gesture::SortChanged(sort) => {
            state.tasks.set_sort(sort);
            vec![]
        }
        Gesture::AddSubmitted(input) => {
            if input.name.trim().is_empty() {
                state.notify(Notice::error("Please enter a task name"));
                return vec![];
            }
            state.loading = true;
            vec![UiEffect::CreateTask(input)]
        }
        Gesture::EditSubmitted { id, patch } => {
            if state.tasks.find(&id).is_none() {
                state.notify(task_error(TaskAction::Update, &TaskError::not_found(id)));
                return vec![];
            }
            state.loading = true;
            vec![UiEffect::UpdateTask {
                id,
                patch,
                action: TaskAction::Update,
            }]
        }
        Gesture::CompleteClicked { id } => {
            state.loading = true;
            vec![UiEffect::UpdateTask {
                id,
                patch: TaskPatch::complete(),
                action: TaskAction::Complete,
            }]
        }
        Gesture::DeleteClicked { id } => {
            request_confirmation(state, Confirmation::DeleteTask { id })
        }
        Gesture::RefreshClicked => {
            state.loading = true;
            vec![UiEffect::LoadTasks]
        }
        Gesture::Confirmed(accepted) => {
            let Some(confirmation) = state.confirmation.take() else {
                return vec![];
            };
            if !accepted {
                return vec![];
            }
            state.loading = true;
            match confirmation {
                Confirmation::DeleteTask { id } => vec![UiEffect::DeleteTask { id }],
                Confirmation::Logout => vec![UiEffect::Logout],
            }
        }
        Gesture::NoticeDismissed => {
            state.notice = None;
            vec![]
        }
    }
}

fn request_confirmation(state: &mut AppState, confirmation: Confirmation) -> Vec<UiEffect> {
    state.confirmation = Some(confirmation.clone());
    vec![UiEffect::Confirm(confirmation)]
}

/// The task API no longer accepts the session: drop it and go to login.
fn session_lost(state: &mut AppState) -> Vec<UiEffect> {
    state.sign_out();
    state.notify(Notice::error(SESSION_EXPIRED));
    vec![UiEffect::DropSession]
}

fn auth_error(err: &AuthError, fallback: &str) -> Notice {
    let text = err.to_string();
    if text.trim().is_empty() {
        Notice::error(fallback)
    } else {
        Notice::error(text)
    }
}

fn task_error(action: TaskAction, err: &TaskError) -> Notice {
    match err {
        TaskError::InvalidInput(message) => Notice::error(message.clone()),
        _ => Notice::error(format!("{}: {err}", action.failure_prefix())),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tasker_core::{NewTask, Priority, Session, Task, TaskFilter, TaskSort, TaskStatus};

    use super::*;
    use crate::state::NoticeKind;

    fn session() -> Session {
        Session {
            token: "t".to_string(),
            access_token: "a".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + chrono::Duration::hours(1),
            username: "ada@example.com".to_string(),
            display_name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
        }
    }

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            name: format!("task {id}"),
            description: String::new(),
            deadline: None,
            priority: Priority::Medium,
            status: TaskStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            user_id: None,
        }
    }

    fn signed_in() -> AppState {
        let mut state = AppState::new();
        update(&mut state, UiEvent::LoggedIn(Ok(session())));
        update(&mut state, UiEvent::TasksLoaded(Ok(vec![task("a"), task("b")])));
        state
    }

    fn gesture(state: &mut AppState, gesture: Gesture) -> Vec<UiEffect> {
        update(state, UiEvent::Gesture(gesture))
    }

    #[test]
    fn test_started_restores_session() {
        let mut state = AppState::new();
        assert_eq!(gesture(&mut state, Gesture::Started), vec![UiEffect::RestoreSession]);

        let effects = update(
            &mut state,
            UiEvent::SessionRestored(RestoreOutcome::Restored(session())),
        );
        assert_eq!(effects, vec![UiEffect::LoadTasks]);
        assert_eq!(state.screen, Screen::Tasks);
        assert_eq!(state.user.as_ref().unwrap().name, "Ada");
    }

    #[test]
    fn test_restore_without_session_shows_login_silently() {
        let mut state = AppState::new();
        update(&mut state, UiEvent::SessionRestored(RestoreOutcome::NoSession));
        assert_eq!(state.screen, Screen::Auth(AuthForm::Login));
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_login_success_loads_tasks() {
        let mut state = AppState::new();
        let effects = update(&mut state, UiEvent::LoggedIn(Ok(session())));
        assert_eq!(effects, vec![UiEffect::LoadTasks]);
        assert_eq!(state.notice, Some(Notice::success("Login successful!")));
    }

    #[test]
    fn test_login_failure_stays_on_auth() {
        let mut state = AppState::new();
        let effects = update(
            &mut state,
            UiEvent::LoggedIn(Err(AuthError::validation(
                "Password must be at least 8 characters",
            ))),
        );
        assert!(effects.is_empty());
        assert_eq!(state.screen, Screen::Auth(AuthForm::Login));
        assert_eq!(
            state.notice,
            Some(Notice::error("Password must be at least 8 characters"))
        );
    }

    #[test]
    fn test_sign_up_moves_to_verify_then_login() {
        let mut state = AppState::new();
        gesture(&mut state, Gesture::ShowForm(AuthForm::SignUp));
        update(
            &mut state,
            UiEvent::SignedUp(Ok(tasker_core::PendingIdentity {
                username: "ada@example.com".to_string(),
                user_sub: None,
                confirmed: false,
                destination: None,
            })),
        );
        assert_eq!(state.screen, Screen::Auth(AuthForm::Verify));

        update(&mut state, UiEvent::Verified(Ok(())));
        assert_eq!(state.screen, Screen::Auth(AuthForm::Login));
        assert_eq!(
            state.notice,
            Some(Notice::success("Email verified! You can now login."))
        );
    }

    #[test]
    fn test_verify_without_sign_up_notice() {
        let mut state = AppState::new();
        update(&mut state, UiEvent::Verified(Err(AuthError::NoPendingSignUp)));
        assert_eq!(state.notice, Some(Notice::error("Please sign up first")));
    }

    #[test]
    fn test_filter_and_sort_mutate_view_only() {
        let mut state = signed_in();
        assert!(gesture(&mut state, Gesture::FilterClicked(TaskFilter::Completed)).is_empty());
        assert!(gesture(&mut state, Gesture::SortChanged(TaskSort::Name)).is_empty());
        assert_eq!(state.tasks.filter(), TaskFilter::Completed);
        assert_eq!(state.tasks.sort(), TaskSort::Name);
        assert!(state.tasks.projection().is_empty());
        assert_eq!(state.tasks.tasks().len(), 2);
    }

    #[test]
    fn test_add_with_blank_name_is_rejected_locally() {
        let mut state = signed_in();
        let effects = gesture(&mut state, Gesture::AddSubmitted(NewTask::new("  ")));
        assert!(effects.is_empty());
        assert!(state.notice.as_ref().unwrap().is_error());
    }

    #[test]
    fn test_mutation_success_reloads() {
        let mut state = signed_in();
        let effects = gesture(&mut state, Gesture::CompleteClicked { id: "a".to_string() });
        assert_eq!(
            effects,
            vec![UiEffect::UpdateTask {
                id: "a".to_string(),
                patch: TaskPatch::complete(),
                action: TaskAction::Complete,
            }]
        );

        let effects = update(
            &mut state,
            UiEvent::TaskMutated {
                action: TaskAction::Complete,
                result: Ok(()),
            },
        );
        assert_eq!(effects, vec![UiEffect::LoadTasks]);
        assert_eq!(state.notice, Some(Notice::success("Task marked as completed!")));
    }

    #[test]
    fn test_mutation_failure_keeps_collection() {
        let mut state = signed_in();
        let effects = update(
            &mut state,
            UiEvent::TaskMutated {
                action: TaskAction::Delete,
                result: Err(TaskError::remote(500, "boom")),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(state.tasks.tasks().len(), 2);
        assert_eq!(
            state.notice,
            Some(Notice::error("Failed to delete task: HTTP 500: boom"))
        );
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut state = signed_in();
        let effects = gesture(&mut state, Gesture::DeleteClicked { id: "a".to_string() });
        assert_eq!(
            effects,
            vec![UiEffect::Confirm(Confirmation::DeleteTask {
                id: "a".to_string()
            })]
        );

        assert!(gesture(&mut state, Gesture::Confirmed(false)).is_empty());
        assert!(state.confirmation.is_none());

        gesture(&mut state, Gesture::DeleteClicked { id: "a".to_string() });
        assert_eq!(
            gesture(&mut state, Gesture::Confirmed(true)),
            vec![UiEffect::DeleteTask { id: "a".to_string() }]
        );
    }

    #[test]
    fn test_stray_confirmation_is_ignored() {
        let mut state = signed_in();
        assert!(gesture(&mut state, Gesture::Confirmed(true)).is_empty());
    }

    #[test]
    fn test_logout_confirmed_then_done() {
        let mut state = signed_in();
        assert_eq!(
            gesture(&mut state, Gesture::LogoutClicked),
            vec![UiEffect::Confirm(Confirmation::Logout)]
        );
        assert_eq!(
            gesture(&mut state, Gesture::Confirmed(true)),
            vec![UiEffect::Logout]
        );

        update(&mut state, UiEvent::LoggedOut(Ok(())));
        assert_eq!(state.screen, Screen::Auth(AuthForm::Login));
        assert!(state.user.is_none());
        assert!(state.tasks.tasks().is_empty());
        assert_eq!(state.notice, Some(Notice::success("Logged out successfully")));
    }

    #[test]
    fn test_auth_failure_switches_to_auth_view() {
        for err in [TaskError::Unauthenticated, TaskError::remote(401, "Unauthorized")] {
            let mut state = signed_in();
            let effects = update(&mut state, UiEvent::TasksLoaded(Err(err)));
            assert_eq!(effects, vec![UiEffect::DropSession]);
            assert_eq!(state.screen, Screen::Auth(AuthForm::Login));
            assert!(state.tasks.tasks().is_empty());
            assert_eq!(state.notice.as_ref().unwrap().kind, NoticeKind::Error);
        }
    }

    #[test]
    fn test_load_failure_empties_list_with_notice() {
        let mut state = signed_in();
        update(
            &mut state,
            UiEvent::TasksLoaded(Err(TaskError::Transport("connection refused".to_string()))),
        );
        assert!(state.tasks.tasks().is_empty());
        assert_eq!(
            state.notice,
            Some(Notice::error(
                "Failed to load tasks: Request failed: connection refused"
            ))
        );
    }

    #[test]
    fn test_new_notice_replaces_old() {
        let mut state = signed_in();
        state.notify(Notice::error("old"));
        update(
            &mut state,
            UiEvent::TaskMutated {
                action: TaskAction::Create,
                result: Ok(()),
            },
        );
        assert_eq!(state.notice, Some(Notice::success("Task created successfully!")));
    }

    #[test]
    fn test_edit_unknown_task_is_rejected() {
        let mut state = signed_in();
        let effects = gesture(
            &mut state,
            Gesture::EditSubmitted {
                id: "zzz".to_string(),
                patch: TaskPatch::complete(),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(
            state.notice,
            Some(Notice::error("Failed to update task: Task not found: zzz"))
        );
    }

    #[test]
    fn test_dismiss_clears_notice_only() {
        let mut state = signed_in();
        state.notify(Notice::success("Task created successfully!"));
        assert!(gesture(&mut state, Gesture::NoticeDismissed).is_empty());
        assert_eq!(state.notice, None);
        assert_eq!(state.screen, Screen::Tasks);
    }
}
