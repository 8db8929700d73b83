//! Presentation state.
//!
//! ```text
//! AppState
//! ├── screen: Screen            (auth forms or the task list)
//! ├── user: Option<UserInfo>    (header identity)
//! ├── tasks: TaskViewModel      (collection + filter/sort)
//! ├── notice: Option<Notice>    (last transient message)
//! ├── confirmation: Option<Confirmation>
//! └── loading: bool
//! ```

use tasker_core::{Session, TaskViewModel};

/// Which auth form is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthForm {
    #[default]
    Login,
    SignUp,
    Verify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth(AuthForm),
    Tasks,
}

impl Default for Screen {
    fn default() -> Self {
        Screen::Auth(AuthForm::Login)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message; replaced by the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Destructive action awaiting an explicit yes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    DeleteTask { id: String },
    Logout,
}

impl Confirmation {
    pub fn prompt(&self) -> &'static str {
        match self {
            Confirmation::DeleteTask { .. } => "Are you sure you want to delete this task?",
            Confirmation::Logout => "Are you sure you want to logout?",
        }
    }
}

/// Header identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
}

impl From<&Session> for UserInfo {
    fn from(session: &Session) -> Self {
        Self {
            name: session.label().to_string(),
            email: session
                .email
                .clone()
                .unwrap_or_else(|| session.username.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub screen: Screen,
    pub user: Option<UserInfo>,
    pub tasks: TaskViewModel,
    pub notice: Option<Notice>,
    pub confirmation: Option<Confirmation>,
    pub loading: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_signed_in(&self) -> bool {
        self.screen == Screen::Tasks
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Returns to the auth view and drops everything tied to the session.
    pub fn sign_out(&mut self) {
        self.screen = Screen::Auth(AuthForm::Login);
        self.user = None;
        self.tasks.clear();
        self.confirmation = None;
        self.loading = false;
    }
}
