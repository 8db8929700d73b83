//! Presentation layer for Tasker.
//!
//! Gestures go through a pure reducer (`update`) that mutates `AppState` and
//! returns effects; the `Runtime` executes effects against the gateways and
//! feeds the outcomes back. `render` turns the state into text.

pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod state;
pub mod update;

pub use effects::UiEffect;
pub use events::{Gesture, TaskAction, UiEvent};
pub use render::render;
pub use runtime::{AutoConfirm, Prompter, Runtime, Services};
pub use state::{AppState, AuthForm, Confirmation, Notice, NoticeKind, Screen, UserInfo};
