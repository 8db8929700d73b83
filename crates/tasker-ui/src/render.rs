//! Plain-text rendering of the presentation state.
//!
//! Rendering is a pure function of state and the current time; the caller
//! decides where the text goes.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, Utc};
use tasker_core::{Task, TaskFilter, TaskSort, TaskSummary};

use crate::state::{AppState, AuthForm, Notice, NoticeKind, Screen};

/// Renders the whole screen.
pub fn render(state: &AppState, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    match state.screen {
        Screen::Auth(form) => render_auth(&mut out, form),
        Screen::Tasks => render_tasks(&mut out, state, now),
    }
    if let Some(notice) = &state.notice {
        let _ = writeln!(out, "\n{}", render_notice(notice));
    }
    out
}

pub fn render_notice(notice: &Notice) -> String {
    match notice.kind {
        NoticeKind::Success => format!("✓ {}", notice.text),
        NoticeKind::Error => format!("✗ {}", notice.text),
    }
}

fn render_auth(out: &mut String, form: AuthForm) {
    let (title, hint) = match form {
        AuthForm::Login => ("Log in", "login <email> <password>  |  signup"),
        AuthForm::SignUp => ("Sign up", "signup <email> <password> <name>  |  login"),
        AuthForm::Verify => ("Verify your email", "verify <6-digit code>  |  resend"),
    };
    let _ = writeln!(out, "Tasker · {title}");
    let _ = writeln!(out, "  {hint}");
}

fn render_tasks(out: &mut String, state: &AppState, now: DateTime<Utc>) {
    if let Some(user) = &state.user {
        let _ = writeln!(out, "{} <{}>", user.name, user.email);
    }
    let _ = writeln!(out, "{}", summary_line(state.tasks.summary()));
    let _ = writeln!(
        out,
        "{}",
        selection_line(state.tasks.filter(), state.tasks.sort())
    );

    let projection = state.tasks.projection();
    let _ = writeln!(out, "{}", count_line(projection.len()));

    if projection.is_empty() {
        let _ = writeln!(out, "\nNo tasks yet. Add one to get started!");
        return;
    }
    for task in &projection {
        let _ = writeln!(out);
        render_card(out, task, now);
    }
}

pub fn summary_line(summary: TaskSummary) -> String {
    format!(
        "{} total • {} pending • {} completed",
        summary.total, summary.pending, summary.completed
    )
}

fn selection_line(filter: TaskFilter, sort: TaskSort) -> String {
    let filters: Vec<String> = TaskFilter::all()
        .iter()
        .map(|f| {
            if *f == filter {
                format!("[{f}]")
            } else {
                f.to_string()
            }
        })
        .collect();
    format!("Filter: {}  Sort: {sort}", filters.join(" "))
}

pub fn count_line(count: usize) -> String {
    if count == 1 {
        "1 task".to_string()
    } else {
        format!("{count} tasks")
    }
}

fn render_card(out: &mut String, task: &Task, now: DateTime<Utc>) {
    let status = if task.is_completed() {
        "✓ Completed"
    } else {
        "○ Pending"
    };
    let _ = writeln!(
        out,
        "[{}] {}  {status}",
        task.priority.as_str().to_uppercase(),
        task.name
    );
    if !task.description.trim().is_empty() {
        let _ = writeln!(out, "    {}", task.description.trim());
    }
    let _ = writeln!(
        out,
        "    Due {} · Created {}",
        format_deadline(task.deadline),
        format_relative(task.created_at, now)
    );
    let _ = writeln!(out, "    id: {}", task.id);
}

/// `Mon D, YYYY`, or `No deadline`.
pub fn format_deadline(deadline: Option<NaiveDate>) -> String {
    deadline.map_or_else(
        || "No deadline".to_string(),
        |d| d.format("%b %-d, %Y").to_string(),
    )
}

/// Relative time for the last week, absolute date and time after that.
pub fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        ago(minutes, "minute")
    } else if hours < 24 {
        ago(hours, "hour")
    } else if days < 7 {
        ago(days, "day")
    } else {
        at.format("%b %-d, %Y, %I:%M %p").to_string()
    }
}

fn ago(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}
