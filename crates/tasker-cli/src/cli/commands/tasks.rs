//! Task commands.

use anyhow::{Error, Result};
use chrono::{NaiveDate, Utc};
use tasker_core::tasks::parse_deadline;
use tasker_core::{NewTask, Priority, TaskFilter, TaskPatch, TaskSort};
use tasker_ui::{Gesture, Services, render};

use super::{StdinPrompter, report, signed_in};

pub struct AddArgs {
    pub name: String,
    pub description: String,
    pub deadline: Option<String>,
    pub priority: String,
}

pub struct EditArgs {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub priority: Option<String>,
}

pub async fn list(services: Services, filter: &str, sort: &str) -> Result<()> {
    let filter: TaskFilter = filter.parse().map_err(Error::msg)?;
    let sort: TaskSort = sort.parse().map_err(Error::msg)?;

    let mut runtime = signed_in(services, StdinPrompter::default()).await?;
    runtime.gesture(Gesture::FilterClicked(filter)).await;
    runtime.gesture(Gesture::SortChanged(sort)).await;

    print!("{}", render(runtime.state(), Utc::now()));
    Ok(())
}

pub async fn add(services: Services, args: AddArgs) -> Result<()> {
    let priority: Priority = args.priority.parse().map_err(Error::msg)?;
    let deadline = match args.deadline.as_deref() {
        Some(raw) => parse_deadline(raw).map_err(Error::msg)?,
        None => None,
    };
    let input = NewTask::new(args.name)
        .with_description(args.description)
        .with_deadline(deadline)
        .with_priority(priority);

    let mut runtime = signed_in(services, StdinPrompter::default()).await?;
    runtime.gesture(Gesture::AddSubmitted(input)).await;
    report(runtime.state())
}

pub async fn edit(services: Services, id: String, args: EditArgs) -> Result<()> {
    let patch = TaskPatch {
        name: args.name,
        description: args.description,
        deadline: parse_deadline_change(args.deadline.as_deref())?,
        priority: args
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()
            .map_err(Error::msg)?,
        status: None,
    };

    let mut runtime = signed_in(services, StdinPrompter::default()).await?;
    runtime.gesture(Gesture::EditSubmitted { id, patch }).await;
    report(runtime.state())
}

pub async fn complete(services: Services, id: String) -> Result<()> {
    let mut runtime = signed_in(services, StdinPrompter::default()).await?;
    runtime.gesture(Gesture::CompleteClicked { id }).await;
    report(runtime.state())
}

pub async fn delete(services: Services, id: String, yes: bool) -> Result<()> {
    let mut runtime = signed_in(services, StdinPrompter::new(yes)).await?;
    runtime.gesture(Gesture::DeleteClicked { id }).await;
    if runtime.state().notice.is_none() {
        println!("Cancelled.");
        return Ok(());
    }
    report(runtime.state())
}

/// `None` leaves the deadline alone; an empty value clears it.
pub(super) fn parse_deadline_change(raw: Option<&str>) -> Result<Option<Option<NaiveDate>>> {
    raw.map(parse_deadline).transpose().map_err(Error::msg)
}
