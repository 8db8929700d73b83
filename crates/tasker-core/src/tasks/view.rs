//! In-memory task collection with filter and sort selection.
//!
//! The view model never performs I/O. It is refilled wholesale after every
//! gateway round-trip and derives the display projection on demand.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::{Task, TaskStatus};

/// Which tasks the projection keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl TaskFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Pending => task.status == TaskStatus::Pending,
            TaskFilter::Completed => task.status == TaskStatus::Completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Pending => "pending",
            TaskFilter::Completed => "completed",
        }
    }

    pub fn all() -> &'static [TaskFilter] {
        &[TaskFilter::All, TaskFilter::Pending, TaskFilter::Completed]
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(format!(
                "Unknown filter: {value} (expected all, pending, or completed)"
            )),
        }
    }
}

/// Ordering applied to the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    #[default]
    Newest,
    Oldest,
    Name,
}

impl TaskSort {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskSort::Newest => "newest",
            TaskSort::Oldest => "oldest",
            TaskSort::Name => "name",
        }
    }

    pub fn all() -> &'static [TaskSort] {
        &[TaskSort::Newest, TaskSort::Oldest, TaskSort::Name]
    }

    /// Total order used by the projection. Ties fall back to `id`.
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        let primary = match self {
            TaskSort::Newest => b.created_at.cmp(&a.created_at),
            TaskSort::Oldest => a.created_at.cmp(&b.created_at),
            TaskSort::Name => collate(&a.name, &b.name),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl fmt::Display for TaskSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskSort {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "name" => Ok(Self::Name),
            _ => Err(format!(
                "Unknown sort: {value} (expected newest, oldest, or name)"
            )),
        }
    }
}

/// Locale-style string comparison: case-insensitive first, then lowercase
/// before uppercase, then code points.
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// Task counts derived from the full collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskSummary {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

/// Filtered, ordered view of a task collection.
///
/// Borrowed from the collection it was derived from; iterate it as many times
/// as needed.
#[derive(Debug, Clone)]
pub struct Projection<'a> {
    items: Vec<&'a Task>,
}

impl<'a> Projection<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.items.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'p, 'a> IntoIterator for &'p Projection<'a> {
    type Item = &'a Task;
    type IntoIter = std::iter::Copied<std::slice::Iter<'p, &'a Task>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter().copied()
    }
}

/// Filters `tasks` by `filter`, then orders by `sort`.
pub fn project(tasks: &[Task], filter: TaskFilter, sort: TaskSort) -> Projection<'_> {
    let mut items: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t)).collect();
    items.sort_by(|a, b| sort.compare(a, b));
    Projection { items }
}

/// Holds the current task collection and display selection.
#[derive(Debug, Clone, Default)]
pub struct TaskViewModel {
    tasks: Vec<Task>,
    filter: TaskFilter,
    sort: TaskSort,
}

impl TaskViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held collection.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Drops the collection and resets the selection (logout teardown).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, sort: TaskSort) {
        self.sort = sort;
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn sort(&self) -> TaskSort {
        self.sort
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn projection(&self) -> Projection<'_> {
        project(&self.tasks, self.filter, self.sort)
    }

    /// Counts over the whole collection, ignoring the filter.
    pub fn summary(&self) -> TaskSummary {
        let pending = self
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .count();
        TaskSummary {
            total: self.tasks.len(),
            pending,
            completed: self.tasks.len() - pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::tasks::Priority;

    fn task(id: &str, name: &str, status: TaskStatus, minute: u32) -> Task {
        Task {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            deadline: None,
            priority: Priority::Medium,
            status,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 10, minute, 0).unwrap(),
            user_id: None,
        }
    }

    fn mixed() -> Vec<Task> {
        vec![
            task("a", "walk dog", TaskStatus::Pending, 5),
            task("b", "Buy milk", TaskStatus::Completed, 1),
            task("c", "apples", TaskStatus::Pending, 9),
            task("d", "Zebra crossing", TaskStatus::Completed, 3),
            task("e", "buy milk", TaskStatus::Pending, 7),
        ]
    }

    fn ids(projection: &Projection<'_>) -> Vec<String> {
        projection.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_filter_keeps_only_matching_status() {
        let tasks = mixed();
        for &filter in TaskFilter::all() {
            for &sort in TaskSort::all() {
                let projection = project(&tasks, filter, sort);
                assert!(projection.iter().all(|t| filter.matches(t)));
            }
        }
        assert_eq!(project(&tasks, TaskFilter::All, TaskSort::Newest).len(), 5);
        assert_eq!(
            project(&tasks, TaskFilter::Pending, TaskSort::Newest).len(),
            3
        );
        assert_eq!(
            project(&tasks, TaskFilter::Completed, TaskSort::Newest).len(),
            2
        );
    }

    #[test]
    fn test_name_sort_is_non_decreasing() {
        let tasks = mixed();
        let projection = project(&tasks, TaskFilter::All, TaskSort::Name);
        let names: Vec<&str> = projection.iter().map(|t| t.name.as_str()).collect();
        assert!(
            names
                .windows(2)
                .all(|w| collate(w[0], w[1]) != Ordering::Greater)
        );
        assert_eq!(
            names,
            vec!["apples", "buy milk", "Buy milk", "walk dog", "Zebra crossing"]
        );
    }

    #[test]
    fn test_newest_and_oldest_order_by_created_at() {
        let tasks = vec![
            task("t1", "first", TaskStatus::Pending, 1),
            task("t2", "second", TaskStatus::Pending, 2),
        ];
        assert_eq!(
            ids(&project(&tasks, TaskFilter::All, TaskSort::Newest)),
            vec!["t2", "t1"]
        );
        assert_eq!(
            ids(&project(&tasks, TaskFilter::All, TaskSort::Oldest)),
            vec!["t1", "t2"]
        );
    }

    #[test]
    fn test_ties_break_on_id() {
        let tasks = vec![
            task("z", "same", TaskStatus::Pending, 1),
            task("m", "same", TaskStatus::Pending, 1),
            task("a", "same", TaskStatus::Pending, 1),
        ];
        for &sort in TaskSort::all() {
            assert_eq!(
                ids(&project(&tasks, TaskFilter::All, sort)),
                vec!["a", "m", "z"]
            );
        }
    }

    #[test]
    fn test_projection_is_restartable() {
        let mut vm = TaskViewModel::new();
        vm.set_tasks(mixed());
        let projection = vm.projection();
        let first: Vec<_> = projection.iter().collect();
        let second: Vec<_> = (&projection).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_counts_whole_collection() {
        let mut vm = TaskViewModel::new();
        vm.set_tasks(mixed());
        vm.set_filter(TaskFilter::Completed);
        assert_eq!(
            vm.summary(),
            TaskSummary {
                total: 5,
                pending: 3,
                completed: 2
            }
        );
    }

    #[test]
    fn test_selection_changes_projection_only() {
        let mut vm = TaskViewModel::new();
        vm.set_tasks(mixed());
        vm.set_filter(TaskFilter::Pending);
        vm.set_sort(TaskSort::Oldest);
        assert_eq!(ids(&vm.projection()), vec!["a", "e", "c"]);
        assert_eq!(vm.tasks().len(), 5);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut vm = TaskViewModel::new();
        vm.set_tasks(mixed());
        vm.set_sort(TaskSort::Name);
        vm.clear();
        assert!(vm.tasks().is_empty());
        assert_eq!(vm.sort(), TaskSort::Newest);
        assert_eq!(vm.filter(), TaskFilter::All);
    }

    #[test]
    fn test_filter_and_sort_parse() {
        assert_eq!("Completed".parse::<TaskFilter>().unwrap(), TaskFilter::Completed);
        assert_eq!("name".parse::<TaskSort>().unwrap(), TaskSort::Name);
        assert!("random".parse::<TaskSort>().is_err());
    }
}
