use crate::error::AppError;
use crate::model::{Priority, Task, TaskFilter};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time, UtcOffset};
use uuid::Uuid;

/// What a toggle did to the task's completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Completed,
    Reopened,
}

pub fn create(
    tasks: &mut Vec<Task>,
    title: &str,
    due_by: OffsetDateTime,
    priority: Priority,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("title is required"));
    }

    let task = Task {
        id: Uuid::new_v4().to_string(),
        title: trimmed.to_string(),
        is_completed: false,
        priority,
        due_by,
        created_at: now,
        completed_at: None,
    };
    tasks.push(task.clone());

    Ok(task)
}

pub fn position(tasks: &[Task], id: &str) -> Result<usize, AppError> {
    let trimmed_id = id.trim();
    if trimmed_id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }

    tasks
        .iter()
        .position(|task| task.id == trimmed_id)
        .ok_or_else(|| AppError::invalid_input("task not found"))
}

pub fn get<'a>(tasks: &'a [Task], id: &str) -> Result<&'a Task, AppError> {
    let index = position(tasks, id)?;
    Ok(&tasks[index])
}

/// Flips completion. Reopening clears `completed_at` so a stale timestamp can
/// never count toward a later challenge window.
pub fn toggle(task: &mut Task, now: OffsetDateTime) -> Transition {
    if task.is_completed {
        task.is_completed = false;
        task.completed_at = None;
        Transition::Reopened
    } else {
        task.is_completed = true;
        task.completed_at = Some(now);
        Transition::Completed
    }
}

pub fn delete(tasks: &mut Vec<Task>, id: &str) -> Result<Task, AppError> {
    let index = position(tasks, id)?;
    Ok(tasks.remove(index))
}

pub fn list(tasks: &[Task], filter: TaskFilter) -> Vec<Task> {
    let mut listed: Vec<Task> = tasks
        .iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect();
    listed.sort_by(|a, b| a.title.cmp(&b.title));
    listed
}

pub fn active_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| !task.is_completed).count()
}

/// Accepts `YYYY-MM-DD` (local midnight) or a full RFC 3339 timestamp.
pub fn parse_due_by(raw: &str, offset: UtcOffset) -> Result<OffsetDateTime, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("due date is required"));
    }

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(parsed);
    }

    let date = Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input("due date must be YYYY-MM-DD or RFC3339"))?;
    Ok(date.with_time(Time::MIDNIGHT).assume_offset(offset))
}

#[cfg(test)]
mod tests {
    use super::{Transition, active_count, create, delete, get, list, parse_due_by, toggle};
    use crate::model::{Priority, Task, TaskFilter};
    use time::macros::{datetime, offset};
    use time::{OffsetDateTime, UtcOffset};

    fn task(id: &str, title: &str, is_completed: bool) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            is_completed,
            priority: Priority::Medium,
            due_by: datetime!(2025-12-20 00:00 UTC),
            created_at: datetime!(2025-12-01 00:00 UTC),
            completed_at: is_completed.then_some(datetime!(2025-12-02 00:00 UTC)),
        }
    }

    fn now() -> OffsetDateTime {
        datetime!(2025-12-17 10:00 UTC)
    }

    #[test]
    fn create_rejects_blank_title() {
        let mut tasks = Vec::new();
        let err = create(&mut tasks, "   ", now(), Priority::Low, now()).unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert!(tasks.is_empty());
    }

    #[test]
    fn create_trims_title_and_sets_defaults() {
        let mut tasks = Vec::new();
        let created = create(&mut tasks, "  water plants ", now(), Priority::High, now()).unwrap();

        assert_eq!(created.title, "water plants");
        assert!(!created.is_completed);
        assert_eq!(created.priority, Priority::High);
        assert_eq!(created.created_at, now());
        assert_eq!(created.completed_at, None);
        assert_eq!(tasks, vec![created]);
    }

    #[test]
    fn create_assigns_unique_ids() {
        let mut tasks = Vec::new();
        let first = create(&mut tasks, "a", now(), Priority::Medium, now()).unwrap();
        let second = create(&mut tasks, "b", now(), Priority::Medium, now()).unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn toggle_sets_and_clears_completed_at() {
        let mut item = task("task-1", "demo", false);

        assert_eq!(toggle(&mut item, now()), Transition::Completed);
        assert!(item.is_completed);
        assert_eq!(item.completed_at, Some(now()));

        assert_eq!(toggle(&mut item, now()), Transition::Reopened);
        assert!(!item.is_completed);
        assert_eq!(item.completed_at, None);
    }

    #[test]
    fn delete_removes_task() {
        let mut tasks = vec![task("task-1", "a", false), task("task-2", "b", false)];
        let removed = delete(&mut tasks, "task-1").unwrap();

        assert_eq!(removed.id, "task-1");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "task-2");
    }

    #[test]
    fn delete_rejects_missing_and_blank_ids() {
        let mut tasks = vec![task("task-1", "a", false)];

        assert_eq!(delete(&mut tasks, "task-9").unwrap_err().code(), "invalid_input");
        assert_eq!(delete(&mut tasks, "  ").unwrap_err().code(), "invalid_input");
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn get_trims_id() {
        let tasks = vec![task("task-1", "a", false)];
        assert_eq!(get(&tasks, " task-1 ").unwrap().title, "a");
    }

    #[test]
    fn list_filters_and_orders_by_title() {
        let tasks = vec![
            task("task-1", "walk dog", false),
            task("task-2", "buy milk", true),
            task("task-3", "answer mail", false),
        ];

        let all: Vec<String> = list(&tasks, TaskFilter::All)
            .into_iter()
            .map(|task| task.title)
            .collect();
        assert_eq!(all, vec!["answer mail", "buy milk", "walk dog"]);

        let completed = list(&tasks, TaskFilter::Completed);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, "task-2");

        let unfinished: Vec<String> = list(&tasks, TaskFilter::Unfinished)
            .into_iter()
            .map(|task| task.id)
            .collect();
        assert_eq!(unfinished, vec!["task-3", "task-1"]);
    }

    #[test]
    fn active_count_counts_unfinished_only() {
        let tasks = vec![
            task("task-1", "a", false),
            task("task-2", "b", true),
            task("task-3", "c", false),
        ];
        assert_eq!(active_count(&tasks), 2);
    }

    #[test]
    fn parse_due_by_accepts_plain_date_at_local_midnight() {
        let parsed = parse_due_by("2025-12-24", offset!(+2)).unwrap();
        assert_eq!(parsed, datetime!(2025-12-24 00:00 +02:00));
    }

    #[test]
    fn parse_due_by_accepts_rfc3339() {
        let parsed = parse_due_by("2025-12-24T15:30:00Z", UtcOffset::UTC).unwrap();
        assert_eq!(parsed, datetime!(2025-12-24 15:30 UTC));
    }

    #[test]
    fn parse_due_by_rejects_garbage() {
        let err = parse_due_by("next tuesday", UtcOffset::UTC).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }
}
