use crate::error::AppError;
use crate::model::Task;
use crate::period::local_date;
use time::{Date, Month, UtcOffset};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub date: Date,
    pub task_count: usize,
    pub has_completed: bool,
}

/// Tasks due on `date` in the given offset, ordered by title.
pub fn tasks_due_on(tasks: &[Task], date: Date, offset: UtcOffset) -> Vec<Task> {
    let mut due: Vec<Task> = tasks
        .iter()
        .filter(|task| local_date(task.due_by, offset) == date)
        .cloned()
        .collect();
    due.sort_by(|a, b| a.title.cmp(&b.title));
    due
}

pub fn day_summary(tasks: &[Task], date: Date, offset: UtcOffset) -> DaySummary {
    let mut task_count = 0;
    let mut has_completed = false;
    for task in tasks
        .iter()
        .filter(|task| local_date(task.due_by, offset) == date)
    {
        task_count += 1;
        has_completed |= task.is_completed;
    }

    DaySummary {
        date,
        task_count,
        has_completed,
    }
}

/// Days of the month laid out in Sunday-first weeks. Leading `None` cells pad
/// the first week up to the weekday of the 1st.
pub fn month_grid(year: i32, month: Month) -> Result<Vec<Option<Date>>, AppError> {
    let first = Date::from_calendar_date(year, month, 1)
        .map_err(|err| AppError::invalid_input(err.to_string()))?;
    let padding = usize::from(first.weekday().number_days_from_sunday());

    let mut cells: Vec<Option<Date>> = vec![None; padding];
    let mut day = Some(first);
    while let Some(current) = day
        && current.month() == month
    {
        cells.push(Some(current));
        day = current.next_day();
    }

    Ok(cells)
}

pub fn month_overview(
    tasks: &[Task],
    year: i32,
    month: Month,
    offset: UtcOffset,
) -> Result<Vec<Option<DaySummary>>, AppError> {
    Ok(month_grid(year, month)?
        .into_iter()
        .map(|cell| cell.map(|date| day_summary(tasks, date, offset)))
        .collect())
}
