use clap::{Parser, Subcommand, ValueEnum};
use taskquest_core::error::AppError;
use taskquest_core::model::TaskFilter;
use time::macros::format_description;
use time::{Date, Month};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskquest add "Buy milk" --due 2025-12-24 --priority high
    Add {
        title: Option<String>,
        /// Due date as YYYY-MM-DD or RFC3339 (defaults to now)
        #[arg(long)]
        due: Option<String>,
        /// high, medium or low
        #[arg(long, default_value = "medium")]
        priority: String,
    },
    /// Mark a task as completed, or reopen a completed one
    ///
    /// Example: taskquest toggle 3f1c...
    Toggle { id: String },
    /// Delete a task
    ///
    /// Example: taskquest delete 3f1c...
    Delete { id: String },
    /// Show details of a task
    Show { id: String },
    /// List tasks ordered by title
    ///
    /// Example: taskquest list unfinished
    List {
        #[arg(value_enum, default_value_t = ListFilter::All)]
        filter: ListFilter,
    },
    /// List tasks due on a day (defaults to today)
    ///
    /// Example: taskquest day 2025-12-24
    Day { date: Option<String> },
    /// Show a month grid with task counts
    ///
    /// Example: taskquest calendar --month 2025-12
    Calendar {
        #[arg(long, value_name = "YYYY-MM")]
        month: Option<String>,
    },
    /// Refresh and list daily and weekly challenges
    Challenges,
    /// Show the profile, applying pending level-ups
    Profile,
    /// List avatars and the level each one unlocks at
    Avatars,
    /// Pick an unlocked avatar
    ///
    /// Example: taskquest avatar star
    Avatar { id: String },
    /// Change the profile name
    Rename { name: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Completed,
    Unfinished,
}

impl From<ListFilter> for TaskFilter {
    fn from(filter: ListFilter) -> Self {
        match filter {
            ListFilter::All => TaskFilter::All,
            ListFilter::Completed => TaskFilter::Completed,
            ListFilter::Unfinished => TaskFilter::Unfinished,
        }
    }
}

/// Parse `YYYY-MM` into a year and month.
pub fn parse_month(raw: &str) -> Result<(i32, Month), AppError> {
    let (year_raw, month_raw) = raw
        .trim()
        .split_once('-')
        .ok_or_else(|| AppError::invalid_input("month must be YYYY-MM"))?;
    let year = year_raw
        .parse::<i32>()
        .map_err(|_| AppError::invalid_input("month must be YYYY-MM"))?;
    let month = month_raw
        .parse::<u8>()
        .ok()
        .and_then(|number| Month::try_from(number).ok())
        .ok_or_else(|| AppError::invalid_input("month must be between 01 and 12"))?;
    Ok((year, month))
}

pub fn parse_day(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input("date must be YYYY-MM-DD"))
}
