mod cli;

use clap::Parser;
use clap::error::ErrorKind;
use cli::{Cli, Command};
use std::rc::Rc;
use tabled::builder::Builder;
use tabled::{Table, Tabled};
use taskquest_core::Session;
use taskquest_core::calendar::DaySummary;
use taskquest_core::clock::SystemClock;
use taskquest_core::config::{self, ConfigOverrides};
use taskquest_core::error::AppError;
use taskquest_core::ledger;
use taskquest_core::model::{AVATARS, Challenge, Priority, Task, User};
use taskquest_core::storage::JsonStore;
use time::UtcOffset;
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const WEEKDAY_HEADER: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: &'static str,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

impl TaskRow {
    fn new(task: &Task, offset: UtcOffset) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority.label(),
            due: task.due_by.to_offset(offset).date().to_string(),
            status: status_label(task),
        }
    }
}

#[derive(Tabled)]
struct ChallengeRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Challenge")]
    title: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Reward")]
    reward: String,
    #[tabled(rename = "Done")]
    done: &'static str,
}

impl From<&Challenge> for ChallengeRow {
    fn from(challenge: &Challenge) -> Self {
        Self {
            kind: challenge.kind.to_string(),
            title: challenge.title.clone(),
            progress: format!("{}/{}", challenge.current_progress, challenge.goal),
            reward: format!("{} XP", challenge.reward_xp),
            done: if challenge.is_completed { "yes" } else { "no" },
        }
    }
}

fn status_label(task: &Task) -> &'static str {
    if task.is_completed {
        "completed"
    } else {
        "unfinished"
    }
}

fn print_tasks_plain(tasks: &[Task], offset: UtcOffset) {
    if tasks.is_empty() {
        println!("No tasks");
        return;
    }
    let rows: Vec<TaskRow> = tasks.iter().map(|task| TaskRow::new(task, offset)).collect();
    println!("{}", Table::new(rows));
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn print_task_details(task: &Task, offset: UtcOffset) {
    println!("ID: {}", task.id);
    println!("Title: {}", task.title);
    println!("Priority: {}", task.priority);
    println!("Status: {}", status_label(task));
    println!("Due: {}", task.due_by.to_offset(offset).date());
    println!("Created: {}", task.created_at.to_offset(offset));
    if let Some(completed_at) = task.completed_at {
        println!("Completed: {}", completed_at.to_offset(offset));
    }
}

fn print_profile(user: &User) {
    let picture = user.avatar().map(|avatar| avatar.emoji).unwrap_or("🙂");
    println!("{picture} {}", user.name);
    println!("Level: {}", user.level);
    println!("XP: {}", user.xp);
    println!("Completed: {}", user.tasks_completed);
    println!("Created: {}", user.created_at.date());
}

fn profile_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "name": user.name,
        "level": user.level,
        "xp": user.xp,
        "tasks_completed": user.tasks_completed,
        "current_picture": user.current_picture,
        "avatar": user.avatar().map(|avatar| avatar.emoji),
    })
}

fn calendar_cell(summary: &DaySummary) -> String {
    let day = summary.date.day();
    match (summary.task_count, summary.has_completed) {
        (0, _) => day.to_string(),
        (count, true) => format!("{day} ({count}✓)"),
        (count, false) => format!("{day} ({count})"),
    }
}

fn print_calendar(cells: &[Option<DaySummary>]) {
    let mut builder = Builder::default();
    builder.push_record(WEEKDAY_HEADER.map(String::from));
    for week in cells.chunks(7) {
        let mut row: Vec<String> = week
            .iter()
            .map(|cell| cell.as_ref().map(calendar_cell).unwrap_or_default())
            .collect();
        row.resize(7, String::new());
        builder.push_record(row);
    }
    println!("{}", builder.build());
}

fn open_session(overrides: &[String]) -> Result<Session, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        warn!(error = %err, "falling back to default configuration");
    }

    let mut parsed = ConfigOverrides::default();
    for raw in overrides {
        parsed.apply(raw)?;
    }
    let config = config::merge_overrides(&loaded.config, &parsed);

    let store = JsonStore::from_env()?;
    Session::open(Box::new(store), Rc::new(SystemClock), config)
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let mut session = open_session(&cli.config_override)?;
    let offset = session.offset();

    match cli.command {
        Command::Add {
            title,
            due,
            priority,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("title is required")),
            };
            let priority: Priority = priority.parse()?;
            let due_by = match due {
                Some(raw) => session.parse_due_by(&raw)?,
                None => session.now(),
            };

            let task = session.create_task(&title, due_by, priority)?;
            if cli.json {
                print_json(&task)?;
            } else {
                println!("Added task: {} ({})", task.title, task.id);
            }
        }
        Command::Toggle { id } => {
            let task = session.toggle_task(&id)?;
            if cli.json {
                print_json(&task)?;
            } else if task.is_completed {
                println!(
                    "Completed task: {} ({}) +{} XP",
                    task.title,
                    task.id,
                    ledger::XP_PER_TASK
                );
            } else {
                println!("Reopened task: {} ({})", task.title, task.id);
            }
        }
        Command::Delete { id } => {
            let task = session.delete_task(&id)?;
            if cli.json {
                print_json(&task)?;
            } else {
                println!("Deleted task: {} ({})", task.title, task.id);
            }
        }
        Command::Show { id } => {
            let task = session.get_task(&id)?;
            if cli.json {
                print_json(&task)?;
            } else {
                print_task_details(&task, offset);
            }
        }
        Command::List { filter } => {
            let tasks = session.list_tasks(filter.into());
            if cli.json {
                print_json(&tasks)?;
            } else {
                print_tasks_plain(&tasks, offset);
            }
        }
        Command::Day { date } => {
            let date = match date {
                Some(raw) => cli::parse_day(&raw)?,
                None => session.today(),
            };
            let tasks = session.tasks_due_on(date);
            if cli.json {
                print_json(&tasks)?;
            } else {
                println!("{date}");
                print_tasks_plain(&tasks, offset);
            }
        }
        Command::Calendar { month } => {
            let (year, month) = match month {
                Some(raw) => cli::parse_month(&raw)?,
                None => {
                    let today = session.today();
                    (today.year(), today.month())
                }
            };
            let cells = session.month_overview(year, month)?;
            if cli.json {
                let days: Vec<serde_json::Value> = cells
                    .iter()
                    .flatten()
                    .map(|summary| {
                        serde_json::json!({
                            "date": summary.date.to_string(),
                            "task_count": summary.task_count,
                            "has_completed": summary.has_completed,
                        })
                    })
                    .collect();
                print_json(&days)?;
            } else {
                println!("{month} {year}");
                print_calendar(&cells);
            }
        }
        Command::Challenges => {
            let report = session.refresh_challenges();
            let challenges = session.challenges();
            if cli.json {
                print_json(&serde_json::json!({
                    "challenges": challenges,
                    "completed": report.completed,
                    "expired": report.expired,
                    "generated": report.generated,
                }))?;
            } else {
                for challenge in &report.completed {
                    println!(
                        "Challenge completed: {} (+{} XP)",
                        challenge.title, challenge.reward_xp
                    );
                }
                let rows: Vec<ChallengeRow> = challenges.iter().map(ChallengeRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }
        Command::Profile => {
            let user = session.profile();
            if cli.json {
                print_json(&profile_json(&user))?;
            } else {
                print_profile(&user);
            }
        }
        Command::Avatars => {
            let user = session.user();
            if cli.json {
                let avatars: Vec<serde_json::Value> = AVATARS
                    .iter()
                    .map(|avatar| {
                        serde_json::json!({
                            "id": avatar.id,
                            "emoji": avatar.emoji,
                            "required_level": avatar.required_level,
                            "unlocked": avatar.unlocked_for(&user),
                        })
                    })
                    .collect();
                print_json(&avatars)?;
            } else {
                for avatar in AVATARS {
                    let lock = if avatar.unlocked_for(&user) {
                        ""
                    } else {
                        " (locked)"
                    };
                    println!(
                        "{} {} Lvl {}{}",
                        avatar.emoji, avatar.id, avatar.required_level, lock
                    );
                }
            }
        }
        Command::Avatar { id } => {
            let user = session.select_avatar(&id)?;
            if cli.json {
                print_json(&profile_json(&user))?;
            } else {
                let picture = user.avatar().map(|avatar| avatar.emoji).unwrap_or("🙂");
                println!("Avatar set: {picture}");
            }
        }
        Command::Rename { name } => {
            let user = session.rename_user(&name)?;
            if cli.json {
                print_json(&profile_json(&user))?;
            } else {
                println!("Renamed profile: {}", user.name);
            }
        }
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                err.exit();
            }
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
