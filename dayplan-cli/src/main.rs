use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use dayplan_core::time::{local_today, parse_tz};
use dayplan_core::{
    project, CompletionOutcome, DayPlan, FileKv, PlannerBackend, Toggle, ToggleReport,
};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod http;
mod prompt;
mod state;

use http::HttpBackend;
use prompt::StdinPrompt;

#[derive(Parser, Debug)]
#[command(
    name = "dayplan",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("DAYPLAN_BUILD_SHA"), ")"),
    about = "Track today's planned sessions and task progress"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show today's schedule with checkmarks and per-task progress
    Today,

    /// Mark a session done (or undo it) by its number in `dayplan today`
    Toggle {
        /// 1-based session number
        number: usize,
    },

    /// Ask the scheduler for a fresh plan and clear today's checkmarks
    Regenerate,

    /// Open the completion prompt for a task directly
    Complete { task_id: String },

    /// Show a multi-day session breakdown for one task
    Project { task_id: String },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default ~/.dayplan/config.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
        },

        Command::Today => {
            let env = Env::load()?;
            let plan = env.open_plan().await?;
            print_plan(&plan);
        }

        Command::Toggle { number } => {
            let index = number
                .checked_sub(1)
                .context("session numbers start at 1")?;
            let env = Env::load()?;
            let mut plan = env.open_plan().await?;
            let report = plan.toggle(index, &mut StdinPrompt)?;
            print_toggle(&plan, &report);
            plan.settle().await;
        }

        Command::Regenerate => {
            let env = Env::load()?;
            let plan = env.open_regenerated().await?;
            print_plan(&plan);
        }

        Command::Complete { task_id } => {
            let env = Env::load()?;
            let mut plan = env.open_plan().await?;
            let outcome = plan.complete(&task_id, &mut StdinPrompt)?;
            print_outcome(&outcome);
            plan.settle().await;
        }

        Command::Project { task_id } => {
            let env = Env::load()?;
            let task = env
                .backend
                .fetch_task(&task_id)
                .await
                .with_context(|| format!("fetch task {task_id}"))?;
            let sessions = project(&task, env.now, env.tz);

            println!("# {} ({} min)\n", task.title, task.estimated_duration);
            for s in &sessions {
                println!(
                    "- {}  {:>4} min  {}",
                    s.date.format("%a %b %-d"),
                    s.duration,
                    s.focus
                );
            }
            if sessions.len() > 1 {
                println!(
                    "\nSplitting \"{}\" into {} sessions.",
                    task.title,
                    sessions.len()
                );
            }
        }
    }

    Ok(())
}

/// Config-derived context shared by the commands that talk to the backend.
struct Env {
    user_id: String,
    tz: Tz,
    now: DateTime<Utc>,
    today: NaiveDate,
    backend: Arc<dyn PlannerBackend>,
}

impl Env {
    fn load() -> Result<Self> {
        let cfg = config::load_config()?;
        let tz = parse_tz(&cfg.schedule.timezone)?;
        let now = Utc::now();
        Ok(Self {
            user_id: cfg.api.user_id,
            tz,
            now,
            today: local_today(now, tz),
            backend: Arc::new(HttpBackend::new(cfg.api.base_url)),
        })
    }

    /// Today's plan; the scheduler only runs on the day's first call.
    async fn open_plan(&self) -> Result<DayPlan<FileKv>> {
        let kv = FileKv::new(state::completion_state_path()?);
        DayPlan::open(self.backend.clone(), kv, self.user_id.as_str(), self.today).await
    }

    async fn open_regenerated(&self) -> Result<DayPlan<FileKv>> {
        let kv = FileKv::new(state::completion_state_path()?);
        DayPlan::open_regenerated(self.backend.clone(), kv, self.user_id.as_str(), self.today)
            .await
    }
}

fn print_plan(plan: &DayPlan<FileKv>) {
    let schedule = plan.schedule();
    println!("# Plan for {}\n", schedule.date());

    if schedule.is_empty() {
        println!("Your schedule is empty. Try: dayplan regenerate");
        return;
    }

    for (i, s) in schedule.sessions().iter().enumerate() {
        let mark = if plan.is_completed(i) { "x" } else { " " };
        println!(
            "[{mark}] {:>2}. {:<17}  {}  ({} min)",
            i + 1,
            s.time_range(),
            s.title,
            s.duration
        );
    }

    println!("\n## Progress\n");
    for task_id in schedule.task_ids() {
        let title = plan
            .board()
            .get(task_id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| task_id.to_string());
        let pct = plan.progress(task_id).unwrap_or(0);
        println!("{:>3}% {} {}", pct, progress_bar(pct), title);
    }

    let awaiting: Vec<&str> = plan.awaiting_confirmation().collect();
    if !awaiting.is_empty() {
        println!("\n## Awaiting confirmation\n");
        for task_id in awaiting {
            println!("- {task_id}: finish with `dayplan complete {task_id}`");
        }
    }
}

fn print_toggle(plan: &DayPlan<FileKv>, report: &ToggleReport) {
    let verb = match report.toggle {
        Toggle::Checked => "Checked",
        Toggle::Unchecked => "Unchecked",
    };
    let title = plan
        .schedule()
        .get(report.index)
        .map(|s| s.title.as_str())
        .unwrap_or("?");
    println!("{verb} session {}: {title}", report.index + 1);

    if let Some(rec) = &report.reconciliation {
        println!(
            "{}/{} sessions done, progress {}%",
            rec.completed_sessions,
            rec.total_sessions,
            rec.progress.map(|p| p.to_string()).unwrap_or_else(|| "-".into())
        );
    }
    if let Some(outcome) = &report.completion {
        print_outcome(outcome);
    }
}

fn print_outcome(outcome: &CompletionOutcome) {
    match outcome {
        CompletionOutcome::Confirmed {
            task_id,
            actual_minutes,
        } => println!("Task {task_id} completed ({actual_minutes} min)."),
        CompletionOutcome::Dismissed { task_id } => println!(
            "Task {task_id} left open. Finish it later with: dayplan complete {task_id}"
        ),
    }
}

fn progress_bar(pct: u8) -> String {
    const WIDTH: usize = 20;
    let filled = (pct as usize * WIDTH) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn toggle_takes_a_one_based_number() {
        let cli = Cli::try_parse_from(["dayplan", "toggle", "3"]).unwrap();
        assert!(matches!(cli.command, Command::Toggle { number: 3 }));
    }

    #[test]
    fn progress_bar_scales_to_width() {
        assert_eq!(progress_bar(0), format!("[{}]", "-".repeat(20)));
        assert_eq!(progress_bar(50), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
        assert_eq!(progress_bar(100), format!("[{}]", "#".repeat(20)));
    }
}
