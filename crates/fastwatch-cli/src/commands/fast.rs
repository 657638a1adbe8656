use std::error::Error;

use clap::Subcommand;
use fastwatch_core::{goal, now_ms};

use super::common::{
    format_duration_ms, format_epoch_ms, load_config, open_components, parse_time_arg,
};

#[derive(Subcommand)]
pub enum FastAction {
    /// Start a fasting session
    Start {
        /// Goal id, e.g. "16:8" (defaults to the configured goal)
        #[arg(long)]
        goal: Option<String>,
        /// Backdated start time (RFC 3339, 'YYYY-MM-DD HH:MM', or epoch ms)
        #[arg(long)]
        at: Option<String>,
    },
    /// Stop the current fasting session
    Stop,
    /// Show the current session state
    Status {
        /// Print the raw snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the active session's start time and/or goal
    Update {
        /// New start time (RFC 3339, 'YYYY-MM-DD HH:MM', or epoch ms)
        #[arg(long)]
        start_time: Option<String>,
        /// New goal id, e.g. "18:6"
        #[arg(long)]
        goal: Option<String>,
    },
    /// Re-publish the current state to the companion device
    Sync,
}

pub fn run(action: FastAction) -> Result<(), Box<dyn Error>> {
    let components = open_components()?;
    match action {
        FastAction::Start { goal, at } => {
            let goal_id = match goal {
                Some(goal) => goal,
                None => load_config()?.default_goal_id,
            };
            let transition = match at {
                Some(raw) => components
                    .service
                    .start_fasting_at(&goal_id, parse_time_arg(&raw)?)?,
                None => components.service.start_fasting(&goal_id)?,
            };
            let snapshot = transition.current();
            println!(
                "Fasting started at {} with goal {}",
                format_epoch_ms(snapshot.start_time),
                snapshot.goal_id
            );
            Ok(())
        }
        FastAction::Stop => {
            components.service.stop_fasting()?;
            let last = components.store.history_all()?;
            if let Some(record) = last.first() {
                println!(
                    "Fast complete: {} ({} to {})",
                    format_duration_ms(record.duration_ms()),
                    format_epoch_ms(record.start_time_epoch_ms),
                    format_epoch_ms(record.end_time_epoch_ms),
                );
            }
            Ok(())
        }
        FastAction::Status { json } => {
            let snapshot = components.store.read();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                return Ok(());
            }
            if snapshot.is_fasting {
                let elapsed = now_ms() - snapshot.start_time;
                println!(
                    "Fasting ({}): {} elapsed since {}",
                    snapshot.goal_id,
                    format_duration_ms(elapsed),
                    format_epoch_ms(snapshot.start_time)
                );
                if let Some(goal_ms) = goal::duration_ms(&snapshot.goal_id) {
                    let remaining = goal_ms - elapsed;
                    if remaining > 0 {
                        println!("{} until the goal", format_duration_ms(remaining));
                    } else {
                        println!("Goal reached {} ago", format_duration_ms(-remaining));
                    }
                }
            } else {
                println!("Not fasting");
            }
            Ok(())
        }
        FastAction::Update { start_time, goal } => {
            let start_time_ms = start_time.map(|raw| parse_time_arg(&raw)).transpose()?;
            let transition = components
                .service
                .update_config(start_time_ms, goal.as_deref())?;
            let snapshot = transition.current();
            println!(
                "Session updated: goal {}, start {}",
                snapshot.goal_id,
                format_epoch_ms(snapshot.start_time)
            );
            Ok(())
        }
        FastAction::Sync => {
            components.service.sync_current_state()?;
            println!("Current state re-published");
            Ok(())
        }
    }
}
