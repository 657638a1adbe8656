use std::error::Error;

use clap::Subcommand;

use super::common::{format_duration_ms, format_epoch_ms, open_components, parse_time_arg};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List completed fasting sessions, newest first
    List {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete one record by its start time
    Delete {
        /// Start time of the record (RFC 3339, 'YYYY-MM-DD HH:MM', or epoch ms)
        start: String,
    },
    /// Delete every record
    Clear,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn Error>> {
    let components = open_components()?;
    match action {
        HistoryAction::List { json, limit } => {
            let mut records = components.store.history_all()?;
            if let Some(limit) = limit {
                records.truncate(limit);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            if records.is_empty() {
                println!("No completed fasts");
                return Ok(());
            }
            for record in &records {
                println!(
                    "{}  {}  goal {}",
                    format_epoch_ms(record.start_time_epoch_ms),
                    format_duration_ms(record.duration_ms()),
                    record.goal_id,
                );
            }
            Ok(())
        }
        HistoryAction::Delete { start } => {
            let start_ms = parse_time_arg(&start)?;
            if components.store.delete_history(start_ms)? {
                println!("Record deleted");
            } else {
                println!("No record starts at {}", format_epoch_ms(start_ms));
            }
            Ok(())
        }
        HistoryAction::Clear => {
            let removed = components.store.clear_history()?;
            println!("Deleted {removed} record(s)");
            Ok(())
        }
    }
}
