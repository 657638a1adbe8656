use std::error::Error;

use clap::Subcommand;
use fastwatch_core::suggest::format_minutes_of_day;
use fastwatch_core::SuggestionEngine;

use super::common::{format_epoch_ms, load_config, open_components};

#[derive(Subcommand)]
pub enum SuggestAction {
    /// Show the suggested next fasting start time
    Show {
        /// Print the suggestion as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SuggestAction) -> Result<(), Box<dyn Error>> {
    match action {
        SuggestAction::Show { json } => {
            let components = open_components()?;
            let engine = SuggestionEngine::new(components.store.clone(), load_config()?);
            let suggestion = engine.compute_suggested_start()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&suggestion)?);
                return Ok(());
            }
            println!(
                "Suggested start: {} (next at {})",
                format_minutes_of_day(suggestion.minutes_of_day),
                format_epoch_ms(suggestion.time_ms),
            );
            println!("Based on {}", suggestion.reasoning);
            Ok(())
        }
    }
}
