use std::error::Error;

use clap::Subcommand;
use fastwatch_core::suggest::format_minutes_of_day;
use fastwatch_core::{Config, SuggestionMode};

use super::common::parse_minutes_arg;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration
    Show {
        /// Print the configuration as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change configuration values
    Set {
        /// Bedtime as HH:MM
        #[arg(long)]
        bedtime: Option<String>,
        /// Hours before bedtime to suggest starting
        #[arg(long)]
        bedtime_offset: Option<u32>,
        /// Fixed fallback start time as HH:MM
        #[arg(long)]
        fixed_start: Option<String>,
        /// Suggestion mode: auto, moving-average, bedtime, fixed
        #[arg(long)]
        mode: Option<String>,
        /// Enable or disable smart reminders
        #[arg(long)]
        smart_reminders: Option<bool>,
        /// Default goal id for `fast start`
        #[arg(long)]
        goal: Option<String>,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn Error>> {
    match action {
        ConfigAction::Show { json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
                return Ok(());
            }
            match config.bedtime_minutes {
                Some(minutes) => println!("bedtime: {}", format_minutes_of_day(minutes)),
                None => println!("bedtime: unset"),
            }
            println!("bedtime offset: {}h", config.bedtime_offset_hours);
            println!(
                "fixed start: {}",
                format_minutes_of_day(config.fixed_fasting_start_minutes)
            );
            println!("mode: {}", mode_name(config.smart_reminder_mode));
            println!("smart reminders: {}", config.smart_reminders_enabled);
            println!("default goal: {}", config.default_goal_id);
            Ok(())
        }
        ConfigAction::Set {
            bedtime,
            bedtime_offset,
            fixed_start,
            mode,
            smart_reminders,
            goal,
        } => {
            let mut config = Config::load()?;
            if let Some(raw) = bedtime {
                config.bedtime_minutes = Some(parse_minutes_arg(&raw)?);
            }
            if let Some(hours) = bedtime_offset {
                config.bedtime_offset_hours = hours;
            }
            if let Some(raw) = fixed_start {
                config.fixed_fasting_start_minutes = parse_minutes_arg(&raw)?;
            }
            if let Some(raw) = mode {
                config.smart_reminder_mode = parse_mode(&raw)?;
            }
            if let Some(enabled) = smart_reminders {
                config.smart_reminders_enabled = enabled;
            }
            if let Some(goal) = goal {
                if fastwatch_core::goal::duration_ms(&goal).is_none() {
                    return Err(format!("'{goal}' is not a valid goal id (try 16:8)").into());
                }
                config.default_goal_id = goal;
            }
            config.save()?;
            println!("Configuration saved");
            Ok(())
        }
    }
}

fn mode_name(mode: SuggestionMode) -> &'static str {
    match mode {
        SuggestionMode::Auto => "auto",
        SuggestionMode::MovingAverageOnly => "moving-average",
        SuggestionMode::BedtimeOnly => "bedtime",
        SuggestionMode::FixedTime => "fixed",
    }
}

fn parse_mode(raw: &str) -> Result<SuggestionMode, Box<dyn Error>> {
    match raw {
        "auto" => Ok(SuggestionMode::Auto),
        "moving-average" => Ok(SuggestionMode::MovingAverageOnly),
        "bedtime" => Ok(SuggestionMode::BedtimeOnly),
        "fixed" => Ok(SuggestionMode::FixedTime),
        other => Err(format!(
            "unknown mode '{other}' (expected auto, moving-average, bedtime, or fixed)"
        )
        .into()),
    }
}
