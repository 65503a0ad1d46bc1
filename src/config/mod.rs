pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::{Result, TriggerError};
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, Validate};
#[cfg(feature = "cli")]
use chrono::{DateTime, FixedOffset};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "semester-trigger")]
#[command(about = "Find courses whose term is old enough to trigger a lifecycle process")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "semester-trigger.toml")]
    pub config: String,

    /// CSV export of course field values (course_id,field,value); overrides [data] in the config
    #[arg(short, long)]
    pub data: Option<String>,

    /// Evaluate only this trigger
    #[arg(short, long)]
    pub trigger: Option<u64>,

    /// Evaluate as of this time (RFC 3339) instead of now
    #[arg(long)]
    pub now: Option<String>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Only show the computed boundaries, not the course ids
    #[arg(long)]
    pub dry_run: bool,

    /// Emit JSON log lines
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn parsed_now(&self) -> Result<Option<DateTime<FixedOffset>>> {
        self.now
            .as_deref()
            .map(|value| {
                DateTime::parse_from_rfc3339(value).map_err(|e| {
                    TriggerError::InvalidConfigValueError {
                        field: "now".to_string(),
                        value: value.to_string(),
                        reason: format!("Expected an RFC 3339 timestamp: {}", e),
                    }
                })
            })
            .transpose()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("config", &self.config)?;
        if let Some(data) = &self.data {
            validate_path("data", data)?;
        }
        self.parsed_now()?;
        Ok(())
    }
}
