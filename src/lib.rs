pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, OutputFormat};

pub use crate::adapters::MemoryStore;
pub use crate::config::toml_config::TomlConfig;
pub use crate::core::{
    selector::DueCourseSelector,
    term::{Season, SeasonStartMonths, Term},
    trigger::SemesterTrigger,
};
pub use crate::utils::error::{Result, TriggerError};
