pub mod report;
pub mod selector;
pub mod term;
pub mod trigger;

pub use crate::domain::model::{DueSelection, FieldDefinition, TriggerOutcome, TriggerSettings};
pub use crate::domain::ports::{FieldCatalog, FieldValueStore, SettingsStore};
pub use crate::utils::error::Result;
