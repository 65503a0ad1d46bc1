use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("The configured custom field '{field}' is missing")]
    MissingField { field: String },

    #[error("The custom field type '{field_type}' is not available")]
    MissingFieldType { field_type: String },

    #[error("Invalid delay '{value}': the amount of months must be a positive integer value between 1 and 999")]
    InvalidDelay { value: String },

    #[error("Trigger not found: {trigger_id}")]
    TriggerNotFound { trigger_id: u64 },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TriggerError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TriggerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TriggerError::MissingField { .. }
            | TriggerError::MissingFieldType { .. }
            | TriggerError::TriggerNotFound { .. }
            | TriggerError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            TriggerError::InvalidDelay { .. } | TriggerError::InvalidConfigValueError { .. } => {
                ErrorCategory::Validation
            }
            TriggerError::CsvError(_) | TriggerError::SerializationError(_) => ErrorCategory::Data,
            TriggerError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            TriggerError::MissingField { field } => format!(
                "Create a custom course field '{}' of type \"semester\" or point the trigger at an existing one",
                field
            ),
            TriggerError::MissingFieldType { field_type } => format!(
                "Install the '{}' custom field type before configuring this trigger",
                field_type
            ),
            TriggerError::InvalidDelay { .. } => {
                "Use a delay between 1 and 999 months".to_string()
            }
            TriggerError::TriggerNotFound { .. } => {
                "Check the trigger ids listed in the configuration file".to_string()
            }
            TriggerError::InvalidConfigValueError { field, .. }
            | TriggerError::ConfigValidationError { field, .. } => {
                format!("Check the '{}' entry in the configuration file", field)
            }
            TriggerError::CsvError(_) => {
                "Make sure the data file has the columns course_id,field,value".to_string()
            }
            TriggerError::SerializationError(_) => {
                "Retry with --format text".to_string()
            }
            TriggerError::IoError(_) => "Make sure the file exists and is readable".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Validation => format!("Invalid setting: {}", self),
            ErrorCategory::Data => format!("Could not read course data: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}
