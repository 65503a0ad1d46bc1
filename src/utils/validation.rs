use crate::utils::error::{Result, TriggerError};
use regex::Regex;
use std::sync::OnceLock;

pub const MIN_DELAY_MONTHS: u32 = 1;
pub const MAX_DELAY_MONTHS: u32 = 999;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn delay_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([1-9]|[1-9][0-9]|[1-9][0-9][0-9])$").expect("delay pattern is valid")
    })
}

/// 驗證表單輸入的延遲月數 (1 到 999，不允許前導零)
pub fn validate_delay_input(value: &str) -> Result<u32> {
    let trimmed = value.trim();
    if !delay_pattern().is_match(trimmed) {
        return Err(TriggerError::InvalidDelay {
            value: value.to_string(),
        });
    }
    trimmed.parse().map_err(|_| TriggerError::InvalidDelay {
        value: value.to_string(),
    })
}

pub fn validate_delay(value: u32) -> Result<()> {
    if !(MIN_DELAY_MONTHS..=MAX_DELAY_MONTHS).contains(&value) {
        return Err(TriggerError::InvalidDelay {
            value: value.to_string(),
        });
    }
    Ok(())
}

pub fn validate_month(field_name: &str, value: u32) -> Result<()> {
    validate_range(field_name, value, 1, 12)
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TriggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(TriggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TriggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(TriggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_delay_input() {
        assert_eq!(validate_delay_input("1").unwrap(), 1);
        assert_eq!(validate_delay_input("24").unwrap(), 24);
        assert_eq!(validate_delay_input("999").unwrap(), 999);
        assert!(validate_delay_input("0").is_err());
        assert!(validate_delay_input("012").is_err());
        assert!(validate_delay_input("1000").is_err());
        assert!(validate_delay_input("-3").is_err());
        assert!(validate_delay_input("twelve").is_err());
        assert!(validate_delay_input("").is_err());
    }

    #[test]
    fn test_validate_delay() {
        assert!(validate_delay(1).is_ok());
        assert!(validate_delay(999).is_ok());
        assert!(matches!(
            validate_delay(0),
            Err(TriggerError::InvalidDelay { .. })
        ));
        assert!(validate_delay(1000).is_err());
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month("seasons.summer_start_month", 4).is_ok());
        assert!(validate_month("seasons.summer_start_month", 0).is_err());
        assert!(validate_month("seasons.winter_start_month", 13).is_err());
    }
}
