use crate::adapters::MemoryStore;
use crate::core::term::{SeasonStartMonths, Term};
use crate::domain::model::{
    FieldDefinition, FieldId, TriggerId, TriggerSettings, DEFAULT_DELAY_MONTHS,
    SEMESTER_FIELD_TYPE,
};
use crate::utils::error::{Result, TriggerError};
use crate::utils::validation::{
    validate_delay, validate_non_empty_string, validate_path, validate_range, Validate,
};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// 未指定預設值時，欄位預設為幾個月後的學期
pub const DEFAULT_MONTHS_INTO_FUTURE: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub seasons: SeasonStartMonths,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,
    pub data: Option<DataConfig>,
    /// 環境中可用的自訂欄位類型
    pub field_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub id: FieldId,
    pub shortname: String,
    pub name: Option<String>,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    pub default_value: Option<i64>,
    pub default_months_into_future: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub id: TriggerId,
    pub customfield: String,
    pub delay: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub path: String,
}

fn default_field_type() -> String {
    SEMESTER_FIELD_TYPE.to_string()
}

impl FieldConfig {
    /// 欄位預設值: 明確指定的值，否則為數個月後所在的學期
    pub fn resolve_default(&self, seasons: &SeasonStartMonths, today: NaiveDate) -> Result<i64> {
        if let Some(value) = self.default_value {
            return Ok(value);
        }

        let months = self
            .default_months_into_future
            .unwrap_or(DEFAULT_MONTHS_INTO_FUTURE);
        today
            .checked_add_months(Months::new(months))
            .and_then(|date| Term::containing(date, seasons))
            .map(|term| term.encode())
            .ok_or_else(|| TriggerError::InvalidConfigValueError {
                field: format!("fields.{}.default_months_into_future", self.shortname),
                value: months.to_string(),
                reason: "No term found for the resulting date".to_string(),
            })
    }

    pub fn to_definition(&self, seasons: &SeasonStartMonths, today: NaiveDate) -> Result<FieldDefinition> {
        Ok(FieldDefinition {
            id: self.id,
            shortname: self.shortname.clone(),
            name: self.name.clone().unwrap_or_else(|| self.shortname.clone()),
            field_type: self.field_type.clone(),
            default_value: self.resolve_default(seasons, today)?,
        })
    }
}

impl TriggerConfig {
    pub fn settings(&self) -> TriggerSettings {
        TriggerSettings {
            customfield: self.customfield.clone(),
            delay: self.delay.unwrap_or(DEFAULT_DELAY_MONTHS),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TriggerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| TriggerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::{Captures, Regex};
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        re.replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        self.seasons.validate()?;

        let mut ids = HashSet::new();
        let mut shortnames = HashSet::new();
        for field in &self.fields {
            validate_non_empty_string("fields.shortname", &field.shortname)?;
            if !ids.insert(field.id) {
                return Err(TriggerError::InvalidConfigValueError {
                    field: "fields.id".to_string(),
                    value: field.id.to_string(),
                    reason: "Duplicate field id".to_string(),
                });
            }
            if !shortnames.insert(field.shortname.as_str()) {
                return Err(TriggerError::InvalidConfigValueError {
                    field: "fields.shortname".to_string(),
                    value: field.shortname.clone(),
                    reason: "Duplicate field shortname".to_string(),
                });
            }
            if let Some(months) = field.default_months_into_future {
                validate_range("fields.default_months_into_future", months, 0, 120)?;
            }
        }

        let mut trigger_ids = HashSet::new();
        for trigger in &self.triggers {
            validate_non_empty_string("triggers.customfield", &trigger.customfield)?;
            validate_delay(trigger.settings().delay)?;
            if !trigger_ids.insert(trigger.id) {
                return Err(TriggerError::InvalidConfigValueError {
                    field: "triggers.id".to_string(),
                    value: trigger.id.to_string(),
                    reason: "Duplicate trigger id".to_string(),
                });
            }
        }

        if let Some(data) = &self.data {
            validate_path("data.path", &data.path)?;
        }

        Ok(())
    }

    pub fn field_types(&self) -> Vec<String> {
        self.field_types
            .clone()
            .unwrap_or_else(|| vec![SEMESTER_FIELD_TYPE.to_string()])
    }

    pub fn data_path(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.path.as_str())
    }

    /// 依配置建立記憶體存放區 (尚未載入課程資料)
    pub fn build_store(&self, today: NaiveDate) -> Result<MemoryStore> {
        let mut store = MemoryStore::new(self.field_types());
        for field in &self.fields {
            store.add_field(field.to_definition(&self.seasons, today)?);
        }
        for trigger in &self.triggers {
            store.add_trigger(trigger.id, trigger.settings());
        }
        Ok(store)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FieldCatalog, SettingsStore};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[seasons]
summer_start_month = 4
winter_start_month = 10

[[fields]]
id = 1
shortname = "lectureterm"
name = "Lecture term"
type = "semester"
default_months_into_future = 3

[[triggers]]
id = 7
customfield = "lectureterm"
delay = 12
"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.seasons, SeasonStartMonths::default());
        assert_eq!(config.fields[0].shortname, "lectureterm");
        assert_eq!(config.triggers[0].settings().delay, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = TomlConfig::from_toml_str(
            r#"
[[fields]]
id = 1
shortname = "lectureterm"

[[triggers]]
id = 1
customfield = "lectureterm"
"#,
        )
        .unwrap();

        assert_eq!(config.seasons, SeasonStartMonths::default());
        assert_eq!(config.fields[0].field_type, SEMESTER_FIELD_TYPE);
        assert_eq!(config.triggers[0].settings().delay, DEFAULT_DELAY_MONTHS);
        assert_eq!(config.field_types(), vec![SEMESTER_FIELD_TYPE.to_string()]);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SEMESTER_TRIGGER_TEST_DATA", "/srv/lms/fields.csv");

        let config = TomlConfig::from_toml_str(
            r#"
[data]
path = "${SEMESTER_TRIGGER_TEST_DATA}"
"#,
        )
        .unwrap();
        assert_eq!(config.data_path(), Some("/srv/lms/fields.csv"));

        std::env::remove_var("SEMESTER_TRIGGER_TEST_DATA");
    }

    #[test]
    fn test_config_validation() {
        let mut config = TomlConfig::from_toml_str(BASIC).unwrap();
        config.triggers[0].delay = Some(1000);
        assert!(matches!(
            config.validate(),
            Err(TriggerError::InvalidDelay { .. })
        ));

        let mut config = TomlConfig::from_toml_str(BASIC).unwrap();
        config.seasons.winter_start_month = 13;
        assert!(config.validate().is_err());

        // 同月開始的兩個季別是合法設定
        let mut config = TomlConfig::from_toml_str(BASIC).unwrap();
        config.seasons.summer_start_month = 4;
        config.seasons.winter_start_month = 4;
        assert!(config.validate().is_ok());

        let mut config = TomlConfig::from_toml_str(BASIC).unwrap();
        let duplicate = config.triggers[0].clone();
        config.triggers.push(duplicate);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            TomlConfig::from_toml_str("[[fields]\nid = "),
            Err(TriggerError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_resolve_default_value() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();
        let field = &config.fields[0];
        // 2025-08-15 + 3 個月 = 2025-11-15，屬於 2025/26 冬季學期
        assert_eq!(
            field.resolve_default(&config.seasons, date(2025, 8, 15)).unwrap(),
            20251
        );

        let mut explicit = field.clone();
        explicit.default_value = Some(99_990);
        assert_eq!(
            explicit.resolve_default(&config.seasons, date(2025, 8, 15)).unwrap(),
            99_990
        );
    }

    #[test]
    fn test_build_store() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();
        let store = config.build_store(date(2025, 1, 10)).unwrap();

        let field = store
            .field_by_shortname("lectureterm", SEMESTER_FIELD_TYPE)
            .unwrap();
        // 2025-01-10 + 3 個月 = 2025-04-10，屬於 2025 夏季學期
        assert_eq!(field.default_value, 20250);
        assert_eq!(store.trigger_ids(), vec![7]);
        assert_eq!(store.trigger_settings(7).unwrap().delay, 12);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.triggers[0].id, 7);
    }
}
