use crate::core::term::Term;
use serde::{Deserialize, Serialize};

/// 學期自訂欄位的類型名稱
pub const SEMESTER_FIELD_TYPE: &str = "semester";

/// 與學期無關的課程值，永遠不會被觸發
pub const TERM_INDEPENDENT: i64 = 1;

/// 未設定時的預設延遲月數
pub const DEFAULT_DELAY_MONTHS: u32 = 24;

pub type CourseId = u64;
pub type FieldId = u64;
pub type TriggerId = u64;

/// 一個觸發器實例的設定 (customfield + delay)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSettings {
    pub customfield: String,
    #[serde(default = "default_delay")]
    pub delay: u32,
}

fn default_delay() -> u32 {
    DEFAULT_DELAY_MONTHS
}

/// 自訂欄位的定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: FieldId,
    pub shortname: String,
    pub name: String,
    pub field_type: String,
    /// 欄位的預設值，設計上永遠位於未來
    pub default_value: i64,
}

/// 一門課程在某個欄位上的值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFieldValue {
    pub course_id: CourseId,
    pub field_id: FieldId,
    pub value: i64,
}

/// 選課條件: 欄位值 < boundary、!= 1，且為有效的學期代碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueSelection {
    pub field_id: FieldId,
    pub boundary: i64,
}

impl DueSelection {
    pub fn new(field_id: FieldId, boundary: i64) -> Self {
        Self { field_id, boundary }
    }

    pub fn is_due(&self, value: i64) -> bool {
        value < self.boundary && value != TERM_INDEPENDENT && Term::is_valid_code(value)
    }

    pub fn matches(&self, record: &CourseFieldValue) -> bool {
        record.field_id == self.field_id && self.is_due(record.value)
    }

    /// SQL WHERE 片段及其具名參數
    pub fn sql_where(&self) -> SqlWhere {
        let sql = "{course}.id IN (\
                   SELECT ctx.instanceid \
                   FROM {context} ctx \
                   JOIN {customfield_data} fdata \
                   ON fdata.contextid = ctx.id AND ctx.contextlevel = 50 \
                   WHERE fdata.fieldid = :customfieldid \
                   AND fdata.intvalue < :oldesttermtoleaveuntriggered \
                   AND fdata.intvalue != 1 \
                   AND fdata.intvalue BETWEEN 10000 AND 99999 \
                   AND MOD(fdata.intvalue, 10) IN (0, 1))"
            .to_string();
        SqlWhere {
            sql,
            customfieldid: self.field_id,
            oldesttermtoleaveuntriggered: self.boundary,
        }
    }
}

/// 帶型別參數的 SQL 片段，欄位 id 保持原本的無號型別交給呼叫端綁定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlWhere {
    pub sql: String,
    pub customfieldid: FieldId,
    pub oldesttermtoleaveuntriggered: i64,
}

/// 課程層級的檢查結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerResponse {
    Trigger,
}

/// 一次觸發器評估的結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerOutcome {
    pub trigger_id: TriggerId,
    pub field: String,
    pub selection: DueSelection,
    pub due_courses: Vec<CourseId>,
    pub skipped_terms: Vec<i64>,
}
