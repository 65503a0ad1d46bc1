use crate::domain::model::{CourseId, DueSelection, FieldDefinition, FieldId, TriggerId, TriggerSettings};
use crate::utils::error::Result;

/// 依觸發器 id 取得實例設定
pub trait SettingsStore {
    fn trigger_settings(&self, trigger_id: TriggerId) -> Result<TriggerSettings>;
    fn trigger_ids(&self) -> Vec<TriggerId>;
}

/// 自訂欄位的中繼資料
pub trait FieldCatalog {
    fn field_by_shortname(&self, shortname: &str, field_type: &str) -> Option<FieldDefinition>;
    fn fields_of_type(&self, field_type: &str) -> Vec<FieldDefinition>;
    fn available_field_types(&self) -> Vec<String>;
}

/// 課程欄位值
pub trait FieldValueStore {
    /// 欄位目前使用中的所有不重複值 (可能包含 1)
    fn distinct_values(&self, field_id: FieldId) -> Vec<i64>;
    fn courses_matching(&self, selection: &DueSelection) -> Vec<CourseId>;
}
