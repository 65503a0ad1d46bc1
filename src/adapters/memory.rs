use crate::domain::model::{
    CourseFieldValue, CourseId, DueSelection, FieldDefinition, FieldId, TriggerId,
    TriggerSettings,
};
use crate::domain::ports::{FieldCatalog, FieldValueStore, SettingsStore};
use crate::utils::error::{Result, TriggerError};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

/// 課程欄位匯出檔的一列: course_id,field,value
#[derive(Debug, Clone, Deserialize)]
struct CourseFieldRow {
    course_id: CourseId,
    field: String,
    value: i64,
}

/// 以記憶體保存設定、欄位與課程資料的存放區
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    triggers: BTreeMap<TriggerId, TriggerSettings>,
    fields: Vec<FieldDefinition>,
    field_types: Vec<String>,
    data: Vec<CourseFieldValue>,
}

impl MemoryStore {
    pub fn new(field_types: Vec<String>) -> Self {
        Self {
            field_types,
            ..Self::default()
        }
    }

    pub fn add_trigger(&mut self, trigger_id: TriggerId, settings: TriggerSettings) {
        self.triggers.insert(trigger_id, settings);
    }

    pub fn add_field(&mut self, field: FieldDefinition) {
        self.fields.push(field);
    }

    /// 設定課程的欄位值; 同一課程同一欄位只保留最後一個值
    pub fn set_value(&mut self, course_id: CourseId, field_id: FieldId, value: i64) {
        self.data
            .retain(|row| !(row.course_id == course_id && row.field_id == field_id));
        self.data.push(CourseFieldValue {
            course_id,
            field_id,
            value,
        });
    }

    pub fn field(&self, shortname: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.shortname == shortname)
    }

    /// 從 CSV 載入課程欄位值，回傳載入的筆數
    pub fn load_csv<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut loaded = 0;
        for row in csv_reader.deserialize::<CourseFieldRow>() {
            let row = row?;
            let Some(field_id) = self.field(&row.field).map(|f| f.id) else {
                tracing::warn!(
                    "⚠️ Ignoring value for unknown field '{}' on course {}",
                    row.field,
                    row.course_id
                );
                continue;
            };
            self.set_value(row.course_id, field_id, row.value);
            loaded += 1;
        }

        tracing::debug!("Loaded {} course field values", loaded);
        Ok(loaded)
    }

    pub fn load_csv_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let file = std::fs::File::open(&path).map_err(TriggerError::IoError)?;
        self.load_csv(file)
    }
}

impl SettingsStore for MemoryStore {
    fn trigger_settings(&self, trigger_id: TriggerId) -> Result<TriggerSettings> {
        self.triggers
            .get(&trigger_id)
            .cloned()
            .ok_or(TriggerError::TriggerNotFound { trigger_id })
    }

    fn trigger_ids(&self) -> Vec<TriggerId> {
        self.triggers.keys().copied().collect()
    }
}

impl FieldCatalog for MemoryStore {
    fn field_by_shortname(&self, shortname: &str, field_type: &str) -> Option<FieldDefinition> {
        self.fields
            .iter()
            .find(|f| f.shortname == shortname && f.field_type == field_type)
            .cloned()
    }

    fn fields_of_type(&self, field_type: &str) -> Vec<FieldDefinition> {
        self.fields
            .iter()
            .filter(|f| f.field_type == field_type)
            .cloned()
            .collect()
    }

    fn available_field_types(&self) -> Vec<String> {
        self.field_types.clone()
    }
}

impl FieldValueStore for MemoryStore {
    fn distinct_values(&self, field_id: FieldId) -> Vec<i64> {
        self.data
            .iter()
            .filter(|row| row.field_id == field_id)
            .map(|row| row.value)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn courses_matching(&self, selection: &DueSelection) -> Vec<CourseId> {
        self.data
            .iter()
            .filter(|row| selection.matches(row))
            .map(|row| row.course_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SEMESTER_FIELD_TYPE;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new(vec![SEMESTER_FIELD_TYPE.to_string()]);
        store.add_field(FieldDefinition {
            id: 1,
            shortname: "lectureterm".to_string(),
            name: "Lecture term".to_string(),
            field_type: SEMESTER_FIELD_TYPE.to_string(),
            default_value: 20251,
        });
        store.add_field(FieldDefinition {
            id: 2,
            shortname: "room".to_string(),
            name: "Room".to_string(),
            field_type: "text".to_string(),
            default_value: 0,
        });
        store
    }

    #[test]
    fn test_load_csv() {
        let mut store = store();
        let csv = "course_id,field,value\n10,lectureterm,20240\n11, lectureterm ,1\n12,unknown,20200\n";
        let loaded = store.load_csv(csv.as_bytes()).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(store.distinct_values(1), vec![1, 20240]);
    }

    #[test]
    fn test_load_csv_rejects_non_numeric_value() {
        let mut store = store();
        let csv = "course_id,field,value\n10,lectureterm,summer\n";
        assert!(matches!(
            store.load_csv(csv.as_bytes()),
            Err(TriggerError::CsvError(_))
        ));
    }

    #[test]
    fn test_distinct_values_per_field() {
        let mut store = store();
        store.set_value(10, 1, 20240);
        store.set_value(11, 1, 20240);
        store.set_value(12, 1, 20231);
        store.set_value(12, 2, 7);
        assert_eq!(store.distinct_values(1), vec![20231, 20240]);
        assert_eq!(store.distinct_values(2), vec![7]);
    }

    #[test]
    fn test_set_value_replaces_previous() {
        let mut store = store();
        store.set_value(10, 1, 20240);
        store.set_value(10, 1, 20250);
        assert_eq!(store.distinct_values(1), vec![20250]);
        let due = DueSelection::new(1, 20251);
        assert_eq!(store.courses_matching(&due), vec![10]);
    }

    #[test]
    fn test_catalog_filters_by_type() {
        let store = store();
        assert!(store.field_by_shortname("lectureterm", SEMESTER_FIELD_TYPE).is_some());
        assert!(store.field_by_shortname("room", SEMESTER_FIELD_TYPE).is_none());
        assert_eq!(store.fields_of_type(SEMESTER_FIELD_TYPE).len(), 1);
    }

    #[test]
    fn test_unknown_trigger() {
        let store = store();
        assert!(matches!(
            store.trigger_settings(42),
            Err(TriggerError::TriggerNotFound { trigger_id: 42 })
        ));
    }
}
