use crate::core::selector::DueCourseSelector;
use crate::core::term::SeasonStartMonths;
use crate::domain::model::{
    CourseId, DueSelection, FieldDefinition, TriggerId, TriggerOutcome, TriggerResponse,
    TriggerSettings, SEMESTER_FIELD_TYPE,
};
use crate::domain::ports::{FieldCatalog, FieldValueStore, SettingsStore};
use crate::utils::error::{Result, TriggerError};
use crate::utils::validation::validate_delay;
use chrono::{DateTime, TimeZone};

/// 學期自訂欄位觸發器: 串接設定、欄位中繼資料與欄位值
pub struct SemesterTrigger<'a, S, C, V> {
    settings: &'a S,
    catalog: &'a C,
    values: &'a V,
    seasons: SeasonStartMonths,
}

impl<'a, S, C, V> SemesterTrigger<'a, S, C, V>
where
    S: SettingsStore,
    C: FieldCatalog,
    V: FieldValueStore,
{
    pub fn new(settings: &'a S, catalog: &'a C, values: &'a V, seasons: SeasonStartMonths) -> Self {
        Self {
            settings,
            catalog,
            values,
            seasons,
        }
    }

    fn resolve_field(&self, shortname: &str) -> Result<FieldDefinition> {
        self.catalog
            .field_by_shortname(shortname, SEMESTER_FIELD_TYPE)
            .ok_or_else(|| TriggerError::MissingField {
                field: shortname.to_string(),
            })
    }

    /// 計算選課條件，並回傳掃描中略過的格式錯誤代碼
    pub fn selection_for<Tz: TimeZone>(
        &self,
        settings: &TriggerSettings,
        now: &DateTime<Tz>,
    ) -> Result<(DueSelection, Vec<i64>)> {
        validate_delay(settings.delay)?;
        let field = self.resolve_field(&settings.customfield)?;

        let in_use = self.values.distinct_values(field.id);
        tracing::debug!(
            "Field '{}' has {} distinct values in use",
            field.shortname,
            in_use.len()
        );

        let selector = DueCourseSelector::new(self.seasons, settings.delay);
        Ok(selector.select(&field, &in_use, now))
    }

    pub fn evaluate<Tz: TimeZone>(
        &self,
        trigger_id: TriggerId,
        now: &DateTime<Tz>,
    ) -> Result<TriggerOutcome> {
        let settings = self.settings.trigger_settings(trigger_id)?;
        tracing::info!(
            "🔍 Evaluating trigger {} (field '{}', {} months delay)",
            trigger_id,
            settings.customfield,
            settings.delay
        );

        let (selection, skipped_terms) = self.selection_for(&settings, now)?;
        if !skipped_terms.is_empty() {
            tracing::warn!(
                "⚠️ Trigger {}: skipped {} invalid term code(s): {:?}",
                trigger_id,
                skipped_terms.len(),
                skipped_terms
            );
        }

        let due_courses: Vec<CourseId> = self
            .values
            .courses_matching(&selection)
            .into_iter()
            .filter(|course_id| self.check_course(*course_id) == TriggerResponse::Trigger)
            .collect();

        tracing::info!(
            "✅ Trigger {}: {} course(s) due (terms below {})",
            trigger_id,
            due_courses.len(),
            selection.boundary
        );

        Ok(TriggerOutcome {
            trigger_id,
            field: settings.customfield,
            selection,
            due_courses,
            skipped_terms,
        })
    }

    /// 逐一評估所有觸發器; 單一觸發器的設定錯誤不影響其他觸發器
    pub fn evaluate_all<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Vec<(TriggerId, Result<TriggerOutcome>)> {
        self.settings
            .trigger_ids()
            .into_iter()
            .map(|trigger_id| {
                let outcome = self.evaluate(trigger_id, now);
                if let Err(e) = &outcome {
                    tracing::error!("❌ Trigger {} failed: {}", trigger_id, e);
                }
                (trigger_id, outcome)
            })
            .collect()
    }

    /// 所有判斷都在選課條件中完成，通過條件的課程一律觸發
    pub fn check_course(&self, _course_id: CourseId) -> TriggerResponse {
        TriggerResponse::Trigger
    }

    /// 可供此觸發器使用的學期欄位
    pub fn eligible_fields(&self) -> Result<Vec<FieldDefinition>> {
        let fields = self.catalog.fields_of_type(SEMESTER_FIELD_TYPE);
        if fields.is_empty() {
            return Err(TriggerError::ConfigValidationError {
                field: "customfield".to_string(),
                message: "There isn't any custom course field which could be used by this trigger. \
                          Please create a custom course field of type \"semester\" first."
                    .to_string(),
            });
        }
        Ok(fields)
    }

    /// 檢查設定是否可用 (例如備份還原時)，回傳所有發現的問題
    pub fn ensure_validity(&self, settings: &TriggerSettings) -> Vec<TriggerError> {
        let mut errors = Vec::new();

        if self
            .catalog
            .field_by_shortname(&settings.customfield, SEMESTER_FIELD_TYPE)
            .is_none()
        {
            errors.push(TriggerError::MissingField {
                field: settings.customfield.clone(),
            });
        }

        if let Err(e) = validate_delay(settings.delay) {
            errors.push(e);
        }

        let has_semester_type = self
            .catalog
            .available_field_types()
            .iter()
            .any(|field_type| field_type == SEMESTER_FIELD_TYPE);
        if !has_semester_type {
            errors.push(TriggerError::MissingFieldType {
                field_type: SEMESTER_FIELD_TYPE.to_string(),
            });
        }

        errors
    }
}
