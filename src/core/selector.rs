use crate::core::term::{SeasonStartMonths, Term};
use crate::domain::model::{DueSelection, FieldDefinition, TERM_INDEPENDENT};
use chrono::{DateTime, TimeZone};

/// 邊界學期的計算結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryScan {
    /// 本次仍不觸發的最舊學期; 低於此值的學期皆已到期
    pub boundary: i64,
    /// 掃描中略過的格式錯誤代碼
    pub skipped: Vec<i64>,
}

/// 依延遲月數決定哪些學期的課程已到期
#[derive(Debug, Clone, Copy)]
pub struct DueCourseSelector {
    seasons: SeasonStartMonths,
    delay_months: u32,
}

impl DueCourseSelector {
    pub fn new(seasons: SeasonStartMonths, delay_months: u32) -> Self {
        Self {
            seasons,
            delay_months,
        }
    }

    /// 由新到舊掃描使用中的學期代碼，找出邊界學期。
    ///
    /// `default_future_term` 是邊界的初始值 (欄位預設值，位於未來)，
    /// 因此在沒有任何學期尚未到期時，所有使用中的學期都會被選取。
    pub fn boundary<Tz: TimeZone>(
        &self,
        in_use: &[i64],
        default_future_term: i64,
        now: &DateTime<Tz>,
    ) -> BoundaryScan {
        let mut codes: Vec<i64> = in_use
            .iter()
            .copied()
            .filter(|code| *code != TERM_INDEPENDENT)
            .collect();
        codes.sort_unstable_by(|a, b| b.cmp(a));
        codes.dedup();

        let tz = now.timezone();
        let mut boundary = default_future_term;
        let mut skipped = Vec::new();

        for code in codes {
            let due = match Term::decode(code)
                .and_then(|term| term.due_date(self.delay_months, &self.seasons, &tz))
            {
                Some(due) => due,
                None => {
                    tracing::debug!("Skipping invalid term code {}", code);
                    skipped.push(code);
                    continue;
                }
            };

            if due > *now {
                tracing::debug!("Term {} not due yet", code);
                boundary = code;
            } else {
                // 學期依遞減排序，較舊的學期必然也已到期
                tracing::debug!("Term {} is the newest due term", code);
                break;
            }
        }

        BoundaryScan { boundary, skipped }
    }

    pub fn select<Tz: TimeZone>(
        &self,
        field: &FieldDefinition,
        in_use: &[i64],
        now: &DateTime<Tz>,
    ) -> (DueSelection, Vec<i64>) {
        let scan = self.boundary(in_use, field.default_value, now);
        tracing::debug!(
            "Boundary for field '{}' with {} months delay: {}",
            field.shortname,
            self.delay_months,
            scan.boundary
        );
        (DueSelection::new(field.id, scan.boundary), scan.skipped)
    }
}
