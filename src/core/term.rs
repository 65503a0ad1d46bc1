//! 學期代碼 (`YYYYT`) 與日曆日期之間的換算。
//!
//! 學期代碼是五位數整數: 前四位為年份，最後一位為季別
//! (0 = 夏季學期, 1 = 冬季學期)。冬季學期跨年，例如 `20241` 代表 2024/25 冬季學期。

use crate::utils::error::Result;
use crate::utils::validation::{validate_month, Validate};
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Summer,
    Winter,
}

impl Season {
    pub fn digit(self) -> i64 {
        match self {
            Season::Summer => 0,
            Season::Winter => 1,
        }
    }

    pub fn from_digit(digit: i64) -> Option<Self> {
        match digit {
            0 => Some(Season::Summer),
            1 => Some(Season::Winter),
            _ => None,
        }
    }
}

/// 兩個季別的開始月份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonStartMonths {
    pub summer_start_month: u32,
    pub winter_start_month: u32,
}

impl SeasonStartMonths {
    pub fn new(summer_start_month: u32, winter_start_month: u32) -> Result<Self> {
        let months = Self {
            summer_start_month,
            winter_start_month,
        };
        months.validate()?;
        Ok(months)
    }

    pub fn start_month(&self, season: Season) -> u32 {
        match season {
            Season::Summer => self.summer_start_month,
            Season::Winter => self.winter_start_month,
        }
    }
}

impl Default for SeasonStartMonths {
    fn default() -> Self {
        Self {
            summer_start_month: 4,
            winter_start_month: 10,
        }
    }
}

impl Validate for SeasonStartMonths {
    fn validate(&self) -> Result<()> {
        validate_month("seasons.summer_start_month", self.summer_start_month)?;
        validate_month("seasons.winter_start_month", self.winter_start_month)?;

        // 冬季學期早於夏季學期時，開始日期不再隨代碼遞增
        if self.summer_start_month > self.winter_start_month {
            tracing::warn!(
                "⚠️ Winter term starts in month {} before the summer term (month {}); \
                 term start dates are no longer ordered by term code",
                self.winter_start_month,
                self.summer_start_month
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Term {
    pub year: i32,
    pub season: Season,
}

impl Term {
    pub fn new(year: i32, season: Season) -> Self {
        Self { year, season }
    }

    pub fn encode(&self) -> i64 {
        i64::from(self.year) * 10 + self.season.digit()
    }

    /// 只接受五位數且最後一位為 0 或 1 的代碼
    pub fn decode(code: i64) -> Option<Self> {
        if !(10_000..=99_999).contains(&code) {
            return None;
        }
        let season = Season::from_digit(code % 10)?;
        let year = i32::try_from(code / 10).ok()?;
        Some(Self { year, season })
    }

    pub fn is_valid_code(code: i64) -> bool {
        Self::decode(code).is_some()
    }

    /// 學期開始月份的第一天
    pub fn start_date(&self, seasons: &SeasonStartMonths) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, seasons.start_month(self.season), 1)
    }

    /// 學期開始當天於指定時區的午夜
    pub fn start_in<Tz: TimeZone>(&self, seasons: &SeasonStartMonths, tz: &Tz) -> Option<DateTime<Tz>> {
        self.start_date(seasons).map(|date| local_midnight(date, tz))
    }

    /// 學期開始日期加上延遲月數 (依日曆月份計算)
    pub fn due_date<Tz: TimeZone>(
        &self,
        delay_months: u32,
        seasons: &SeasonStartMonths,
        tz: &Tz,
    ) -> Option<DateTime<Tz>> {
        let due = self
            .start_date(seasons)?
            .checked_add_months(Months::new(delay_months))?;
        Some(local_midnight(due, tz))
    }

    /// 包含指定日期的學期: 開始日期不晚於該日期的最新學期
    /// (開始日期相同時取代碼較大者)
    pub fn containing(date: NaiveDate, seasons: &SeasonStartMonths) -> Option<Self> {
        let year = date.year();
        [
            Term::new(year, Season::Winter),
            Term::new(year, Season::Summer),
            Term::new(year - 1, Season::Winter),
            Term::new(year - 1, Season::Summer),
        ]
        .into_iter()
        .filter_map(|term| term.start_date(seasons).map(|start| (start, term)))
        .filter(|(start, _)| *start <= date)
        .max()
        .map(|(_, term)| term)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.season {
            Season::Summer => write!(f, "Summer {}", self.year),
            Season::Winter => write!(
                f,
                "Winter {}/{:02}",
                self.year,
                (self.year + 1).rem_euclid(100)
            ),
        }
    }
}

fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let naive = date.and_time(NaiveTime::MIN);
    // 午夜落在夏令時間的空隙時，退回以 UTC 解讀
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}
