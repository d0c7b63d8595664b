//! 班表日曆與時間工具

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 取得日期當週的週一（含當天）
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// 月份內的工作日（週一到週五），依日期排序
///
/// 無效的年月回傳空列表。
pub fn business_days_in_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .filter(|d| d.weekday().num_days_from_monday() < 5)
        .collect()
}

/// 將分鐘數向上取整到步長的倍數
pub fn round_up_to_step(minutes: u32, step: u32) -> u32 {
    if step == 0 {
        return minutes;
    }
    minutes.div_ceil(step) * step
}

/// 月份工作日所涵蓋的 ISO 週次（排序、去重）
pub fn iso_weeks_in_month(year: i32, month: u32) -> Vec<u32> {
    business_days_in_month(year, month)
        .iter()
        .map(|d| d.iso_week().week())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 班表日曆
///
/// 每個工作日從 `day_start` 開始，可排產分鐘數依星期而定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftCalendar {
    /// 日曆ID
    pub calendar_id: String,

    /// 每日開工時間
    pub day_start: NaiveTime,

    /// 排程粒度（分鐘）
    pub step_minutes: u32,

    /// 每日產能（分鐘）
    /// 索引 0 = 週一, 1 = 週二, ..., 6 = 週日
    pub capacity_minutes: [u32; 7],
}

impl ShiftCalendar {
    /// 創建新的班表日曆（週一到週四 8 小時、週五 6 小時、週末休息）
    pub fn new(calendar_id: String) -> Self {
        Self {
            calendar_id,
            day_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            step_minutes: 15,
            capacity_minutes: [480, 480, 480, 480, 360, 0, 0],
        }
    }

    /// 建構器模式：設置開工時間
    pub fn with_day_start(mut self, day_start: NaiveTime) -> Self {
        self.day_start = day_start;
        self
    }

    /// 建構器模式：設置排程粒度
    pub fn with_step_minutes(mut self, step_minutes: u32) -> Self {
        self.step_minutes = step_minutes;
        self
    }

    /// 建構器模式：設置每日產能
    pub fn with_capacity_minutes(mut self, capacity_minutes: [u32; 7]) -> Self {
        self.capacity_minutes = capacity_minutes;
        self
    }

    /// 當日可排產分鐘數
    pub fn capacity_minutes(&self, date: NaiveDate) -> u32 {
        self.capacity_minutes[date.weekday().num_days_from_monday() as usize]
    }

    /// 檢查是否為工作日
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.capacity_minutes(date) > 0
    }

    /// 當日開工時刻
    pub fn day_start_at(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.day_start)
    }

    /// 當日收工時刻（開工時刻加當日產能）
    pub fn day_end_at(&self, date: NaiveDate) -> NaiveDateTime {
        self.day_start_at(date) + Duration::minutes(i64::from(self.capacity_minutes(date)))
    }

    /// 距當日開工的分鐘數（開工前為負值）
    pub fn minutes_since_day_start(&self, at: NaiveDateTime) -> i64 {
        (at - self.day_start_at(at.date())).num_minutes()
    }

    /// 檢查時刻是否對齊排程粒度
    pub fn is_on_grid(&self, at: NaiveDateTime) -> bool {
        let step = i64::from(self.step_minutes.max(1));
        at.second() == 0
            && at.nanosecond() == 0
            && self.minutes_since_day_start(at).rem_euclid(step) == 0
    }

    /// 週累計工時位置（小時）
    ///
    /// 之前各工作日的產能小時數，加上當日自開工起經過的小時數。
    /// 用於把整週排程攤平在同一條時間軸上。
    pub fn week_hour_offset(&self, at: NaiveDateTime) -> Decimal {
        let weekday = at.date().weekday().num_days_from_monday() as usize;
        let before: u32 = self.capacity_minutes[..weekday].iter().sum();
        let minutes = i64::from(before) + self.minutes_since_day_start(at);
        Decimal::from(minutes) / Decimal::from(60)
    }
}

impl Default for ShiftCalendar {
    fn default() -> Self {
        Self::new("DEFAULT".to_string())
    }
}
