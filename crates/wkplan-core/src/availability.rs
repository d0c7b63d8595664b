//! 每日作業員出勤

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 每日可上工作業員（日期 → 作業員ID集合）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAvailability {
    days: BTreeMap<NaiveDate, BTreeSet<String>>,
}

impl DailyAvailability {
    /// 創建空的出勤表
    pub fn new() -> Self {
        Self::default()
    }

    /// 整週全員出勤（從週一起連續 `days` 天）
    pub fn full_week<I, S>(monday: NaiveDate, days: u32, operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let operators: BTreeSet<String> = operators.into_iter().map(Into::into).collect();
        let mut availability = Self::new();
        for offset in 0..days {
            availability.set_day(monday + Duration::days(i64::from(offset)), operators.clone());
        }
        availability
    }

    /// 設置某日的出勤名單
    pub fn set_day(&mut self, date: NaiveDate, operators: BTreeSet<String>) {
        self.days.insert(date, operators);
    }

    /// 設置作業員某日是否出勤
    pub fn set_available(&mut self, date: NaiveDate, operator: &str, available: bool) {
        let operators = self.days.entry(date).or_default();
        if available {
            operators.insert(operator.to_string());
        } else {
            operators.remove(operator);
        }
    }

    /// 切換作業員某日的出勤狀態，回傳切換後是否出勤
    pub fn toggle(&mut self, date: NaiveDate, operator: &str) -> bool {
        let available = !self.is_available(date, operator);
        self.set_available(date, operator, available);
        available
    }

    /// 檢查作業員某日是否出勤
    pub fn is_available(&self, date: NaiveDate, operator: &str) -> bool {
        self.days
            .get(&date)
            .is_some_and(|operators| operators.contains(operator))
    }

    /// 某日出勤名單（未設置的日期為空）
    pub fn operators_on(&self, date: NaiveDate) -> BTreeSet<String> {
        self.days.get(&date).cloned().unwrap_or_default()
    }

    /// 已設置的日期
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }
}
