//! 排程結果模型

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::Task;

/// 派工（作業員在某工作站的一段排程）
///
/// 建立後不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// 作業員ID
    pub operator: String,

    /// 產品ID
    pub product: String,

    /// 模組ID
    pub subsystem: String,

    /// 工作站ID
    pub workcell: String,

    /// 開始時間
    pub start: NaiveDateTime,

    /// 結束時間（不含）
    pub end: NaiveDateTime,

    /// 工時（小時）
    pub duration_hours: Decimal,
}

impl Assignment {
    /// 創建新的派工，工時由起訖時間推算
    pub fn new(
        operator: String,
        product: String,
        subsystem: String,
        workcell: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        let minutes = (end - start).num_minutes();
        Self {
            operator,
            product,
            subsystem,
            workcell,
            start,
            end,
            duration_hours: Decimal::from(minutes) / Decimal::from(60),
        }
    }

    /// 派工日期
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// 工時（分鐘）
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// 檢查兩段 [start, end) 區間是否重疊
    pub fn overlaps(&self, other: &Assignment) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// 週排產方案
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// 方案ID
    pub id: Uuid,

    /// 週一日期
    pub week_start: NaiveDate,

    /// 方案序號（從 1 開始）
    pub index: u32,

    /// 本方案使用的需求係數
    pub demand_multiplier: f64,

    /// 派工（依排入順序）
    pub assignments: Vec<Assignment>,

    /// 週五結束後仍未排入的任務
    pub unscheduled: Vec<Task>,
}

impl Proposal {
    /// 創建空的排產方案
    pub fn new(week_start: NaiveDate, index: u32, demand_multiplier: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            week_start,
            index,
            demand_multiplier,
            assignments: Vec::new(),
            unscheduled: Vec::new(),
        }
    }

    /// 建構器模式：設置派工
    pub fn with_assignments(mut self, assignments: Vec<Assignment>) -> Self {
        self.assignments = assignments;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// 總排產工時（小時）
    pub fn total_hours(&self) -> Decimal {
        self.assignments.iter().map(|a| a.duration_hours).sum()
    }

    /// 未排入的總工時（小時）
    pub fn unscheduled_hours(&self) -> Decimal {
        self.unscheduled.iter().map(|t| t.remaining_hours).sum()
    }

    /// 某作業員的派工
    pub fn assignments_for_operator(&self, operator: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.operator == operator)
            .collect()
    }
}
