//! 方案檢視（排程表、週產出彙總）

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use wkplan_core::{Assignment, ShiftCalendar, TaskKey, TrainingMatrix};

/// 排程表的一列（以簡稱顯示）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub date: NaiveDate,
    /// 作業員簡稱，沒有時為 "N/A"
    pub operator: String,
    pub product: String,
    /// 模組簡述，沒有時為模組ID
    pub subsystem: String,
    pub workcell: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_hours: Decimal,
    /// 在整週時間軸上的起點（小時）
    pub week_hour_offset: Decimal,
}

/// 週產出彙總的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSummaryRow {
    pub product: String,
    pub subsystem: String,
    pub short_desc: String,
    /// 派工段數
    pub chunks: usize,
    pub hours: Decimal,
}

/// 方案檢視
pub struct ProposalView<'a> {
    training: &'a TrainingMatrix,
    short_descs: &'a HashMap<TaskKey, String>,
    calendar: &'a ShiftCalendar,
}

impl<'a> ProposalView<'a> {
    pub fn new(
        training: &'a TrainingMatrix,
        short_descs: &'a HashMap<TaskKey, String>,
        calendar: &'a ShiftCalendar,
    ) -> Self {
        Self {
            training,
            short_descs,
            calendar,
        }
    }

    fn short_desc(&self, product: &str, subsystem: &str) -> String {
        self.short_descs
            .get(&TaskKey::new(product, subsystem))
            .cloned()
            .unwrap_or_else(|| subsystem.to_string())
    }

    /// 排程表，依開始時間與作業員排序
    pub fn schedule_rows(&self, assignments: &[Assignment]) -> Vec<ScheduleRow> {
        let mut rows: Vec<ScheduleRow> = assignments
            .iter()
            .map(|a| ScheduleRow {
                date: a.date(),
                operator: self
                    .training
                    .short_name(&a.operator)
                    .filter(|s| !s.is_empty())
                    .unwrap_or("N/A")
                    .to_string(),
                product: a.product.clone(),
                subsystem: self.short_desc(&a.product, &a.subsystem),
                workcell: a.workcell.clone(),
                start: a.start,
                end: a.end,
                duration_hours: a.duration_hours,
                week_hour_offset: self.calendar.week_hour_offset(a.start),
            })
            .collect();

        rows.sort_by(|x, y| x.start.cmp(&y.start).then_with(|| x.operator.cmp(&y.operator)));
        rows
    }

    /// 依 (產品, 模組) 彙總派工段數與工時
    pub fn production_summary(&self, assignments: &[Assignment]) -> Vec<ProductionSummaryRow> {
        let mut totals: BTreeMap<TaskKey, (usize, Decimal)> = BTreeMap::new();
        for a in assignments {
            let entry = totals
                .entry(TaskKey::new(&a.product, &a.subsystem))
                .or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += a.duration_hours;
        }

        totals
            .into_iter()
            .map(|(key, (chunks, hours))| ProductionSummaryRow {
                short_desc: self.short_desc(&key.product, &key.subsystem),
                product: key.product,
                subsystem: key.subsystem,
                chunks,
                hours,
            })
            .collect()
    }
}
