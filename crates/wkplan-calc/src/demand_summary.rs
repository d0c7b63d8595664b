//! 月需求週彙總

use serde::{Deserialize, Serialize};
use wkplan_core::{iso_weeks_in_month, DemandRecord};

/// 單一產品在某 ISO 週的需求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyDemand {
    pub month: u32,
    pub product: String,
    pub product_desc: String,
    pub monthly_qty: u32,
    /// ISO 週次
    pub week: u32,
    pub weekly_qty: u32,
}

/// 需求彙總器
pub struct DemandSummarizer;

impl DemandSummarizer {
    /// 把目標月份的需求平均分攤到該月工作日所屬的 ISO 週
    ///
    /// 每週數量 = ceil(月需求 / 週數)；輸出依需求記錄順序，再依週次排列。
    pub fn summarize(demands: &[DemandRecord], year: i32, month: u32) -> Vec<WeeklyDemand> {
        let weeks = iso_weeks_in_month(year, month);
        let week_count = weeks.len().max(1) as u32;

        demands
            .iter()
            .filter(|d| d.matches_period(year, month))
            .flat_map(|d| {
                let weekly_qty = d.quantity.div_ceil(week_count);
                weeks.iter().map(move |&week| WeeklyDemand {
                    month,
                    product: d.product.clone(),
                    product_desc: d.product_desc.clone(),
                    monthly_qty: d.quantity,
                    week,
                    weekly_qty,
                })
            })
            .collect()
    }
}
