//! 週任務池

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use wkplan_core::{business_days_in_month, DemandRecord, PoolTask, StandardTimeTable, Task, TaskKey};

/// 任務池建立器
pub struct TaskPoolBuilder;

impl TaskPoolBuilder {
    /// 將月需求展開為目標週的任務池
    ///
    /// 每筆目標月份的需求：
    /// 1. 數量 × 需求係數（向上取整）
    /// 2. 平均分攤到當月工作日，得到每日目標台數（向上取整）
    /// 3. 每日目標 × `pool_days` 即本週台數
    /// 4. 每台產品的每個模組產生一個任務，工時為標準工時
    ///
    /// 沒有標準工時的產品會被略過；目標月份沒有需求時回傳空任務池。
    pub fn build(
        demands: &[DemandRecord],
        times: &StandardTimeTable,
        target_date: NaiveDate,
        demand_multiplier: f64,
        pool_days: u32,
    ) -> Vec<PoolTask> {
        let (year, month) = (target_date.year(), target_date.month());
        let business_days = business_days_in_month(year, month).len().max(1) as u32;

        let mut pool = Vec::new();
        for demand in demands.iter().filter(|d| d.matches_period(year, month)) {
            let subsystems = times.subsystems_of(&demand.product);
            if subsystems.is_empty() {
                tracing::debug!("產品 {} 沒有標準工時，略過", demand.product);
                continue;
            }

            let quantity = demand.scaled_quantity(demand_multiplier);
            let daily_target = quantity.div_ceil(business_days);
            let units = daily_target * pool_days;

            tracing::debug!(
                "產品 {}: 月需求 {} → {}，每日 {}，本週 {} 台",
                demand.product,
                demand.quantity,
                quantity,
                daily_target,
                units
            );

            for _ in 0..units {
                for subsystem in &subsystems {
                    pool.push(PoolTask::new(
                        demand.product.clone(),
                        subsystem.subsystem.clone(),
                        subsystem.hours,
                    ));
                }
            }
        }

        pool
    }

    /// 依 (產品, 模組) 合併任務池，工時加總為剩餘工時
    pub fn aggregate(pool: &[PoolTask]) -> Vec<Task> {
        let mut totals: BTreeMap<TaskKey, Decimal> = BTreeMap::new();
        for task in pool {
            *totals
                .entry(TaskKey::new(&task.product, &task.subsystem))
                .or_insert(Decimal::ZERO) += task.hours;
        }

        totals
            .into_iter()
            .map(|(key, hours)| Task::new(key.product, key.subsystem, hours))
            .collect()
    }
}
