//! # wkplan Core
//!
//! 週排產核心資料模型與類型定義

pub mod availability;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod demand;
pub mod plan;
pub mod task;
pub mod training;

// Re-export 主要類型
pub use availability::DailyAvailability;
pub use calendar::{
    business_days_in_month, iso_weeks_in_month, round_up_to_step, week_monday, ShiftCalendar,
};
pub use catalog::{ProductMeta, StandardTime, StandardTimeTable, WorkcellMap, WorkcellRecord};
pub use config::PlanningConfig;
pub use demand::DemandRecord;
pub use plan::{Assignment, Proposal};
pub use task::{PoolTask, Task, TaskKey};
pub use training::{Operator, TrainingMatrix, TrainingRecord};

/// 排產錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("缺少來源資料: {0}")]
    MissingSourceData(String),

    #[error("資料格式錯誤 ({table} 第 {row} 行): {message}")]
    MalformedInput {
        table: String,
        row: usize,
        message: String,
    },

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("檔案讀寫錯誤: {0}")]
    Io(#[from] std::io::Error),

    #[error("其他錯誤: {0}")]
    Other(String),
}

impl PlanError {
    /// 建立資料格式錯誤
    pub fn malformed(table: &str, row: usize, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            table: table.to_string(),
            row,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
