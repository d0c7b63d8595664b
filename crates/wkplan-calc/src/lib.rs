//! # wkplan Calculation Engine
//!
//! 週排產計算引擎：任務池、單日排程、週方案產生、需求彙總

pub mod day_scheduler;
pub mod demand_summary;
pub mod inputs;
pub mod occupancy;
pub mod proposal;
pub mod summary;
pub mod task_pool;
pub mod validation;

// Re-export 主要類型
pub use day_scheduler::{DaySchedule, DayScheduler};
pub use demand_summary::{DemandSummarizer, WeeklyDemand};
pub use inputs::PlanningInputs;
pub use occupancy::Occupancy;
pub use proposal::{ProposalGenerator, ProposalRun, WeeklyPlanResult};
pub use summary::{ProductionSummaryRow, ProposalView, ScheduleRow};
pub use task_pool::TaskPoolBuilder;
pub use validation::{validate_proposal, ValidationResult, Violation, ViolationKind};

/// 排產警告（不中斷計算的狀況）
#[derive(Debug, Clone, PartialEq)]
pub struct PlanWarning {
    pub kind: WarningKind,
    /// 相關對象（產品/模組、日期等）
    pub subject: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl PlanWarning {
    pub fn new(
        kind: WarningKind,
        subject: String,
        message: String,
        severity: WarningSeverity,
    ) -> Self {
        Self {
            kind,
            subject,
            message,
            severity,
        }
    }

    pub fn info(kind: WarningKind, subject: String, message: String) -> Self {
        Self::new(kind, subject, message, WarningSeverity::Info)
    }

    pub fn warning(kind: WarningKind, subject: String, message: String) -> Self {
        Self::new(kind, subject, message, WarningSeverity::Warning)
    }
}

/// 警告類別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// 目標月份沒有需求
    NoDemandForPeriod,
    /// 當日沒有出勤作業員
    NoAvailableOperators,
    /// 任務無法排入（結轉到週末仍未完成）
    UnschedulableTask,
    /// 模組沒有對應的工作站
    MissingWorkcell,
    /// 需求中的產品沒有標準工時
    UnknownProduct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
}
