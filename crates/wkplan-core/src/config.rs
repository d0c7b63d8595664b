//! 排產參數配置

use serde::{Deserialize, Serialize};

use crate::calendar::ShiftCalendar;
use crate::{PlanError, Result};

/// 週排產參數配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// 班表日曆（開工時間、排程粒度、每日產能）
    pub calendar: ShiftCalendar,

    /// 產生的方案數量
    pub proposal_count: u32,

    /// 需求不確定度 u，需求係數取自 [1-u, 1+u]
    pub demand_uncertainty: f64,

    /// 任務池涵蓋的工作日數（一週）
    pub pool_days: u32,

    /// 隨機種子（None 表示每次執行不同）
    pub seed: Option<u64>,

    /// 是否並行計算各方案
    pub parallel: bool,
}

impl PlanningConfig {
    /// 創建預設配置（3 個方案、±10% 需求波動）
    pub fn new() -> Self {
        Self {
            calendar: ShiftCalendar::default(),
            proposal_count: 3,
            demand_uncertainty: 0.1,
            pool_days: 5,
            seed: None,
            parallel: true,
        }
    }

    /// 建構器模式：設置班表日曆
    pub fn with_calendar(mut self, calendar: ShiftCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// 建構器模式：設置方案數量
    pub fn with_proposal_count(mut self, count: u32) -> Self {
        self.proposal_count = count;
        self
    }

    /// 建構器模式：設置需求不確定度
    pub fn with_demand_uncertainty(mut self, uncertainty: f64) -> Self {
        self.demand_uncertainty = uncertainty;
        self
    }

    /// 建構器模式：設置隨機種子
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 建構器模式：設置是否並行
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// 從 JSON 字串載入配置（缺少的欄位使用預設值）
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PlanError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 檢查配置是否有效
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.demand_uncertainty) {
            return Err(PlanError::InvalidConfig(format!(
                "需求不確定度必須在 [0, 1) 之間: {}",
                self.demand_uncertainty
            )));
        }
        if self.calendar.step_minutes == 0 {
            return Err(PlanError::InvalidConfig("排程粒度不可為 0".to_string()));
        }
        if self.proposal_count == 0 {
            return Err(PlanError::InvalidConfig("方案數量不可為 0".to_string()));
        }
        if self.calendar.capacity_minutes.iter().any(|&m| m > 24 * 60) {
            return Err(PlanError::InvalidConfig(
                "每日產能不可超過 1440 分鐘".to_string(),
            ));
        }
        Ok(())
    }

    /// 需求係數的範圍
    pub fn multiplier_range(&self) -> (f64, f64) {
        (1.0 - self.demand_uncertainty, 1.0 + self.demand_uncertainty)
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = PlanningConfig::default();

        assert_eq!(config.proposal_count, 3);
        assert_eq!(config.pool_days, 5);
        assert_eq!(config.calendar.step_minutes, 15);
        assert_eq!(config.multiplier_range(), (0.9, 1.1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PlanningConfig::new()
            .with_proposal_count(5)
            .with_demand_uncertainty(0.2)
            .with_seed(42)
            .with_parallel(false);

        assert_eq!(config.proposal_count, 5);
        assert_eq!(config.seed, Some(42));
        assert!(!config.parallel);
    }

    #[rstest]
    #[case(PlanningConfig::new().with_demand_uncertainty(1.0))]
    #[case(PlanningConfig::new().with_demand_uncertainty(-0.1))]
    #[case(PlanningConfig::new().with_proposal_count(0))]
    #[case(PlanningConfig::new().with_calendar(ShiftCalendar::default().with_step_minutes(0)))]
    fn test_invalid_config(#[case] config: PlanningConfig) {
        assert!(matches!(config.validate(), Err(PlanError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_json() {
        let config = PlanningConfig::from_json(r#"{ "proposal_count": 2, "seed": 7 }"#).unwrap();

        assert_eq!(config.proposal_count, 2);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.demand_uncertainty, 0.1);
        assert_eq!(config.calendar, ShiftCalendar::default());
    }

    #[test]
    fn test_invalid_json() {
        let result = PlanningConfig::from_json(r#"{ "demand_uncertainty": 3.0 }"#);
        assert!(matches!(result, Err(PlanError::InvalidConfig(_))));
    }
}
