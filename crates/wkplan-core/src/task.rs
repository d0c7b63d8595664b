//! 生產任務模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// (產品, 模組) 鍵
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskKey {
    pub product: String,
    pub subsystem: String,
}

impl TaskKey {
    pub fn new(product: &str, subsystem: &str) -> Self {
        Self {
            product: product.to_string(),
            subsystem: subsystem.to_string(),
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.product, self.subsystem)
    }
}

/// 任務池中的單一模組組裝（一台產品的一個模組）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolTask {
    pub product: String,
    pub subsystem: String,
    /// 標準工時（小時）
    pub hours: Decimal,
}

impl PoolTask {
    pub fn new(product: String, subsystem: String, hours: Decimal) -> Self {
        Self {
            product,
            subsystem,
            hours,
        }
    }
}

/// 待排任務（剩餘工時）
///
/// 排程過程中剩餘工時只減不增；剩餘工時 ≤ 0 代表已排完。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub product: String,
    pub subsystem: String,
    /// 剩餘工時（小時）
    pub remaining_hours: Decimal,
}

impl Task {
    /// 創建新的待排任務
    pub fn new(product: String, subsystem: String, remaining_hours: Decimal) -> Self {
        Self {
            product,
            subsystem,
            remaining_hours,
        }
    }

    pub fn key(&self) -> TaskKey {
        TaskKey::new(&self.product, &self.subsystem)
    }

    /// 檢查是否已排完
    pub fn is_done(&self) -> bool {
        self.remaining_hours <= Decimal::ZERO
    }

    /// 產生剩餘工時較少的結轉任務
    pub fn carried_forward(&self, remaining_hours: Decimal) -> Self {
        Self {
            product: self.product.clone(),
            subsystem: self.subsystem.clone(),
            remaining_hours,
        }
    }
}
