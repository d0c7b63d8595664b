//! 月需求模型

use serde::{Deserialize, Serialize};

/// 月需求（某產品某月的目標產量）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    /// 年
    pub year: i32,

    /// 月（1-12）
    pub month: u32,

    /// 產品ID
    pub product: String,

    /// 產品描述
    pub product_desc: String,

    /// 月需求數量（台）
    pub quantity: u32,
}

impl DemandRecord {
    /// 創建新的月需求
    pub fn new(year: i32, month: u32, product: String, quantity: u32) -> Self {
        Self {
            year,
            month,
            product,
            product_desc: String::new(),
            quantity,
        }
    }

    /// 建構器模式：設置產品描述
    pub fn with_product_desc(mut self, product_desc: String) -> Self {
        self.product_desc = product_desc;
        self
    }

    /// 檢查是否屬於指定年月
    pub fn matches_period(&self, year: i32, month: u32) -> bool {
        self.year == year && self.month == month
    }

    /// 套用需求係數後的數量（向上取整）
    pub fn scaled_quantity(&self, multiplier: f64) -> u32 {
        let scaled = (f64::from(self.quantity) * multiplier).ceil();
        if scaled <= 0.0 {
            0
        } else {
            scaled as u32
        }
    }
}
