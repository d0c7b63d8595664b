//! 產品/模組主檔：標準工時、工作站、模組資訊

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::task::TaskKey;

/// 模組標準工時
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardTime {
    /// 產品ID
    pub product: String,

    /// 產品描述
    pub product_desc: String,

    /// 模組ID
    pub subsystem: String,

    /// 模組描述
    pub subsystem_desc: String,

    /// 標準工時（小時）
    pub hours: Decimal,
}

impl StandardTime {
    /// 創建新的標準工時
    pub fn new(product: String, subsystem: String, hours: Decimal) -> Self {
        Self {
            product,
            product_desc: String::new(),
            subsystem,
            subsystem_desc: String::new(),
            hours,
        }
    }

    /// 建構器模式：設置描述
    pub fn with_descriptions(mut self, product_desc: String, subsystem_desc: String) -> Self {
        self.product_desc = product_desc;
        self.subsystem_desc = subsystem_desc;
        self
    }

    pub fn key(&self) -> TaskKey {
        TaskKey::new(&self.product, &self.subsystem)
    }
}

/// 標準工時表
///
/// 保留來源表的順序；同一 (產品, 模組) 重複出現時以第一筆為準。
#[derive(Debug, Clone, Default)]
pub struct StandardTimeTable {
    records: Vec<StandardTime>,
    index: HashMap<TaskKey, usize>,
    by_product: HashMap<String, Vec<usize>>,
}

impl StandardTimeTable {
    /// 從標準工時記錄建立工時表
    pub fn new(records: Vec<StandardTime>) -> Self {
        let mut index = HashMap::new();
        let mut by_product: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, record) in records.iter().enumerate() {
            if index.contains_key(&record.key()) {
                continue;
            }
            index.insert(record.key(), i);
            by_product
                .entry(record.product.clone())
                .or_insert_with(Vec::new)
                .push(i);
        }

        Self {
            records,
            index,
            by_product,
        }
    }

    /// 查詢模組標準工時
    pub fn hours(&self, product: &str, subsystem: &str) -> Option<Decimal> {
        self.index
            .get(&TaskKey::new(product, subsystem))
            .map(|&i| self.records[i].hours)
    }

    /// 產品所屬的模組（依來源表順序）
    pub fn subsystems_of(&self, product: &str) -> Vec<&StandardTime> {
        self.by_product
            .get(product)
            .map(|indices| indices.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// 檢查產品是否有任何已知模組
    pub fn contains_product(&self, product: &str) -> bool {
        self.by_product.contains_key(product)
    }

    pub fn records(&self) -> &[StandardTime] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 模組與工作站對照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkcellRecord {
    pub product: String,
    pub product_desc: String,
    pub subsystem: String,
    pub subsystem_desc: String,
    /// 工作站ID
    pub workcell: String,
    /// 工作站技術類別
    pub technology: String,
}

impl WorkcellRecord {
    /// 創建新的工作站對照
    pub fn new(product: String, subsystem: String, workcell: String) -> Self {
        Self {
            product,
            product_desc: String::new(),
            subsystem,
            subsystem_desc: String::new(),
            workcell,
            technology: String::new(),
        }
    }

    /// 建構器模式：設置技術類別
    pub fn with_technology(mut self, technology: String) -> Self {
        self.technology = technology;
        self
    }
}

/// 工作站對照表（每個模組只在一個工作站組裝）
#[derive(Debug, Clone, Default)]
pub struct WorkcellMap {
    workcells: HashMap<TaskKey, String>,
}

impl WorkcellMap {
    /// 從對照記錄建立（重複時以第一筆為準）
    pub fn new(records: &[WorkcellRecord]) -> Self {
        let mut workcells = HashMap::new();
        for record in records {
            workcells
                .entry(TaskKey::new(&record.product, &record.subsystem))
                .or_insert_with(|| record.workcell.clone());
        }
        Self { workcells }
    }

    /// 查詢模組所在工作站
    pub fn workcell(&self, product: &str, subsystem: &str) -> Option<&str> {
        self.workcells
            .get(&TaskKey::new(product, subsystem))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.workcells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workcells.is_empty()
    }
}

/// 模組資訊（簡稱、每台用量）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMeta {
    pub product: String,
    pub subsystem: String,
    /// 模組簡稱
    pub subsystem_short_desc: String,
    /// 每台產品所需模組數
    pub units_per_product: u32,
}

impl ProductMeta {
    /// 建立 (產品, 模組) → 模組簡稱 的索引
    pub fn short_desc_index(metas: &[ProductMeta]) -> HashMap<TaskKey, String> {
        let mut index = HashMap::new();
        for meta in metas {
            index
                .entry(TaskKey::new(&meta.product, &meta.subsystem))
                .or_insert_with(|| meta.subsystem_short_desc.clone());
        }
        index
    }
}
