//! 作業員與訓練資格

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::task::TaskKey;

/// 訓練記錄（有記錄即代表已受訓）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub product: String,
    pub product_desc: String,
    pub subsystem: String,
    pub subsystem_desc: String,
    /// 作業員ID
    pub operator: String,
    /// 作業員姓名
    pub operator_name: String,
    /// 作業員簡稱
    pub operator_short_name: String,
}

impl TrainingRecord {
    /// 創建新的訓練記錄
    pub fn new(product: String, subsystem: String, operator: String) -> Self {
        Self {
            product,
            product_desc: String::new(),
            subsystem,
            subsystem_desc: String::new(),
            operator,
            operator_name: String::new(),
            operator_short_name: String::new(),
        }
    }

    /// 建構器模式：設置作業員姓名
    pub fn with_operator_names(mut self, name: String, short_name: String) -> Self {
        self.operator_name = name;
        self.operator_short_name = short_name;
        self
    }
}

/// 作業員
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Operator {
    pub id: String,
    pub short_name: String,
}

/// 訓練矩陣
///
/// (產品, 模組) → 已受訓作業員，作業員順序為來源表中首次出現的順序。
#[derive(Debug, Clone, Default)]
pub struct TrainingMatrix {
    trained: HashMap<TaskKey, Vec<String>>,
    short_names: BTreeMap<String, String>,
}

impl TrainingMatrix {
    /// 從訓練記錄建立訓練矩陣
    pub fn new(records: &[TrainingRecord]) -> Self {
        let mut trained: HashMap<TaskKey, Vec<String>> = HashMap::new();
        let mut short_names = BTreeMap::new();

        for record in records {
            let operators = trained
                .entry(TaskKey::new(&record.product, &record.subsystem))
                .or_insert_with(Vec::new);
            if !operators.contains(&record.operator) {
                operators.push(record.operator.clone());
            }

            let short_name = record.operator_short_name.trim();
            let entry = short_names
                .entry(record.operator.clone())
                .or_insert_with(String::new);
            if entry.is_empty() && !short_name.is_empty() {
                *entry = short_name.to_string();
            }
        }

        Self {
            trained,
            short_names,
        }
    }

    /// 模組的已受訓作業員（來源表順序）
    pub fn operators_for(&self, product: &str, subsystem: &str) -> &[String] {
        self.trained
            .get(&TaskKey::new(product, subsystem))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 檢查作業員是否受訓
    pub fn is_trained(&self, operator: &str, product: &str, subsystem: &str) -> bool {
        self.operators_for(product, subsystem)
            .iter()
            .any(|op| op == operator)
    }

    /// 所有作業員（依ID排序，缺簡稱時為 "N/A"）
    pub fn operators(&self) -> Vec<Operator> {
        self.short_names
            .iter()
            .map(|(id, short_name)| Operator {
                id: id.clone(),
                short_name: if short_name.is_empty() {
                    "N/A".to_string()
                } else {
                    short_name.clone()
                },
            })
            .collect()
    }

    /// 作業員簡稱
    pub fn short_name(&self, operator: &str) -> Option<&str> {
        self.short_names
            .get(operator)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.trained.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<TrainingRecord> {
        vec![
            TrainingRecord::new("P1".to_string(), "S1".to_string(), "op2".to_string())
                .with_operator_names("Clara Font".to_string(), "Clar".to_string()),
            TrainingRecord::new("P1".to_string(), "S1".to_string(), "op1".to_string()),
            TrainingRecord::new("P1".to_string(), "S2".to_string(), "op1".to_string())
                .with_operator_names("Arnauld Vila".to_string(), "Arna".to_string()),
            TrainingRecord::new("P1".to_string(), "S1".to_string(), "op2".to_string()),
            TrainingRecord::new("P2".to_string(), "S1".to_string(), "op3".to_string()),
        ]
    }

    #[test]
    fn test_operators_keep_first_seen_order() {
        let matrix = TrainingMatrix::new(&records());

        assert_eq!(matrix.operators_for("P1", "S1"), ["op2", "op1"]);
        assert_eq!(matrix.operators_for("P1", "S2"), ["op1"]);
        assert!(matrix.operators_for("P9", "S1").is_empty());
    }

    #[test]
    fn test_is_trained() {
        let matrix = TrainingMatrix::new(&records());

        assert!(matrix.is_trained("op1", "P1", "S2"));
        assert!(!matrix.is_trained("op2", "P1", "S2"));
        assert!(!matrix.is_trained("op3", "P1", "S1"));
    }

    #[test]
    fn test_operator_directory() {
        let matrix = TrainingMatrix::new(&records());
        let operators = matrix.operators();

        assert_eq!(operators.len(), 3);
        assert_eq!(operators[0].id, "op1");
        // op1 的簡稱出現在較後面的記錄
        assert_eq!(operators[0].short_name, "Arna");
        assert_eq!(operators[1].short_name, "Clar");
        assert_eq!(operators[2].short_name, "N/A");
        assert_eq!(matrix.short_name("op3"), None);
    }
}
