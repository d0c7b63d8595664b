//! 來源資料表（CSV）
//!
//! 資料目錄下的五個檔案：
//! - `demand.csv`：月需求
//! - `times.csv`：模組標準工時
//! - `stations.csv`：模組對應工作站
//! - `training.csv`：作業員受訓記錄
//! - `products.csv`：模組簡述與每台用量（選用）
//!
//! 表頭會先去除空白再正規化，廠內原始欄位名稱與英文欄位名稱都可使用。

use csv::ReaderBuilder;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use wkplan_core::{
    DemandRecord, PlanError, ProductMeta, Result, StandardTime, TrainingRecord, WorkcellRecord,
};

pub const DEMAND_FILE: &str = "demand.csv";
pub const TIMES_FILE: &str = "times.csv";
pub const STATIONS_FILE: &str = "stations.csv";
pub const TRAINING_FILE: &str = "training.csv";
pub const PRODUCTS_FILE: &str = "products.csv";

/// 廠內欄位名稱 → 正規化欄位名稱
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("Any", "Year"),
    ("Mes", "Month"),
    ("CodiProjecte", "Product"),
    ("DescripcioProjecte", "ProductDesc"),
    ("Unitats", "Quantity"),
    ("CodiModul", "Subsystem"),
    ("DescripcioModul", "SubsystemDesc"),
    ("TempsEstandar", "Time"),
    ("UT", "Workcell"),
    ("TecnologiaPerUT", "Technology"),
    ("Usuari", "Operator"),
    ("Nom", "OperatorName"),
    ("NomCurt", "OperatorShortName"),
    ("ModulCode", "SubsystemShortDesc"),
    ("ModulPerProduct", "UnitsPerProduct"),
];

/// 正規化表頭
pub fn normalize_header(header: &str) -> String {
    let trimmed = header.trim().trim_start_matches('\u{feff}');
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// 讀入後的一張表
struct CsvTable {
    name: String,
    /// (資料列號, 欄位 → 值)；列號從 2 起算（第 1 列為表頭）
    rows: Vec<(usize, HashMap<String, String>)>,
}

impl CsvTable {
    fn read(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if !path.exists() {
            return Err(PlanError::MissingSourceData(path.display().to_string()));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| PlanError::malformed(&name, 1, e.to_string()))?
            .iter()
            .map(normalize_header)
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let row_no = idx + 2;
            let record = result.map_err(|e| PlanError::malformed(&name, row_no, e.to_string()))?;

            let mut row = HashMap::new();
            for (col, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col) {
                    row.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳過完全空白的列
            if row.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push((row_no, row));
        }

        tracing::debug!("讀取 {}: {} 列", name, rows.len());
        Ok(Self { name, rows })
    }

    fn required<'r>(&self, row_no: usize, row: &'r HashMap<String, String>, col: &str) -> Result<&'r str> {
        match row.get(col).map(String::as_str) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(PlanError::malformed(&self.name, row_no, format!("缺少欄位 {}", col))),
        }
    }

    fn optional(row: &HashMap<String, String>, col: &str) -> String {
        row.get(col).cloned().unwrap_or_default()
    }

    fn decimal(&self, row_no: usize, row: &HashMap<String, String>, col: &str) -> Result<Decimal> {
        let raw = self.required(row_no, row, col)?;
        // 歐陸格式的小數逗號
        Decimal::from_str(&raw.replace(',', "."))
            .map_err(|_| PlanError::malformed(&self.name, row_no, format!("{} 不是數值: {}", col, raw)))
    }

    /// 非負整數（接受 "20.0" 這類試算表匯出格式）
    fn count(&self, row_no: usize, row: &HashMap<String, String>, col: &str) -> Result<u32> {
        let value = self.decimal(row_no, row, col)?;
        if value.is_sign_negative() || !value.fract().is_zero() {
            return Err(PlanError::malformed(
                &self.name,
                row_no,
                format!("{} 必須是非負整數: {}", col, value),
            ));
        }
        value
            .to_u32()
            .ok_or_else(|| PlanError::malformed(&self.name, row_no, format!("{} 超出範圍: {}", col, value)))
    }
}

/// 載入月需求
pub fn load_demand(path: &Path) -> Result<Vec<DemandRecord>> {
    let table = CsvTable::read(path)?;
    table
        .rows
        .iter()
        .map(|(row_no, row)| {
            let year = table.count(*row_no, row, "Year")?;
            let month = table.count(*row_no, row, "Month")?;
            if !(1..=12).contains(&month) {
                return Err(PlanError::malformed(&table.name, *row_no, format!("無效的月份: {}", month)));
            }
            Ok(DemandRecord::new(
                year as i32,
                month,
                table.required(*row_no, row, "Product")?.to_string(),
                table.count(*row_no, row, "Quantity")?,
            )
            .with_product_desc(CsvTable::optional(row, "ProductDesc")))
        })
        .collect()
}

/// 載入標準工時
pub fn load_times(path: &Path) -> Result<Vec<StandardTime>> {
    let table = CsvTable::read(path)?;
    table
        .rows
        .iter()
        .map(|(row_no, row)| {
            let hours = table.decimal(*row_no, row, "Time")?;
            if hours.is_sign_negative() {
                return Err(PlanError::malformed(&table.name, *row_no, format!("標準工時不可為負: {}", hours)));
            }
            Ok(StandardTime::new(
                table.required(*row_no, row, "Product")?.to_string(),
                table.required(*row_no, row, "Subsystem")?.to_string(),
                hours,
            )
            .with_descriptions(
                CsvTable::optional(row, "ProductDesc"),
                CsvTable::optional(row, "SubsystemDesc"),
            ))
        })
        .collect()
}

/// 載入工作站對應
pub fn load_stations(path: &Path) -> Result<Vec<WorkcellRecord>> {
    let table = CsvTable::read(path)?;
    table
        .rows
        .iter()
        .map(|(row_no, row)| {
            let mut record = WorkcellRecord::new(
                table.required(*row_no, row, "Product")?.to_string(),
                table.required(*row_no, row, "Subsystem")?.to_string(),
                table.required(*row_no, row, "Workcell")?.to_string(),
            )
            .with_technology(CsvTable::optional(row, "Technology"));
            record.product_desc = CsvTable::optional(row, "ProductDesc");
            record.subsystem_desc = CsvTable::optional(row, "SubsystemDesc");
            Ok(record)
        })
        .collect()
}

/// 載入受訓記錄
pub fn load_training(path: &Path) -> Result<Vec<TrainingRecord>> {
    let table = CsvTable::read(path)?;
    table
        .rows
        .iter()
        .map(|(row_no, row)| {
            let mut record = TrainingRecord::new(
                table.required(*row_no, row, "Product")?.to_string(),
                table.required(*row_no, row, "Subsystem")?.to_string(),
                table.required(*row_no, row, "Operator")?.to_string(),
            )
            .with_operator_names(
                CsvTable::optional(row, "OperatorName"),
                CsvTable::optional(row, "OperatorShortName"),
            );
            record.product_desc = CsvTable::optional(row, "ProductDesc");
            record.subsystem_desc = CsvTable::optional(row, "SubsystemDesc");
            Ok(record)
        })
        .collect()
}

/// 載入產品模組資料
pub fn load_products(path: &Path) -> Result<Vec<ProductMeta>> {
    let table = CsvTable::read(path)?;
    table
        .rows
        .iter()
        .map(|(row_no, row)| {
            let units = match row.get("UnitsPerProduct").filter(|v| !v.is_empty()) {
                Some(_) => table.count(*row_no, row, "UnitsPerProduct")?,
                None => 1,
            };
            Ok(ProductMeta {
                product: table.required(*row_no, row, "Product")?.to_string(),
                subsystem: table.required(*row_no, row, "Subsystem")?.to_string(),
                subsystem_short_desc: CsvTable::optional(row, "SubsystemShortDesc"),
                units_per_product: units,
            })
        })
        .collect()
}

/// 資料目錄下的所有來源表
#[derive(Debug, Clone, Default)]
pub struct SourceTables {
    pub demand: Vec<DemandRecord>,
    pub times: Vec<StandardTime>,
    pub stations: Vec<WorkcellRecord>,
    pub training: Vec<TrainingRecord>,
    pub products: Vec<ProductMeta>,
}

impl SourceTables {
    /// 載入資料目錄
    ///
    /// 需求、工時、工作站、受訓四張表缺一不可；產品表只用於顯示，缺少時為空。
    pub fn load(dir: &Path) -> Result<Self> {
        tracing::info!("載入來源資料: {}", dir.display());

        let demand = load_demand(&dir.join(DEMAND_FILE))?;
        let times = load_times(&dir.join(TIMES_FILE))?;
        let stations = load_stations(&dir.join(STATIONS_FILE))?;
        let training = load_training(&dir.join(TRAINING_FILE))?;

        let products_path = dir.join(PRODUCTS_FILE);
        let products = if products_path.exists() {
            load_products(&products_path)?
        } else {
            tracing::debug!("{} 不存在，略過模組簡述", products_path.display());
            Vec::new()
        };

        tracing::info!(
            "來源資料：需求 {} 筆，工時 {} 筆，工作站 {} 筆，受訓 {} 筆，產品 {} 筆",
            demand.len(),
            times.len(),
            stations.len(),
            training.len(),
            products.len()
        );

        Ok(Self {
            demand,
            times,
            stations,
            training,
            products,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[rstest]
    #[case("CodiProjecte", "Product")]
    #[case(" TempsEstandar ", "Time")]
    #[case("nomcurt", "OperatorShortName")]
    #[case("\u{feff}Any", "Year")]
    #[case("Quantity", "Quantity")]
    #[case("Extra", "Extra")]
    fn test_normalize_header(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_header(raw), expected);
    }

    #[test]
    fn test_load_demand_with_source_headers() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            DEMAND_FILE,
            "Any,Mes,CodiProjecte,DescripcioProjecte,Unitats\n\
             2025,3,P1,Bomba,42\n\
             ,,,,\n\
             2025,4, P2 ,Valvula,20.0\n",
        );

        let demand = load_demand(&path).unwrap();

        assert_eq!(demand.len(), 2);
        assert_eq!(demand[0].product_desc, "Bomba");
        assert_eq!(demand[1].product, "P2");
        assert_eq!(demand[1].quantity, 20);
    }

    #[test]
    fn test_load_times_decimal_comma() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            TIMES_FILE,
            "Product,Subsystem,Time\nP1,S1,\"2,5\"\nP1,S2,4\n",
        );

        let times = load_times(&path).unwrap();
        assert_eq!(times[0].hours, Decimal::new(25, 1));
        assert_eq!(times[1].hours, Decimal::from(4));
    }

    #[rstest]
    #[case("Year,Month,Product,Quantity\n2025,3,P1,abc\n")]
    #[case("Year,Month,Product,Quantity\n2025,13,P1,5\n")]
    #[case("Year,Month,Product,Quantity\n2025,3,,5\n")]
    #[case("Year,Month,Product,Quantity\n2025,3,P1,-5\n")]
    fn test_malformed_demand(#[case] content: &str) {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, DEMAND_FILE, content);

        let err = load_demand(&path).unwrap_err();
        assert!(matches!(err, PlanError::MalformedInput { row: 2, .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = SourceTables::load(dir.path()).unwrap_err();
        assert!(matches!(err, PlanError::MissingSourceData(_)));
    }

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        write(&dir, DEMAND_FILE, "Year,Month,Product,Quantity\n2025,3,P1,42\n");
        write(&dir, TIMES_FILE, "Product,Subsystem,Time\nP1,S1,1.5\n");
        write(&dir, STATIONS_FILE, "CodiProjecte,CodiModul,UT,TecnologiaPerUT\nP1,S1,UT-1,Soldadura\n");
        write(
            &dir,
            TRAINING_FILE,
            "CodiProjecte,CodiModul,Usuari,Nom,NomCurt\nP1,S1,op1,Anna Puig,ANNA\n",
        );

        let tables = SourceTables::load(dir.path()).unwrap();

        assert_eq!(tables.stations[0].workcell, "UT-1");
        assert_eq!(tables.stations[0].technology, "Soldadura");
        assert_eq!(tables.training[0].operator_short_name, "ANNA");
        assert!(tables.products.is_empty());

        write(
            &dir,
            PRODUCTS_FILE,
            "CodiProjecte,CodiModul,ModulCode,ModulPerProduct\nP1,S1,MOT,2\nP1,S2,CAB,\n",
        );
        let tables = SourceTables::load(dir.path()).unwrap();
        assert_eq!(tables.products[0].subsystem_short_desc, "MOT");
        assert_eq!(tables.products[0].units_per_product, 2);
        assert_eq!(tables.products[1].units_per_product, 1);
    }
}
