//! 命令列定義

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// 週排產：把月需求排成作業員的每週派工方案
#[derive(Parser, Debug)]
#[command(name = "wkplan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 來源資料目錄（demand.csv、times.csv、stations.csv、training.csv、products.csv）
    #[arg(long, global = true, default_value = "data")]
    pub data_dir: PathBuf,

    /// 方案輸出目錄
    #[arg(long, global = true, default_value = "output")]
    pub output_dir: PathBuf,

    /// JSON 配置檔
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 輸出除錯日誌
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 產生目標日期所在週的排產方案
    Generate {
        /// 目標日期（YYYY-MM-DD），以該週週一為起點
        #[arg(short, long)]
        date: NaiveDate,

        /// 方案數量
        #[arg(short, long)]
        proposals: Option<u32>,

        /// 需求不確定度 u，係數取自 [1-u, 1+u]
        #[arg(short, long)]
        uncertainty: Option<f64>,

        /// 隨機種子
        #[arg(long)]
        seed: Option<u64>,

        /// 請假：YYYY-MM-DD:作業員ID，可重複
        #[arg(long = "unavailable", value_parser = parse_absence)]
        unavailable: Vec<Absence>,

        /// 依序計算各方案（不並行）
        #[arg(long)]
        sequential: bool,
    },

    /// 顯示某月需求的每週分攤
    Demand {
        #[arg(short, long)]
        year: i32,

        #[arg(short, long)]
        month: u32,
    },

    /// 列出作業員
    Operators,

    /// 顯示已產生的方案
    Show {
        /// 目標日期（YYYY-MM-DD）
        #[arg(short, long)]
        date: NaiveDate,

        /// 方案序號（預設為第一個）
        #[arg(short, long)]
        proposal: Option<u32>,
    },
}

/// 某日某作業員不出勤
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Absence {
    pub date: NaiveDate,
    pub operator: String,
}

/// 解析 `YYYY-MM-DD:作業員ID`
pub fn parse_absence(raw: &str) -> Result<Absence, String> {
    let (date, operator) = raw
        .split_once(':')
        .ok_or_else(|| format!("格式應為 YYYY-MM-DD:作業員ID，收到 {}", raw))?;
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| format!("無效的日期 {}: {}", date, e))?;
    let operator = operator.trim();
    if operator.is_empty() {
        return Err(format!("缺少作業員ID: {}", raw));
    }
    Ok(Absence {
        date,
        operator: operator.to_string(),
    })
}
