//! 排產方案檔案（CSV）
//!
//! 每個方案一個檔案：`planning_week_{YYYYMMDD}_proposal{i}.csv`

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, WriterBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use wkplan_core::{Assignment, PlanError, Proposal, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// 輸出檔案的欄位
const HEADERS: [&str; 9] = [
    "Date",
    "ProposalId",
    "Operator",
    "Product",
    "Subsystem",
    "Workcell",
    "Start",
    "End",
    "DurationHours",
];

/// 方案檔中的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProposalRow {
    pub date: String,
    pub proposal_id: u32,
    pub operator: String,
    pub product: String,
    pub subsystem: String,
    pub workcell: String,
    pub start: String,
    pub end: String,
    pub duration_hours: Decimal,
}

impl ProposalRow {
    pub fn from_assignment(proposal_id: u32, assignment: &Assignment) -> Self {
        let mut hours = assignment.duration_hours.round_dp(2);
        hours.rescale(2);
        Self {
            date: assignment.start.format(DATE_FORMAT).to_string(),
            proposal_id,
            operator: assignment.operator.clone(),
            product: assignment.product.clone(),
            subsystem: assignment.subsystem.clone(),
            workcell: assignment.workcell.clone(),
            start: assignment.start.format(DATETIME_FORMAT).to_string(),
            end: assignment.end.format(DATETIME_FORMAT).to_string(),
            duration_hours: hours,
        }
    }

    /// 還原為派工
    pub fn to_assignment(&self) -> Result<Assignment> {
        let parse = |raw: &str| {
            NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
                .map_err(|e| PlanError::InvalidDate(format!("{}: {}", raw, e)))
        };
        Ok(Assignment::new(
            self.operator.clone(),
            self.product.clone(),
            self.subsystem.clone(),
            self.workcell.clone(),
            parse(&self.start)?,
            parse(&self.end)?,
        ))
    }
}

/// 方案檔名
pub fn proposal_file_name(week_start: NaiveDate, index: u32) -> String {
    format!("planning_week_{}_proposal{}.csv", week_start.format("%Y%m%d"), index)
}

fn file_prefix(week_start: NaiveDate) -> String {
    format!("planning_week_{}_proposal", week_start.format("%Y%m%d"))
}

/// 寫出方案，回傳檔案路徑
///
/// 沒有派工的方案只寫表頭。
pub fn write_proposal(dir: &Path, proposal: &Proposal) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(proposal_file_name(proposal.week_start, proposal.index));

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(|e| PlanError::Other(e.to_string()))?;

    writer
        .write_record(HEADERS)
        .map_err(|e| PlanError::Other(e.to_string()))?;
    for assignment in &proposal.assignments {
        writer
            .serialize(ProposalRow::from_assignment(proposal.index, assignment))
            .map_err(|e| PlanError::Other(e.to_string()))?;
    }
    writer.flush()?;

    tracing::info!(
        "寫出方案 {}: {} 筆派工 → {}",
        proposal.index,
        proposal.assignments.len(),
        path.display()
    );
    Ok(path)
}

/// 讀取方案檔
pub fn read_proposal(path: &Path) -> Result<Vec<ProposalRow>> {
    if !path.exists() {
        return Err(PlanError::MissingSourceData(path.display().to_string()));
    }

    let name = path.display().to_string();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| PlanError::Other(e.to_string()))?;

    reader
        .deserialize::<ProposalRow>()
        .enumerate()
        .map(|(idx, row)| row.map_err(|e| PlanError::malformed(&name, idx + 2, e.to_string())))
        .collect()
}

/// 列出某週已產生的方案序號與檔案（依序號排列）
///
/// 輸出目錄不存在時視為沒有方案。
pub fn list_proposals(dir: &Path, week_start: NaiveDate) -> Result<Vec<(u32, PathBuf)>> {
    if !dir.exists() {
        tracing::debug!("輸出目錄 {} 不存在", dir.display());
        return Ok(Vec::new());
    }

    let prefix = file_prefix(week_start);
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        let index = file_name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".csv"))
            .and_then(|digits| digits.parse::<u32>().ok());
        if let Some(index) = index {
            found.push((index, entry.path()));
        }
    }

    found.sort_by_key(|(index, _)| *index);
    Ok(found)
}
