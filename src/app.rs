//! 命令實作
//!
//! 每個命令回傳要顯示的文字，由 `main` 負責輸出。

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use wkplan_calc::{DemandSummarizer, PlanningInputs, ProposalGenerator, ProposalView, WarningSeverity};
use wkplan_core::{week_monday, Assignment, DailyAvailability, PlanningConfig, ProductMeta};
use wkplan_io::{list_proposals, read_proposal, write_proposal, SourceTables};

use crate::cli::Absence;

/// 讀取配置；未指定檔案時使用預設值
pub fn load_config(path: Option<&Path>) -> Result<PlanningConfig> {
    let Some(path) = path else {
        return Ok(PlanningConfig::default());
    };

    let json = fs::read_to_string(path)
        .with_context(|| format!("無法讀取配置檔 {}", path.display()))?;
    let config = PlanningConfig::from_json(&json)
        .with_context(|| format!("配置檔 {} 無效", path.display()))?;
    tracing::debug!("載入配置 {}: {:?}", path.display(), config);
    Ok(config)
}

/// 來源表轉為排產輸入
pub fn planning_inputs(tables: &SourceTables) -> PlanningInputs {
    PlanningInputs::from_records(
        tables.demand.clone(),
        tables.times.clone(),
        &tables.stations,
        &tables.training,
    )
}

/// 預設出勤：受訓表中的所有作業員整週出勤，再扣除請假
pub fn weekly_availability(
    inputs: &PlanningInputs,
    monday: NaiveDate,
    days: u32,
    absences: &[Absence],
) -> DailyAvailability {
    let operators = inputs.training.operators().into_iter().map(|op| op.id);
    let mut availability = DailyAvailability::full_week(monday, days, operators);
    for absence in absences {
        availability.set_available(absence.date, &absence.operator, false);
    }
    availability
}

/// generate 命令的選項
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub proposals: Option<u32>,
    pub uncertainty: Option<f64>,
    pub seed: Option<u64>,
    pub unavailable: Vec<Absence>,
    pub sequential: bool,
}

/// 產生方案並寫出檔案，回傳摘要
pub fn generate(
    data_dir: &Path,
    output_dir: &Path,
    config: PlanningConfig,
    date: NaiveDate,
    options: &GenerateOptions,
) -> Result<String> {
    let mut config = config;
    if let Some(count) = options.proposals {
        config = config.with_proposal_count(count);
    }
    if let Some(uncertainty) = options.uncertainty {
        config = config.with_demand_uncertainty(uncertainty);
    }
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }
    if options.sequential {
        config = config.with_parallel(false);
    }
    config.validate().context("排產參數無效")?;

    let tables = SourceTables::load(data_dir).context("載入來源資料失敗")?;
    let inputs = planning_inputs(&tables);
    let monday = week_monday(date);
    let availability = weekly_availability(&inputs, monday, config.pool_days, &options.unavailable);

    let result = ProposalGenerator::new(&inputs, &config).generate_with_config(date, &availability);

    let mut out = String::new();
    writeln!(out, "週一 {}：產生 {} 個方案", monday, result.runs.len())?;
    for run in &result.runs {
        let path: PathBuf = write_proposal(output_dir, &run.proposal)
            .with_context(|| format!("寫出方案 {} 失敗", run.proposal.index))?;
        writeln!(
            out,
            "  方案 {}（係數 {:.3}）：{} 筆派工，{} 小時，未排入 {} 小時 → {}",
            run.proposal.index,
            run.proposal.demand_multiplier,
            run.proposal.assignments.len(),
            run.proposal.total_hours().round_dp(2),
            run.proposal.unscheduled_hours().round_dp(2),
            path.display()
        )?;
    }

    let warnings: Vec<_> = result
        .warnings()
        .filter(|w| w.severity == WarningSeverity::Warning)
        .collect();
    if !warnings.is_empty() {
        writeln!(out, "警告 {} 則：", warnings.len())?;
        for warning in warnings {
            writeln!(out, "  [{:?}] {}: {}", warning.kind, warning.subject, warning.message)?;
        }
    }

    Ok(out)
}

/// 某月需求的每週分攤
pub fn demand(data_dir: &Path, year: i32, month: u32) -> Result<String> {
    if !(1..=12).contains(&month) {
        bail!("無效的月份: {}", month);
    }
    let tables = SourceTables::load(data_dir).context("載入來源資料失敗")?;
    let rows = DemandSummarizer::summarize(&tables.demand, year, month);

    let mut out = String::new();
    if rows.is_empty() {
        writeln!(out, "{}-{:02} 沒有需求", year, month)?;
        return Ok(out);
    }

    writeln!(
        out,
        "{:<6} {:<12} {:<24} {:>8} {:>6} {:>8}",
        "Month", "Product", "Description", "Monthly", "Week", "Weekly"
    )?;
    for row in rows {
        writeln!(
            out,
            "{:<6} {:<12} {:<24} {:>8} {:>6} {:>8}",
            row.month, row.product, row.product_desc, row.monthly_qty, row.week, row.weekly_qty
        )?;
    }
    Ok(out)
}

/// 作業員清單
pub fn operators(data_dir: &Path) -> Result<String> {
    let tables = SourceTables::load(data_dir).context("載入來源資料失敗")?;
    let inputs = planning_inputs(&tables);

    let mut out = String::new();
    writeln!(out, "{:<12} {:<10}", "Operator", "ShortName")?;
    for op in inputs.training.operators() {
        writeln!(out, "{:<12} {:<10}", op.id, op.short_name)?;
    }
    Ok(out)
}

/// 顯示已寫出的方案：排程表與週產出彙總
pub fn show(
    data_dir: &Path,
    output_dir: &Path,
    config: &PlanningConfig,
    date: NaiveDate,
    proposal: Option<u32>,
) -> Result<String> {
    let monday = week_monday(date);
    let listed = list_proposals(output_dir, monday)?;
    if listed.is_empty() {
        return Ok(format!("週一 {} 沒有已產生的方案\n", monday));
    }

    let (index, path) = match proposal {
        Some(wanted) => listed
            .into_iter()
            .find(|(index, _)| *index == wanted)
            .with_context(|| format!("找不到方案 {}", wanted))?,
        None => listed
            .into_iter()
            .next()
            .context("找不到方案")?,
    };

    let assignments: Vec<Assignment> = read_proposal(&path)?
        .iter()
        .map(|row| row.to_assignment())
        .collect::<wkplan_core::Result<_>>()?;

    let tables = SourceTables::load(data_dir).context("載入來源資料失敗")?;
    let inputs = planning_inputs(&tables);
    let short_descs = ProductMeta::short_desc_index(&tables.products);
    let view = ProposalView::new(&inputs.training, &short_descs, &config.calendar);

    let mut out = String::new();
    writeln!(
        out,
        "方案 {}：週一 {}（第 {} 週）",
        index,
        monday,
        monday.iso_week().week()
    )?;
    writeln!(
        out,
        "{:<10} {:<8} {:<10} {:<10} {:<8} {:>5} {:>5} {:>6} {:>6}",
        "Date", "Operator", "Product", "Subsystem", "Workcell", "Start", "End", "Hours", "Offset"
    )?;
    for row in view.schedule_rows(&assignments) {
        writeln!(
            out,
            "{:<10} {:<8} {:<10} {:<10} {:<8} {:>5} {:>5} {:>6} {:>6}",
            row.date,
            row.operator,
            row.product,
            row.subsystem,
            row.workcell,
            row.start.format("%H:%M"),
            row.end.format("%H:%M"),
            row.duration_hours.round_dp(2),
            row.week_hour_offset.round_dp(2)
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{:<10} {:<10} {:<10} {:>6} {:>8}", "Product", "Subsystem", "Short", "Chunks", "Hours")?;
    for row in view.production_summary(&assignments) {
        writeln!(
            out,
            "{:<10} {:<10} {:<10} {:>6} {:>8}",
            row.product,
            row.subsystem,
            row.short_desc,
            row.chunks,
            row.hours.round_dp(2)
        )?;
    }

    Ok(out)
}
