//! 週排產方案產生器

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use wkplan_core::{week_monday, DailyAvailability, PlanningConfig, Proposal};

use crate::day_scheduler::DayScheduler;
use crate::inputs::PlanningInputs;
use crate::task_pool::TaskPoolBuilder;
use crate::validation::validate_proposal;
use crate::{PlanWarning, WarningKind};

/// 單一方案的計算結果
#[derive(Debug, Clone)]
pub struct ProposalRun {
    pub proposal: Proposal,
    pub warnings: Vec<PlanWarning>,
}

/// 整週排產結果
#[derive(Debug, Clone)]
pub struct WeeklyPlanResult {
    /// 週一日期
    pub week_start: NaiveDate,

    /// 各方案（依序號排列）
    pub runs: Vec<ProposalRun>,

    /// 計算時間（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl WeeklyPlanResult {
    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.runs.iter().map(|run| &run.proposal)
    }

    pub fn into_proposals(self) -> Vec<Proposal> {
        self.runs.into_iter().map(|run| run.proposal).collect()
    }

    /// 所有方案的警告
    pub fn warnings(&self) -> impl Iterator<Item = &PlanWarning> {
        self.runs.iter().flat_map(|run| run.warnings.iter())
    }
}

/// 週排產方案產生器
///
/// 每個方案以不同的需求係數重新展開任務池，再從週一排到週五，
/// 當日排不完的任務結轉到隔天。各方案互不相依，可並行計算。
pub struct ProposalGenerator<'a> {
    inputs: &'a PlanningInputs,
    config: &'a PlanningConfig,
}

impl<'a> ProposalGenerator<'a> {
    pub fn new(inputs: &'a PlanningInputs, config: &'a PlanningConfig) -> Self {
        Self { inputs, config }
    }

    /// 以配置中的種子產生方案（未設定種子時每次不同）
    pub fn generate_with_config(
        &self,
        target_date: NaiveDate,
        availability: &DailyAvailability,
    ) -> WeeklyPlanResult {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.generate(target_date, availability, &mut rng)
    }

    /// 產生目標日期所在週的所有方案
    ///
    /// 需求係數在分派前依方案序號依序抽出，
    /// 因此同一個亂數種子不論是否並行都得到相同結果。
    pub fn generate<R: Rng + ?Sized>(
        &self,
        target_date: NaiveDate,
        availability: &DailyAvailability,
        rng: &mut R,
    ) -> WeeklyPlanResult {
        let monday = week_monday(target_date);
        let multipliers = self.draw_multipliers(rng);

        tracing::info!(
            "開始產生週排產方案：週一 {}，方案 {} 個，需求 {} 筆",
            monday,
            multipliers.len(),
            self.inputs.demand.len()
        );

        let start_time = std::time::Instant::now();

        let runs: Vec<ProposalRun> = if self.config.parallel {
            multipliers
                .par_iter()
                .enumerate()
                .map(|(i, &m)| self.build_proposal(monday, i as u32 + 1, m, availability))
                .collect()
        } else {
            multipliers
                .iter()
                .enumerate()
                .map(|(i, &m)| self.build_proposal(monday, i as u32 + 1, m, availability))
                .collect()
        };

        tracing::info!("週排產完成，耗時 {:?}", start_time.elapsed());

        WeeklyPlanResult {
            week_start: monday,
            runs,
            calculation_time_ms: Some(start_time.elapsed().as_millis()),
        }
    }

    /// 依序抽出各方案的需求係數，均勻分布於 [1-u, 1+u]
    pub fn draw_multipliers<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let (low, high) = self.config.multiplier_range();
        (0..self.config.proposal_count)
            .map(|_| {
                if high > low {
                    rng.gen_range(low..=high)
                } else {
                    1.0
                }
            })
            .collect()
    }

    /// 建立單一方案
    pub fn build_proposal(
        &self,
        monday: NaiveDate,
        index: u32,
        multiplier: f64,
        availability: &DailyAvailability,
    ) -> ProposalRun {
        let mut proposal = Proposal::new(monday, index, multiplier);
        let mut warnings = self.demand_warnings(monday);

        let pool = TaskPoolBuilder::build(
            &self.inputs.demand,
            &self.inputs.times,
            monday,
            multiplier,
            self.config.pool_days,
        );
        let mut tasks = TaskPoolBuilder::aggregate(&pool);

        tracing::debug!(
            "方案 {}：需求係數 {:.4}，任務池 {} 筆，合併後 {} 項",
            index,
            multiplier,
            pool.len(),
            tasks.len()
        );

        if tasks.is_empty() {
            warnings.push(PlanWarning::info(
                WarningKind::NoDemandForPeriod,
                format!("{}-{:02}", monday.year(), monday.month()),
                "任務池為空，產生空方案".to_string(),
            ));
            return ProposalRun { proposal, warnings };
        }

        let scheduler = DayScheduler::new(
            &self.inputs.training,
            &self.inputs.workcells,
            &self.config.calendar,
        );

        for offset in 0..self.config.pool_days {
            if tasks.is_empty() {
                break;
            }

            let date = monday + Duration::days(i64::from(offset));
            let operators = availability.operators_on(date);
            if operators.is_empty() {
                tracing::debug!("方案 {}：{} 沒有出勤作業員，跳過", index, date);
                warnings.push(PlanWarning::warning(
                    WarningKind::NoAvailableOperators,
                    date.to_string(),
                    "當日沒有出勤作業員".to_string(),
                ));
                continue;
            }

            let day = scheduler.schedule_day(date, tasks, &operators);
            proposal.assignments.extend(day.assignments);
            warnings.extend(day.warnings);
            tasks = day.remainder;
        }

        for task in &tasks {
            tracing::warn!(
                "方案 {}：{} 尚有 {} 小時未排入",
                index,
                task.key(),
                task.remaining_hours
            );
            warnings.push(PlanWarning::warning(
                WarningKind::UnschedulableTask,
                task.key().to_string(),
                format!("本週無法排入 {} 小時", task.remaining_hours),
            ));
        }
        proposal.unscheduled = tasks;

        if let Err(violations) =
            validate_proposal(&proposal, &self.inputs.training, &self.config.calendar)
        {
            for violation in &violations {
                tracing::error!("方案 {} 檢核失敗: {}", index, violation.message);
            }
        }

        tracing::info!(
            "方案 {} 完成：派工 {} 筆，共 {} 小時，未排入 {} 小時",
            index,
            proposal.assignments.len(),
            proposal.total_hours(),
            proposal.unscheduled_hours()
        );

        ProposalRun { proposal, warnings }
    }

    /// 需求面的警告：目標月份沒有需求、產品沒有標準工時
    fn demand_warnings(&self, monday: NaiveDate) -> Vec<PlanWarning> {
        let (year, month) = (monday.year(), monday.month());
        let mut warnings = Vec::new();

        for demand in self
            .inputs
            .demand
            .iter()
            .filter(|d| d.matches_period(year, month))
        {
            if !self.inputs.times.contains_product(&demand.product) {
                warnings.push(PlanWarning::warning(
                    WarningKind::UnknownProduct,
                    demand.product.clone(),
                    "產品沒有標準工時，略過".to_string(),
                ));
            }
        }

        warnings
    }
}
