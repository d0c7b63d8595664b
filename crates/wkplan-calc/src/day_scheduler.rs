//! 單日排程器
//!
//! 貪婪啟發式：
//! 1. 依星期決定當日產能（週末為 0，不排程）
//! 2. 任務依剩餘工時由大到小排序
//! 3. 候選作業員 = 已受訓 ∧ 當日出勤 ∧ 尚有產能，依剩餘產能由大到小
//! 4. 每位候選人排入 min(任務未排工時, 作業員剩餘工時)，量化到排程粒度
//! 5. 從開工時刻逐步往後找作業員空檔，且工作站同時段必須空閒
//! 6. 任務可拆給多位作業員；排不完的部分結轉到隔天

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use tracing::instrument;
use wkplan_core::{round_up_to_step, Assignment, ShiftCalendar, Task, TrainingMatrix, WorkcellMap};

use crate::occupancy::Occupancy;
use crate::{PlanWarning, WarningKind};

/// 單日排程結果
#[derive(Debug, Clone)]
pub struct DaySchedule {
    /// 日期
    pub date: NaiveDate,

    /// 派工（依排入順序）
    pub assignments: Vec<Assignment>,

    /// 結轉到隔天的任務（剩餘工時已扣除）
    pub remainder: Vec<Task>,

    pub warnings: Vec<PlanWarning>,
}

impl DaySchedule {
    /// 當日完全不排程，任務原樣結轉
    fn unchanged(date: NaiveDate, tasks: Vec<Task>) -> Self {
        Self {
            date,
            assignments: Vec::new(),
            remainder: tasks,
            warnings: Vec::new(),
        }
    }

    /// 當日排入的總工時（小時）
    pub fn scheduled_hours(&self) -> Decimal {
        self.assignments.iter().map(|a| a.duration_hours).sum()
    }
}

/// 單日排程器
///
/// 只持有唯讀資料；佔用表與剩餘產能只存在於單次 `schedule_day` 呼叫中。
pub struct DayScheduler<'a> {
    training: &'a TrainingMatrix,
    workcells: &'a WorkcellMap,
    calendar: &'a ShiftCalendar,
}

impl<'a> DayScheduler<'a> {
    pub fn new(
        training: &'a TrainingMatrix,
        workcells: &'a WorkcellMap,
        calendar: &'a ShiftCalendar,
    ) -> Self {
        Self {
            training,
            workcells,
            calendar,
        }
    }

    /// 排定一天的任務
    #[instrument(skip(self, tasks, available_operators), fields(
        date = %date,
        tasks = tasks.len(),
        operators = available_operators.len()
    ))]
    pub fn schedule_day(
        &self,
        date: NaiveDate,
        mut tasks: Vec<Task>,
        available_operators: &BTreeSet<String>,
    ) -> DaySchedule {
        let day_capacity = self.calendar.capacity_minutes(date);
        if day_capacity == 0 {
            tracing::debug!("{} 非工作日，任務全部結轉", date);
            return DaySchedule::unchanged(date, tasks);
        }

        if available_operators.is_empty() {
            let mut schedule = DaySchedule::unchanged(date, tasks);
            schedule.warnings.push(PlanWarning::warning(
                WarningKind::NoAvailableOperators,
                date.to_string(),
                "當日沒有出勤作業員，任務全部結轉".to_string(),
            ));
            return schedule;
        }

        let step = self.calendar.step_minutes;
        let window_start = self.calendar.day_start_at(date);
        let window_end = self.calendar.day_end_at(date);

        let mut remaining_capacity: HashMap<String, u32> = available_operators
            .iter()
            .map(|op| (op.clone(), day_capacity))
            .collect();
        let mut operator_occupancy: HashMap<String, Occupancy> = HashMap::new();
        let mut workcell_occupancy: HashMap<String, Occupancy> = HashMap::new();

        let mut assignments = Vec::new();
        let mut remainder = Vec::new();
        let mut warnings = Vec::new();

        tasks.sort_by(|a, b| {
            b.remaining_hours
                .cmp(&a.remaining_hours)
                .then_with(|| a.product.cmp(&b.product))
                .then_with(|| a.subsystem.cmp(&b.subsystem))
        });

        for task in tasks {
            if task.is_done() {
                tracing::debug!("任務 {} 已無剩餘工時，移除", task.key());
                continue;
            }

            let Some(workcell) = self.workcells.workcell(&task.product, &task.subsystem) else {
                warnings.push(PlanWarning::warning(
                    WarningKind::MissingWorkcell,
                    task.key().to_string(),
                    "模組沒有對應的工作站，任務結轉".to_string(),
                ));
                remainder.push(task);
                continue;
            };

            let mut candidates: Vec<&String> = self
                .training
                .operators_for(&task.product, &task.subsystem)
                .iter()
                .filter(|op| remaining_capacity.get(op.as_str()).is_some_and(|&m| m > 0))
                .collect();

            if candidates.is_empty() {
                tracing::debug!("任務 {} 當日沒有可用作業員", task.key());
                remainder.push(task);
                continue;
            }

            // 穩定排序：產能相同時維持訓練表順序
            candidates.sort_by_key(|op| Reverse(remaining_capacity[op.as_str()]));

            let required = task.remaining_hours;
            let mut credited = Decimal::ZERO;

            for operator in candidates {
                if credited >= required {
                    break;
                }

                let available_minutes = remaining_capacity[operator.as_str()];
                if available_minutes < step {
                    continue;
                }

                let unassigned = required - credited;
                let chunk_hours = unassigned.min(Decimal::from(available_minutes) / Decimal::from(60));
                let chunk_minutes = round_up_to_step(whole_minutes(chunk_hours), step);

                let occupancy = operator_occupancy.entry(operator.clone()).or_default();
                let Some((start, end)) =
                    occupancy.first_fit(window_start, window_end, chunk_minutes, step)
                else {
                    continue;
                };

                let station = workcell_occupancy.entry(workcell.to_string()).or_default();
                if !station.is_free(start, end) {
                    tracing::debug!(
                        "工作站 {} 在 {} - {} 已被佔用，跳過作業員 {}",
                        workcell,
                        start.time(),
                        end.time(),
                        operator
                    );
                    continue;
                }

                let assignment = Assignment::new(
                    operator.clone(),
                    task.product.clone(),
                    task.subsystem.clone(),
                    workcell.to_string(),
                    start,
                    end,
                );

                occupancy.insert(start, end);
                station.insert(start, end);
                if let Some(minutes) = remaining_capacity.get_mut(operator.as_str()) {
                    *minutes = minutes.saturating_sub(chunk_minutes);
                }
                credited += assignment.duration_hours.min(unassigned);
                assignments.push(assignment);
            }

            let leftover = (required - credited).round_dp(2).max(Decimal::ZERO);
            if leftover > Decimal::ZERO {
                remainder.push(task.carried_forward(leftover));
            }
        }

        tracing::debug!(
            "{} 排程完成：派工 {} 筆，結轉 {} 筆",
            date,
            assignments.len(),
            remainder.len()
        );

        DaySchedule {
            date,
            assignments,
            remainder,
            warnings,
        }
    }
}

/// 小時換算為整數分鐘（捨去不足一分鐘的部分）
fn whole_minutes(hours: Decimal) -> u32 {
    (hours * Decimal::from(60)).trunc().to_u32().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, NaiveTime};
    use rstest::rstest;
    use wkplan_core::{TrainingRecord, WorkcellRecord};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn hours(h: i64, scale: u32) -> Decimal {
        Decimal::new(h, scale)
    }

    fn training(rows: &[(&str, &str, &str)]) -> TrainingMatrix {
        let records: Vec<_> = rows
            .iter()
            .map(|(p, s, op)| TrainingRecord::new(p.to_string(), s.to_string(), op.to_string()))
            .collect();
        TrainingMatrix::new(&records)
    }

    fn workcells(rows: &[(&str, &str, &str)]) -> WorkcellMap {
        let records: Vec<_> = rows
            .iter()
            .map(|(p, s, wc)| WorkcellRecord::new(p.to_string(), s.to_string(), wc.to_string()))
            .collect();
        WorkcellMap::new(&records)
    }

    fn operators(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn task(p: &str, s: &str, remaining: Decimal) -> Task {
        Task::new(p.to_string(), s.to_string(), remaining)
    }

    #[test]
    fn test_single_operator_splits_over_days() {
        let training = training(&[("P1", "S1", "op1")]);
        let workcells = workcells(&[("P1", "S1", "UT-1")]);
        let calendar = ShiftCalendar::default();
        let scheduler = DayScheduler::new(&training, &workcells, &calendar);

        let day = scheduler.schedule_day(
            monday(),
            vec![task("P1", "S1", hours(10, 0))],
            &operators(&["op1"]),
        );

        assert_eq!(day.assignments.len(), 1);
        let a = &day.assignments[0];
        assert_eq!(a.operator, "op1");
        assert_eq!(a.start, at(monday(), 8, 0));
        assert_eq!(a.end, at(monday(), 16, 0));
        assert_eq!(a.duration_hours, hours(8, 0));

        assert_eq!(day.remainder.len(), 1);
        assert_eq!(day.remainder[0].remaining_hours, hours(2, 0));
    }

    #[test]
    fn test_shared_workcell_blocks_second_operator() {
        let training = training(&[("P1", "S1", "op1"), ("P1", "S1", "op2")]);
        let workcells = workcells(&[("P1", "S1", "UT-1")]);
        let calendar = ShiftCalendar::default();
        let scheduler = DayScheduler::new(&training, &workcells, &calendar);

        let day = scheduler.schedule_day(
            monday(),
            vec![task("P1", "S1", hours(10, 0))],
            &operators(&["op1", "op2"]),
        );

        // op1 佔滿工作站 08:00-16:00，op2 找到的空檔與工作站衝突
        assert_eq!(day.assignments.len(), 1);
        assert_eq!(day.assignments[0].operator, "op1");
        assert_eq!(day.remainder[0].remaining_hours, hours(2, 0));
    }

    #[test]
    fn test_operators_share_day_on_separate_workcells() {
        let training = training(&[
            ("P1", "S1", "op1"),
            ("P1", "S2", "op1"),
            ("P1", "S2", "op2"),
        ]);
        let workcells = workcells(&[("P1", "S1", "UT-1"), ("P1", "S2", "UT-2")]);
        let calendar = ShiftCalendar::default();
        let scheduler = DayScheduler::new(&training, &workcells, &calendar);

        let day = scheduler.schedule_day(
            monday(),
            vec![task("P1", "S1", hours(6, 0)), task("P1", "S2", hours(4, 0))],
            &operators(&["op1", "op2"]),
        );

        // S1 (6h) 先排：op1 08:00-14:00
        // S2 (4h)：op2 剩餘產能較多，08:00-12:00
        assert_eq!(day.assignments.len(), 2);
        assert_eq!(day.assignments[0].operator, "op1");
        assert_eq!(day.assignments[0].subsystem, "S1");
        assert_eq!(day.assignments[1].operator, "op2");
        assert_eq!(day.assignments[1].start, at(monday(), 8, 0));
        assert!(day.remainder.is_empty());
    }

    #[test]
    fn test_largest_task_first() {
        let training = training(&[("P1", "S1", "op1"), ("P1", "S2", "op1")]);
        let workcells = workcells(&[("P1", "S1", "UT-1"), ("P1", "S2", "UT-2")]);
        let calendar = ShiftCalendar::default();
        let scheduler = DayScheduler::new(&training, &workcells, &calendar);

        let day = scheduler.schedule_day(
            monday(),
            vec![task("P1", "S1", hours(2, 0)), task("P1", "S2", hours(7, 0))],
            &operators(&["op1"]),
        );

        // S2 (7h) 先排在 08:00-15:00，S1 只剩 1 小時
        assert_eq!(day.assignments[0].subsystem, "S2");
        assert_eq!(day.assignments[1].subsystem, "S1");
        assert_eq!(day.assignments[1].start, at(monday(), 15, 0));
        assert_eq!(day.assignments[1].duration_hours, hours(1, 0));
        assert_eq!(day.remainder.len(), 1);
        assert_eq!(day.remainder[0].remaining_hours, hours(1, 0));
    }

    #[test]
    fn test_workcell_fully_booked_carries_task_unchanged() {
        // S1 與 S2 共用工作站 UT-1
        let training = training(&[("P1", "S1", "op1"), ("P1", "S2", "op2")]);
        let workcells = workcells(&[("P1", "S1", "UT-1"), ("P1", "S2", "UT-1")]);
        let calendar = ShiftCalendar::default();
        let scheduler = DayScheduler::new(&training, &workcells, &calendar);

        let day = scheduler.schedule_day(
            monday(),
            vec![task("P1", "S1", hours(8, 0)), task("P1", "S2", hours(3, 0))],
            &operators(&["op1", "op2"]),
        );

        assert_eq!(day.assignments.len(), 1);
        assert_eq!(day.assignments[0].subsystem, "S1");
        assert_eq!(day.remainder.len(), 1);
        assert_eq!(day.remainder[0].subsystem, "S2");
        assert_eq!(day.remainder[0].remaining_hours, hours(3, 0));
    }

    #[rstest]
    #[case(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(), 6)] // 週五
    #[case(NaiveDate::from_ymd_opt(2025, 3, 13).unwrap(), 8)] // 週四
    fn test_day_capacity(#[case] date: NaiveDate, #[case] capacity_hours: i64) {
        let training = training(&[("P1", "S1", "op1")]);
        let workcells = workcells(&[("P1", "S1", "UT-1")]);
        let calendar = ShiftCalendar::default();
        let scheduler = DayScheduler::new(&training, &workcells, &calendar);

        let day = scheduler.schedule_day(
            date,
            vec![task("P1", "S1", hours(20, 0))],
            &operators(&["op1"]),
        );

        assert_eq!(day.scheduled_hours(), hours(capacity_hours, 0));
        assert_eq!(day.remainder[0].remaining_hours, hours(20 - capacity_hours, 0));
    }

    #[test]
    fn test_weekend_carries_everything() {
        let training = training(&[("P1", "S1", "op1")]);
        let workcells = workcells(&[("P1", "S1", "UT-1")]);
        let calendar = ShiftCalendar::default();
        let scheduler = DayScheduler::new(&training, &workcells, &calendar);
        let saturday = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

        let tasks = vec![task("P1", "S1", hours(3, 0))];
        let day = scheduler.schedule_day(saturday, tasks.clone(), &operators(&["op1"]));

        assert!(day.assignments.is_empty());
        assert_eq!(day.remainder, tasks);
    }

    #[test]
    fn test_no_available_operators() {
        let training = training(&[("P1", "S1", "op1")]);
        let workcells = workcells(&[("P1", "S1", "UT-1")]);
        let calendar = ShiftCalendar::default();
        let scheduler = DayScheduler::new(&training, &workcells, &calendar);

        let tasks = vec![task("P1", "S1", hours(3, 0))];
        let day = scheduler.schedule_day(monday(), tasks.clone(), &BTreeSet::new());

        assert!(day.assignments.is_empty());
        assert_eq!(day.remainder, tasks);
        assert_eq!(day.warnings[0].kind, WarningKind::NoAvailableOperators);
    }

    #[test]
    fn test_untrained_or_absent_operator_not_used() {
        let training = training(&[("P1", "S1", "op1")]);
        let workcells = workcells(&[("P1", "S1", "UT-1")]);
        let calendar = ShiftCalendar::default();
        let scheduler = DayScheduler::new(&training, &workcells, &calendar);

        let day = scheduler.schedule_day(
            monday(),
            vec![task("P1", "S1", hours(3, 0))],
            &operators(&["op2"]),
        );

        assert!(day.assignments.is_empty());
        assert_eq!(day.remainder[0].remaining_hours, hours(3, 0));
    }

    #[test]
    fn test_missing_workcell_is_reported() {
        let training = training(&[("P1", "S1", "op1")]);
        let workcells = workcells(&[]);
        let calendar = ShiftCalendar::default();
        let scheduler = DayScheduler::new(&training, &workcells, &calendar);

        let day = scheduler.schedule_day(
            monday(),
            vec![task("P1", "S1", hours(3, 0))],
            &operators(&["op1"]),
        );

        assert!(day.assignments.is_empty());
        assert_eq!(day.remainder.len(), 1);
        assert_eq!(day.warnings[0].kind, WarningKind::MissingWorkcell);
    }

    #[test]
    fn test_chunk_rounds_up_to_grid() {
        let training = training(&[("P1", "S1", "op1")]);
        let workcells = workcells(&[("P1", "S1", "UT-1")]);
        let calendar = ShiftCalendar::default();
        let scheduler = DayScheduler::new(&training, &workcells, &calendar);

        // 2.1 小時 = 126 分鐘 → 135 分鐘
        let day = scheduler.schedule_day(
            monday(),
            vec![task("P1", "S1", hours(21, 1))],
            &operators(&["op1"]),
        );

        assert_eq!(day.assignments[0].duration_minutes(), 135);
        assert_eq!(day.assignments[0].end, at(monday(), 10, 15));
        // 量化多出的時間不會讓剩餘工時變成負值
        assert!(day.remainder.is_empty());
    }

    #[test]
    fn test_done_tasks_dropped() {
        let training = training(&[("P1", "S1", "op1")]);
        let workcells = workcells(&[("P1", "S1", "UT-1")]);
        let calendar = ShiftCalendar::default();
        let scheduler = DayScheduler::new(&training, &workcells, &calendar);

        let day = scheduler.schedule_day(
            monday(),
            vec![task("P1", "S1", Decimal::ZERO)],
            &operators(&["op1"]),
        );

        assert!(day.assignments.is_empty());
        assert!(day.remainder.is_empty());
    }
}
