//! 排產方案檢核
//!
//! 檢查方案是否滿足硬性限制：
//! - 作業員同一時段只做一件事
//! - 工作站同一時段只有一名作業員
//! - 作業員已受訓
//! - 起訖時刻對齊排程粒度，且落在當日工作時段內
//! - 作業員當日派工不超過當日產能

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use wkplan_core::{Assignment, Proposal, ShiftCalendar, TrainingMatrix};

/// 檢核結果
pub type ValidationResult = Result<(), Vec<Violation>>;

/// 違反的限制
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// 作業員時段重疊
    OperatorOverlap,
    /// 工作站時段重疊
    WorkcellOverlap,
    /// 作業員未受訓
    Untrained,
    /// 起訖時刻未對齊排程粒度
    OffGrid,
    /// 超出當日工作時段
    OutsideWindow,
    /// 超出當日產能
    CapacityExceeded,
}

impl Violation {
    fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// 檢核整個方案，回傳所有違反項目
pub fn validate_proposal(
    proposal: &Proposal,
    training: &TrainingMatrix,
    calendar: &ShiftCalendar,
) -> ValidationResult {
    let mut violations = Vec::new();

    for a in &proposal.assignments {
        if !training.is_trained(&a.operator, &a.product, &a.subsystem) {
            violations.push(Violation::new(
                ViolationKind::Untrained,
                format!("{} 未受訓 {}/{}", a.operator, a.product, a.subsystem),
            ));
        }

        if !calendar.is_on_grid(a.start) || !calendar.is_on_grid(a.end) {
            violations.push(Violation::new(
                ViolationKind::OffGrid,
                format!("{} {} - {} 未對齊排程粒度", a.operator, a.start, a.end),
            ));
        }

        let date = a.date();
        if a.end.date() != date
            || a.start < calendar.day_start_at(date)
            || a.end > calendar.day_end_at(date)
        {
            violations.push(Violation::new(
                ViolationKind::OutsideWindow,
                format!("{} {} - {} 超出工作時段", a.operator, a.start, a.end),
            ));
        }
    }

    check_overlaps(
        &proposal.assignments,
        |a| a.operator.as_str(),
        ViolationKind::OperatorOverlap,
        &mut violations,
    );
    check_overlaps(
        &proposal.assignments,
        |a| a.workcell.as_str(),
        ViolationKind::WorkcellOverlap,
        &mut violations,
    );

    let mut daily_minutes: BTreeMap<(&str, NaiveDate), i64> = BTreeMap::new();
    for a in &proposal.assignments {
        *daily_minutes.entry((a.operator.as_str(), a.date())).or_insert(0) += a.duration_minutes();
    }
    for ((operator, date), minutes) in daily_minutes {
        let capacity = i64::from(calendar.capacity_minutes(date));
        if minutes > capacity {
            violations.push(Violation::new(
                ViolationKind::CapacityExceeded,
                format!("{} 在 {} 排了 {} 分鐘，產能 {} 分鐘", operator, date, minutes, capacity),
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// 依資源分組後，檢查相鄰時段是否重疊
fn check_overlaps<'a, F>(
    assignments: &'a [Assignment],
    resource_of: F,
    kind: ViolationKind,
    violations: &mut Vec<Violation>,
) where
    F: Fn(&'a Assignment) -> &'a str,
{
    let mut by_resource: HashMap<&str, Vec<&Assignment>> = HashMap::new();
    for a in assignments {
        by_resource.entry(resource_of(a)).or_default().push(a);
    }

    for (resource, mut slots) in by_resource {
        slots.sort_by_key(|a| a.start);
        for pair in slots.windows(2) {
            if pair[0].overlaps(pair[1]) {
                violations.push(Violation::new(
                    kind,
                    format!(
                        "{}: {} - {} 與 {} - {} 重疊",
                        resource, pair[0].start, pair[0].end, pair[1].start, pair[1].end
                    ),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use wkplan_core::TrainingRecord;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn assignment(op: &str, wc: &str, start: NaiveDateTime, end: NaiveDateTime) -> Assignment {
        Assignment::new(
            op.to_string(),
            "P1".to_string(),
            "S1".to_string(),
            wc.to_string(),
            start,
            end,
        )
    }

    fn training() -> TrainingMatrix {
        TrainingMatrix::new(&[
            TrainingRecord::new("P1".to_string(), "S1".to_string(), "op1".to_string()),
            TrainingRecord::new("P1".to_string(), "S1".to_string(), "op2".to_string()),
        ])
    }

    fn proposal(assignments: Vec<Assignment>) -> Proposal {
        Proposal::new(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(), 1, 1.0)
            .with_assignments(assignments)
    }

    fn kinds(result: ValidationResult) -> Vec<ViolationKind> {
        result.err().unwrap_or_default().into_iter().map(|v| v.kind).collect()
    }

    #[test]
    fn test_valid_proposal() {
        let p = proposal(vec![
            assignment("op1", "UT-1", at(10, 8, 0), at(10, 12, 0)),
            assignment("op2", "UT-1", at(10, 12, 0), at(10, 16, 0)),
            assignment("op1", "UT-2", at(10, 12, 0), at(10, 16, 0)),
        ]);
        assert!(validate_proposal(&p, &training(), &ShiftCalendar::default()).is_ok());
    }

    #[test]
    fn test_operator_overlap() {
        let p = proposal(vec![
            assignment("op1", "UT-1", at(10, 8, 0), at(10, 10, 0)),
            assignment("op1", "UT-2", at(10, 9, 45), at(10, 11, 0)),
        ]);
        let kinds = kinds(validate_proposal(&p, &training(), &ShiftCalendar::default()));
        assert_eq!(kinds, vec![ViolationKind::OperatorOverlap]);
    }

    #[test]
    fn test_workcell_overlap() {
        let p = proposal(vec![
            assignment("op1", "UT-1", at(10, 8, 0), at(10, 10, 0)),
            assignment("op2", "UT-1", at(10, 9, 0), at(10, 11, 0)),
        ]);
        let kinds = kinds(validate_proposal(&p, &training(), &ShiftCalendar::default()));
        assert_eq!(kinds, vec![ViolationKind::WorkcellOverlap]);
    }

    #[test]
    fn test_untrained_operator() {
        let p = proposal(vec![assignment("op9", "UT-1", at(10, 8, 0), at(10, 9, 0))]);
        let kinds = kinds(validate_proposal(&p, &training(), &ShiftCalendar::default()));
        assert_eq!(kinds, vec![ViolationKind::Untrained]);
    }

    #[test]
    fn test_off_grid_and_outside_window() {
        let p = proposal(vec![
            assignment("op1", "UT-1", at(10, 8, 10), at(10, 9, 10)),
            assignment("op2", "UT-2", at(10, 7, 0), at(10, 9, 0)),
        ]);
        let kinds = kinds(validate_proposal(&p, &training(), &ShiftCalendar::default()));
        assert!(kinds.contains(&ViolationKind::OffGrid));
        assert!(kinds.contains(&ViolationKind::OutsideWindow));
    }

    #[test]
    fn test_friday_window_is_shorter() {
        // 週五產能 360 分鐘，14:00 收工
        let p = proposal(vec![assignment("op1", "UT-1", at(14, 13, 0), at(14, 15, 0))]);
        let kinds = kinds(validate_proposal(&p, &training(), &ShiftCalendar::default()));
        assert_eq!(kinds, vec![ViolationKind::OutsideWindow]);
    }

    #[test]
    fn test_capacity_exceeded() {
        let calendar = ShiftCalendar::default().with_capacity_minutes([120, 480, 480, 480, 360, 0, 0]);
        // 合計 180 分鐘，超過當日 120 分鐘
        let p = proposal(vec![
            assignment("op1", "UT-1", at(10, 8, 0), at(10, 10, 0)),
            assignment("op1", "UT-2", at(10, 10, 0), at(10, 11, 0)),
        ]);
        let kinds = kinds(validate_proposal(&p, &training(), &calendar));
        assert!(kinds.contains(&ViolationKind::CapacityExceeded));
    }
}
