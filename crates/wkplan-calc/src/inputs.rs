//! 排產輸入資料（唯讀快照）

use wkplan_core::{
    DemandRecord, StandardTime, StandardTimeTable, TrainingMatrix, TrainingRecord, WorkcellMap,
    WorkcellRecord,
};

/// 一次排產所需的全部唯讀資料
///
/// 各方案共用同一份快照，計算期間不會被修改。
#[derive(Debug, Clone, Default)]
pub struct PlanningInputs {
    pub demand: Vec<DemandRecord>,
    pub times: StandardTimeTable,
    pub training: TrainingMatrix,
    pub workcells: WorkcellMap,
}

impl PlanningInputs {
    /// 從來源記錄建立
    pub fn from_records(
        demand: Vec<DemandRecord>,
        times: Vec<StandardTime>,
        workcells: &[WorkcellRecord],
        training: &[TrainingRecord],
    ) -> Self {
        Self {
            demand,
            times: StandardTimeTable::new(times),
            training: TrainingMatrix::new(training),
            workcells: WorkcellMap::new(workcells),
        }
    }
}
