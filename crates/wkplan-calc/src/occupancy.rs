//! 時段佔用表

use chrono::{Duration, NaiveDateTime};

/// 單一資源（作業員或工作站）當日已佔用的時段
///
/// 時段為半開區間 [start, end)，依開始時間排序。
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    intervals: Vec<(NaiveDateTime, NaiveDateTime)>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    /// 檢查時段是否與已佔用時段不重疊
    pub fn is_free(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.intervals
            .iter()
            .all(|&(s, e)| end <= s || start >= e)
    }

    /// 佔用時段（維持排序）
    pub fn insert(&mut self, start: NaiveDateTime, end: NaiveDateTime) {
        let pos = self.intervals.partition_point(|&(s, e)| (s, e) <= (start, end));
        self.intervals.insert(pos, (start, end));
    }

    /// 從 `window_start` 起以 `step_minutes` 為步長往後搜尋，
    /// 回傳第一個長度為 `duration_minutes` 且不重疊的時段
    ///
    /// 時段必須完全落在 `window_end` 之前；長度為 0 時不搜尋。
    pub fn first_fit(
        &self,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
        duration_minutes: u32,
        step_minutes: u32,
    ) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if duration_minutes == 0 || step_minutes == 0 {
            return None;
        }

        let duration = Duration::minutes(i64::from(duration_minutes));
        let step = Duration::minutes(i64::from(step_minutes));

        let mut start = window_start;
        while start + duration <= window_end {
            let end = start + duration;
            if self.is_free(start, end) {
                return Some((start, end));
            }
            start += step;
        }

        None
    }

    /// 已佔用分鐘數
    pub fn occupied_minutes(&self) -> i64 {
        self.intervals
            .iter()
            .map(|&(s, e)| (e - s).num_minutes())
            .sum()
    }

    pub fn intervals(&self) -> &[(NaiveDateTime, NaiveDateTime)] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}
