use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课表时段
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/schedule.ts")]
pub struct Schedule {
    pub id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub teacher_id: i64,
    /// 1 = 周一 .. 7 = 周日
    pub day_of_week: i32,
    #[serde(with = "crate::utils::hhmm")]
    #[ts(type = "string")]
    pub start_time: NaiveTime,
    #[serde(with = "crate::utils::hhmm")]
    #[ts(type = "string")]
    pub end_time: NaiveTime,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Schedule {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/schedule.ts")]
pub struct ScheduleDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub schedule: Schedule,
    pub class_name: Option<String>,
    pub subject_name: Option<String>,
    pub teacher_name: Option<String>,
}
