use super::entities::ScheduleDetail;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/schedule.ts")]
pub struct ScheduleListResponse {
    pub items: Vec<ScheduleDetail>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/schedule.ts")]
pub struct ScheduleDay {
    pub day_of_week: i32,
    pub slots: Vec<ScheduleDetail>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/schedule.ts")]
pub struct WeekScheduleResponse {
    pub days: Vec<ScheduleDay>,
    pub total_slots: usize,
    pub total_minutes: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/schedule.ts")]
pub struct TodayScheduleResponse {
    pub day_of_week: i32,
    pub items: Vec<ScheduleDetail>,
}
