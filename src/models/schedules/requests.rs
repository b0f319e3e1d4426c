use chrono::NaiveTime;
use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/schedule.ts")]
pub struct ScheduleQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub class_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub teacher_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub day_of_week: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/schedule.ts")]
pub struct CreateScheduleRequest {
    pub class_id: i64,
    pub subject_id: i64,
    pub teacher_id: i64,
    pub day_of_week: i32,
    #[serde(with = "crate::utils::hhmm")]
    #[ts(type = "string")]
    pub start_time: NaiveTime,
    #[serde(with = "crate::utils::hhmm")]
    #[ts(type = "string")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/schedule.ts")]
pub struct UpdateScheduleRequest {
    pub subject_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub day_of_week: Option<i32>,
    #[serde(default, with = "crate::utils::hhmm::option")]
    #[ts(type = "string | null")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "crate::utils::hhmm::option")]
    #[ts(type = "string | null")]
    pub end_time: Option<NaiveTime>,
}

// 周课表查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/schedule.ts")]
pub struct WeekScheduleParams {
    pub class_id: Option<i64>,
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub class_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub day_of_week: Option<i32>,
}
