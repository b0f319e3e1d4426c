use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::UserRole;

// 全校计数（缓存于 dashboard:stats）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct DashboardCounts {
    pub total_students: i64,
    pub total_teachers: i64,
    pub total_classes: i64,
    pub total_subjects: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct DashboardStatsResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub counts: DashboardCounts,
    pub role: UserRole,
    // 教师
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub allocation_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub today_slots: Option<i64>,
    // 学生
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub overall_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub attendance_rate: Option<f64>,
}
