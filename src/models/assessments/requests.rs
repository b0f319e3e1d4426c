use chrono::NaiveDate;
use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct AssessmentQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub class_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub subject_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub bimester: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct CreateAssessmentRequest {
    pub class_id: i64,
    pub subject_id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub bimester: i32,
    pub max_score: f64,
    pub weight: f64,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct UpdateAssessmentRequest {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub bimester: Option<i32>,
    pub max_score: Option<f64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct AssessmentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub class_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub bimester: Option<i32>,
    /// 限定在这些班级内
    pub class_ids: Option<Vec<i64>>,
    /// 限定在这些（班级, 学科）组合内（教师视角）
    pub allocations: Option<Vec<(i64, i64)>>,
}
