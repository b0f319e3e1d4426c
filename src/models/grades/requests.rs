use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub assessment_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub student_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub class_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub subject_id: Option<i64>,
}

// 录入（或更新）单个成绩
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct UpsertGradeRequest {
    pub assessment_id: i64,
    pub student_id: i64,
    pub score: Option<f64>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct BulkGradeEntry {
    pub student_id: i64,
    pub score: Option<f64>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct BulkGradeRequest {
    pub grades: Vec<BulkGradeEntry>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct UpdateGradeRequest {
    #[serde(default, deserialize_with = "crate::utils::deserialize_some")]
    #[ts(type = "number | null")]
    pub score: Option<Option<f64>>,
    #[serde(default, deserialize_with = "crate::utils::deserialize_some")]
    #[ts(type = "string | null")]
    pub remarks: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct GradeListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub assessment_id: Option<i64>,
    pub student_id: Option<i64>,
    pub class_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub allocations: Option<Vec<(i64, i64)>>,
}
