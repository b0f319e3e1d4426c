use super::entities::{Grade, GradeDetail};
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeListResponse {
    pub items: Vec<GradeDetail>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct BulkGradeResponse {
    pub assessment_id: i64,
    pub items: Vec<Grade>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct SubjectAverage {
    pub subject_id: i64,
    pub subject_name: Option<String>,
    pub average: Option<f64>,
}

// 我的成绩汇总
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeSummary {
    /// 已评分成绩按评分刻度归一化后的算术平均
    pub overall_average: Option<f64>,
    pub graded_count: usize,
    pub per_subject: Vec<SubjectAverage>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct MyGradesResponse {
    pub items: Vec<GradeDetail>,
    pub summary: GradeSummary,
}
