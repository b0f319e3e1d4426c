use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 成绩；score 为空表示尚未评分
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct Grade {
    pub id: i64,
    pub assessment_id: i64,
    pub student_id: i64,
    pub score: Option<f64>,
    pub remarks: Option<String>,
    pub graded_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 带评估信息的成绩
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub grade: Grade,
    pub student_name: Option<String>,
    pub assessment_name: String,
    pub assessment_date: NaiveDate,
    pub bimester: i32,
    pub max_score: f64,
    pub weight: f64,
    pub class_id: i64,
    pub subject_id: i64,
    pub subject_name: Option<String>,
    pub class_name: Option<String>,
}

/// 报表计算用的成绩行
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAssessment {
    pub student_id: i64,
    pub subject_id: i64,
    pub bimester: i32,
    pub score: Option<f64>,
    pub max_score: f64,
    pub weight: f64,
}
