use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 评估（考试、作业等可评分事件）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct Assessment {
    pub id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub name: String,
    pub date: NaiveDate,
    /// 1..=4
    pub bimester: i32,
    pub max_score: f64,
    pub weight: f64,
    pub created_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct AssessmentDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub assessment: Assessment,
    pub class_name: Option<String>,
    pub subject_name: Option<String>,
    pub graded_count: i64,
}
