use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 教师任课分配
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/allocation.ts")]
pub struct TeacherAllocation {
    pub id: i64,
    pub teacher_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/allocation.ts")]
pub struct TeacherAllocationDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub allocation: TeacherAllocation,
    pub teacher_name: Option<String>,
    pub class_name: Option<String>,
    pub subject_name: Option<String>,
}
