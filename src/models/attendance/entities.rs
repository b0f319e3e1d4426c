use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 出勤状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub enum AttendanceStatus {
    Present,   // 出勤
    Absent,    // 缺勤
    Justified, // 请假（已说明）
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::Absent => write!(f, "absent"),
            AttendanceStatus::Justified => write!(f, "justified"),
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "justified" => Ok(AttendanceStatus::Justified),
            _ => Err(format!("Invalid attendance status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub class_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub justification: Option<String>,
    pub recorded_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub record: AttendanceRecord,
    pub student_name: Option<String>,
    pub subject_name: Option<String>,
}

/// 单个学生的出勤汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceSummary {
    pub total_classes: i64,
    pub present_count: i64,
    pub absent_count: i64,
    pub justified_count: i64,
    /// (出勤 + 请假) / 总数 × 100，保留两位小数
    pub attendance_rate: f64,
}

// 按学生与状态聚合的考勤条数（存储层聚合结果）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceTally {
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub count: i64,
}
