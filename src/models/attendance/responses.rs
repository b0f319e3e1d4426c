use super::entities::{AttendanceDetail, AttendanceRecord, AttendanceSummary};
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceListResponse {
    pub items: Vec<AttendanceDetail>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct RollCallResponse {
    pub recorded: usize,
    pub items: Vec<AttendanceRecord>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct StudentAttendanceSummary {
    pub student_id: i64,
    pub student_name: Option<String>,
    pub enrollment_number: String,
    #[serde(flatten)]
    #[ts(flatten)]
    pub summary: AttendanceSummary,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct ClassAttendanceSummaryResponse {
    pub class_id: i64,
    pub items: Vec<StudentAttendanceSummary>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct MyAttendanceResponse {
    pub items: Vec<AttendanceDetail>,
    pub summary: AttendanceSummary,
}
