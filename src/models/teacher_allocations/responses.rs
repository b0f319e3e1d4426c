use super::entities::TeacherAllocationDetail;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/allocation.ts")]
pub struct AllocationListResponse {
    pub items: Vec<TeacherAllocationDetail>,
    pub pagination: PaginationInfo,
}
