use super::entities::IncidentDetail;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/incident.ts")]
pub struct IncidentListResponse {
    pub items: Vec<IncidentDetail>,
    pub pagination: PaginationInfo,
}
