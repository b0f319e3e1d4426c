use chrono::NaiveDate;
use serde::Deserialize;
use ts_rs::TS;

use super::entities::IncidentKind;
use crate::models::common::PaginationQuery;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/incident.ts")]
pub struct IncidentQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub student_id: Option<i64>,
    pub kind: Option<IncidentKind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/incident.ts")]
pub struct CreateIncidentRequest {
    pub student_id: i64,
    pub subject_id: Option<i64>,
    pub kind: IncidentKind,
    pub description: String,
    pub date: NaiveDate,
    pub attachment_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/incident.ts")]
pub struct UpdateIncidentRequest {
    pub kind: Option<IncidentKind>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "crate::utils::deserialize_some")]
    #[ts(type = "string | null")]
    pub attachment_url: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct IncidentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<i64>,
    pub kind: Option<IncidentKind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reporter_id: Option<i64>,
}
