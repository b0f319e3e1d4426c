use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/announcement.ts")]
pub struct AnnouncementQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub target_class_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/announcement.ts")]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub content: String,
    pub target_class_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/announcement.ts")]
pub struct UpdateAnnouncementRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "crate::utils::deserialize_some")]
    #[ts(type = "number | null")]
    pub target_class_id: Option<Option<i64>>,
}

// 公告可见范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnouncementAudience {
    /// 全部公告
    All,
    /// 全校公告加上这些班级的公告
    GlobalAnd(Vec<i64>),
}

#[derive(Debug, Clone)]
pub struct AnnouncementListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub target_class_id: Option<i64>,
    pub audience: AnnouncementAudience,
}
