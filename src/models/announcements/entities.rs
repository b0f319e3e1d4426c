use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 公告；target_class_id 为空表示全校公告
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/announcement.ts")]
pub struct Announcement {
    pub id: i64,
    pub author_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub target_class_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/announcement.ts")]
pub struct AnnouncementDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub announcement: Announcement,
    pub author_name: Option<String>,
    pub target_class_name: Option<String>,
}
