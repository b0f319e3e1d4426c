use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 事件类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/incident.ts")]
pub enum IncidentKind {
    Behavior,
    Academic,
    Health,
    Other,
}

impl std::fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IncidentKind::Behavior => "behavior",
            IncidentKind::Academic => "academic",
            IncidentKind::Health => "health",
            IncidentKind::Other => "other",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for IncidentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "behavior" => Ok(IncidentKind::Behavior),
            "academic" => Ok(IncidentKind::Academic),
            "health" => Ok(IncidentKind::Health),
            "other" => Ok(IncidentKind::Other),
            _ => Err(format!("Invalid incident kind: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/incident.ts")]
pub struct Incident {
    pub id: i64,
    pub student_id: i64,
    pub reporter_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub kind: IncidentKind,
    pub description: String,
    pub date: NaiveDate,
    pub attachment_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/incident.ts")]
pub struct IncidentDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub incident: Incident,
    pub student_name: Option<String>,
    pub reporter_name: Option<String>,
    pub subject_name: Option<String>,
}
