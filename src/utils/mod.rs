pub mod csv_upload;
pub mod extractor;
pub mod hhmm;
pub mod jwt;
pub mod parameter_error_handler;
pub mod password;
pub mod query;
pub mod random;
pub mod sql;
pub mod validate;

pub use extractor::{
    SafeAnnouncementIdI64, SafeAssessmentIdI64, SafeAttendanceIdI64, SafeClassIdI64,
    SafeGradeIdI64, SafeIDI64, SafeIncidentIdI64, SafeScheduleIdI64, SafeStudentIdI64,
};
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use sql::escape_like_pattern;

use serde::{Deserialize, Deserializer};

/// 区分"字段缺失"与"显式 null"：缺失为 None，null 为 Some(None)
///
/// 配合 `#[serde(default)]` 使用。
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        coord_id: Option<Option<i64>>,
    }

    #[test]
    fn test_deserialize_some_distinguishes_null() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.coord_id, None);

        let null: Patch = serde_json::from_str(r#"{"coord_id":null}"#).unwrap();
        assert_eq!(null.coord_id, Some(None));

        let set: Patch = serde_json::from_str(r#"{"coord_id":3}"#).unwrap();
        assert_eq!(set.coord_id, Some(Some(3)));
    }
}
