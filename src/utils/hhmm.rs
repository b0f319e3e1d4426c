//! `HH:MM` 格式的 `NaiveTime` 序列化
//!
//! 用法：`#[serde(with = "crate::utils::hhmm")]`，可选字段使用 `hhmm::option`。

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

use crate::entity::TIME_FORMAT;

pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(serde::de::Error::custom)
}

/// 接受 `HH:MM`，也容忍带秒的 `HH:MM:SS`
pub fn parse(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("Invalid time '{s}', expected HH:MM"))
}

pub mod option {
    use super::*;

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => super::serialize(t, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| parse(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Slot {
        #[serde(with = "crate::utils::hhmm")]
        start: NaiveTime,
        #[serde(default, with = "crate::utils::hhmm::option")]
        end: Option<NaiveTime>,
    }

    #[test]
    fn test_serializes_without_seconds() {
        let slot = Slot {
            start: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            end: None,
        };
        let json = serde_json::to_string(&slot).unwrap();
        assert_eq!(json, r#"{"start":"07:30","end":null}"#);
    }

    #[test]
    fn test_parses_optional_and_seconds() {
        let slot: Slot = serde_json::from_str(r#"{"start":"08:00:00","end":"08:50"}"#).unwrap();
        assert_eq!(slot.start, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(slot.end, NaiveTime::from_hms_opt(8, 50, 0));

        let missing: Slot = serde_json::from_str(r#"{"start":"08:00"}"#).unwrap();
        assert!(missing.end.is_none());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Slot>(r#"{"start":"25:99"}"#).is_err());
    }
}
