//! 查询字符串辅助
//!
//! 带 `#[serde(flatten)]` 的结构体会先把查询参数缓冲成字符串，
//! 数字字段无法直接反序列化，需要显式解析。

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, de::Error};

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Str(String),
    Int(i64),
    Float(f64),
}

/// 接受数字或数字字符串；空字符串视为未提供
pub fn opt_parse<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = match Option::<Raw>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Raw::Str(s)) => s,
        Some(Raw::Int(n)) => n.to_string(),
        Some(Raw::Float(n)) => n.to_string(),
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|e| D::Error::custom(format!("invalid value '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use crate::models::common::PaginationQuery;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Params {
        #[serde(flatten)]
        pagination: PaginationQuery,
        #[serde(default, deserialize_with = "super::opt_parse")]
        class_id: Option<i64>,
        #[serde(default, deserialize_with = "super::opt_parse")]
        day: Option<i32>,
    }

    fn parse(s: &str) -> Result<Params, actix_web::error::QueryPayloadError> {
        actix_web::web::Query::<Params>::from_query(s).map(|q| q.into_inner())
    }

    #[test]
    fn test_numbers_next_to_flattened_pagination() {
        let p = parse("page=2&class_id=7&day=3").unwrap();
        assert_eq!(p.pagination.page, 2);
        assert_eq!(p.class_id, Some(7));
        assert_eq!(p.day, Some(3));
    }

    #[test]
    fn test_missing_and_empty_values() {
        let p = parse("class_id=").unwrap();
        assert_eq!(p.class_id, None);
        assert_eq!(p.day, None);
        assert!(parse("class_id=abc").is_err());
    }
}
