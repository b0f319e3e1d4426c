use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 每页条数上限
pub const MAX_PAGE_SIZE: i64 = 100;
/// 页码上限，保证 (page - 1) * size 不超出 i64
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

// 分页查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct PaginationQuery {
    #[serde(
        default = "default_page",
        deserialize_with = "deserialize_string_to_i64"
    )]
    pub page: i64,
    #[serde(
        default = "default_size",
        deserialize_with = "deserialize_string_to_i64"
    )]
    pub size: i64,
}

// 分页响应信息
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

// 分页列表响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct PaginatedResponse<T: TS> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

// 自定义反序列化函数，支持字符串到i64的转换
fn deserialize_string_to_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{Error, Unexpected, Visitor};
    use std::fmt;

    struct I64Visitor;

    impl<'de> Visitor<'de> for I64Visitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a string containing an integer")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            if value <= i64::MAX as u64 {
                Ok(value as i64)
            } else {
                Err(Error::invalid_value(Unexpected::Unsigned(value), &self))
            }
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            value
                .parse()
                .map_err(|_| Error::invalid_value(Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(I64Visitor)
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    10
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

impl PaginationQuery {
    /// 规范化后的页码与每页条数（页码从 1 开始，每页 1..=100）
    pub fn normalized(&self) -> (u64, u64) {
        (
            self.page.clamp(1, MAX_PAGE) as u64,
            self.size.clamp(1, MAX_PAGE_SIZE) as u64,
        )
    }
}

impl PaginationInfo {
    pub fn new(page: u64, page_size: u64, total: u64, total_pages: u64) -> Self {
        Self {
            page: page as i64,
            page_size: page_size as i64,
            total: total as i64,
            total_pages: total_pages as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(flatten)]
        pagination: PaginationQuery,
        #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
        class_id: Option<i64>,
    }

    #[test]
    fn test_query_string_pagination() {
        let w: Wrapper = serde_urlencoded_from("page=3&size=20&class_id=7");
        assert_eq!(w.pagination.page, 3);
        assert_eq!(w.pagination.size, 20);
        assert_eq!(w.class_id, Some(7));
    }

    #[test]
    fn test_defaults_and_clamp() {
        let w: Wrapper = serde_urlencoded_from("size=1000");
        assert_eq!(w.pagination.page, 1);
        assert_eq!(w.pagination.normalized(), (1, 100));

        let q = PaginationQuery { page: -4, size: 0 };
        assert_eq!(q.normalized(), (1, 1));

        let q = PaginationQuery {
            page: i64::MAX,
            size: 100,
        };
        let (page, size) = q.normalized();
        assert_eq!(page, MAX_PAGE as u64);
        assert!((page - 1).checked_mul(size).is_some_and(|o| o <= i64::MAX as u64));
    }

    fn serde_urlencoded_from<T: serde::de::DeserializeOwned>(s: &str) -> T {
        actix_web::web::Query::<T>::from_query(s).unwrap().into_inner()
    }
}
