//! 路径参数安全提取
//!
//! `define_safe_i64_extractor!` 生成的新类型既可直接作为处理函数参数（读取指定的
//! 路径段），也可放进 `web::Path<(A, B)>` 中按位置反序列化。非正整数一律 400。

use actix_web::{HttpRequest, HttpResponse, error::InternalError};

use crate::models::{ApiResponse, ErrorCode};

#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = std::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _payload: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                std::future::ready($crate::utils::extractor::path_i64(req, $param).map($name))
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = <i64 as serde::Deserialize>::deserialize(deserializer)?;
                if value <= 0 {
                    return Err(serde::de::Error::custom(format!(
                        "Invalid {}: must be a positive integer",
                        $param
                    )));
                }
                Ok($name(value))
            }
        }
    };
}

define_safe_i64_extractor!(SafeIDI64, "id");
define_safe_i64_extractor!(SafeClassIdI64, "class_id");
define_safe_i64_extractor!(SafeStudentIdI64, "student_id");
define_safe_i64_extractor!(SafeAssessmentIdI64, "assessment_id");
define_safe_i64_extractor!(SafeGradeIdI64, "grade_id");
define_safe_i64_extractor!(SafeAttendanceIdI64, "attendance_id");
define_safe_i64_extractor!(SafeScheduleIdI64, "schedule_id");
define_safe_i64_extractor!(SafeIncidentIdI64, "incident_id");
define_safe_i64_extractor!(SafeAnnouncementIdI64, "announcement_id");

/// 读取并校验路径段中的正整数 ID
pub fn path_i64(req: &HttpRequest, param: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(param).unwrap_or_default();
    match raw.parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => {
            let message = format!("Invalid {param}: must be a positive integer");
            let response = HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::InvalidParameter, &message));
            Err(InternalError::from_response(message, response).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{FromRequest, test::TestRequest};

    use super::*;

    #[actix_web::test]
    async fn test_extracts_positive_id() {
        let req = TestRequest::default().param("class_id", "42").to_http_request();
        let id = SafeClassIdI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 42);
    }

    #[actix_web::test]
    async fn test_rejects_non_positive_or_garbage() {
        for raw in ["0", "-3", "abc", ""] {
            let req = TestRequest::default().param("id", raw).to_http_request();
            assert!(SafeIDI64::extract(&req).await.is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_deserialize_checks_sign() {
        let id: SafeStudentIdI64 = serde_json::from_str("7").unwrap();
        assert_eq!(id, SafeStudentIdI64(7));
        assert!(serde_json::from_str::<SafeStudentIdI64>("0").is_err());
    }
}
