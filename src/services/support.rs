//! 服务层共用的响应与缓存辅助

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, error};

use crate::cache::{ObjectCache, keys};
use crate::errors::SchoolSystemError;
use crate::models::{ApiResponse, ErrorCode};

pub(crate) fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::Unauthorized,
        "Unauthorized access, please login",
    ))
}

pub(crate) fn forbidden(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn not_found(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn conflict(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(code, message))
}

/// 存储层错误转换为响应
///
/// 唯一约束冲突返回 409（使用 `conflict_code`），外键或校验错误返回 400，其余 500。
pub(crate) fn storage_failure(
    context: &str,
    err: SchoolSystemError,
    conflict_code: ErrorCode,
) -> HttpResponse {
    match err {
        SchoolSystemError::Conflict(_) => HttpResponse::Conflict().json(ApiResponse::error_empty(
            conflict_code,
            format!("{context}: record already exists"),
        )),
        SchoolSystemError::Validation(msg) => HttpResponse::BadRequest().json(
            ApiResponse::error_empty(ErrorCode::BadRequest, format!("{context}: {msg}")),
        ),
        SchoolSystemError::NotFound(msg) => HttpResponse::NotFound().json(
            ApiResponse::error_empty(ErrorCode::NotFound, format!("{context}: {msg}")),
        ),
        other => {
            error!("{}: {}", context, other);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("{context}: {}", other.message()),
            ))
        }
    }
}

/// 无冲突语义的存储错误
pub(crate) fn internal_failure(context: &str, err: SchoolSystemError) -> HttpResponse {
    storage_failure(context, err, ErrorCode::Conflict)
}

pub(crate) fn object_cache(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|cache| cache.get_ref().clone())
}

/// 用户资料、角色或状态变化后清除会话缓存
pub(crate) async fn evict_session_user(request: &HttpRequest, user_id: i64) {
    if let Some(cache) = object_cache(request) {
        cache.remove(&keys::session_user(user_id)).await;
        debug!("Evicted cached session for user {}", user_id);
    }
}

/// 用户、班级、学科变更后清除仪表盘计数
pub(crate) async fn invalidate_dashboard(request: &HttpRequest) {
    if let Some(cache) = object_cache(request) {
        cache.remove(keys::DASHBOARD_STATS).await;
        debug!("Dashboard counters invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_storage_failure_status_mapping() {
        let conflict = storage_failure(
            "Failed to create class",
            SchoolSystemError::conflict("UNIQUE"),
            ErrorCode::ClassAlreadyExists,
        );
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let fk = internal_failure("Failed", SchoolSystemError::validation("FOREIGN KEY"));
        assert_eq!(fk.status(), StatusCode::BAD_REQUEST);

        let db = internal_failure("Failed", SchoolSystemError::database_operation("boom"));
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
