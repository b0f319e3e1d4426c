use actix_web::{
    HttpRequest, HttpResponse,
    error::{InternalError, JsonPayloadError, QueryPayloadError},
};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

/// JSON 请求体解析失败时返回统一的错误包
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("JSON payload rejected on {}: {}", req.path(), err);

    let (response, message) = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => (
            HttpResponse::PayloadTooLarge().json(ApiResponse::error_empty(
                ErrorCode::PayloadTooLarge,
                "Request body is too large",
            )),
            "Request body is too large".to_string(),
        ),
        JsonPayloadError::ContentType => {
            let message = "Content-Type must be application/json".to_string();
            (
                HttpResponse::UnsupportedMediaType()
                    .json(ApiResponse::error_empty(ErrorCode::BadRequest, &message)),
                message,
            )
        }
        _ => {
            let message = format!("Invalid JSON body: {err}");
            (
                HttpResponse::BadRequest()
                    .json(ApiResponse::error_empty(ErrorCode::InvalidParameter, &message)),
                message,
            )
        }
    };

    InternalError::from_response(message, response).into()
}

/// 查询参数解析失败时返回统一的错误包
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Query string rejected on {}: {}", req.path(), err);

    let message = format!("Invalid query parameters: {err}");
    let response = HttpResponse::BadRequest()
        .json(ApiResponse::error_empty(ErrorCode::InvalidParameter, &message));
    InternalError::from_response(message, response).into()
}

#[cfg(test)]
mod tests {
    use actix_web::{ResponseError, http::StatusCode, test::TestRequest};

    use super::*;

    #[test]
    fn test_query_error_is_bad_request() {
        let req = TestRequest::default().uri("/api/v1/classes?page=x").to_http_request();
        let err = actix_web::web::Query::<std::collections::HashMap<String, i64>>::from_query(
            "page=x",
        )
        .unwrap_err();
        let error = query_error_handler(err, &req);
        assert_eq!(error.as_response_error().status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_json_content_type_error() {
        let req = TestRequest::default().to_http_request();
        let error = json_error_handler(JsonPayloadError::ContentType, &req);
        assert_eq!(
            error.as_response_error().status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }
}
