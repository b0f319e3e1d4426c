use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::services::support::evict_session_user;
use crate::utils::jwt::JwtUtils;

/// 处理用户登出
///
/// 下发过期的 refresh_token cookie，并清除会话缓存
pub async fn handle_logout(request: &HttpRequest) -> ActixResult<HttpResponse> {
    if let Some(user_id) = RequireJWT::extract_user_id(request) {
        evict_session_user(request, user_id).await;
        tracing::info!("User {} logged out", user_id);
    }

    Ok(HttpResponse::Ok()
        .cookie(JwtUtils::create_empty_refresh_token_cookie())
        .json(ApiResponse::<()>::success_empty("Logged out")))
}
