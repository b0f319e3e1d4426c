/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <token>` 中的 access token，加载对应用户并放入请求扩展。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use rust_school_system::middlewares::RequireJWT;
 *
 * web::scope("/api/v1/classes")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_classes));
 * ```
 *
 * 处理程序中通过 [`RequireJWT::extract_user_claims`] 取得当前用户。
 *
 * ## 认证流程
 *
 * 1. 提取并验证 access token（签名、过期时间、类型）
 * 2. 按用户 ID 先查缓存，未命中再查存储，写回缓存
 * 3. 非 active 用户一律拒绝
 * 4. 失败返回 401 与统一错误结构
 */

use crate::cache::{ObjectCache, ObjectCacheExt, keys};
use crate::config::AppConfig;
use crate::models::users::entities::{self, UserRole};
use crate::models::ErrorCode;
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

/// 认证失败原因
#[derive(Debug, PartialEq, Eq)]
enum AuthFailure {
    MissingToken,
    InvalidToken,
    UserNotFound,
    Inactive,
    Internal,
}

impl AuthFailure {
    fn response_parts(&self) -> (StatusCode, ErrorCode, &'static str) {
        match self {
            AuthFailure::MissingToken => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "Missing or invalid Authorization header",
            ),
            AuthFailure::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "Invalid or expired access token",
            ),
            AuthFailure::UserNotFound => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "User no longer exists",
            ),
            AuthFailure::Inactive => (
                StatusCode::FORBIDDEN,
                ErrorCode::AccountInactive,
                "Account is not active",
            ),
            AuthFailure::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Authentication backend unavailable",
            ),
        }
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// 提取并验证 access token，返回当前用户
async fn authenticate(req: &ServiceRequest) -> Result<entities::User, AuthFailure> {
    let token = bearer_token(req).ok_or(AuthFailure::MissingToken)?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        AuthFailure::InvalidToken
    })?;
    let user_id = claims.user_id().ok_or(AuthFailure::InvalidToken)?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone());
    let cache_key = keys::session_user(user_id);

    if let Some(ref cache) = cache
        && let Some(user) = cache.get_json::<entities::User>(&cache_key).await
    {
        debug!("Session user {} served from cache", user_id);
        return if user.is_active() {
            Ok(user)
        } else {
            Err(AuthFailure::Inactive)
        };
    }

    let Some(storage) = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
    else {
        error!("Storage not registered in app data");
        return Err(AuthFailure::Internal);
    };

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| {
            error!("Failed to load session user {}: {}", user_id, e);
            AuthFailure::Internal
        })?
        .ok_or(AuthFailure::UserNotFound)?;

    if let Some(cache) = cache {
        cache
            .insert_json(&cache_key, &user, AppConfig::get().cache.default_ttl)
            .await;
    }

    if !user.is_active() {
        return Err(AuthFailure::Inactive);
    }
    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // CORS 预检直接放行
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match authenticate(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(failure) => {
                    info!(
                        "JWT authentication failed for request to {}: {:?}",
                        req.path(),
                        failure
                    );
                    let (status, code, message) = failure.response_parts();
                    Ok(req.into_response(
                        create_error_response(status, code, message).map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取用户信息
impl RequireJWT {
    /// 从请求扩展中提取当前用户
    /// 此函数应该在应用了RequireJWT中间件的路由处理程序中使用
    pub fn extract_user_claims(req: &actix_web::HttpRequest) -> Option<entities::User> {
        req.extensions().get::<entities::User>().cloned()
    }

    /// 从请求扩展中提取用户ID
    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<entities::User>().map(|user| user.id)
    }

    /// 从请求扩展中提取用户角色
    pub fn extract_user_role(req: &actix_web::HttpRequest) -> Option<UserRole> {
        req.extensions()
            .get::<entities::User>()
            .map(|user| user.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION_HEADER, "Bearer abc.def.ghi"))
            .to_srv_request();
        assert_eq!(bearer_token(&req), Some("abc.def.ghi"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION_HEADER, "Basic abc"))
            .to_srv_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION_HEADER, "Bearer "))
            .to_srv_request();
        assert_eq!(bearer_token(&req), None);
    }

    #[test]
    fn test_inactive_account_is_forbidden() {
        let (status, code, _) = AuthFailure::Inactive.response_parts();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(code, ErrorCode::AccountInactive);

        let (status, _, _) = AuthFailure::InvalidToken.response_parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
