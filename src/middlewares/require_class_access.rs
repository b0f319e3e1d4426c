/*!
 * 班级范围访问控制中间件
 *
 * 用于带 `{class_id}` 路径段的路由，必须在 RequireJWT 之后执行。
 *
 * - 管理员：任意班级
 * - 协调员：可读取任意班级；自己协调的班级额外可修改
 * - 教师：被分配任课的班级
 * - 学生：自己所在的班级
 *
 * 通过后把 [`ClassAccess`] 放入请求扩展，处理程序用它判断写权限。
 *
 * ```rust,ignore
 * web::resource("/{class_id}")
 *     .wrap(RequireClassAccess::readers())
 *     .route(web::get().to(get_class))
 * ```
 */

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
use tracing::{error, info};

use crate::errors::Result;
use crate::models::{
    ErrorCode,
    users::entities::{User, UserRole},
};
use crate::storage::Storage;

use super::create_error_response;

/// 当前用户与某个班级的关系
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassAccess {
    Admin,
    /// 该班级的协调员
    Coordinator,
    /// 其他协调员（只读）
    Management,
    /// 在该班级任课的教师
    Teacher,
    /// 该班级的学生
    Student,
}

impl ClassAccess {
    /// 可修改、删除班级
    pub fn can_manage(&self) -> bool {
        matches!(self, ClassAccess::Admin | ClassAccess::Coordinator)
    }

    /// 可查看班级全部学生数据
    pub fn is_staff(&self) -> bool {
        !matches!(self, ClassAccess::Student)
    }
}

/// 计算用户对班级的访问级别；None 表示无权访问
pub async fn resolve_class_access(
    storage: &dyn Storage,
    user: &User,
    class_id: i64,
) -> Result<Option<ClassAccess>> {
    match user.role {
        UserRole::Admin => Ok(Some(ClassAccess::Admin)),
        UserRole::Coord => {
            let coordinates = storage
                .get_class_by_id(class_id)
                .await?
                .is_some_and(|class| class.coord_id == Some(user.id));
            Ok(Some(if coordinates {
                ClassAccess::Coordinator
            } else {
                ClassAccess::Management
            }))
        }
        UserRole::Teacher => Ok(storage
            .is_teacher_allocated(user.id, class_id, None)
            .await?
            .then_some(ClassAccess::Teacher)),
        UserRole::Student => Ok(storage
            .get_student_by_user_id(user.id)
            .await?
            .filter(|student| student.class_id == Some(class_id))
            .map(|_| ClassAccess::Student)),
    }
}

#[derive(Clone)]
pub struct RequireClassAccess {
    allowed: Vec<ClassAccess>,
}

impl RequireClassAccess {
    pub fn new_any(allowed: &[ClassAccess]) -> Self {
        Self {
            allowed: allowed.to_vec(),
        }
    }

    /// 任何与班级有关系的用户
    pub fn readers() -> Self {
        Self::new_any(&[
            ClassAccess::Admin,
            ClassAccess::Coordinator,
            ClassAccess::Management,
            ClassAccess::Teacher,
            ClassAccess::Student,
        ])
    }

    /// 教职工（排除学生）
    pub fn staff() -> Self {
        Self::new_any(&[
            ClassAccess::Admin,
            ClassAccess::Coordinator,
            ClassAccess::Management,
            ClassAccess::Teacher,
        ])
    }

    /// 从请求扩展中取出访问级别
    pub fn extract_access(req: &actix_web::HttpRequest) -> Option<ClassAccess> {
        req.extensions().get::<ClassAccess>().copied()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireClassAccess
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireClassAccessMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireClassAccessMiddleware {
            service: Rc::new(service),
            allowed: self.allowed.clone(),
        }))
    }
}

pub struct RequireClassAccessMiddleware<S> {
    service: Rc<S>,
    allowed: Vec<ClassAccess>,
}

impl<S, B> Service<ServiceRequest> for RequireClassAccessMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let allowed = self.allowed.clone();

        Box::pin(async move {
            // 1. 当前用户
            let Some(user) = req.extensions().get::<User>().cloned() else {
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Authentication required",
                    )
                    .map_into_right_body(),
                ));
            };

            // 2. class_id
            let Some(class_id) = req
                .match_info()
                .get("class_id")
                .and_then(|s| s.parse::<i64>().ok())
                .filter(|id| *id > 0)
            else {
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::BAD_REQUEST,
                        ErrorCode::InvalidParameter,
                        "Missing or invalid class_id",
                    )
                    .map_into_right_body(),
                ));
            };

            // 3. 计算访问级别
            let Some(storage) = req
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .map(|data| data.get_ref().clone())
            else {
                error!("Storage not registered in app data");
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalServerError,
                        "Storage unavailable",
                    )
                    .map_into_right_body(),
                ));
            };

            let access = match resolve_class_access(storage.as_ref(), &user, class_id).await {
                Ok(access) => access,
                Err(e) => {
                    error!("Failed to resolve class access for user {}: {}", user.id, e);
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            "Failed to check class permission",
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            match access {
                Some(access) if allowed.contains(&access) => {
                    req.extensions_mut().insert(access);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                _ => {
                    info!(
                        "Class access denied for user {} (role: {}) on class {}",
                        user.id, user.role, class_id
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::ClassPermissionDenied,
                            "No permission for this class",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_access_levels() {
        assert!(ClassAccess::Admin.can_manage());
        assert!(ClassAccess::Coordinator.can_manage());
        assert!(!ClassAccess::Management.can_manage());
        assert!(!ClassAccess::Teacher.can_manage());
        assert!(ClassAccess::Teacher.is_staff());
        assert!(!ClassAccess::Student.is_staff());
    }

    #[test]
    fn test_presets() {
        assert!(RequireClassAccess::readers().allowed.contains(&ClassAccess::Student));
        assert!(!RequireClassAccess::staff().allowed.contains(&ClassAccess::Student));
    }
}
