use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        entities::{UserRole, UserStatus},
        requests::UpdateUserRequest,
        responses::UserResponse,
    },
};
use crate::services::support::{
    bad_request, conflict, evict_session_user, internal_failure, invalidate_dashboard, not_found,
    storage_failure,
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_full_name, validate_password_simple};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    // 管理员不能降级或停用自己
    if RequireJWT::extract_user_id(request) == Some(user_id) {
        let demotes = update_data.role.is_some_and(|r| r != UserRole::Admin);
        let deactivates = update_data.status.is_some_and(|s| s != UserStatus::Active);
        if demotes || deactivates {
            return Ok(bad_request(
                ErrorCode::BadRequest,
                "You cannot change your own role or status",
            ));
        }
    }

    if let Some(ref email) = update_data.email
        && let Err(msg) = validate_email(email)
    {
        return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
    }

    if let Some(ref full_name) = update_data.full_name {
        if let Err(msg) = validate_full_name(full_name) {
            return Ok(bad_request(ErrorCode::UserFullNameInvalid, msg));
        }
        update_data.full_name = Some(full_name.trim().to_string());
    }

    if let Some(ref password) = update_data.password {
        if let Err(msg) = validate_password_simple(password) {
            return Ok(bad_request(ErrorCode::PasswordPolicyViolation, msg));
        }
        update_data.password = match hash_password(password) {
            Ok(hash) => Some(hash),
            Err(e) => return Ok(internal_failure("Password hashing failed", e)),
        };
    }

    let storage = service.get_storage(request);

    let demotes = update_data.role.is_some_and(|r| r != UserRole::Admin);
    let deactivates = update_data.status.is_some_and(|s| s != UserStatus::Active);
    if demotes || deactivates {
        match storage.find_system_admin_id().await {
            Ok(Some(admin_id)) if admin_id == user_id => {
                return Ok(bad_request(
                    ErrorCode::CannotDeleteSystemAdmin,
                    "The system administrator must stay an active admin",
                ));
            }
            Ok(_) => {}
            Err(e) => return Ok(internal_failure("Failed to resolve system administrator", e)),
        }
    }

    // 角色变更不能让学生档案、任课分配或协调班级指向不匹配的角色
    if let Some(next_role) = update_data.role {
        let current = match storage.get_user_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
            Err(e) => return Ok(internal_failure("Failed to retrieve user", e)),
        };
        let links = match storage.get_role_links(user_id).await {
            Ok(links) => links,
            Err(e) => return Ok(internal_failure("Failed to check user references", e)),
        };
        if let Some(reason) = links.blocking_link(current.role, next_role) {
            return Ok(conflict(ErrorCode::UserRoleMismatch, reason));
        }
    }

    match storage.update_user(user_id, update_data).await {
        Ok(Some(user)) => {
            info!("User {} updated", user.id);
            evict_session_user(request, user.id).await;
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user },
                "User updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(storage_failure(
            "User update failed",
            e,
            ErrorCode::UserAlreadyExists,
        )),
    }
}
