use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::auth::requests::UpdateProfileRequest;
use crate::models::users::requests::UpdateUserRequest;
use crate::models::users::responses::UserResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::support::{
    bad_request, evict_session_user, internal_failure, not_found, storage_failure, unauthorized,
};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validate::{validate_email, validate_full_name, validate_password_simple};

use super::AuthService;

pub async fn handle_update_profile(
    service: &AuthService,
    update_data: UpdateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    if let Some(ref full_name) = update_data.full_name
        && let Err(msg) = validate_full_name(full_name)
    {
        return Ok(bad_request(ErrorCode::UserFullNameInvalid, msg));
    }

    // 邮箱格式与唯一性
    if let Some(ref email) = update_data.email {
        if let Err(msg) = validate_email(email) {
            return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
        }
        match storage.get_user_by_email(email).await {
            Ok(Some(existing)) if existing.id != current_user.id => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::UserAlreadyExists,
                    "Email is already in use",
                )));
            }
            Ok(_) => {}
            Err(e) => return Ok(internal_failure("Failed to check email", e)),
        }
    }

    // 修改密码需要当前密码
    let hashed_password = match update_data.new_password {
        Some(ref new_password) => {
            // 会话缓存中的用户不含密码哈希，需从存储读取
            let stored_hash = match storage.get_user_by_id(current_user.id).await {
                Ok(Some(user)) => user.password_hash,
                Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
                Err(e) => return Ok(internal_failure("Failed to load user", e)),
            };
            let confirmed = update_data
                .current_password
                .as_deref()
                .is_some_and(|current| verify_password(current, &stored_hash));
            if !confirmed {
                return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                    ErrorCode::AuthFailed,
                    "Current password is incorrect",
                )));
            }
            if let Err(msg) = validate_password_simple(new_password) {
                return Ok(bad_request(ErrorCode::PasswordPolicyViolation, msg));
            }
            match hash_password(new_password) {
                Ok(hash) => Some(hash),
                Err(e) => return Ok(internal_failure("Password hashing failed", e)),
            }
        }
        None => None,
    };

    // 角色与状态不可自行修改
    let storage_update = UpdateUserRequest {
        email: update_data.email,
        password: hashed_password,
        full_name: update_data.full_name.map(|n| n.trim().to_string()),
        role: None,
        status: None,
    };

    match storage.update_user(current_user.id, storage_update).await {
        Ok(Some(user)) => {
            evict_session_user(request, user.id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user },
                "Profile updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(storage_failure(
            "Failed to update profile",
            e,
            ErrorCode::UserAlreadyExists,
        )),
    }
}
