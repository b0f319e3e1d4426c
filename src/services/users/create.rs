use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{requests::CreateUserRequest, responses::UserResponse},
};
use crate::services::support::{bad_request, internal_failure, invalidate_dashboard, storage_failure};
use crate::utils::password::hash_password;
use crate::utils::validate::{
    validate_email, validate_full_name, validate_password_simple, validate_username,
};

/// 校验新建账号的字段；学生导入与内联建档共用
pub(crate) fn validate_new_account(
    username: &str,
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<(), (ErrorCode, String)> {
    validate_username(username).map_err(|m| (ErrorCode::UserNameInvalid, m.to_string()))?;
    validate_email(email).map_err(|m| (ErrorCode::UserEmailInvalid, m.to_string()))?;
    validate_full_name(full_name).map_err(|m| (ErrorCode::UserFullNameInvalid, m))?;
    validate_password_simple(password).map_err(|m| (ErrorCode::PasswordPolicyViolation, m))?;
    Ok(())
}

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    user_data.full_name = user_data.full_name.trim().to_string();

    if let Err((code, msg)) = validate_new_account(
        &user_data.username,
        &user_data.email,
        &user_data.password,
        &user_data.full_name,
    ) {
        return Ok(bad_request(code, msg));
    }

    user_data.password = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(internal_failure("Password hashing failed", e)),
    };

    let storage = service.get_storage(request);

    match storage.create_user(user_data).await {
        Ok(user) => {
            info!("User {} created with role {}", user.username, user.role);
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(UserResponse { user }, "User created successfully")))
        }
        Err(e) => Ok(storage_failure(
            "User creation failed",
            e,
            ErrorCode::UserAlreadyExists,
        )),
    }
}
