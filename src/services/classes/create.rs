use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode, classes::requests::CreateClassRequest};
use crate::services::support::{
    bad_request, internal_failure, invalidate_dashboard, storage_failure,
};
use crate::storage::Storage;
use crate::utils::validate::{validate_class_year, validate_text};

/// 协调员必须是 coord 角色的用户；Ok(Some) 为校验失败的响应
pub(crate) async fn check_coordinator(
    storage: &dyn Storage,
    coord_id: i64,
) -> Result<Option<HttpResponse>, crate::errors::SchoolSystemError> {
    match storage.get_user_by_id(coord_id).await? {
        Some(user) if user.role == UserRole::Coord => Ok(None),
        Some(_) => Ok(Some(bad_request(
            ErrorCode::UserRoleMismatch,
            "Coordinator must be a user with the coord role",
        ))),
        None => Ok(Some(bad_request(
            ErrorCode::UserNotFound,
            "Coordinator not found",
        ))),
    }
}

pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    mut class_data: CreateClassRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Err(msg) = validate_text("Class name", &class_data.name, 1, 100) {
        return Ok(bad_request(ErrorCode::ClassNameInvalid, msg));
    }
    class_data.name = class_data.name.trim().to_string();

    if let Err(msg) = validate_class_year(class_data.year) {
        return Ok(bad_request(ErrorCode::ClassYearInvalid, msg));
    }

    if let Some(coord_id) = class_data.coord_id {
        match check_coordinator(storage.as_ref(), coord_id).await {
            Ok(None) => {}
            Ok(Some(response)) => return Ok(response),
            Err(e) => return Ok(internal_failure("Failed to verify coordinator", e)),
        }
    }

    match storage.create_class(class_data).await {
        Ok(class) => {
            info!("Class {} ({}) created", class.name, class.year);
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(class, "Class created successfully")))
        }
        Err(e) => Ok(storage_failure(
            "Class creation failed",
            e,
            ErrorCode::ClassAlreadyExists,
        )),
    }
}
