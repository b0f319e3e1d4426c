use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use super::create::check_coordinator;
use crate::middlewares::RequireClassAccess;
use crate::models::{ApiResponse, ErrorCode, classes::requests::UpdateClassRequest};
use crate::services::support::{
    bad_request, forbidden, internal_failure, not_found, storage_failure,
};
use crate::utils::validate::{validate_class_year, validate_text};

pub async fn update_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    mut update_data: UpdateClassRequest,
) -> ActixResult<HttpResponse> {
    // 协调员只能修改自己负责的班级
    if !RequireClassAccess::extract_access(request).is_some_and(|a| a.can_manage()) {
        return Ok(forbidden(
            ErrorCode::ClassPermissionDenied,
            "Only administrators or the class coordinator can modify this class",
        ));
    }

    let storage = service.get_storage(request);

    if let Some(ref name) = update_data.name {
        if let Err(msg) = validate_text("Class name", name, 1, 100) {
            return Ok(bad_request(ErrorCode::ClassNameInvalid, msg));
        }
        update_data.name = Some(name.trim().to_string());
    }

    if let Some(year) = update_data.year
        && let Err(msg) = validate_class_year(year)
    {
        return Ok(bad_request(ErrorCode::ClassYearInvalid, msg));
    }

    if let Some(Some(coord_id)) = update_data.coord_id {
        match check_coordinator(storage.as_ref(), coord_id).await {
            Ok(None) => {}
            Ok(Some(response)) => return Ok(response),
            Err(e) => return Ok(internal_failure("Failed to verify coordinator", e)),
        }
    }

    match storage.update_class(class_id, update_data).await {
        Ok(Some(class)) => {
            info!("Class {} updated", class.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(class, "Class updated successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => Ok(storage_failure(
            "Class update failed",
            e,
            ErrorCode::ClassAlreadyExists,
        )),
    }
}
