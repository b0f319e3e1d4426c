use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::middlewares::RequireClassAccess;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::support::{forbidden, internal_failure, invalidate_dashboard, not_found};

pub async fn delete_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    if !RequireClassAccess::extract_access(request).is_some_and(|a| a.can_manage()) {
        return Ok(forbidden(
            ErrorCode::ClassPermissionDenied,
            "Only administrators or the class coordinator can delete this class",
        ));
    }

    let storage = service.get_storage(request);

    match storage.delete_class(class_id).await {
        Ok(true) => {
            info!("Class {} deleted", class_id);
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Class deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => Ok(internal_failure("Class deletion failed", e)),
    }
}
