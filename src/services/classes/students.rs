use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::ApiResponse;
use crate::models::classes::responses::ClassStudentsResponse;
use crate::services::support::internal_failure;

pub async fn list_class_students(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_class_students(class_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ClassStudentsResponse { class_id, items },
            "Class students retrieved successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to retrieve class students", e)),
    }
}
