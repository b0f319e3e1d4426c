use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::StudentService;
use crate::models::students::requests::DeleteStudentParams;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::support::{
    evict_session_user, internal_failure, invalidate_dashboard, not_found,
};

pub async fn delete_student(
    service: &StudentService,
    request: &HttpRequest,
    student_id: i64,
    params: DeleteStudentParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let student = match storage.get_student_by_id(student_id).await {
        Ok(Some(student)) => student,
        Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve student", e)),
    };

    match storage.delete_student(student_id, params.delete_profile).await {
        Ok(true) => {
            info!(
                "Student {} deleted (profile removed: {})",
                student_id, params.delete_profile
            );
            if params.delete_profile {
                evict_session_user(request, student.user_id).await;
            }
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Student deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => Ok(internal_failure("Student deletion failed", e)),
    }
}
