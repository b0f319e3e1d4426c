use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::StudentService;
use crate::models::students::requests::TransferStudentRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::support::{bad_request, internal_failure, not_found};

pub async fn transfer_student(
    service: &StudentService,
    request: &HttpRequest,
    student_id: i64,
    data: TransferStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_class_by_id(data.class_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(bad_request(ErrorCode::ClassNotFound, "Target class not found")),
        Err(e) => return Ok(internal_failure("Failed to verify class", e)),
    }

    match storage.transfer_student(student_id, data.class_id).await {
        Ok(Some(student)) => {
            info!("Student {} transferred to class {}", student.id, data.class_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                student,
                "Student transferred successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => Ok(internal_failure("Student transfer failed", e)),
    }
}
