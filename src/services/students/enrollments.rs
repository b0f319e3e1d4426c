use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use super::get::can_view_student;
use crate::middlewares::RequireJWT;
use crate::models::students::responses::EnrollmentListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::support::{forbidden, internal_failure, not_found, unauthorized};

pub async fn list_enrollments(
    service: &StudentService,
    request: &HttpRequest,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let student = match storage.get_student_by_id(student_id).await {
        Ok(Some(student)) => student,
        Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve student", e)),
    };

    match can_view_student(storage.as_ref(), &current_user, &student).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(forbidden(
                ErrorCode::Forbidden,
                "You do not have permission to view this student",
            ));
        }
        Err(e) => return Ok(internal_failure("Failed to check permissions", e)),
    }

    match storage.list_enrollments(student_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            EnrollmentListResponse { items },
            "Enrollment history retrieved successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to retrieve enrollments", e)),
    }
}
