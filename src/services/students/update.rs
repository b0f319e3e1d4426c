use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::StudentService;
use super::create::validate_birth_date;
use crate::models::students::requests::UpdateStudentRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::support::{
    bad_request, evict_session_user, internal_failure, not_found, storage_failure,
};
use crate::utils::validate::{validate_enrollment_number, validate_full_name};

pub async fn update_student(
    service: &StudentService,
    request: &HttpRequest,
    student_id: i64,
    mut data: UpdateStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Some(ref number) = data.enrollment_number {
        let number = number.trim().to_string();
        if let Err(msg) = validate_enrollment_number(&number) {
            return Ok(bad_request(ErrorCode::EnrollmentNumberInvalid, msg));
        }
        data.enrollment_number = Some(number);
    }
    if let Some(Some(birth_date)) = data.birth_date
        && let Err(msg) = validate_birth_date(birth_date)
    {
        return Ok(bad_request(ErrorCode::BirthDateInvalid, msg));
    }
    if let Some(ref full_name) = data.full_name {
        if let Err(msg) = validate_full_name(full_name) {
            return Ok(bad_request(ErrorCode::UserFullNameInvalid, msg));
        }
        data.full_name = Some(full_name.trim().to_string());
    }

    let renames = data.full_name.is_some();

    let student = match storage.update_student(student_id, data).await {
        Ok(Some(student)) => student,
        Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => {
            return Ok(storage_failure(
                "Student update failed",
                e,
                ErrorCode::StudentAlreadyExists,
            ));
        }
    };

    info!("Student {} updated", student.id);
    if renames {
        evict_session_user(request, student.user_id).await;
    }

    match storage.get_student_detail(student.id).await {
        Ok(Some(detail)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(detail, "Student updated successfully"))),
        Ok(None) => Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => Ok(internal_failure("Failed to retrieve student", e)),
    }
}
