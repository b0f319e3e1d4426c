use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::students::entities::Student;
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::support::{forbidden, internal_failure, not_found, unauthorized};
use crate::storage::Storage;

/// 能否查看某个学生的档案与成绩
pub(crate) async fn can_view_student(
    storage: &dyn Storage,
    user: &User,
    student: &Student,
) -> Result<bool> {
    match user.role {
        UserRole::Admin | UserRole::Coord => Ok(true),
        UserRole::Teacher => match student.class_id {
            Some(class_id) => storage.is_teacher_allocated(user.id, class_id, None).await,
            None => Ok(false),
        },
        UserRole::Student => Ok(student.user_id == user.id),
    }
}

pub async fn get_student(
    service: &StudentService,
    request: &HttpRequest,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let detail = match storage.get_student_detail(student_id).await {
        Ok(Some(detail)) => detail,
        Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve student", e)),
    };

    match can_view_student(storage.as_ref(), &current_user, &detail.student).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Student information retrieved successfully",
        ))),
        Ok(false) => {
            tracing::info!("User {} denied access to student {}", current_user.id, student_id);
            Ok(forbidden(
                ErrorCode::Forbidden,
                "You do not have permission to view this student",
            ))
        }
        Err(e) => Ok(internal_failure("Failed to check permissions", e)),
    }
}

pub async fn get_my_student(
    service: &StudentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };

    let student = match storage.get_student_by_user_id(user_id).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::StudentProfileMissing,
                "No student record is linked to this account",
            ));
        }
        Err(e) => return Ok(internal_failure("Failed to retrieve student", e)),
    };

    match storage.get_student_detail(student.id).await {
        Ok(Some(detail)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Student information retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => Ok(internal_failure("Failed to retrieve student", e)),
    }
}
