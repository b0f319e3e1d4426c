use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveDate;
use tracing::info;

use super::StudentService;
use crate::models::students::requests::{CreateStudentRecord, CreateStudentRequest};
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::support::{
    bad_request, internal_failure, invalidate_dashboard, storage_failure,
};
use crate::services::users::create::validate_new_account;
use crate::services::users::import::hash_in_background;
use crate::utils::validate::validate_enrollment_number;

/// 出生日期不能晚于今天
pub(crate) fn validate_birth_date(birth_date: NaiveDate) -> Result<(), &'static str> {
    if birth_date > chrono::Utc::now().date_naive() {
        return Err("Birth date cannot be in the future");
    }
    Ok(())
}

pub async fn create_student(
    service: &StudentService,
    request: &HttpRequest,
    data: CreateStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let enrollment_number = data.enrollment_number.trim().to_string();
    if let Err(msg) = validate_enrollment_number(&enrollment_number) {
        return Ok(bad_request(ErrorCode::EnrollmentNumberInvalid, msg));
    }
    if let Some(birth_date) = data.birth_date
        && let Err(msg) = validate_birth_date(birth_date)
    {
        return Ok(bad_request(ErrorCode::BirthDateInvalid, msg));
    }

    if let Some(class_id) = data.class_id {
        match storage.get_class_by_id(class_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(bad_request(ErrorCode::ClassNotFound, "Class not found")),
            Err(e) => return Ok(internal_failure("Failed to verify class", e)),
        }
    }

    let mut record = CreateStudentRecord {
        user_id: 0,
        class_id: data.class_id,
        enrollment_number,
        birth_date: data.birth_date,
    };

    let result = match (data.user_id, data.account) {
        // 关联已有的学生账号
        (Some(user_id), None) => {
            match storage.get_user_by_id(user_id).await {
                Ok(Some(user)) if user.role == UserRole::Student => {}
                Ok(Some(_)) => {
                    return Ok(bad_request(
                        ErrorCode::UserRoleMismatch,
                        "The linked user must have the student role",
                    ));
                }
                Ok(None) => return Ok(bad_request(ErrorCode::UserNotFound, "User not found")),
                Err(e) => return Ok(internal_failure("Failed to verify user", e)),
            }
            record.user_id = user_id;
            storage.create_student(record).await
        }
        // 同时创建账号
        (None, Some(account)) => {
            let full_name = account.full_name.trim().to_string();
            if let Err((code, msg)) = validate_new_account(
                &account.username,
                &account.email,
                &account.password,
                &full_name,
            ) {
                return Ok(bad_request(code, msg));
            }
            let password = match hash_in_background(account.password).await {
                Ok(hash) => hash,
                Err(msg) => {
                    return Ok(HttpResponse::InternalServerError().json(
                        ApiResponse::error_empty(ErrorCode::InternalServerError, msg),
                    ));
                }
            };
            let user = CreateUserRequest {
                username: account.username,
                email: account.email,
                password,
                full_name,
                role: UserRole::Student,
            };
            storage.create_student_with_account(user, record).await
        }
        _ => {
            return Ok(bad_request(
                ErrorCode::InvalidParameter,
                "Provide either user_id or account, but not both",
            ));
        }
    };

    match result {
        Ok(student) => {
            info!("Student {} created", student.enrollment_number);
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(student, "Student created successfully")))
        }
        Err(e) => Ok(storage_failure(
            "Student creation failed",
            e,
            ErrorCode::StudentAlreadyExists,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_birth_date_not_in_future() {
        let today = chrono::Utc::now().date_naive();
        assert!(validate_birth_date(today).is_ok());
        assert!(validate_birth_date(today + chrono::Days::new(1)).is_err());
        assert!(validate_birth_date(NaiveDate::from_ymd_opt(2012, 5, 3).unwrap()).is_ok());
    }
}
