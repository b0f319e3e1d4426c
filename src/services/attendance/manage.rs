use std::collections::HashSet;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AttendanceService;
use crate::errors::SchoolSystemError;
use crate::middlewares::RequireJWT;
use crate::models::attendance::entities::{AttendanceRecord, AttendanceStatus};
use crate::models::attendance::requests::{
    AttendanceListQuery, AttendanceQueryParams, AttendanceUpsert, RecordAttendanceRequest,
    RollCallRequest, UpdateAttendanceRequest,
};
use crate::models::attendance::responses::{AttendanceListResponse, RollCallResponse};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode, PaginationInfo};
use crate::services::access::{allocation_pairs, can_teach, student_profile};
use crate::services::support::{
    bad_request, forbidden, internal_failure, not_found, storage_failure, unauthorized,
};
use crate::storage::Storage;
use crate::utils::validate::{validate_date_range, validate_text};

/// 规范化说明：请假必须填写，最长 500 字符，空白视为未填写
pub(crate) fn normalize_justification(
    status: AttendanceStatus,
    justification: Option<String>,
) -> Result<Option<String>, String> {
    let justification = justification
        .map(|j| j.trim().to_string())
        .filter(|j| !j.is_empty());
    if let Some(ref text) = justification {
        validate_text("Justification", text, 0, 500)?;
    }
    if status == AttendanceStatus::Justified && justification.is_none() {
        return Err("A justification is required for justified absences".to_string());
    }
    Ok(justification)
}

fn not_allocated() -> HttpResponse {
    forbidden(
        ErrorCode::TeacherNotAllocated,
        "You are not allocated to this class and subject",
    )
}

async fn ensure_subject(
    storage: &dyn Storage,
    subject_id: i64,
) -> Result<Option<HttpResponse>, SchoolSystemError> {
    Ok(storage
        .get_subject_by_id(subject_id)
        .await?
        .is_none()
        .then(|| not_found(ErrorCode::SubjectNotFound, "Subject not found")))
}

/// 读取考勤记录并确认当前用户可以维护它
async fn load_manageable(
    storage: &dyn Storage,
    user: &User,
    attendance_id: i64,
) -> Result<Result<AttendanceRecord, HttpResponse>, SchoolSystemError> {
    let Some(record) = storage.get_attendance_by_id(attendance_id).await? else {
        return Ok(Err(not_found(
            ErrorCode::AttendanceNotFound,
            "Attendance record not found",
        )));
    };
    if !can_teach(storage, user, record.class_id, record.subject_id).await? {
        return Ok(Err(not_allocated()));
    }
    Ok(Ok(record))
}

pub async fn list_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    query: AttendanceQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    if let Err(msg) = validate_date_range(query.start_date, query.end_date) {
        return Ok(bad_request(ErrorCode::AttendanceInvalid, msg));
    }

    let mut list_query = AttendanceListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        class_id: query.class_id,
        student_id: query.student_id,
        subject_id: query.subject_id,
        start_date: query.start_date,
        end_date: query.end_date,
        allocations: None,
    };

    match current_user.role {
        UserRole::Admin | UserRole::Coord => {}
        UserRole::Teacher => match allocation_pairs(storage.as_ref(), current_user.id).await {
            Ok(pairs) => list_query.allocations = Some(pairs),
            Err(e) => return Ok(internal_failure("Failed to resolve allocations", e)),
        },
        UserRole::Student => match student_profile(storage.as_ref(), &current_user).await {
            Ok(Some(student)) => list_query.student_id = Some(student.id),
            Ok(None) => {
                let (page, size) = query.pagination.normalized();
                let empty = AttendanceListResponse {
                    items: Vec::new(),
                    pagination: PaginationInfo::new(page, size, 0, 0),
                };
                return Ok(HttpResponse::Ok().json(ApiResponse::success(
                    empty,
                    "Attendance list retrieved successfully",
                )));
            }
            Err(e) => return Ok(internal_failure("Failed to resolve student profile", e)),
        },
    }

    match storage.list_attendance_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Attendance list retrieved successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to retrieve attendance", e)),
    }
}

pub async fn record_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    data: RecordAttendanceRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let justification = match normalize_justification(data.status, data.justification) {
        Ok(j) => j,
        Err(msg) => return Ok(bad_request(ErrorCode::AttendanceInvalid, msg)),
    };

    let class_id = match storage.get_student_by_id(data.student_id).await {
        Ok(Some(student)) => match student.class_id {
            Some(class_id) => class_id,
            None => {
                return Ok(bad_request(
                    ErrorCode::StudentNotInClass,
                    "The student is not assigned to a class",
                ));
            }
        },
        Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve student", e)),
    };

    match ensure_subject(storage.as_ref(), data.subject_id).await {
        Ok(None) => {}
        Ok(Some(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve subject", e)),
    }

    match can_teach(storage.as_ref(), &current_user, class_id, data.subject_id).await {
        Ok(true) => {}
        Ok(false) => return Ok(not_allocated()),
        Err(e) => return Ok(internal_failure("Failed to check allocation", e)),
    }

    let upsert = AttendanceUpsert {
        student_id: data.student_id,
        subject_id: data.subject_id,
        class_id,
        date: data.date,
        status: data.status,
        justification,
        recorded_by: current_user.id,
    };

    match storage.upsert_attendance(upsert).await {
        Ok(record) => {
            info!(
                "Attendance {} recorded for student {} on {}",
                record.status, record.student_id, record.date
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                record,
                "Attendance recorded successfully",
            )))
        }
        Err(e) => Ok(storage_failure(
            "Failed to record attendance",
            e,
            ErrorCode::AttendanceAlreadyExists,
        )),
    }
}

pub async fn roll_call(
    service: &AttendanceService,
    request: &HttpRequest,
    data: RollCallRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    if data.entries.is_empty() {
        return Ok(bad_request(
            ErrorCode::AttendanceInvalid,
            "At least one attendance entry is required",
        ));
    }

    match storage.get_class_by_id(data.class_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve class", e)),
    }
    match ensure_subject(storage.as_ref(), data.subject_id).await {
        Ok(None) => {}
        Ok(Some(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve subject", e)),
    }
    match can_teach(storage.as_ref(), &current_user, data.class_id, data.subject_id).await {
        Ok(true) => {}
        Ok(false) => return Ok(not_allocated()),
        Err(e) => return Ok(internal_failure("Failed to check allocation", e)),
    }

    let members: HashSet<i64> = match storage.list_class_students(data.class_id).await {
        Ok(students) => students.into_iter().map(|s| s.student.id).collect(),
        Err(e) => return Ok(internal_failure("Failed to retrieve class students", e)),
    };

    // 全部校验通过后才写入
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(data.entries.len());
    for entry in data.entries {
        if !seen.insert(entry.student_id) {
            return Ok(bad_request(
                ErrorCode::AttendanceInvalid,
                format!("Student {} appears more than once", entry.student_id),
            ));
        }
        if !members.contains(&entry.student_id) {
            return Ok(bad_request(
                ErrorCode::StudentNotInClass,
                format!("Student {} does not belong to class {}", entry.student_id, data.class_id),
            ));
        }
        let justification = match normalize_justification(entry.status, entry.justification) {
            Ok(j) => j,
            Err(msg) => {
                return Ok(bad_request(
                    ErrorCode::AttendanceInvalid,
                    format!("Student {}: {msg}", entry.student_id),
                ));
            }
        };
        records.push(AttendanceUpsert {
            student_id: entry.student_id,
            subject_id: data.subject_id,
            class_id: data.class_id,
            date: data.date,
            status: entry.status,
            justification,
            recorded_by: current_user.id,
        });
    }

    match storage.record_roll_call(records).await {
        Ok(items) => {
            info!(
                "Roll call for class {} subject {} on {}: {} entries",
                data.class_id,
                data.subject_id,
                data.date,
                items.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                RollCallResponse {
                    recorded: items.len(),
                    items,
                },
                "Roll call recorded successfully",
            )))
        }
        Err(e) => Ok(storage_failure(
            "Failed to record roll call",
            e,
            ErrorCode::AttendanceAlreadyExists,
        )),
    }
}

pub async fn update_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    attendance_id: i64,
    data: UpdateAttendanceRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let justification = match normalize_justification(data.status, data.justification) {
        Ok(j) => j,
        Err(msg) => return Ok(bad_request(ErrorCode::AttendanceInvalid, msg)),
    };

    match load_manageable(storage.as_ref(), &current_user, attendance_id).await {
        Ok(Ok(_)) => {}
        Ok(Err(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve attendance", e)),
    }

    match storage
        .update_attendance(attendance_id, data.status, justification, current_user.id)
        .await
    {
        Ok(Some(record)) => {
            info!("Attendance {} updated to {}", record.id, record.status);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                record,
                "Attendance updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::AttendanceNotFound,
            "Attendance record not found",
        )),
        Err(e) => Ok(internal_failure("Attendance update failed", e)),
    }
}

pub async fn delete_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    attendance_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    match load_manageable(storage.as_ref(), &current_user, attendance_id).await {
        Ok(Ok(_)) => {}
        Ok(Err(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve attendance", e)),
    }

    match storage.delete_attendance(attendance_id).await {
        Ok(true) => {
            info!("Attendance {} deleted", attendance_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Attendance deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::AttendanceNotFound,
            "Attendance record not found",
        )),
        Err(e) => Ok(internal_failure("Attendance deletion failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_justification_required_when_justified() {
        assert!(normalize_justification(AttendanceStatus::Justified, None).is_err());
        assert!(normalize_justification(AttendanceStatus::Justified, Some("   ".into())).is_err());
        assert_eq!(
            normalize_justification(AttendanceStatus::Justified, Some(" atestado ".into())),
            Ok(Some("atestado".to_string()))
        );
    }

    #[test]
    fn test_justification_optional_otherwise() {
        assert_eq!(normalize_justification(AttendanceStatus::Present, None), Ok(None));
        assert_eq!(
            normalize_justification(AttendanceStatus::Absent, Some(String::new())),
            Ok(None)
        );
        let too_long = "x".repeat(501);
        assert!(normalize_justification(AttendanceStatus::Absent, Some(too_long)).is_err());
    }
}
