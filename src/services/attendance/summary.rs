use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttendanceService;
use crate::middlewares::RequireJWT;
use crate::models::attendance::entities::{AttendanceDetail, AttendanceStatus, AttendanceSummary};
use crate::models::attendance::requests::{AttendanceListQuery, AttendanceSummaryParams};
use crate::models::attendance::responses::{
    ClassAttendanceSummaryResponse, MyAttendanceResponse, StudentAttendanceSummary,
};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{allocation_pairs, student_profile};
use crate::services::reports::calc::{attendance_summary, summarize_tallies};
use crate::services::support::{bad_request, internal_failure, not_found, unauthorized};
use crate::utils::validate::validate_date_range;

/// 由明细记录直接汇总
pub(crate) fn summarize_records(items: &[AttendanceDetail]) -> AttendanceSummary {
    let count = |status: AttendanceStatus| {
        items.iter().filter(|i| i.record.status == status).count() as i64
    };
    attendance_summary(
        count(AttendanceStatus::Present),
        count(AttendanceStatus::Absent),
        count(AttendanceStatus::Justified),
    )
}

pub async fn my_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    params: AttendanceSummaryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    if let Err(msg) = validate_date_range(params.start_date, params.end_date) {
        return Ok(bad_request(ErrorCode::AttendanceInvalid, msg));
    }

    let student = match student_profile(storage.as_ref(), &current_user).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::StudentProfileMissing,
                "No student record is linked to this account",
            ));
        }
        Err(e) => return Ok(internal_failure("Failed to resolve student profile", e)),
    };

    match storage
        .list_student_attendance(student.id, params.start_date, params.end_date)
        .await
    {
        Ok(mut items) => {
            if let Some(subject_id) = params.subject_id {
                items.retain(|i| i.record.subject_id == subject_id);
            }
            let summary = summarize_records(&items);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                MyAttendanceResponse { items, summary },
                "Attendance retrieved successfully",
            )))
        }
        Err(e) => Ok(internal_failure("Failed to retrieve attendance", e)),
    }
}

/// 班级出勤汇总：班上每个学生一行，没有记录的学生出勤率为 0
pub async fn class_summary(
    service: &AttendanceService,
    request: &HttpRequest,
    class_id: i64,
    params: AttendanceSummaryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    if let Err(msg) = validate_date_range(params.start_date, params.end_date) {
        return Ok(bad_request(ErrorCode::AttendanceInvalid, msg));
    }

    match storage.get_class_by_id(class_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve class", e)),
    }

    let students = match storage.list_class_students(class_id).await {
        Ok(students) => students,
        Err(e) => return Ok(internal_failure("Failed to retrieve class students", e)),
    };

    let mut query = AttendanceListQuery {
        class_id: Some(class_id),
        subject_id: params.subject_id,
        start_date: params.start_date,
        end_date: params.end_date,
        ..Default::default()
    };
    if current_user.role == UserRole::Teacher {
        match allocation_pairs(storage.as_ref(), current_user.id).await {
            Ok(pairs) => query.allocations = Some(pairs),
            Err(e) => return Ok(internal_failure("Failed to resolve allocations", e)),
        }
    }

    let tallies = match storage.attendance_tallies(query).await {
        Ok(tallies) => summarize_tallies(&tallies),
        Err(e) => return Ok(internal_failure("Failed to summarize attendance", e)),
    };

    let items = students
        .into_iter()
        .map(|detail| {
            let summary = tallies
                .get(&detail.student.id)
                .cloned()
                .unwrap_or_else(|| attendance_summary(0, 0, 0));
            StudentAttendanceSummary {
                student_id: detail.student.id,
                student_name: Some(detail.full_name),
                enrollment_number: detail.student.enrollment_number,
                summary,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ClassAttendanceSummaryResponse { class_id, items },
        "Attendance summary retrieved successfully",
    )))
}
