use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveTime;
use tracing::info;

use super::ScheduleService;
use super::timetable::find_conflict;
use crate::middlewares::RequireJWT;
use crate::models::schedules::requests::{
    CreateScheduleRequest, ScheduleListQuery, ScheduleQueryParams, UpdateScheduleRequest,
};
use crate::models::schedules::responses::ScheduleListResponse;
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode, PaginationInfo};
use crate::services::access::student_profile;
use crate::services::support::{
    bad_request, internal_failure, not_found, storage_failure, unauthorized,
};
use crate::storage::Storage;
use crate::utils::validate::{validate_day_of_week, validate_time_range};

/// 一个待写入的时段
struct SlotPlan {
    class_id: i64,
    subject_id: i64,
    teacher_id: i64,
    day_of_week: i32,
    start_time: NaiveTime,
    end_time: NaiveTime,
}

/// 校验时段：星期与时间范围、教师任课、与同班或同一教师的课表不重叠
async fn check_slot(
    storage: &dyn Storage,
    plan: &SlotPlan,
    exclude_id: Option<i64>,
) -> Result<Option<HttpResponse>, crate::errors::SchoolSystemError> {
    if let Err(msg) = validate_day_of_week(plan.day_of_week) {
        return Ok(Some(bad_request(ErrorCode::ScheduleInvalid, msg)));
    }
    if let Err(msg) = validate_time_range(plan.start_time, plan.end_time) {
        return Ok(Some(bad_request(ErrorCode::ScheduleInvalid, msg)));
    }

    if !storage
        .is_teacher_allocated(plan.teacher_id, plan.class_id, Some(plan.subject_id))
        .await?
    {
        return Ok(Some(bad_request(
            ErrorCode::TeacherNotAllocated,
            "The teacher is not allocated to this class and subject",
        )));
    }

    let same_day = storage
        .list_day_slots(plan.day_of_week, plan.class_id, plan.teacher_id)
        .await?;
    if let Some(conflict) = find_conflict(&same_day, plan.start_time, plan.end_time, exclude_id)
    {
        let who = if conflict.class_id == plan.class_id {
            "the class"
        } else {
            "the teacher"
        };
        return Ok(Some(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::ScheduleConflict,
            format!(
                "Time slot overlaps {who}'s schedule {} ({}-{})",
                conflict.id,
                conflict.start_time.format("%H:%M"),
                conflict.end_time.format("%H:%M")
            ),
        ))));
    }
    Ok(None)
}

/// 教师只看自己的课表，学生只看本班；Ok(None) 表示学生未分班
pub(crate) async fn scope_schedule_query(
    storage: &dyn Storage,
    user: &User,
    mut query: ScheduleListQuery,
) -> Result<Option<ScheduleListQuery>, crate::errors::SchoolSystemError> {
    match user.role {
        UserRole::Admin | UserRole::Coord => {}
        UserRole::Teacher => query.teacher_id = Some(user.id),
        UserRole::Student => match student_profile(storage, user).await?.and_then(|s| s.class_id) {
            Some(class_id) => query.class_id = Some(class_id),
            None => return Ok(None),
        },
    }
    Ok(Some(query))
}

pub async fn list_schedules(
    service: &ScheduleService,
    request: &HttpRequest,
    query: ScheduleQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let (page, size) = query.pagination.normalized();
    let list_query = ScheduleListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        class_id: query.class_id,
        teacher_id: query.teacher_id,
        day_of_week: query.day_of_week,
    };

    let list_query = match scope_schedule_query(storage.as_ref(), &current_user, list_query).await
    {
        Ok(Some(q)) => q,
        Ok(None) => {
            let empty = ScheduleListResponse {
                items: Vec::new(),
                pagination: PaginationInfo::new(page, size, 0, 0),
            };
            return Ok(HttpResponse::Ok().json(ApiResponse::success(
                empty,
                "Schedule list retrieved successfully",
            )));
        }
        Err(e) => return Ok(internal_failure("Failed to resolve schedule scope", e)),
    };

    match storage.list_schedules_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Schedule list retrieved successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to retrieve schedules", e)),
    }
}

pub async fn create_schedule(
    service: &ScheduleService,
    request: &HttpRequest,
    data: CreateScheduleRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let plan = SlotPlan {
        class_id: data.class_id,
        subject_id: data.subject_id,
        teacher_id: data.teacher_id,
        day_of_week: data.day_of_week,
        start_time: data.start_time,
        end_time: data.end_time,
    };
    match check_slot(storage.as_ref(), &plan, None).await {
        Ok(None) => {}
        Ok(Some(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to validate schedule", e)),
    }

    match storage.create_schedule(data).await {
        Ok(schedule) => {
            info!(
                "Schedule {} created for class {} on day {}",
                schedule.id, schedule.class_id, schedule.day_of_week
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(schedule, "Schedule created successfully")))
        }
        Err(e) => Ok(storage_failure(
            "Schedule creation failed",
            e,
            ErrorCode::ScheduleConflict,
        )),
    }
}

pub async fn update_schedule(
    service: &ScheduleService,
    request: &HttpRequest,
    schedule_id: i64,
    data: UpdateScheduleRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let existing = match storage.get_schedule_by_id(schedule_id).await {
        Ok(Some(schedule)) => schedule,
        Ok(None) => return Ok(not_found(ErrorCode::ScheduleNotFound, "Schedule not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve schedule", e)),
    };

    // 合并后的时段整体校验
    let plan = SlotPlan {
        class_id: existing.class_id,
        subject_id: data.subject_id.unwrap_or(existing.subject_id),
        teacher_id: data.teacher_id.unwrap_or(existing.teacher_id),
        day_of_week: data.day_of_week.unwrap_or(existing.day_of_week),
        start_time: data.start_time.unwrap_or(existing.start_time),
        end_time: data.end_time.unwrap_or(existing.end_time),
    };
    match check_slot(storage.as_ref(), &plan, Some(schedule_id)).await {
        Ok(None) => {}
        Ok(Some(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to validate schedule", e)),
    }

    match storage.update_schedule(schedule_id, data).await {
        Ok(Some(schedule)) => {
            info!("Schedule {} updated", schedule.id);
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success(schedule, "Schedule updated successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::ScheduleNotFound, "Schedule not found")),
        Err(e) => Ok(internal_failure("Schedule update failed", e)),
    }
}

pub async fn delete_schedule(
    service: &ScheduleService,
    request: &HttpRequest,
    schedule_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_schedule(schedule_id).await {
        Ok(true) => {
            info!("Schedule {} deleted", schedule_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Schedule deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::ScheduleNotFound, "Schedule not found")),
        Err(e) => Ok(internal_failure("Schedule deletion failed", e)),
    }
}
