use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Datelike;

use super::ScheduleService;
use super::manage::scope_schedule_query;
use super::timetable::group_week;
use crate::config::AppConfig;
use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::models::schedules::requests::{ScheduleListQuery, WeekScheduleParams};
use crate::models::schedules::responses::TodayScheduleResponse;
use crate::services::support::{internal_failure, unauthorized};

/// 今天是星期几（1 = 周一）
pub(crate) fn today_day_of_week() -> i32 {
    chrono::Local::now().weekday().number_from_monday() as i32
}

pub async fn week_schedule(
    service: &ScheduleService,
    request: &HttpRequest,
    params: WeekScheduleParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let query = ScheduleListQuery {
        class_id: params.class_id,
        teacher_id: params.teacher_id,
        ..Default::default()
    };

    let slots = match scope_schedule_query(storage.as_ref(), &current_user, query).await {
        Ok(Some(query)) => match storage.list_schedules(query).await {
            Ok(slots) => slots,
            Err(e) => return Ok(internal_failure("Failed to retrieve schedules", e)),
        },
        Ok(None) => Vec::new(),
        Err(e) => return Ok(internal_failure("Failed to resolve schedule scope", e)),
    };

    let week = group_week(slots, AppConfig::get().school.school_days);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        week,
        "Weekly schedule retrieved successfully",
    )))
}

pub async fn today_schedule(
    service: &ScheduleService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let day_of_week = today_day_of_week();
    let query = ScheduleListQuery {
        day_of_week: Some(day_of_week),
        ..Default::default()
    };

    let items = match scope_schedule_query(storage.as_ref(), &current_user, query).await {
        Ok(Some(query)) => match storage.list_schedules(query).await {
            Ok(items) => items,
            Err(e) => return Ok(internal_failure("Failed to retrieve schedules", e)),
        },
        Ok(None) => Vec::new(),
        Err(e) => return Ok(internal_failure("Failed to resolve schedule scope", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        TodayScheduleResponse { day_of_week, items },
        "Today's schedule retrieved successfully",
    )))
}
