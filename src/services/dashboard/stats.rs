use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::DashboardService;
use crate::cache::{ObjectCacheExt, keys};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::models::attendance::requests::AttendanceListQuery;
use crate::models::dashboard::responses::{DashboardCounts, DashboardStatsResponse};
use crate::models::schedules::requests::ScheduleListQuery;
use crate::models::users::entities::{User, UserRole};
use crate::services::access::student_profile;
use crate::services::reports::calc::{average_of, subject_finals, summarize_tallies};
use crate::services::schedules::views::today_day_of_week;
use crate::services::support::{internal_failure, object_cache, unauthorized};
use crate::storage::Storage;

/// 全校计数，优先读缓存
async fn load_counts(storage: &dyn Storage, request: &HttpRequest) -> Result<DashboardCounts> {
    let cache = object_cache(request);

    if let Some(ref cache) = cache
        && let Some(counts) = cache.get_json::<DashboardCounts>(keys::DASHBOARD_STATS).await
    {
        debug!("Dashboard counters served from cache");
        return Ok(counts);
    }

    let counts = storage.dashboard_counts().await?;
    if let Some(cache) = cache {
        cache
            .insert_json(
                keys::DASHBOARD_STATS,
                &counts,
                AppConfig::get().cache.default_ttl,
            )
            .await;
    }
    Ok(counts)
}

/// 按角色补充的指标
async fn fill_role_extras(
    storage: &dyn Storage,
    user: &User,
    stats: &mut DashboardStatsResponse,
) -> Result<()> {
    match user.role {
        UserRole::Admin | UserRole::Coord => {}
        UserRole::Teacher => {
            stats.allocation_count =
                Some(storage.list_teacher_allocations(user.id).await?.len() as i64);
            let today = storage
                .list_schedules(ScheduleListQuery {
                    teacher_id: Some(user.id),
                    day_of_week: Some(today_day_of_week()),
                    ..Default::default()
                })
                .await?;
            stats.today_slots = Some(today.len() as i64);
        }
        UserRole::Student => {
            let Some(student) = student_profile(storage, user).await? else {
                return Ok(());
            };
            let scale = AppConfig::get().school.grading_scale;
            let rows = storage
                .list_scored_assessments(None, Some(student.id))
                .await?;
            stats.overall_average = average_of(subject_finals(&rows, student.id, scale).into_values());

            let tallies = storage
                .attendance_tallies(AttendanceListQuery {
                    student_id: Some(student.id),
                    ..Default::default()
                })
                .await?;
            stats.attendance_rate = summarize_tallies(&tallies)
                .get(&student.id)
                .map(|s| s.attendance_rate);
        }
    }
    Ok(())
}

pub async fn get_stats(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let counts = match load_counts(storage.as_ref(), request).await {
        Ok(counts) => counts,
        Err(e) => return Ok(internal_failure("Failed to load dashboard counters", e)),
    };

    let mut stats = DashboardStatsResponse {
        counts,
        role: current_user.role,
        allocation_count: None,
        today_slots: None,
        overall_average: None,
        attendance_rate: None,
    };

    if let Err(e) = fill_role_extras(storage.as_ref(), &current_user, &mut stats).await {
        return Ok(internal_failure("Failed to load dashboard statistics", e));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        stats,
        "Dashboard statistics retrieved successfully",
    )))
}
