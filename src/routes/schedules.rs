use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::schedules::requests::{
    CreateScheduleRequest, ScheduleQueryParams, UpdateScheduleRequest, WeekScheduleParams,
};
use crate::models::users::entities::UserRole;
use crate::services::ScheduleService;
use crate::utils::SafeScheduleIdI64;

static SCHEDULE_SERVICE: Lazy<ScheduleService> = Lazy::new(ScheduleService::new_lazy);

pub async fn list_schedules(
    req: HttpRequest,
    query: web::Query<ScheduleQueryParams>,
) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE
        .list_schedules(&req, query.into_inner())
        .await
}

pub async fn create_schedule(
    req: HttpRequest,
    data: web::Json<CreateScheduleRequest>,
) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE
        .create_schedule(&req, data.into_inner())
        .await
}

pub async fn week_schedule(
    req: HttpRequest,
    query: web::Query<WeekScheduleParams>,
) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE.week_schedule(&req, query.into_inner()).await
}

pub async fn today_schedule(req: HttpRequest) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE.today_schedule(&req).await
}

pub async fn update_schedule(
    req: HttpRequest,
    schedule_id: SafeScheduleIdI64,
    data: web::Json<UpdateScheduleRequest>,
) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE
        .update_schedule(&req, schedule_id.0, data.into_inner())
        .await
}

pub async fn delete_schedule(
    req: HttpRequest,
    schedule_id: SafeScheduleIdI64,
) -> ActixResult<HttpResponse> {
    SCHEDULE_SERVICE.delete_schedule(&req, schedule_id.0).await
}

pub fn configure_schedules_routes(cfg: &mut web::ServiceConfig) {
    let management = || middlewares::RequireRole::new_any(UserRole::management_roles());

    cfg.service(
        web::scope("/api/v1/schedules")
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_schedules))
                    .route(web::post().to(create_schedule).wrap(management())),
            )
            .route("/week", web::get().to(week_schedule))
            .route("/today", web::get().to(today_schedule))
            .service(
                web::resource("/{schedule_id}")
                    .route(web::put().to(update_schedule).wrap(management()))
                    .route(web::delete().to(delete_schedule).wrap(management())),
            ),
    );
}
