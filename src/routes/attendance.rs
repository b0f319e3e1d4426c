use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::attendance::requests::{
    AttendanceQueryParams, AttendanceSummaryParams, RecordAttendanceRequest, RollCallRequest,
    UpdateAttendanceRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::AttendanceService;
use crate::utils::SafeAttendanceIdI64;

static ATTENDANCE_SERVICE: Lazy<AttendanceService> = Lazy::new(AttendanceService::new_lazy);

pub async fn list_attendance(
    req: HttpRequest,
    query: web::Query<AttendanceQueryParams>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .list_attendance(&req, query.into_inner())
        .await
}

pub async fn record_attendance(
    req: HttpRequest,
    data: web::Json<RecordAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .record_attendance(&req, data.into_inner())
        .await
}

pub async fn roll_call(
    req: HttpRequest,
    data: web::Json<RollCallRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.roll_call(&req, data.into_inner()).await
}

pub async fn my_attendance(
    req: HttpRequest,
    query: web::Query<AttendanceSummaryParams>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .my_attendance(&req, query.into_inner())
        .await
}

pub async fn update_attendance(
    req: HttpRequest,
    attendance_id: SafeAttendanceIdI64,
    data: web::Json<UpdateAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .update_attendance(&req, attendance_id.0, data.into_inner())
        .await
}

pub async fn delete_attendance(
    req: HttpRequest,
    attendance_id: SafeAttendanceIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .delete_attendance(&req, attendance_id.0)
        .await
}

pub fn configure_attendance_routes(cfg: &mut web::ServiceConfig) {
    let staff = || middlewares::RequireRole::new_any(UserRole::staff_roles());

    cfg.service(
        web::scope("/api/v1/attendance")
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_attendance))
                    .route(web::post().to(record_attendance).wrap(staff())),
            )
            .route("/roll-call", web::post().to(roll_call).wrap(staff()))
            .route("/me", web::get().to(my_attendance))
            .service(
                web::resource("/{attendance_id}")
                    .route(web::put().to(update_attendance).wrap(staff()))
                    .route(web::delete().to(delete_attendance).wrap(staff())),
            ),
    );
}
