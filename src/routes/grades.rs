use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grades::requests::{GradeQueryParams, UpdateGradeRequest, UpsertGradeRequest};
use crate::models::users::entities::UserRole;
use crate::services::GradeService;
use crate::utils::SafeGradeIdI64;

static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

pub async fn list_grades(
    req: HttpRequest,
    query: web::Query<GradeQueryParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.list_grades(&req, query.into_inner()).await
}

pub async fn upsert_grade(
    req: HttpRequest,
    data: web::Json<UpsertGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.upsert_grade(&req, data.into_inner()).await
}

pub async fn my_grades(req: HttpRequest) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.my_grades(&req).await
}

pub async fn update_grade(
    req: HttpRequest,
    grade_id: SafeGradeIdI64,
    data: web::Json<UpdateGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .update_grade(&req, grade_id.0, data.into_inner())
        .await
}

pub async fn delete_grade(req: HttpRequest, grade_id: SafeGradeIdI64) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.delete_grade(&req, grade_id.0).await
}

pub fn configure_grades_routes(cfg: &mut web::ServiceConfig) {
    let staff = || middlewares::RequireRole::new_any(UserRole::staff_roles());

    cfg.service(
        web::scope("/api/v1/grades")
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_grades))
                    .route(web::post().to(upsert_grade).wrap(staff())),
            )
            .route("/me", web::get().to(my_grades))
            .service(
                web::resource("/{grade_id}")
                    .route(web::put().to(update_grade).wrap(staff()))
                    .route(web::delete().to(delete_grade).wrap(staff())),
            ),
    );
}
