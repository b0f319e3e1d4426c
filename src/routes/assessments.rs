use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assessments::requests::{
    AssessmentQueryParams, CreateAssessmentRequest, UpdateAssessmentRequest,
};
use crate::models::grades::requests::BulkGradeRequest;
use crate::models::users::entities::UserRole;
use crate::services::{AssessmentService, GradeService};
use crate::utils::SafeAssessmentIdI64;

static ASSESSMENT_SERVICE: Lazy<AssessmentService> = Lazy::new(AssessmentService::new_lazy);
static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

pub async fn list_assessments(
    req: HttpRequest,
    query: web::Query<AssessmentQueryParams>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .list_assessments(&req, query.into_inner())
        .await
}

pub async fn create_assessment(
    req: HttpRequest,
    data: web::Json<CreateAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .create_assessment(&req, data.into_inner())
        .await
}

pub async fn get_assessment(
    req: HttpRequest,
    assessment_id: SafeAssessmentIdI64,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .get_assessment(&req, assessment_id.0)
        .await
}

pub async fn update_assessment(
    req: HttpRequest,
    assessment_id: SafeAssessmentIdI64,
    data: web::Json<UpdateAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .update_assessment(&req, assessment_id.0, data.into_inner())
        .await
}

pub async fn delete_assessment(
    req: HttpRequest,
    assessment_id: SafeAssessmentIdI64,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .delete_assessment(&req, assessment_id.0)
        .await
}

// 整份评估的成绩批量录入
pub async fn bulk_upsert_grades(
    req: HttpRequest,
    assessment_id: SafeAssessmentIdI64,
    data: web::Json<BulkGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .bulk_upsert_grades(&req, assessment_id.0, data.into_inner())
        .await
}

pub fn configure_assessments_routes(cfg: &mut web::ServiceConfig) {
    let staff = || middlewares::RequireRole::new_any(UserRole::staff_roles());

    cfg.service(
        web::scope("/api/v1/assessments")
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_assessments))
                    .route(web::post().to(create_assessment).wrap(staff())),
            )
            .service(
                web::resource("/{assessment_id}")
                    .route(web::get().to(get_assessment))
                    .route(web::put().to(update_assessment).wrap(staff()))
                    .route(web::delete().to(delete_assessment).wrap(staff())),
            )
            .route(
                "/{assessment_id}/grades",
                web::put().to(bulk_upsert_grades).wrap(staff()),
            ),
    );
}
