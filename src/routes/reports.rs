use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireClassAccess};
use crate::models::users::entities::UserRole;
use crate::services::ReportService;
use crate::utils::{SafeClassIdI64, SafeStudentIdI64};

static REPORT_SERVICE: Lazy<ReportService> = Lazy::new(ReportService::new_lazy);

pub async fn overview(req: HttpRequest) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.overview(&req).await
}

pub async fn class_report(req: HttpRequest, class_id: SafeClassIdI64) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.class_report(&req, class_id.0).await
}

pub async fn export_class_report(
    req: HttpRequest,
    class_id: SafeClassIdI64,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.export_class_report(&req, class_id.0).await
}

// 成绩单：可见范围在服务层判断
pub async fn report_card(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.report_card(&req, student_id.0).await
}

pub fn configure_reports_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/reports")
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireJWT)
            .route(
                "/overview",
                web::get()
                    .to(overview)
                    .wrap(middlewares::RequireRole::new_any(UserRole::management_roles())),
            )
            .service(
                web::resource("/classes/{class_id}")
                    .wrap(RequireClassAccess::staff())
                    .route(web::get().to(class_report)),
            )
            .service(
                web::resource("/classes/{class_id}/export")
                    .wrap(RequireClassAccess::staff())
                    .route(web::get().to(export_class_report)),
            )
            .route(
                "/students/{student_id}/report-card",
                web::get().to(report_card),
            ),
    );
}
