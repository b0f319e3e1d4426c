use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::incidents::requests::{
    CreateIncidentRequest, IncidentQueryParams, UpdateIncidentRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::IncidentService;
use crate::utils::SafeIncidentIdI64;

static INCIDENT_SERVICE: Lazy<IncidentService> = Lazy::new(IncidentService::new_lazy);

pub async fn list_incidents(
    req: HttpRequest,
    query: web::Query<IncidentQueryParams>,
) -> ActixResult<HttpResponse> {
    INCIDENT_SERVICE
        .list_incidents(&req, query.into_inner())
        .await
}

pub async fn create_incident(
    req: HttpRequest,
    data: web::Json<CreateIncidentRequest>,
) -> ActixResult<HttpResponse> {
    INCIDENT_SERVICE
        .create_incident(&req, data.into_inner())
        .await
}

pub async fn get_incident(
    req: HttpRequest,
    incident_id: SafeIncidentIdI64,
) -> ActixResult<HttpResponse> {
    INCIDENT_SERVICE.get_incident(&req, incident_id.0).await
}

pub async fn update_incident(
    req: HttpRequest,
    incident_id: SafeIncidentIdI64,
    data: web::Json<UpdateIncidentRequest>,
) -> ActixResult<HttpResponse> {
    INCIDENT_SERVICE
        .update_incident(&req, incident_id.0, data.into_inner())
        .await
}

pub async fn delete_incident(
    req: HttpRequest,
    incident_id: SafeIncidentIdI64,
) -> ActixResult<HttpResponse> {
    INCIDENT_SERVICE.delete_incident(&req, incident_id.0).await
}

pub fn configure_incidents_routes(cfg: &mut web::ServiceConfig) {
    let staff = || middlewares::RequireRole::new_any(UserRole::staff_roles());

    cfg.service(
        web::scope("/api/v1/incidents")
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_incidents))
                    .route(web::post().to(create_incident).wrap(staff())),
            )
            .service(
                web::resource("/{incident_id}")
                    .route(web::get().to(get_incident))
                    .route(web::put().to(update_incident).wrap(staff()))
                    .route(web::delete().to(delete_incident).wrap(staff())),
            ),
    );
}
