use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::teacher_allocations::requests::{AllocationQueryParams, CreateAllocationRequest};
use crate::models::users::entities::UserRole;
use crate::services::AllocationService;
use crate::utils::SafeIDI64;

static ALLOCATION_SERVICE: Lazy<AllocationService> = Lazy::new(AllocationService::new_lazy);

pub async fn list_allocations(
    req: HttpRequest,
    query: web::Query<AllocationQueryParams>,
) -> ActixResult<HttpResponse> {
    ALLOCATION_SERVICE
        .list_allocations(&req, query.into_inner())
        .await
}

pub async fn create_allocation(
    req: HttpRequest,
    data: web::Json<CreateAllocationRequest>,
) -> ActixResult<HttpResponse> {
    ALLOCATION_SERVICE
        .create_allocation(&req, data.into_inner())
        .await
}

pub async fn delete_allocation(
    req: HttpRequest,
    allocation_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    ALLOCATION_SERVICE
        .delete_allocation(&req, allocation_id.0)
        .await
}

pub fn configure_allocations_routes(cfg: &mut web::ServiceConfig) {
    let management = || middlewares::RequireRole::new_any(UserRole::management_roles());

    cfg.service(
        web::scope("/api/v1/allocations")
            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_allocations))
                    .route(web::post().to(create_allocation).wrap(management())),
            )
            .route(
                "/{id}",
                web::delete().to(delete_allocation).wrap(management()),
            ),
    );
}
