use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::{
    ApiResponse,
    classes::responses::CoordinatorListResponse,
    users::{
        entities::{UserRole, UserStatus},
        requests::UserListQuery,
    },
};
use crate::services::support::internal_failure;

pub async fn list_coordinators(
    service: &ClassService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let query = UserListQuery {
        role: Some(UserRole::Coord),
        status: Some(UserStatus::Active),
        ..Default::default()
    };

    match storage.list_users(query).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            CoordinatorListResponse { items },
            "Coordinator list retrieved successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to retrieve coordinators", e)),
    }
}
