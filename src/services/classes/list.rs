use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::middlewares::RequireJWT;
use crate::models::classes::requests::{ClassListQuery, ClassQueryParams, ClassScope};
use crate::models::users::entities::UserRole;
use crate::models::ApiResponse;
use crate::services::support::{internal_failure, unauthorized};

pub async fn list_classes(
    service: &ClassService,
    request: &HttpRequest,
    query: ClassQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    // 按角色限定可见班级
    let scope = match current_user.role {
        UserRole::Admin | UserRole::Coord => ClassScope::All,
        UserRole::Teacher => ClassScope::AllocatedTo(current_user.id),
        UserRole::Student => ClassScope::StudentOf(current_user.id),
    };

    let list_query = ClassListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        year: query.year,
        search: query.search,
        scope,
    };

    match storage.list_classes_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Class list retrieved successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to retrieve class list", e)),
    }
}
