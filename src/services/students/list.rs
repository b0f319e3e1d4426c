use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::models::students::requests::{StudentListQuery, StudentQueryParams};
use crate::models::users::entities::UserRole;
use crate::services::access::allocated_class_ids;
use crate::services::support::{internal_failure, unauthorized};

pub async fn list_students(
    service: &StudentService,
    request: &HttpRequest,
    query: StudentQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    // 教师只能看到任课班级的学生
    let class_ids = if current_user.role == UserRole::Teacher {
        match allocated_class_ids(storage.as_ref(), current_user.id).await {
            Ok(ids) => Some(ids),
            Err(e) => return Ok(internal_failure("Failed to load allocations", e)),
        }
    } else {
        None
    };

    let list_query = StudentListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        class_id: query.class_id,
        class_ids,
        search: query.search,
    };

    match storage.list_students_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Student list retrieved successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to retrieve student list", e)),
    }
}
