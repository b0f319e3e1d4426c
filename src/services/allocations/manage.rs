use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AllocationService;
use crate::middlewares::RequireJWT;
use crate::models::teacher_allocations::requests::{
    AllocationListQuery, AllocationQueryParams, CreateAllocationRequest,
};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::support::{
    bad_request, internal_failure, not_found, storage_failure, unauthorized,
};

pub async fn list_allocations(
    service: &AllocationService,
    request: &HttpRequest,
    query: AllocationQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    // 教师只能看到自己的任课
    let teacher_id = match current_user.role {
        UserRole::Teacher => Some(current_user.id),
        _ => query.teacher_id,
    };

    let list_query = AllocationListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        teacher_id,
        class_id: query.class_id,
        subject_id: query.subject_id,
    };

    match storage.list_allocations_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Allocation list retrieved successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to retrieve allocations", e)),
    }
}

pub async fn create_allocation(
    service: &AllocationService,
    request: &HttpRequest,
    data: CreateAllocationRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_user_by_id(data.teacher_id).await {
        Ok(Some(user)) if user.role == UserRole::Teacher => {}
        Ok(Some(_)) => {
            return Ok(bad_request(
                ErrorCode::UserRoleMismatch,
                "Allocations can only be assigned to teachers",
            ));
        }
        Ok(None) => return Ok(bad_request(ErrorCode::UserNotFound, "Teacher not found")),
        Err(e) => return Ok(internal_failure("Failed to verify teacher", e)),
    }

    match storage.get_class_by_id(data.class_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(bad_request(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => return Ok(internal_failure("Failed to verify class", e)),
    }

    match storage.get_subject_by_id(data.subject_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(bad_request(ErrorCode::SubjectNotFound, "Subject not found")),
        Err(e) => return Ok(internal_failure("Failed to verify subject", e)),
    }

    match storage.create_allocation(data).await {
        Ok(allocation) => {
            info!(
                "Teacher {} allocated to class {} subject {}",
                allocation.teacher_id, allocation.class_id, allocation.subject_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                allocation,
                "Allocation created successfully",
            )))
        }
        Err(e) => Ok(storage_failure(
            "Allocation creation failed",
            e,
            ErrorCode::AllocationAlreadyExists,
        )),
    }
}

pub async fn delete_allocation(
    service: &AllocationService,
    request: &HttpRequest,
    allocation_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_allocation(allocation_id).await {
        Ok(true) => {
            info!("Allocation {} deleted", allocation_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Allocation deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(ErrorCode::AllocationNotFound, "Allocation not found")),
        Err(e) => Ok(internal_failure("Allocation deletion failed", e)),
    }
}
