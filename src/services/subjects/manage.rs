use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SubjectService;
use crate::models::subjects::requests::{
    CreateSubjectRequest, SubjectListQuery, SubjectQueryParams, UpdateSubjectRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::support::{
    bad_request, internal_failure, invalidate_dashboard, not_found, storage_failure,
};
use crate::utils::validate::{validate_text, validate_workload_hours};

fn validate_description(description: &Option<String>) -> Result<(), String> {
    match description {
        Some(text) => validate_text("Description", text, 0, 500),
        None => Ok(()),
    }
}

/// 空白描述按未填写处理
fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

pub async fn list_subjects(
    service: &SubjectService,
    request: &HttpRequest,
    query: SubjectQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let list_query = SubjectListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        search: query.search,
    };

    match storage.list_subjects_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Subject list retrieved successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to retrieve subject list", e)),
    }
}

pub async fn create_subject(
    service: &SubjectService,
    request: &HttpRequest,
    mut data: CreateSubjectRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_text("Subject name", &data.name, 1, 100) {
        return Ok(bad_request(ErrorCode::SubjectInvalid, msg));
    }
    if let Err(msg) = validate_description(&data.description) {
        return Ok(bad_request(ErrorCode::SubjectInvalid, msg));
    }
    if let Err(msg) = validate_workload_hours(data.workload_hours) {
        return Ok(bad_request(ErrorCode::SubjectInvalid, msg));
    }
    data.name = data.name.trim().to_string();
    data.description = normalize_description(data.description);

    let storage = service.get_storage(request);

    match storage.create_subject(data).await {
        Ok(subject) => {
            info!("Subject {} created", subject.name);
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(subject, "Subject created successfully")))
        }
        Err(e) => Ok(storage_failure(
            "Subject creation failed",
            e,
            ErrorCode::SubjectAlreadyExists,
        )),
    }
}

pub async fn get_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_subject_by_id(subject_id).await {
        Ok(Some(subject)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            subject,
            "Subject retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::SubjectNotFound, "Subject not found")),
        Err(e) => Ok(internal_failure("Failed to retrieve subject", e)),
    }
}

pub async fn update_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
    mut data: UpdateSubjectRequest,
) -> ActixResult<HttpResponse> {
    if let Some(ref name) = data.name {
        if let Err(msg) = validate_text("Subject name", name, 1, 100) {
            return Ok(bad_request(ErrorCode::SubjectInvalid, msg));
        }
        data.name = Some(name.trim().to_string());
    }
    if let Some(description) = data.description.take() {
        if let Err(msg) = validate_description(&description) {
            return Ok(bad_request(ErrorCode::SubjectInvalid, msg));
        }
        data.description = Some(normalize_description(description));
    }
    if let Some(hours) = data.workload_hours
        && let Err(msg) = validate_workload_hours(hours)
    {
        return Ok(bad_request(ErrorCode::SubjectInvalid, msg));
    }

    let storage = service.get_storage(request);

    match storage.update_subject(subject_id, data).await {
        Ok(Some(subject)) => {
            info!("Subject {} updated", subject.id);
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success(subject, "Subject updated successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::SubjectNotFound, "Subject not found")),
        Err(e) => Ok(storage_failure(
            "Subject update failed",
            e,
            ErrorCode::SubjectAlreadyExists,
        )),
    }
}

pub async fn delete_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_subject(subject_id).await {
        Ok(true) => {
            info!("Subject {} deleted", subject_id);
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Subject deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::SubjectNotFound, "Subject not found")),
        Err(e) => Ok(internal_failure("Subject deletion failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_description_is_dropped() {
        assert_eq!(normalize_description(Some("   ".into())), None);
        assert_eq!(
            normalize_description(Some(" Algebra basics ".into())),
            Some("Algebra basics".to_string())
        );
        assert!(validate_description(&Some("d".repeat(501))).is_err());
        assert!(validate_description(&None).is_ok());
    }
}
