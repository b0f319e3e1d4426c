use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::IncidentService;
use crate::errors::SchoolSystemError;
use crate::middlewares::RequireJWT;
use crate::models::incidents::entities::Incident;
use crate::models::incidents::requests::{
    CreateIncidentRequest, IncidentListQuery, IncidentQueryParams, UpdateIncidentRequest,
};
use crate::models::incidents::responses::IncidentListResponse;
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode, PaginationInfo};
use crate::services::access::student_profile;
use crate::services::support::{
    bad_request, forbidden, internal_failure, not_found, storage_failure, unauthorized,
};
use crate::storage::Storage;
use crate::utils::validate::{validate_date_range, validate_http_url, validate_text};

/// 规范化附件地址：空白视为未提供
pub(crate) fn normalize_attachment(url: Option<String>) -> Result<Option<String>, &'static str> {
    match url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
        Some(url) => validate_http_url(&url).map(|_| Some(url)),
        None => Ok(None),
    }
}

fn validate_description(description: &str) -> Result<(), String> {
    validate_text("Description", description, 1, 2000)
}

/// 管理层可修改全部记录，教师只能修改自己报告的记录
fn can_modify(user: &User, incident: &Incident) -> bool {
    match user.role {
        UserRole::Admin | UserRole::Coord => true,
        UserRole::Teacher => incident.reporter_id == Some(user.id),
        UserRole::Student => false,
    }
}

async fn can_view(
    storage: &dyn Storage,
    user: &User,
    incident: &Incident,
) -> Result<bool, SchoolSystemError> {
    match user.role {
        UserRole::Student => Ok(student_profile(storage, user)
            .await?
            .is_some_and(|s| s.id == incident.student_id)),
        _ => Ok(can_modify(user, incident)),
    }
}

fn incident_not_found() -> HttpResponse {
    not_found(ErrorCode::IncidentNotFound, "Incident not found")
}

/// 读取记录并确认当前用户可以修改
async fn load_modifiable(
    storage: &dyn Storage,
    user: &User,
    incident_id: i64,
) -> Result<Result<Incident, HttpResponse>, SchoolSystemError> {
    let Some(incident) = storage.get_incident_by_id(incident_id).await? else {
        return Ok(Err(incident_not_found()));
    };
    if !can_modify(user, &incident) {
        return Ok(Err(forbidden(
            ErrorCode::Forbidden,
            "Only the reporter or management can change this incident",
        )));
    }
    Ok(Ok(incident))
}

pub async fn list_incidents(
    service: &IncidentService,
    request: &HttpRequest,
    query: IncidentQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    if let Err(msg) = validate_date_range(query.start_date, query.end_date) {
        return Ok(bad_request(ErrorCode::IncidentInvalid, msg));
    }

    let mut list_query = IncidentListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        student_id: query.student_id,
        kind: query.kind,
        start_date: query.start_date,
        end_date: query.end_date,
        reporter_id: None,
    };

    match current_user.role {
        UserRole::Admin | UserRole::Coord => {}
        UserRole::Teacher => list_query.reporter_id = Some(current_user.id),
        UserRole::Student => match student_profile(storage.as_ref(), &current_user).await {
            Ok(Some(student)) => list_query.student_id = Some(student.id),
            Ok(None) => {
                let (page, size) = query.pagination.normalized();
                let empty = IncidentListResponse {
                    items: Vec::new(),
                    pagination: PaginationInfo::new(page, size, 0, 0),
                };
                return Ok(HttpResponse::Ok().json(ApiResponse::success(
                    empty,
                    "Incident list retrieved successfully",
                )));
            }
            Err(e) => return Ok(internal_failure("Failed to resolve student profile", e)),
        },
    }

    match storage.list_incidents_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Incident list retrieved successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to retrieve incidents", e)),
    }
}

pub async fn create_incident(
    service: &IncidentService,
    request: &HttpRequest,
    mut data: CreateIncidentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    data.description = data.description.trim().to_string();
    if let Err(msg) = validate_description(&data.description) {
        return Ok(bad_request(ErrorCode::IncidentInvalid, msg));
    }
    data.attachment_url = match normalize_attachment(data.attachment_url.take()) {
        Ok(url) => url,
        Err(msg) => return Ok(bad_request(ErrorCode::IncidentInvalid, msg)),
    };

    let student = match storage.get_student_by_id(data.student_id).await {
        Ok(Some(student)) => student,
        Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve student", e)),
    };

    if let Some(subject_id) = data.subject_id {
        match storage.get_subject_by_id(subject_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(not_found(ErrorCode::SubjectNotFound, "Subject not found")),
            Err(e) => return Ok(internal_failure("Failed to retrieve subject", e)),
        }
    }

    // 教师只能为任课班级的学生登记
    if current_user.role == UserRole::Teacher {
        let allocated = match student.class_id {
            Some(class_id) => storage
                .is_teacher_allocated(current_user.id, class_id, None)
                .await,
            None => Ok(false),
        };
        match allocated {
            Ok(true) => {}
            Ok(false) => {
                return Ok(forbidden(
                    ErrorCode::TeacherNotAllocated,
                    "You are not allocated to this student's class",
                ));
            }
            Err(e) => return Ok(internal_failure("Failed to check allocation", e)),
        }
    }

    match storage.create_incident(data, current_user.id).await {
        Ok(incident) => {
            info!(
                "Incident {} ({}) reported for student {} by user {}",
                incident.id, incident.kind, incident.student_id, current_user.id
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(incident, "Incident created successfully")))
        }
        Err(e) => Ok(storage_failure(
            "Incident creation failed",
            e,
            ErrorCode::IncidentInvalid,
        )),
    }
}

pub async fn get_incident(
    service: &IncidentService,
    request: &HttpRequest,
    incident_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let detail = match storage.get_incident_detail(incident_id).await {
        Ok(Some(detail)) => detail,
        Ok(None) => return Ok(incident_not_found()),
        Err(e) => return Ok(internal_failure("Failed to retrieve incident", e)),
    };

    match can_view(storage.as_ref(), &current_user, &detail.incident).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Incident retrieved successfully",
        ))),
        Ok(false) => Ok(incident_not_found()),
        Err(e) => Ok(internal_failure("Failed to check incident access", e)),
    }
}

pub async fn update_incident(
    service: &IncidentService,
    request: &HttpRequest,
    incident_id: i64,
    mut data: UpdateIncidentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    if let Some(description) = data.description.as_mut() {
        *description = description.trim().to_string();
        if let Err(msg) = validate_description(description) {
            return Ok(bad_request(ErrorCode::IncidentInvalid, msg));
        }
    }
    if let Some(url) = data.attachment_url.take() {
        data.attachment_url = match normalize_attachment(url) {
            Ok(url) => Some(url),
            Err(msg) => return Ok(bad_request(ErrorCode::IncidentInvalid, msg)),
        };
    }

    match load_modifiable(storage.as_ref(), &current_user, incident_id).await {
        Ok(Ok(_)) => {}
        Ok(Err(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve incident", e)),
    }

    match storage.update_incident(incident_id, data).await {
        Ok(Some(incident)) => {
            info!("Incident {} updated by user {}", incident.id, current_user.id);
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success(incident, "Incident updated successfully")))
        }
        Ok(None) => Ok(incident_not_found()),
        Err(e) => Ok(internal_failure("Incident update failed", e)),
    }
}

pub async fn delete_incident(
    service: &IncidentService,
    request: &HttpRequest,
    incident_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    match load_modifiable(storage.as_ref(), &current_user, incident_id).await {
        Ok(Ok(_)) => {}
        Ok(Err(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve incident", e)),
    }

    match storage.delete_incident(incident_id).await {
        Ok(true) => {
            info!("Incident {} deleted by user {}", incident_id, current_user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Incident deleted successfully")))
        }
        Ok(false) => Ok(incident_not_found()),
        Err(e) => Ok(internal_failure("Incident deletion failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::incidents::entities::IncidentKind;
    use crate::models::users::entities::UserStatus;
    use chrono::{NaiveDate, Utc};

    fn user(id: i64, role: UserRole) -> User {
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@school.test"),
            password_hash: String::new(),
            full_name: "Test User".to_string(),
            role,
            status: UserStatus::Active,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn incident(reporter_id: Option<i64>) -> Incident {
        Incident {
            id: 1,
            student_id: 9,
            reporter_id,
            subject_id: None,
            kind: IncidentKind::Behavior,
            description: "Late".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            attachment_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_reporter_or_management_can_modify() {
        let report = incident(Some(3));
        assert!(can_modify(&user(1, UserRole::Admin), &report));
        assert!(can_modify(&user(2, UserRole::Coord), &report));
        assert!(can_modify(&user(3, UserRole::Teacher), &report));
        assert!(!can_modify(&user(4, UserRole::Teacher), &report));
        assert!(!can_modify(&user(9, UserRole::Student), &report));
        assert!(!can_modify(&user(3, UserRole::Teacher), &incident(None)));
    }

    #[test]
    fn test_normalize_attachment() {
        assert_eq!(normalize_attachment(None), Ok(None));
        assert_eq!(normalize_attachment(Some("  ".into())), Ok(None));
        assert_eq!(
            normalize_attachment(Some("https://files.school.test/a.pdf".into())),
            Ok(Some("https://files.school.test/a.pdf".to_string()))
        );
        assert!(normalize_attachment(Some("ftp://files/a.pdf".into())).is_err());
    }
}
