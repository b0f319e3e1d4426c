use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AnnouncementService;
use crate::errors::SchoolSystemError;
use crate::middlewares::RequireJWT;
use crate::models::announcements::entities::Announcement;
use crate::models::announcements::requests::{
    AnnouncementAudience, AnnouncementListQuery, AnnouncementQueryParams,
    CreateAnnouncementRequest, UpdateAnnouncementRequest,
};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{allocated_class_ids, student_profile};
use crate::services::support::{
    bad_request, forbidden, internal_failure, not_found, storage_failure, unauthorized,
};
use crate::storage::Storage;
use crate::utils::validate::validate_text;

pub(crate) fn validate_title(title: &str) -> Result<(), String> {
    validate_text("Title", title, 1, 200)
}

pub(crate) fn validate_content(content: &str) -> Result<(), String> {
    validate_text("Content", content, 1, 5000)
}

/// 当前用户能看到的公告范围
pub(crate) async fn audience_for(
    storage: &dyn Storage,
    user: &User,
) -> Result<AnnouncementAudience, SchoolSystemError> {
    Ok(match user.role {
        UserRole::Admin | UserRole::Coord => AnnouncementAudience::All,
        UserRole::Teacher => {
            AnnouncementAudience::GlobalAnd(allocated_class_ids(storage, user.id).await?)
        }
        UserRole::Student => AnnouncementAudience::GlobalAnd(
            student_profile(storage, user)
                .await?
                .and_then(|s| s.class_id)
                .into_iter()
                .collect(),
        ),
    })
}

/// 检查发布目标：班级必须存在；教师只能面向自己任课的班级
async fn check_target(
    storage: &dyn Storage,
    user: &User,
    target_class_id: Option<i64>,
) -> Result<Option<HttpResponse>, SchoolSystemError> {
    if let Some(class_id) = target_class_id
        && storage.get_class_by_id(class_id).await?.is_none()
    {
        return Ok(Some(not_found(ErrorCode::ClassNotFound, "Class not found")));
    }

    if user.role == UserRole::Teacher {
        let allowed = match target_class_id {
            Some(class_id) => storage.is_teacher_allocated(user.id, class_id, None).await?,
            None => false,
        };
        if !allowed {
            return Ok(Some(forbidden(
                ErrorCode::TeacherNotAllocated,
                "Teachers can only publish announcements to classes they teach",
            )));
        }
    }
    Ok(None)
}

/// 管理层可修改全部公告，教师只能修改自己发布的
fn can_modify(user: &User, announcement: &Announcement) -> bool {
    match user.role {
        UserRole::Admin | UserRole::Coord => true,
        UserRole::Teacher => announcement.author_id == Some(user.id),
        UserRole::Student => false,
    }
}

async fn load_modifiable(
    storage: &dyn Storage,
    user: &User,
    announcement_id: i64,
) -> Result<Result<Announcement, HttpResponse>, SchoolSystemError> {
    let Some(announcement) = storage.get_announcement_by_id(announcement_id).await? else {
        return Ok(Err(not_found(
            ErrorCode::AnnouncementNotFound,
            "Announcement not found",
        )));
    };
    if !can_modify(user, &announcement) {
        return Ok(Err(forbidden(
            ErrorCode::Forbidden,
            "Only the author or management can change this announcement",
        )));
    }
    Ok(Ok(announcement))
}

pub async fn list_announcements(
    service: &AnnouncementService,
    request: &HttpRequest,
    query: AnnouncementQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let audience = match audience_for(storage.as_ref(), &current_user).await {
        Ok(audience) => audience,
        Err(e) => return Ok(internal_failure("Failed to resolve announcement audience", e)),
    };

    let list_query = AnnouncementListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        target_class_id: query.target_class_id,
        audience,
    };

    match storage.list_announcements_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Announcement list retrieved successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to retrieve announcements", e)),
    }
}

pub async fn create_announcement(
    service: &AnnouncementService,
    request: &HttpRequest,
    mut data: CreateAnnouncementRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    data.title = data.title.trim().to_string();
    if let Err(msg) = validate_title(&data.title).and_then(|_| validate_content(&data.content)) {
        return Ok(bad_request(ErrorCode::AnnouncementInvalid, msg));
    }

    match check_target(storage.as_ref(), &current_user, data.target_class_id).await {
        Ok(None) => {}
        Ok(Some(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to check announcement target", e)),
    }

    match storage.create_announcement(data, current_user.id).await {
        Ok(announcement) => {
            info!(
                "Announcement {} published by user {} (target: {:?})",
                announcement.id, current_user.id, announcement.target_class_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                announcement,
                "Announcement created successfully",
            )))
        }
        Err(e) => Ok(storage_failure(
            "Announcement creation failed",
            e,
            ErrorCode::AnnouncementInvalid,
        )),
    }
}

pub async fn update_announcement(
    service: &AnnouncementService,
    request: &HttpRequest,
    announcement_id: i64,
    mut data: UpdateAnnouncementRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    if let Some(title) = data.title.as_mut() {
        *title = title.trim().to_string();
        if let Err(msg) = validate_title(title) {
            return Ok(bad_request(ErrorCode::AnnouncementInvalid, msg));
        }
    }
    if let Some(ref content) = data.content
        && let Err(msg) = validate_content(content)
    {
        return Ok(bad_request(ErrorCode::AnnouncementInvalid, msg));
    }

    let existing = match load_modifiable(storage.as_ref(), &current_user, announcement_id).await {
        Ok(Ok(announcement)) => announcement,
        Ok(Err(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve announcement", e)),
    };

    // 目标变更时按新目标重新检查
    let target = data.target_class_id.unwrap_or(existing.target_class_id);
    if data.target_class_id.is_some() || current_user.role == UserRole::Teacher {
        match check_target(storage.as_ref(), &current_user, target).await {
            Ok(None) => {}
            Ok(Some(response)) => return Ok(response),
            Err(e) => return Ok(internal_failure("Failed to check announcement target", e)),
        }
    }

    match storage.update_announcement(announcement_id, data).await {
        Ok(Some(announcement)) => {
            info!(
                "Announcement {} updated by user {}",
                announcement.id, current_user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                announcement,
                "Announcement updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::AnnouncementNotFound,
            "Announcement not found",
        )),
        Err(e) => Ok(internal_failure("Announcement update failed", e)),
    }
}

pub async fn delete_announcement(
    service: &AnnouncementService,
    request: &HttpRequest,
    announcement_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    match load_modifiable(storage.as_ref(), &current_user, announcement_id).await {
        Ok(Ok(_)) => {}
        Ok(Err(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve announcement", e)),
    }

    match storage.delete_announcement(announcement_id).await {
        Ok(true) => {
            info!(
                "Announcement {} deleted by user {}",
                announcement_id, current_user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Announcement deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::AnnouncementNotFound,
            "Announcement not found",
        )),
        Err(e) => Ok(internal_failure("Announcement deletion failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_content_limits() {
        assert!(validate_title("Reunião de pais").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"t".repeat(201)).is_err());
        assert!(validate_content(&"c".repeat(5000)).is_ok());
        assert!(validate_content(&"c".repeat(5001)).is_err());
        assert!(validate_content("").is_err());
    }
}
