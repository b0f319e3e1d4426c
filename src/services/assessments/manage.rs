use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssessmentService;
use crate::errors::SchoolSystemError;
use crate::middlewares::RequireJWT;
use crate::models::assessments::entities::Assessment;
use crate::models::assessments::requests::{
    AssessmentListQuery, AssessmentQueryParams, CreateAssessmentRequest, UpdateAssessmentRequest,
};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{allocation_pairs, can_teach, student_profile};
use crate::services::support::{
    bad_request, forbidden, internal_failure, not_found, storage_failure, unauthorized,
};
use crate::storage::Storage;
use crate::utils::validate::{
    validate_bimester, validate_max_score, validate_text, validate_weight,
};

/// 评估字段校验；未提供的字段跳过
pub(crate) fn validate_assessment_fields(
    name: Option<&str>,
    bimester: Option<i32>,
    max_score: Option<f64>,
    weight: Option<f64>,
) -> Result<(), String> {
    if let Some(name) = name {
        validate_text("Assessment name", name.trim(), 1, 100)?;
    }
    if let Some(bimester) = bimester {
        validate_bimester(bimester)?;
    }
    if let Some(max_score) = max_score {
        validate_max_score(max_score)?;
    }
    if let Some(weight) = weight {
        validate_weight(weight)?;
    }
    Ok(())
}

/// 学生与教师能否查看该评估
pub(crate) async fn can_view_assessment(
    storage: &dyn Storage,
    user: &User,
    assessment: &Assessment,
) -> Result<bool, SchoolSystemError> {
    match user.role {
        UserRole::Student => Ok(student_profile(storage, user)
            .await?
            .and_then(|s| s.class_id)
            .is_some_and(|class_id| class_id == assessment.class_id)),
        _ => can_teach(storage, user, assessment.class_id, assessment.subject_id).await,
    }
}

/// 读取评估并确认当前用户可以维护它
pub(crate) async fn load_manageable(
    storage: &dyn Storage,
    user: &User,
    assessment_id: i64,
) -> Result<Result<Assessment, HttpResponse>, SchoolSystemError> {
    let Some(assessment) = storage.get_assessment_by_id(assessment_id).await? else {
        return Ok(Err(not_found(
            ErrorCode::AssessmentNotFound,
            "Assessment not found",
        )));
    };
    if !can_teach(storage, user, assessment.class_id, assessment.subject_id).await? {
        return Ok(Err(forbidden(
            ErrorCode::TeacherNotAllocated,
            "You are not allocated to this class and subject",
        )));
    }
    Ok(Ok(assessment))
}

pub async fn list_assessments(
    service: &AssessmentService,
    request: &HttpRequest,
    query: AssessmentQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let mut list_query = AssessmentListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        class_id: query.class_id,
        subject_id: query.subject_id,
        bimester: query.bimester,
        ..Default::default()
    };

    match current_user.role {
        UserRole::Admin | UserRole::Coord => {}
        UserRole::Teacher => match allocation_pairs(storage.as_ref(), current_user.id).await {
            Ok(pairs) => list_query.allocations = Some(pairs),
            Err(e) => return Ok(internal_failure("Failed to resolve allocations", e)),
        },
        UserRole::Student => match student_profile(storage.as_ref(), &current_user).await {
            Ok(profile) => {
                list_query.class_ids =
                    Some(profile.and_then(|s| s.class_id).into_iter().collect())
            }
            Err(e) => return Ok(internal_failure("Failed to resolve student class", e)),
        },
    }

    match storage.list_assessments_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Assessment list retrieved successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to retrieve assessments", e)),
    }
}

pub async fn create_assessment(
    service: &AssessmentService,
    request: &HttpRequest,
    mut data: CreateAssessmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    data.name = data.name.trim().to_string();
    if let Err(msg) = validate_assessment_fields(
        Some(&data.name),
        Some(data.bimester),
        Some(data.max_score),
        Some(data.weight),
    ) {
        return Ok(bad_request(ErrorCode::AssessmentInvalid, msg));
    }

    match storage.get_class_by_id(data.class_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve class", e)),
    }
    match storage.get_subject_by_id(data.subject_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::SubjectNotFound, "Subject not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve subject", e)),
    }

    match can_teach(storage.as_ref(), &current_user, data.class_id, data.subject_id).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(forbidden(
                ErrorCode::TeacherNotAllocated,
                "You are not allocated to this class and subject",
            ));
        }
        Err(e) => return Ok(internal_failure("Failed to check allocation", e)),
    }

    match storage.create_assessment(data, current_user.id).await {
        Ok(assessment) => {
            info!(
                "Assessment {} created for class {} by user {}",
                assessment.id, assessment.class_id, current_user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                assessment,
                "Assessment created successfully",
            )))
        }
        Err(e) => Ok(storage_failure(
            "Assessment creation failed",
            e,
            ErrorCode::AssessmentInvalid,
        )),
    }
}

pub async fn get_assessment(
    service: &AssessmentService,
    request: &HttpRequest,
    assessment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let detail = match storage.get_assessment_detail(assessment_id).await {
        Ok(Some(detail)) => detail,
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::AssessmentNotFound,
                "Assessment not found",
            ));
        }
        Err(e) => return Ok(internal_failure("Failed to retrieve assessment", e)),
    };

    match can_view_assessment(storage.as_ref(), &current_user, &detail.assessment).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Assessment retrieved successfully",
        ))),
        // 不暴露无权访问的评估是否存在
        Ok(false) => Ok(not_found(
            ErrorCode::AssessmentNotFound,
            "Assessment not found",
        )),
        Err(e) => Ok(internal_failure("Failed to check assessment access", e)),
    }
}

pub async fn update_assessment(
    service: &AssessmentService,
    request: &HttpRequest,
    assessment_id: i64,
    mut data: UpdateAssessmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    if let Some(name) = data.name.as_mut() {
        *name = name.trim().to_string();
    }
    if let Err(msg) =
        validate_assessment_fields(data.name.as_deref(), data.bimester, data.max_score, data.weight)
    {
        return Ok(bad_request(ErrorCode::AssessmentInvalid, msg));
    }

    match load_manageable(storage.as_ref(), &current_user, assessment_id).await {
        Ok(Ok(_)) => {}
        Ok(Err(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve assessment", e)),
    }

    // 满分不能低于已录入的成绩
    if let Some(max_score) = data.max_score {
        match storage.highest_score(assessment_id).await {
            Ok(Some(highest)) if highest > max_score => {
                return Ok(bad_request(
                    ErrorCode::AssessmentInvalid,
                    format!("Max score cannot be lower than an existing grade ({highest})"),
                ));
            }
            Ok(_) => {}
            Err(e) => return Ok(internal_failure("Failed to check recorded grades", e)),
        }
    }

    match storage.update_assessment(assessment_id, data).await {
        Ok(Some(assessment)) => {
            info!("Assessment {} updated", assessment.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                assessment,
                "Assessment updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::AssessmentNotFound,
            "Assessment not found",
        )),
        Err(e) => Ok(internal_failure("Assessment update failed", e)),
    }
}

pub async fn delete_assessment(
    service: &AssessmentService,
    request: &HttpRequest,
    assessment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    match load_manageable(storage.as_ref(), &current_user, assessment_id).await {
        Ok(Ok(_)) => {}
        Ok(Err(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve assessment", e)),
    }

    match storage.delete_assessment(assessment_id).await {
        Ok(true) => {
            info!("Assessment {} deleted", assessment_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Assessment deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::AssessmentNotFound,
            "Assessment not found",
        )),
        Err(e) => Ok(internal_failure("Assessment deletion failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_assessment_fields() {
        assert!(validate_assessment_fields(Some("Prova 1"), Some(1), Some(10.0), Some(2.0)).is_ok());
        assert!(validate_assessment_fields(None, None, None, None).is_ok());
        assert!(validate_assessment_fields(Some(""), None, None, None).is_err());
        assert!(validate_assessment_fields(None, Some(5), None, None).is_err());
        assert!(validate_assessment_fields(None, None, Some(0.0), None).is_err());
        assert!(validate_assessment_fields(None, None, None, Some(101.0)).is_err());
    }
}
