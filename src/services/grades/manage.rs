use std::collections::HashSet;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::GradeService;
use crate::middlewares::RequireJWT;
use crate::models::assessments::entities::Assessment;
use crate::models::grades::requests::{
    BulkGradeEntry, BulkGradeRequest, GradeListQuery, GradeQueryParams, UpdateGradeRequest,
    UpsertGradeRequest,
};
use crate::models::grades::responses::{BulkGradeResponse, GradeListResponse};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode, PaginationInfo};
use crate::services::access::{allocation_pairs, student_profile};
use crate::services::assessments::manage::load_manageable;
use crate::services::support::{
    bad_request, internal_failure, not_found, storage_failure, unauthorized,
};
use crate::utils::validate::{validate_score, validate_text};

/// 校验一条成绩：分数范围与备注长度
pub(crate) fn validate_entry(entry: &BulkGradeEntry, max_score: f64) -> Result<(), String> {
    if let Some(score) = entry.score {
        validate_score(score, max_score)?;
    }
    if let Some(ref remarks) = entry.remarks {
        validate_text("Remarks", remarks, 0, 500)?;
    }
    Ok(())
}

/// 批量成绩整体校验：不允许重复学生，任何一条不合法则整体拒绝
pub(crate) fn validate_batch(entries: &[BulkGradeEntry], max_score: f64) -> Result<(), String> {
    if entries.is_empty() {
        return Err("At least one grade is required".to_string());
    }
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.student_id) {
            return Err(format!("Student {} appears more than once", entry.student_id));
        }
        validate_entry(entry, max_score).map_err(|e| format!("Student {}: {e}", entry.student_id))?;
    }
    Ok(())
}

fn student_not_in_class(student_id: i64) -> HttpResponse {
    bad_request(
        ErrorCode::StudentNotInClass,
        format!("Student {student_id} does not belong to the assessment's class"),
    )
}

pub async fn list_grades(
    service: &GradeService,
    request: &HttpRequest,
    query: GradeQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let mut list_query = GradeListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        assessment_id: query.assessment_id,
        student_id: query.student_id,
        class_id: query.class_id,
        subject_id: query.subject_id,
        ..Default::default()
    };

    match current_user.role {
        UserRole::Admin | UserRole::Coord => {}
        UserRole::Teacher => match allocation_pairs(storage.as_ref(), current_user.id).await {
            Ok(pairs) => list_query.allocations = Some(pairs),
            Err(e) => return Ok(internal_failure("Failed to resolve allocations", e)),
        },
        UserRole::Student => match student_profile(storage.as_ref(), &current_user).await {
            Ok(Some(student)) => list_query.student_id = Some(student.id),
            Ok(None) => {
                let (page, size) = query.pagination.normalized();
                let empty = GradeListResponse {
                    items: Vec::new(),
                    pagination: PaginationInfo::new(page, size, 0, 0),
                };
                return Ok(HttpResponse::Ok().json(ApiResponse::success(
                    empty,
                    "Grade list retrieved successfully",
                )));
            }
            Err(e) => return Ok(internal_failure("Failed to resolve student profile", e)),
        },
    }

    match storage.list_grades_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Grade list retrieved successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to retrieve grades", e)),
    }
}

pub async fn upsert_grade(
    service: &GradeService,
    request: &HttpRequest,
    data: UpsertGradeRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let assessment = match load_manageable(storage.as_ref(), &current_user, data.assessment_id).await
    {
        Ok(Ok(assessment)) => assessment,
        Ok(Err(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve assessment", e)),
    };

    let entry = BulkGradeEntry {
        student_id: data.student_id,
        score: data.score,
        remarks: data.remarks,
    };
    if let Err(msg) = validate_entry(&entry, assessment.max_score) {
        return Ok(bad_request(ErrorCode::GradeInvalid, msg));
    }

    match storage.get_student_by_id(entry.student_id).await {
        Ok(Some(student)) if student.class_id == Some(assessment.class_id) => {}
        Ok(Some(_)) => return Ok(student_not_in_class(entry.student_id)),
        Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve student", e)),
    }

    match storage
        .upsert_grade(assessment.id, entry, current_user.id)
        .await
    {
        Ok(grade) => {
            info!(
                "Grade recorded for student {} on assessment {} by user {}",
                grade.student_id, grade.assessment_id, current_user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(grade, "Grade saved successfully")))
        }
        Err(e) => Ok(storage_failure("Failed to save grade", e, ErrorCode::GradeInvalid)),
    }
}

/// 批量成绩中不属于评估班级的学生
async fn outsiders(
    storage: &dyn crate::storage::Storage,
    assessment: &Assessment,
    entries: &[BulkGradeEntry],
) -> crate::errors::Result<Vec<i64>> {
    let members: HashSet<i64> = storage
        .list_class_students(assessment.class_id)
        .await?
        .into_iter()
        .map(|s| s.student.id)
        .collect();
    Ok(entries
        .iter()
        .map(|e| e.student_id)
        .filter(|id| !members.contains(id))
        .collect())
}

pub async fn bulk_upsert_grades(
    service: &GradeService,
    request: &HttpRequest,
    assessment_id: i64,
    data: BulkGradeRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let assessment = match load_manageable(storage.as_ref(), &current_user, assessment_id).await {
        Ok(Ok(assessment)) => assessment,
        Ok(Err(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve assessment", e)),
    };

    if let Err(msg) = validate_batch(&data.grades, assessment.max_score) {
        return Ok(bad_request(ErrorCode::GradeInvalid, msg));
    }

    match outsiders(storage.as_ref(), &assessment, &data.grades).await {
        Ok(ids) if ids.is_empty() => {}
        Ok(ids) => return Ok(student_not_in_class(ids[0])),
        Err(e) => return Ok(internal_failure("Failed to retrieve class students", e)),
    }

    match storage
        .bulk_upsert_grades(assessment_id, data.grades, current_user.id)
        .await
    {
        Ok(items) => {
            info!(
                "{} grades saved for assessment {} by user {}",
                items.len(),
                assessment_id,
                current_user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                BulkGradeResponse {
                    assessment_id,
                    items,
                },
                "Grades saved successfully",
            )))
        }
        Err(e) => Ok(storage_failure("Failed to save grades", e, ErrorCode::GradeInvalid)),
    }
}

pub async fn update_grade(
    service: &GradeService,
    request: &HttpRequest,
    grade_id: i64,
    data: UpdateGradeRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let grade = match storage.get_grade_by_id(grade_id).await {
        Ok(Some(grade)) => grade,
        Ok(None) => return Ok(not_found(ErrorCode::GradeNotFound, "Grade not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve grade", e)),
    };

    let assessment = match load_manageable(storage.as_ref(), &current_user, grade.assessment_id)
        .await
    {
        Ok(Ok(assessment)) => assessment,
        Ok(Err(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve assessment", e)),
    };

    let entry = BulkGradeEntry {
        student_id: grade.student_id,
        score: data.score.flatten(),
        remarks: data.remarks.clone().flatten(),
    };
    if let Err(msg) = validate_entry(&entry, assessment.max_score) {
        return Ok(bad_request(ErrorCode::GradeInvalid, msg));
    }

    match storage.update_grade(grade_id, data, current_user.id).await {
        Ok(Some(grade)) => {
            info!("Grade {} updated by user {}", grade.id, current_user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(grade, "Grade updated successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::GradeNotFound, "Grade not found")),
        Err(e) => Ok(internal_failure("Grade update failed", e)),
    }
}

pub async fn delete_grade(
    service: &GradeService,
    request: &HttpRequest,
    grade_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let grade = match storage.get_grade_by_id(grade_id).await {
        Ok(Some(grade)) => grade,
        Ok(None) => return Ok(not_found(ErrorCode::GradeNotFound, "Grade not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve grade", e)),
    };

    match load_manageable(storage.as_ref(), &current_user, grade.assessment_id).await {
        Ok(Ok(_)) => {}
        Ok(Err(response)) => return Ok(response),
        Err(e) => return Ok(internal_failure("Failed to retrieve assessment", e)),
    }

    match storage.delete_grade(grade_id).await {
        Ok(true) => {
            info!("Grade {} deleted by user {}", grade_id, current_user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Grade deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::GradeNotFound, "Grade not found")),
        Err(e) => Ok(internal_failure("Grade deletion failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(student_id: i64, score: Option<f64>) -> BulkGradeEntry {
        BulkGradeEntry {
            student_id,
            score,
            remarks: None,
        }
    }

    #[test]
    fn test_validate_entry_score_bounds() {
        assert!(validate_entry(&entry(1, Some(10.0)), 10.0).is_ok());
        assert!(validate_entry(&entry(1, Some(0.0)), 10.0).is_ok());
        assert!(validate_entry(&entry(1, None), 10.0).is_ok());
        assert!(validate_entry(&entry(1, Some(10.5)), 10.0).is_err());
        assert!(validate_entry(&entry(1, Some(-1.0)), 10.0).is_err());
    }

    #[test]
    fn test_validate_batch_is_all_or_nothing() {
        assert!(validate_batch(&[entry(1, Some(5.0)), entry(2, None)], 10.0).is_ok());
        assert!(validate_batch(&[], 10.0).is_err());

        let err = validate_batch(&[entry(1, Some(5.0)), entry(2, Some(11.0))], 10.0).unwrap_err();
        assert!(err.starts_with("Student 2"));

        let dup = validate_batch(&[entry(3, Some(1.0)), entry(3, Some(2.0))], 10.0).unwrap_err();
        assert!(dup.contains("more than once"));
    }
}
