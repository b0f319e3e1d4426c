use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::calc::{
    attendance_summary, average_of, bimester_averages, final_average, performance_band,
    summarize_tallies,
};
use super::{ReportService, subject_names};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::attendance::entities::AttendanceSummary;
use crate::models::attendance::requests::AttendanceListQuery;
use crate::models::grades::entities::ScoredAssessment;
use crate::models::reports::responses::{ReportCard, ReportCardEntry};
use crate::models::students::entities::{Student, StudentDetail};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::student_profile;
use crate::services::support::{forbidden, internal_failure, not_found, unauthorized};
use crate::storage::Storage;

/// 每个学科一行：四个学段、最终平均、等级与是否及格
pub(crate) fn build_entries(
    rows: &[ScoredAssessment],
    student_id: i64,
    names: &HashMap<i64, String>,
    scale: f64,
    passing_average: f64,
) -> Vec<ReportCardEntry> {
    let mut subjects: Vec<i64> = rows
        .iter()
        .filter(|r| r.student_id == student_id)
        .map(|r| r.subject_id)
        .collect();
    subjects.sort_unstable();
    subjects.dedup();

    let mut entries: Vec<ReportCardEntry> = subjects
        .into_iter()
        .map(|subject_id| {
            let bimesters = bimester_averages(rows, student_id, subject_id, scale);
            let final_avg = final_average(&bimesters);
            ReportCardEntry {
                subject_id,
                subject_name: names.get(&subject_id).cloned(),
                bimesters,
                final_average: final_avg,
                band: final_avg.map(|avg| performance_band(avg, scale)),
                passed: final_avg.map(|avg| avg >= passing_average),
            }
        })
        .collect();
    entries.sort_by(|a, b| a.subject_name.cmp(&b.subject_name));
    entries
}

/// 学生只能看自己的成绩单，教师只能看任课班级的学生
pub(crate) async fn can_view_card(
    storage: &dyn Storage,
    user: &User,
    student: &Student,
) -> Result<bool> {
    match user.role {
        UserRole::Admin | UserRole::Coord => Ok(true),
        UserRole::Teacher => match student.class_id {
            Some(class_id) => storage.is_teacher_allocated(user.id, class_id, None).await,
            None => Ok(false),
        },
        UserRole::Student => Ok(student_profile(storage, user)
            .await?
            .is_some_and(|own| own.id == student.id)),
    }
}

async fn build_card(storage: &dyn Storage, detail: StudentDetail) -> Result<ReportCard> {
    let school = &AppConfig::get().school;
    let student_id = detail.student.id;

    let rows = storage.list_scored_assessments(None, Some(student_id)).await?;
    let names = subject_names(storage).await?;
    let entries = build_entries(
        &rows,
        student_id,
        &names,
        school.grading_scale,
        school.passing_average,
    );

    let tallies = storage
        .attendance_tallies(AttendanceListQuery {
            student_id: Some(student_id),
            ..Default::default()
        })
        .await?;
    let attendance: AttendanceSummary = summarize_tallies(&tallies)
        .remove(&student_id)
        .unwrap_or_else(|| attendance_summary(0, 0, 0));

    Ok(ReportCard {
        overall_average: average_of(entries.iter().map(|e| e.final_average)),
        student: detail,
        entries,
        attendance,
    })
}

pub async fn report_card(
    service: &ReportService,
    request: &HttpRequest,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let detail = match storage.get_student_detail(student_id).await {
        Ok(Some(detail)) => detail,
        Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => return Ok(internal_failure("Failed to retrieve student", e)),
    };

    match can_view_card(storage.as_ref(), &current_user, &detail.student).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(forbidden(
                ErrorCode::Forbidden,
                "You are not allowed to view this report card",
            ));
        }
        Err(e) => return Ok(internal_failure("Failed to check report card access", e)),
    }

    match build_card(storage.as_ref(), detail).await {
        Ok(card) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            card,
            "Report card generated successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to generate report card", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reports::responses::PerformanceBand;

    fn scored(subject_id: i64, bimester: i32, score: f64) -> ScoredAssessment {
        ScoredAssessment {
            student_id: 5,
            subject_id,
            bimester,
            score: Some(score),
            max_score: 10.0,
            weight: 1.0,
        }
    }

    #[test]
    fn test_report_card_entries() {
        let rows = vec![
            scored(1, 1, 9.0),
            scored(1, 2, 10.0),
            scored(2, 1, 4.0),
            scored(2, 4, 5.0),
        ];
        let names = HashMap::from([(1, "Biology".to_string()), (2, "Chemistry".to_string())]);
        let entries = build_entries(&rows, 5, &names, 10.0, 5.0);

        assert_eq!(entries.len(), 2);
        let biology = &entries[0];
        assert_eq!(biology.bimesters, vec![Some(9.0), Some(10.0), None, None]);
        assert_eq!(biology.final_average, Some(9.5));
        assert_eq!(biology.band, Some(PerformanceBand::Excellent));
        assert_eq!(biology.passed, Some(true));

        let chemistry = &entries[1];
        assert_eq!(chemistry.final_average, Some(4.5));
        assert_eq!(chemistry.band, Some(PerformanceBand::Insufficient));
        assert_eq!(chemistry.passed, Some(false));

        assert!(build_entries(&rows, 6, &names, 10.0, 5.0).is_empty());
    }
}
