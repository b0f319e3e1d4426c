use std::collections::BTreeMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::config::AppConfig;
use crate::middlewares::RequireJWT;
use crate::models::grades::entities::{GradeDetail, ScoredAssessment};
use crate::models::grades::responses::{GradeSummary, MyGradesResponse, SubjectAverage};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::student_profile;
use crate::services::reports::calc::plain_average;
use crate::services::support::{internal_failure, not_found, unauthorized};

fn as_scored(detail: &GradeDetail) -> ScoredAssessment {
    ScoredAssessment {
        student_id: detail.grade.student_id,
        subject_id: detail.subject_id,
        bimester: detail.bimester,
        score: detail.grade.score,
        max_score: detail.max_score,
        weight: detail.weight,
    }
}

/// 汇总：全部已评分成绩与各学科的归一化简单平均
pub(crate) fn summarize(items: &[GradeDetail], scale: f64) -> GradeSummary {
    let rows: Vec<ScoredAssessment> = items.iter().map(as_scored).collect();

    let mut subjects: BTreeMap<i64, Option<String>> = BTreeMap::new();
    for item in items {
        subjects
            .entry(item.subject_id)
            .or_insert_with(|| item.subject_name.clone());
    }

    let per_subject = subjects
        .into_iter()
        .map(|(subject_id, subject_name)| {
            let subject_rows: Vec<ScoredAssessment> = rows
                .iter()
                .filter(|r| r.subject_id == subject_id)
                .cloned()
                .collect();
            SubjectAverage {
                subject_id,
                subject_name,
                average: plain_average(&subject_rows, scale),
            }
        })
        .collect();

    GradeSummary {
        overall_average: plain_average(&rows, scale),
        graded_count: rows.iter().filter(|r| r.score.is_some()).count(),
        per_subject,
    }
}

pub async fn my_grades(service: &GradeService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(current_user) = RequireJWT::extract_user_claims(request) else {
        return Ok(unauthorized());
    };

    let student = match student_profile(storage.as_ref(), &current_user).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::StudentProfileMissing,
                "No student record is linked to this account",
            ));
        }
        Err(e) => return Ok(internal_failure("Failed to resolve student profile", e)),
    };

    match storage.list_student_grades(student.id).await {
        Ok(items) => {
            let summary = summarize(&items, AppConfig::get().school.grading_scale);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                MyGradesResponse { items, summary },
                "Grades retrieved successfully",
            )))
        }
        Err(e) => Ok(internal_failure("Failed to retrieve grades", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grades::entities::Grade;
    use chrono::{NaiveDate, Utc};

    fn detail(subject_id: i64, score: Option<f64>, max_score: f64) -> GradeDetail {
        GradeDetail {
            grade: Grade {
                id: 1,
                assessment_id: 1,
                student_id: 7,
                score,
                remarks: None,
                graded_by: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            student_name: None,
            assessment_name: "Prova".to_string(),
            assessment_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            bimester: 1,
            max_score,
            weight: 1.0,
            class_id: 1,
            subject_id,
            subject_name: Some(format!("Subject {subject_id}")),
            class_name: None,
        }
    }

    #[test]
    fn test_summary_plain_average() {
        let items = vec![
            detail(1, Some(8.0), 10.0),
            detail(1, Some(60.0), 100.0),
            detail(2, None, 10.0),
        ];
        let summary = summarize(&items, 10.0);
        assert_eq!(summary.overall_average, Some(7.0));
        assert_eq!(summary.graded_count, 2);
        assert_eq!(summary.per_subject.len(), 2);
        assert_eq!(summary.per_subject[0].average, Some(7.0));
        assert_eq!(summary.per_subject[1].average, None);
        assert_eq!(summary.per_subject[1].subject_name.as_deref(), Some("Subject 2"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[], 10.0);
        assert_eq!(summary.overall_average, None);
        assert!(summary.per_subject.is_empty());
    }
}
