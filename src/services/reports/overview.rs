use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::calc::{performance_band, student_ids, subject_averages, subject_finals};
use super::{ReportService, subject_names};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::grades::entities::ScoredAssessment;
use crate::models::grades::responses::SubjectAverage;
use crate::models::reports::responses::{BandDistribution, OverviewReport};
use crate::services::support::internal_failure;
use crate::storage::Storage;

/// 各学科平均，按学科名称排序
pub(crate) fn named_subject_averages(
    rows: &[ScoredAssessment],
    names: &HashMap<i64, String>,
    scale: f64,
) -> Vec<SubjectAverage> {
    let mut averages: Vec<SubjectAverage> = subject_averages(rows, scale)
        .into_iter()
        .map(|(subject_id, average)| SubjectAverage {
            subject_id,
            subject_name: names.get(&subject_id).cloned(),
            average,
        })
        .collect();
    averages.sort_by(|a, b| a.subject_name.cmp(&b.subject_name));
    averages
}

/// 所有（学生, 学科）最终平均的等级分布
pub(crate) fn band_distribution(rows: &[ScoredAssessment], scale: f64) -> BandDistribution {
    let mut distribution = BandDistribution::default();
    for student_id in student_ids(rows) {
        for average in subject_finals(rows, student_id, scale).into_values().flatten() {
            distribution.add(performance_band(average, scale));
        }
    }
    distribution
}

async fn build_overview(storage: &dyn Storage) -> Result<OverviewReport> {
    let scale = AppConfig::get().school.grading_scale;
    let rows = storage.list_scored_assessments(None, None).await?;
    let names = subject_names(storage).await?;

    Ok(OverviewReport {
        counts: storage.dashboard_counts().await?,
        classes_per_year: storage.count_classes_per_year().await?,
        subject_averages: named_subject_averages(&rows, &names, scale),
        band_distribution: band_distribution(&rows, scale),
    })
}

pub async fn overview(service: &ReportService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match build_overview(storage.as_ref()).await {
        Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            report,
            "Overview report generated successfully",
        ))),
        Err(e) => Ok(internal_failure("Failed to generate overview report", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(student_id: i64, subject_id: i64, score: f64) -> ScoredAssessment {
        ScoredAssessment {
            student_id,
            subject_id,
            bimester: 1,
            score: Some(score),
            max_score: 10.0,
            weight: 1.0,
        }
    }

    #[test]
    fn test_band_distribution_counts_each_student_subject() {
        let rows = vec![
            scored(1, 1, 9.5),
            scored(1, 2, 4.0),
            scored(2, 1, 7.0),
            scored(3, 1, 6.0),
        ];
        let distribution = band_distribution(&rows, 10.0);
        assert_eq!(
            distribution,
            BandDistribution {
                excellent: 1,
                good: 1,
                regular: 1,
                insufficient: 1,
            }
        );
    }

    #[test]
    fn test_named_subject_averages_sorted_by_name() {
        let rows = vec![scored(1, 1, 8.0), scored(2, 1, 6.0), scored(1, 2, 10.0)];
        let names = HashMap::from([(1, "Matemática".to_string()), (2, "Artes".to_string())]);
        let averages = named_subject_averages(&rows, &names, 10.0);
        assert_eq!(averages[0].subject_name.as_deref(), Some("Artes"));
        assert_eq!(averages[0].average, Some(10.0));
        assert_eq!(averages[1].average, Some(7.0));
    }
}
