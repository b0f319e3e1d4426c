use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::calc::{average_of, subject_finals, summarize_tallies};
use super::overview::named_subject_averages;
use super::{ReportService, subject_names};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::attendance::entities::AttendanceTally;
use crate::models::attendance::requests::AttendanceListQuery;
use crate::models::classes::entities::Class;
use crate::models::grades::entities::ScoredAssessment;
use crate::models::reports::responses::{BelowPassing, ClassReport, ClassReportRow, SubjectFinal};
use crate::models::students::entities::StudentDetail;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::support::{internal_failure, not_found};
use crate::storage::Storage;
use crate::utils::csv_upload::write_csv;

/// 报表的原始数据
pub(crate) struct ClassReportInput<'a> {
    pub class: &'a Class,
    pub students: Vec<StudentDetail>,
    pub rows: &'a [ScoredAssessment],
    pub tallies: &'a [AttendanceTally],
    pub subject_names: &'a HashMap<i64, String>,
    pub scale: f64,
    pub passing_average: f64,
}

pub(crate) fn build_class_report(input: ClassReportInput<'_>) -> ClassReport {
    let attendance = summarize_tallies(input.tallies);
    let mut below_passing = Vec::new();

    let students = input
        .students
        .into_iter()
        .map(|detail| {
            let student_id = detail.student.id;
            let finals = subject_finals(input.rows, student_id, input.scale);

            for (&subject_id, average) in &finals {
                if let Some(average) = *average
                    && average < input.passing_average
                {
                    below_passing.push(BelowPassing {
                        student_id,
                        student_name: detail.full_name.clone(),
                        subject_id,
                        subject_name: input.subject_names.get(&subject_id).cloned(),
                        final_average: average,
                    });
                }
            }

            ClassReportRow {
                student_id,
                student_name: detail.full_name,
                enrollment_number: detail.student.enrollment_number,
                overall_average: average_of(finals.values().copied()),
                subjects: finals
                    .into_iter()
                    .map(|(subject_id, final_average)| SubjectFinal {
                        subject_id,
                        final_average,
                    })
                    .collect(),
                attendance_rate: attendance
                    .get(&student_id)
                    .map(|s| s.attendance_rate)
                    .unwrap_or(0.0),
            }
        })
        .collect();

    ClassReport {
        class_id: input.class.id,
        class_name: input.class.name.clone(),
        year: input.class.year,
        passing_average: input.passing_average,
        subject_averages: named_subject_averages(input.rows, input.subject_names, input.scale),
        students,
        below_passing,
    }
}

/// 报表转为 CSV：每个学科一列
pub(crate) fn report_to_csv(report: &ClassReport) -> Result<Vec<u8>> {
    let subjects: Vec<(i64, String)> = report
        .subject_averages
        .iter()
        .map(|s| {
            (
                s.subject_id,
                s.subject_name
                    .clone()
                    .unwrap_or_else(|| format!("subject_{}", s.subject_id)),
            )
        })
        .collect();

    let mut header = vec!["enrollment_number".to_string(), "student_name".to_string()];
    header.extend(subjects.iter().map(|(_, name)| name.clone()));
    header.push("overall_average".to_string());
    header.push("attendance_rate".to_string());
    let header: Vec<&str> = header.iter().map(String::as_str).collect();

    let fmt = |v: Option<f64>| v.map(|v| format!("{v:.2}")).unwrap_or_default();

    let rows = report.students.iter().map(|row| {
        let mut record = vec![row.enrollment_number.clone(), row.student_name.clone()];
        for (subject_id, _) in &subjects {
            let average = row
                .subjects
                .iter()
                .find(|s| s.subject_id == *subject_id)
                .and_then(|s| s.final_average);
            record.push(fmt(average));
        }
        record.push(fmt(row.overall_average));
        record.push(format!("{:.2}", row.attendance_rate));
        record
    });

    write_csv(&header, rows)
}

async fn load_class_report(storage: &dyn Storage, class_id: i64) -> Result<Option<ClassReport>> {
    let Some(class) = storage.get_class_by_id(class_id).await? else {
        return Ok(None);
    };

    let students = storage.list_class_students(class_id).await?;
    let rows = storage.list_scored_assessments(Some(class_id), None).await?;
    let tallies = storage
        .attendance_tallies(AttendanceListQuery {
            class_id: Some(class_id),
            ..Default::default()
        })
        .await?;
    let names = subject_names(storage).await?;
    let school = &AppConfig::get().school;

    Ok(Some(build_class_report(ClassReportInput {
        class: &class,
        students,
        rows: &rows,
        tallies: &tallies,
        subject_names: &names,
        scale: school.grading_scale,
        passing_average: school.passing_average,
    })))
}

pub async fn class_report(
    service: &ReportService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match load_class_report(storage.as_ref(), class_id).await {
        Ok(Some(report)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            report,
            "Class report generated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => Ok(internal_failure("Failed to generate class report", e)),
    }
}

pub async fn export_class_report(
    service: &ReportService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let report = match load_class_report(storage.as_ref(), class_id).await {
        Ok(Some(report)) => report,
        Ok(None) => return Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => return Ok(internal_failure("Failed to generate class report", e)),
    };

    match report_to_csv(&report) {
        Ok(bytes) => {
            info!("Class report {} exported ({} students)", class_id, report.students.len());
            Ok(HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"class-{class_id}-report.csv\""),
                ))
                .body(bytes))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::ExportFailed,
                format!("Failed to generate CSV: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::AttendanceStatus;
    use crate::models::students::entities::Student;
    use chrono::Utc;

    fn student(id: i64, name: &str) -> StudentDetail {
        StudentDetail {
            student: Student {
                id,
                user_id: id + 100,
                class_id: Some(1),
                enrollment_number: format!("RA{id:03}"),
                birth_date: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            full_name: name.to_string(),
            email: format!("s{id}@school.test"),
            class_name: Some("1A".to_string()),
        }
    }

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

    fn sample_report() -> ClassReport {
        let class = Class {
            id: 1,
            name: "1A".to_string(),
            year: 2024,
            coord_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let rows = vec![scored(1, 10, 8.0), scored(1, 20, 4.0), scored(2, 10, 6.0)];
        let tallies = vec![AttendanceTally {
            student_id: 1,
            status: AttendanceStatus::Present,
            count: 3,
        }];
        let names = HashMap::from([(10, "Math".to_string()), (20, "History".to_string())]);

        build_class_report(ClassReportInput {
            class: &class,
            students: vec![student(1, "Ana"), student(2, "Bruno")],
            rows: &rows,
            tallies: &tallies,
            subject_names: &names,
            scale: 10.0,
            passing_average: 5.0,
        })
    }

    #[test]
    fn test_class_report_rows_and_below_passing() {
        let report = sample_report();
        assert_eq!(report.students.len(), 2);

        let ana = &report.students[0];
        assert_eq!(ana.overall_average, Some(6.0));
        assert_eq!(ana.attendance_rate, 100.0);
        assert_eq!(report.students[1].attendance_rate, 0.0);

        assert_eq!(report.below_passing.len(), 1);
        assert_eq!(report.below_passing[0].student_id, 1);
        assert_eq!(report.below_passing[0].subject_name.as_deref(), Some("History"));

        let math = report
            .subject_averages
            .iter()
            .find(|s| s.subject_id == 10)
            .unwrap();
        assert_eq!(math.average, Some(7.0));
    }

    #[test]
    fn test_report_to_csv_has_subject_columns() {
        let csv = String::from_utf8(report_to_csv(&sample_report()).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("enrollment_number,student_name,History,Math,overall_average,attendance_rate")
        );
        assert_eq!(lines.next(), Some("RA001,Ana,4.00,8.00,6.00,100.00"));
        assert_eq!(lines.next(), Some("RA002,Bruno,,6.00,6.00,0.00"));
    }
}
