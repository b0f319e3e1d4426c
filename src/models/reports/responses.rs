use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::attendance::entities::AttendanceSummary;
use crate::models::dashboard::responses::DashboardCounts;
use crate::models::grades::responses::SubjectAverage;
use crate::models::students::entities::StudentDetail;

// 成绩等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Regular,
    Insufficient,
}

impl std::fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PerformanceBand::Excellent => "excellent",
            PerformanceBand::Good => "good",
            PerformanceBand::Regular => "regular",
            PerformanceBand::Insufficient => "insufficient",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct BandDistribution {
    pub excellent: i64,
    pub good: i64,
    pub regular: i64,
    pub insufficient: i64,
}

impl BandDistribution {
    pub fn add(&mut self, band: PerformanceBand) {
        match band {
            PerformanceBand::Excellent => self.excellent += 1,
            PerformanceBand::Good => self.good += 1,
            PerformanceBand::Regular => self.regular += 1,
            PerformanceBand::Insufficient => self.insufficient += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct YearCount {
    pub year: i32,
    pub count: i64,
}

// 全校概览
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct OverviewReport {
    #[serde(flatten)]
    #[ts(flatten)]
    pub counts: DashboardCounts,
    pub classes_per_year: Vec<YearCount>,
    pub subject_averages: Vec<SubjectAverage>,
    pub band_distribution: BandDistribution,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct SubjectFinal {
    pub subject_id: i64,
    pub final_average: Option<f64>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct ClassReportRow {
    pub student_id: i64,
    pub student_name: String,
    pub enrollment_number: String,
    pub subjects: Vec<SubjectFinal>,
    pub overall_average: Option<f64>,
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct BelowPassing {
    pub student_id: i64,
    pub student_name: String,
    pub subject_id: i64,
    pub subject_name: Option<String>,
    pub final_average: f64,
}

// 班级报表
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct ClassReport {
    pub class_id: i64,
    pub class_name: String,
    pub year: i32,
    pub passing_average: f64,
    pub subject_averages: Vec<SubjectAverage>,
    pub students: Vec<ClassReportRow>,
    pub below_passing: Vec<BelowPassing>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct ReportCardEntry {
    pub subject_id: i64,
    pub subject_name: Option<String>,
    /// 第 1..=4 学段的平均分
    pub bimesters: Vec<Option<f64>>,
    pub final_average: Option<f64>,
    pub band: Option<PerformanceBand>,
    pub passed: Option<bool>,
}

// 学生成绩单
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct ReportCard {
    pub student: StudentDetail,
    pub entries: Vec<ReportCardEntry>,
    pub overall_average: Option<f64>,
    pub attendance: AttendanceSummary,
}
