//! 成绩与考勤的聚合计算
//!
//! 所有平均分都先按评分刻度归一化（`score / max_score × scale`），
//! 未评分（score 为空）的记录不参与计算。

use std::collections::{BTreeMap, HashMap};

use crate::models::attendance::entities::{AttendanceStatus, AttendanceSummary, AttendanceTally};
use crate::models::grades::entities::ScoredAssessment;
use crate::models::reports::responses::PerformanceBand;

pub const BIMESTERS: i32 = 4;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// 归一化后的分数；未评分时为 None
pub fn normalized(row: &ScoredAssessment, scale: f64) -> Option<f64> {
    let score = row.score?;
    (row.max_score > 0.0).then(|| score / row.max_score * scale)
}

/// 加权平均：Σ(归一化分 × 权重) / Σ权重，保留两位小数
pub fn weighted_average<'a>(
    rows: impl IntoIterator<Item = &'a ScoredAssessment>,
    scale: f64,
) -> Option<f64> {
    let (weighted, weights) = rows
        .into_iter()
        .filter_map(|row| normalized(row, scale).map(|n| (n * row.weight, row.weight)))
        .fold((0.0, 0.0), |(sum, w), (nw, rw)| (sum + nw, w + rw));
    (weights > 0.0).then(|| round2(weighted / weights))
}

/// 某学生某学科在单个学段的平均分
pub fn bimester_average(
    rows: &[ScoredAssessment],
    student_id: i64,
    subject_id: i64,
    bimester: i32,
    scale: f64,
) -> Option<f64> {
    weighted_average(
        rows.iter().filter(|r| {
            r.student_id == student_id && r.subject_id == subject_id && r.bimester == bimester
        }),
        scale,
    )
}

/// 四个学段的平均分，下标 0 对应第 1 学段
pub fn bimester_averages(
    rows: &[ScoredAssessment],
    student_id: i64,
    subject_id: i64,
    scale: f64,
) -> Vec<Option<f64>> {
    (1..=BIMESTERS)
        .map(|b| bimester_average(rows, student_id, subject_id, b, scale))
        .collect()
}

/// 最终平均：已有学段平均分的算术平均
pub fn final_average(bimesters: &[Option<f64>]) -> Option<f64> {
    mean(bimesters.iter().flatten().copied()).map(round2)
}

/// 学生每个学科的最终平均，按学科 ID 排序
pub fn subject_finals(
    rows: &[ScoredAssessment],
    student_id: i64,
    scale: f64,
) -> BTreeMap<i64, Option<f64>> {
    let mut subjects: Vec<i64> = rows
        .iter()
        .filter(|r| r.student_id == student_id)
        .map(|r| r.subject_id)
        .collect();
    subjects.sort_unstable();
    subjects.dedup();

    subjects
        .into_iter()
        .map(|subject_id| {
            let bimesters = bimester_averages(rows, student_id, subject_id, scale);
            (subject_id, final_average(&bimesters))
        })
        .collect()
}

/// 多个平均分的算术平均（忽略 None）
pub fn average_of(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    mean(values.into_iter().flatten()).map(round2)
}

/// 各学科的平均：该学科所有学生最终平均的算术平均
pub fn subject_averages(rows: &[ScoredAssessment], scale: f64) -> BTreeMap<i64, Option<f64>> {
    let mut per_subject: BTreeMap<i64, Vec<Option<f64>>> = BTreeMap::new();
    for student_id in student_ids(rows) {
        for (subject_id, avg) in subject_finals(rows, student_id, scale) {
            per_subject.entry(subject_id).or_default().push(avg);
        }
    }
    per_subject
        .into_iter()
        .map(|(subject_id, finals)| (subject_id, average_of(finals)))
        .collect()
}

pub fn student_ids(rows: &[ScoredAssessment]) -> Vec<i64> {
    let mut ids: Vec<i64> = rows.iter().map(|r| r.student_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// 已评分成绩归一化后的简单平均
pub fn plain_average(rows: &[ScoredAssessment], scale: f64) -> Option<f64> {
    mean(rows.iter().filter_map(|r| normalized(r, scale))).map(round2)
}

/// 等级阈值按 10 分制给出，随评分刻度等比缩放
pub fn performance_band(average: f64, scale: f64) -> PerformanceBand {
    let factor = scale / 10.0;
    if average >= 9.0 * factor {
        PerformanceBand::Excellent
    } else if average >= 7.0 * factor {
        PerformanceBand::Good
    } else if average >= 5.0 * factor {
        PerformanceBand::Regular
    } else {
        PerformanceBand::Insufficient
    }
}

/// 由计数得出出勤汇总；总数为 0 时出勤率为 0
pub fn attendance_summary(present: i64, absent: i64, justified: i64) -> AttendanceSummary {
    let total = present + absent + justified;
    let attendance_rate = if total == 0 {
        0.0
    } else {
        round2((present + justified) as f64 / total as f64 * 100.0)
    };
    AttendanceSummary {
        total_classes: total,
        present_count: present,
        absent_count: absent,
        justified_count: justified,
        attendance_rate,
    }
}

/// 存储层的分组计数按学生汇总
pub fn summarize_tallies(tallies: &[AttendanceTally]) -> HashMap<i64, AttendanceSummary> {
    let mut counts: HashMap<i64, (i64, i64, i64)> = HashMap::new();
    for tally in tallies {
        let entry = counts.entry(tally.student_id).or_default();
        match tally.status {
            AttendanceStatus::Present => entry.0 += tally.count,
            AttendanceStatus::Absent => entry.1 += tally.count,
            AttendanceStatus::Justified => entry.2 += tally.count,
        }
    }
    counts
        .into_iter()
        .map(|(student_id, (p, a, j))| (student_id, attendance_summary(p, a, j)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(subject_id: i64, bimester: i32, score: Option<f64>, max: f64, weight: f64) -> ScoredAssessment {
        ScoredAssessment {
            student_id: 1,
            subject_id,
            bimester,
            score,
            max_score: max,
            weight,
        }
    }

    #[test]
    fn test_bimester_average_is_weighted_and_normalized() {
        let rows = vec![
            row(1, 1, Some(8.0), 10.0, 1.0),
            row(1, 1, Some(18.0), 20.0, 2.0),
            row(1, 1, None, 10.0, 5.0),
            row(1, 2, Some(5.0), 10.0, 1.0),
        ];
        // (8×1 + 9×2) / 3
        assert_eq!(bimester_average(&rows, 1, 1, 1, 10.0), Some(8.67));
        assert_eq!(bimester_average(&rows, 1, 1, 2, 10.0), Some(5.0));
        assert_eq!(bimester_average(&rows, 1, 1, 3, 10.0), None);
        assert_eq!(bimester_average(&rows, 2, 1, 1, 10.0), None);
    }

    #[test]
    fn test_ungraded_only_has_no_average() {
        let rows = vec![row(1, 1, None, 10.0, 1.0)];
        assert_eq!(bimester_average(&rows, 1, 1, 1, 10.0), None);
        assert_eq!(plain_average(&rows, 10.0), None);
    }

    #[test]
    fn test_final_average_uses_existing_bimesters() {
        assert_eq!(final_average(&[Some(8.0), None, Some(7.0), None]), Some(7.5));
        assert_eq!(final_average(&[None, None, None, None]), None);

        let rows = vec![
            row(1, 1, Some(8.0), 10.0, 1.0),
            row(1, 3, Some(70.0), 100.0, 1.0),
            row(2, 1, None, 10.0, 1.0),
        ];
        let finals = subject_finals(&rows, 1, 10.0);
        assert_eq!(finals.get(&1), Some(&Some(7.5)));
        assert_eq!(finals.get(&2), Some(&None));
    }

    #[test]
    fn test_grading_scale_changes_normalization() {
        let rows = vec![row(1, 1, Some(15.0), 20.0, 1.0)];
        assert_eq!(bimester_average(&rows, 1, 1, 1, 10.0), Some(7.5));
        assert_eq!(bimester_average(&rows, 1, 1, 1, 100.0), Some(75.0));
    }

    #[test]
    fn test_subject_averages_across_students() {
        let mut rows = vec![row(1, 1, Some(6.0), 10.0, 1.0)];
        rows.push(ScoredAssessment {
            student_id: 2,
            ..row(1, 1, Some(9.0), 10.0, 1.0)
        });
        let averages = subject_averages(&rows, 10.0);
        assert_eq!(averages.get(&1), Some(&Some(7.5)));
        assert_eq!(student_ids(&rows), vec![1, 2]);
    }

    #[test]
    fn test_performance_band_thresholds() {
        assert_eq!(performance_band(9.0, 10.0), PerformanceBand::Excellent);
        assert_eq!(performance_band(8.99, 10.0), PerformanceBand::Good);
        assert_eq!(performance_band(7.0, 10.0), PerformanceBand::Good);
        assert_eq!(performance_band(5.0, 10.0), PerformanceBand::Regular);
        assert_eq!(performance_band(4.99, 10.0), PerformanceBand::Insufficient);
        assert_eq!(performance_band(90.0, 100.0), PerformanceBand::Excellent);
        assert_eq!(performance_band(65.0, 100.0), PerformanceBand::Regular);
    }

    #[test]
    fn test_attendance_summary_rate() {
        let summary = attendance_summary(3, 1, 1);
        assert_eq!(summary.total_classes, 5);
        assert_eq!(summary.attendance_rate, 80.0);

        assert_eq!(attendance_summary(0, 0, 0).attendance_rate, 0.0);
        assert_eq!(attendance_summary(2, 1, 0).attendance_rate, 66.67);
    }

    #[test]
    fn test_summarize_tallies_groups_by_student() {
        let tallies = vec![
            AttendanceTally {
                student_id: 1,
                status: AttendanceStatus::Present,
                count: 4,
            },
            AttendanceTally {
                student_id: 1,
                status: AttendanceStatus::Absent,
                count: 1,
            },
            AttendanceTally {
                student_id: 2,
                status: AttendanceStatus::Justified,
                count: 2,
            },
        ];
        let summaries = summarize_tallies(&tallies);
        assert_eq!(summaries[&1].attendance_rate, 80.0);
        assert_eq!(summaries[&2].justified_count, 2);
        assert_eq!(summaries[&2].attendance_rate, 100.0);
    }
}
