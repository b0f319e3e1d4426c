//! 课表的纯计算：时段冲突与按周分组

use chrono::NaiveTime;

use crate::models::schedules::entities::{Schedule, ScheduleDetail};
use crate::models::schedules::responses::{ScheduleDay, WeekScheduleResponse};

/// 两个半开区间 [start, end) 是否相交；首尾相接不算冲突
pub fn overlaps(a: (NaiveTime, NaiveTime), b: (NaiveTime, NaiveTime)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// 找出与新时段冲突的第一条课表；`exclude_id` 为正在修改的课表
pub fn find_conflict<'a>(
    existing: &'a [Schedule],
    start: NaiveTime,
    end: NaiveTime,
    exclude_id: Option<i64>,
) -> Option<&'a Schedule> {
    existing
        .iter()
        .filter(|slot| Some(slot.id) != exclude_id)
        .find(|slot| overlaps((start, end), (slot.start_time, slot.end_time)))
}

/// 按星期分组；上课日（1..=school_days）即使为空也列出，周末只在有课时出现
pub fn group_week(slots: Vec<ScheduleDetail>, school_days: u8) -> WeekScheduleResponse {
    let total_slots = slots.len();
    let total_minutes = slots.iter().map(|s| s.schedule.duration_minutes()).sum();

    let mut days: Vec<ScheduleDay> = (1..=7)
        .map(|day_of_week| ScheduleDay {
            day_of_week,
            slots: Vec::new(),
        })
        .collect();
    for slot in slots {
        let index = (slot.schedule.day_of_week.clamp(1, 7) - 1) as usize;
        days[index].slots.push(slot);
    }
    for day in &mut days {
        day.slots
            .sort_by_key(|s| (s.schedule.start_time, s.schedule.id));
    }

    let school_days = i32::from(school_days.clamp(1, 7));
    days.retain(|day| day.day_of_week <= school_days || !day.slots.is_empty());

    WeekScheduleResponse {
        days,
        total_slots,
        total_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(id: i64, day: i32, start: NaiveTime, end: NaiveTime) -> Schedule {
        Schedule {
            id,
            class_id: 1,
            subject_id: 1,
            teacher_id: 1,
            day_of_week: day,
            start_time: start,
            end_time: end,
            created_at: chrono::Utc::now(),
        }
    }

    fn detail(schedule: Schedule) -> ScheduleDetail {
        ScheduleDetail {
            schedule,
            class_name: None,
            subject_name: None,
            teacher_name: None,
        }
    }

    #[test]
    fn test_overlap_rules() {
        assert!(overlaps((t(7, 0), t(7, 50)), (t(7, 30), t(8, 20))));
        assert!(overlaps((t(7, 0), t(9, 0)), (t(7, 30), t(8, 0))));
        // 首尾相接
        assert!(!overlaps((t(7, 0), t(7, 50)), (t(7, 50), t(8, 40))));
        assert!(!overlaps((t(10, 0), t(10, 50)), (t(7, 0), t(7, 50))));
    }

    #[test]
    fn test_find_conflict_skips_self() {
        let existing = vec![slot(1, 1, t(7, 0), t(7, 50)), slot(2, 1, t(8, 0), t(8, 50))];
        assert_eq!(
            find_conflict(&existing, t(7, 30), t(8, 10), None).map(|s| s.id),
            Some(1)
        );
        assert_eq!(
            find_conflict(&existing, t(7, 0), t(7, 55), Some(1)).map(|s| s.id),
            None
        );
        assert_eq!(
            find_conflict(&existing, t(8, 40), t(9, 0), Some(1)).map(|s| s.id),
            Some(2)
        );
    }

    #[test]
    fn test_group_week_keeps_empty_school_days() {
        let slots = vec![
            detail(slot(1, 3, t(9, 0), t(9, 50))),
            detail(slot(2, 1, t(8, 0), t(8, 50))),
            detail(slot(3, 1, t(7, 0), t(7, 50))),
            detail(slot(4, 6, t(8, 0), t(9, 40))),
        ];
        let week = group_week(slots, 5);

        let days: Vec<i32> = week.days.iter().map(|d| d.day_of_week).collect();
        assert_eq!(days, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(week.total_slots, 4);
        assert_eq!(week.total_minutes, 50 * 3 + 100);
        assert!(week.days[1].slots.is_empty());
        let monday: Vec<i64> = week.days[0].slots.iter().map(|s| s.schedule.id).collect();
        assert_eq!(monday, vec![3, 2]);
    }
}
