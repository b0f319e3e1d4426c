//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。
//!
//! 时间戳以 unix 秒存储，日历日期以 `YYYY-MM-DD` 字符串存储，上课时间以 `HH:MM` 字符串存储。

pub mod prelude;

pub mod announcements;
pub mod assessments;
pub mod attendance;
pub mod classes;
pub mod enrollments;
pub mod grades;
pub mod incidents;
pub mod schedules;
pub mod students;
pub mod subjects;
pub mod teacher_allocations;
pub mod users;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

pub(crate) fn to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

pub(crate) fn to_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap_or_default()
}

pub(crate) fn to_time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, TIME_FORMAT).unwrap_or_default()
}

pub(crate) fn date_to_string(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn time_to_string(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_and_time_columns() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(date_to_string(date), "2025-03-14");
        assert_eq!(to_date("2025-03-14"), date);

        let time = NaiveTime::from_hms_opt(7, 5, 0).unwrap();
        assert_eq!(time_to_string(time), "07:05");
        assert_eq!(to_time("07:05"), time);
    }
}
