pub mod common;

pub mod announcements;
pub mod assessments;
pub mod attendance;
pub mod auth;
pub mod classes;
pub mod dashboard;
pub mod grades;
pub mod incidents;
pub mod reports;
pub mod schedules;
pub mod students;
pub mod subjects;
pub mod teacher_allocations;
pub mod users;

pub use common::{
    ApiResponse, MAX_PAGE, MAX_PAGE_SIZE, PaginatedResponse, PaginationInfo, PaginationQuery,
};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
///
/// 0 表示成功；其余按千位分段：
/// 1xxx 通用，2xxx 认证，3xxx 用户，4xxx 班级，5xxx 学生，
/// 6xxx 学科与任课，7xxx 评估与成绩，8xxx 考勤与课表，9xxx 事件、公告与导入导出。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    InvalidParameter = 1001,
    NotFound = 1002,
    Conflict = 1003,
    RateLimitExceeded = 1004,
    PayloadTooLarge = 1005,
    InternalServerError = 1099,

    // 认证
    AuthFailed = 2000,
    Unauthorized = 2001,
    Forbidden = 2002,
    AccountInactive = 2003,
    PasswordPolicyViolation = 2004,

    // 用户
    UserNotFound = 3000,
    UserAlreadyExists = 3001,
    UserNameInvalid = 3002,
    UserEmailInvalid = 3003,
    UserFullNameInvalid = 3004,
    UserCreationFailed = 3005,
    UserUpdateFailed = 3006,
    UserDeleteFailed = 3007,
    CannotDeleteSelf = 3008,
    CannotDeleteSystemAdmin = 3009,
    UserRoleMismatch = 3010,

    // 班级
    ClassNotFound = 4000,
    ClassAlreadyExists = 4001,
    ClassNameInvalid = 4002,
    ClassYearInvalid = 4003,
    ClassPermissionDenied = 4004,

    // 学生
    StudentNotFound = 5000,
    StudentAlreadyExists = 5001,
    EnrollmentNumberInvalid = 5002,
    StudentNotInClass = 5003,
    BirthDateInvalid = 5004,
    StudentProfileMissing = 5005,

    // 学科与任课
    SubjectNotFound = 6000,
    SubjectAlreadyExists = 6001,
    SubjectInvalid = 6002,
    AllocationNotFound = 6010,
    AllocationAlreadyExists = 6011,
    TeacherNotAllocated = 6012,

    // 评估与成绩
    AssessmentNotFound = 7000,
    AssessmentInvalid = 7001,
    GradeNotFound = 7010,
    GradeInvalid = 7011,

    // 考勤与课表
    AttendanceNotFound = 8000,
    AttendanceInvalid = 8001,
    AttendanceAlreadyExists = 8002,
    ScheduleNotFound = 8010,
    ScheduleInvalid = 8011,
    ScheduleConflict = 8012,

    // 事件、公告与导入导出
    IncidentNotFound = 9000,
    IncidentInvalid = 9001,
    AnnouncementNotFound = 9010,
    AnnouncementInvalid = 9011,
    ImportFileMissing = 9020,
    ImportFileFormatInvalid = 9021,
    ImportRowLimitExceeded = 9022,
    ExportFailed = 9030,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_ranges() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::AuthFailed as i32 / 1000, 2);
        assert_eq!(ErrorCode::UserAlreadyExists as i32 / 1000, 3);
        assert_eq!(ErrorCode::ClassNotFound as i32 / 1000, 4);
        assert_eq!(ErrorCode::StudentNotInClass as i32 / 1000, 5);
        assert_eq!(ErrorCode::TeacherNotAllocated as i32 / 1000, 6);
        assert_eq!(ErrorCode::GradeInvalid as i32 / 1000, 7);
        assert_eq!(ErrorCode::ScheduleConflict as i32 / 1000, 8);
        assert_eq!(ErrorCode::ImportRowLimitExceeded as i32 / 1000, 9);
    }

    #[test]
    fn test_api_response_envelope() {
        let body = serde_json::to_value(ApiResponse::error_empty(
            ErrorCode::ScheduleConflict,
            "overlap",
        ))
        .unwrap();
        assert_eq!(body["code"], 8012);
        assert_eq!(body["message"], "overlap");
        assert!(body.get("data").is_none());
        assert!(body.get("timestamp").is_some());
    }
}
