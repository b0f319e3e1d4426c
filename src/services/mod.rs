pub(crate) mod access;
pub(crate) mod support;

pub mod allocations;
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
pub mod users;

pub use allocations::AllocationService;
pub use announcements::AnnouncementService;
pub use assessments::AssessmentService;
pub use attendance::AttendanceService;
pub use auth::AuthService;
pub use classes::ClassService;
pub use dashboard::DashboardService;
pub use grades::GradeService;
pub use incidents::IncidentService;
pub use reports::ReportService;
pub use schedules::ScheduleService;
pub use students::StudentService;
pub use subjects::SubjectService;
pub use users::UserService;
