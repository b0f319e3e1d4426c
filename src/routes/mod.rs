pub mod auth;

pub mod users;

pub mod classes;

pub mod students;

pub mod subjects;

pub mod allocations;

pub mod schedules;

pub mod assessments;

pub mod grades;

pub mod attendance;

pub mod incidents;

pub mod announcements;

pub mod dashboard;

pub mod reports;

pub mod frontend;

pub use allocations::configure_allocations_routes;
pub use announcements::configure_announcements_routes;
pub use assessments::configure_assessments_routes;
pub use attendance::configure_attendance_routes;
pub use auth::configure_auth_routes;
pub use classes::configure_classes_routes;
pub use dashboard::configure_dashboard_routes;
pub use frontend::configure_frontend_routes;
pub use grades::configure_grades_routes;
pub use incidents::configure_incidents_routes;
pub use reports::configure_reports_routes;
pub use schedules::configure_schedules_routes;
pub use students::configure_students_routes;
pub use subjects::configure_subjects_routes;
pub use users::configure_user_routes;
