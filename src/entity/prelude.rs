//! 预导入模块，方便使用

pub use super::announcements::Entity as Announcements;
pub use super::assessments::Entity as Assessments;
pub use super::attendance::Entity as Attendance;
pub use super::classes::Entity as Classes;
pub use super::enrollments::Entity as Enrollments;
pub use super::grades::Entity as Grades;
pub use super::incidents::Entity as Incidents;
pub use super::schedules::Entity as Schedules;
pub use super::students::Entity as Students;
pub use super::subjects::Entity as Subjects;
pub use super::teacher_allocations::Entity as TeacherAllocations;
pub use super::users::Entity as Users;
