use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::{
    announcements::{
        entities::Announcement,
        requests::{AnnouncementListQuery, CreateAnnouncementRequest, UpdateAnnouncementRequest},
        responses::AnnouncementListResponse,
    },
    assessments::{
        entities::{Assessment, AssessmentDetail},
        requests::{AssessmentListQuery, CreateAssessmentRequest, UpdateAssessmentRequest},
        responses::AssessmentListResponse,
    },
    attendance::{
        entities::{AttendanceDetail, AttendanceRecord, AttendanceStatus, AttendanceTally},
        requests::{AttendanceListQuery, AttendanceUpsert},
        responses::AttendanceListResponse,
    },
    classes::{
        entities::{Class, ClassDetail},
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    dashboard::responses::DashboardCounts,
    grades::{
        entities::{Grade, GradeDetail, ScoredAssessment},
        requests::{BulkGradeEntry, GradeListQuery, UpdateGradeRequest},
        responses::GradeListResponse,
    },
    incidents::{
        entities::{Incident, IncidentDetail},
        requests::{CreateIncidentRequest, IncidentListQuery, UpdateIncidentRequest},
        responses::IncidentListResponse,
    },
    reports::responses::YearCount,
    schedules::{
        entities::{Schedule, ScheduleDetail},
        requests::{CreateScheduleRequest, ScheduleListQuery, UpdateScheduleRequest},
        responses::ScheduleListResponse,
    },
    students::{
        entities::{Enrollment, Student, StudentDetail},
        requests::{CreateStudentRecord, StudentListQuery, UpdateStudentRequest},
        responses::StudentListResponse,
    },
    subjects::{
        entities::Subject,
        requests::{CreateSubjectRequest, SubjectListQuery, UpdateSubjectRequest},
        responses::SubjectListResponse,
    },
    teacher_allocations::{
        entities::TeacherAllocation,
        requests::{AllocationListQuery, CreateAllocationRequest},
        responses::AllocationListResponse,
    },
    users::{
        entities::{RoleLinks, User},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 服务层与数据库之间的存储接口
///
/// 写入类方法中的密码字段一律是已经哈希过的值。
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 登录时按用户名或邮箱查找
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 不分页，用于导出与下拉列表
    async fn list_users(&self, query: UserListQuery) -> Result<Vec<User>>;
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    async fn delete_user(&self, id: i64) -> Result<bool>;
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 返回给定集合中已被占用的用户名 / 邮箱
    async fn find_existing_usernames(&self, usernames: &[String]) -> Result<Vec<String>>;
    async fn find_existing_emails(&self, emails: &[String]) -> Result<Vec<String>>;
    async fn count_users(&self) -> Result<u64>;
    // 学生档案、任课分配与协调班级的引用情况
    async fn get_role_links(&self, user_id: i64) -> Result<RoleLinks>;
    // 最早创建的管理员，即初始化时写入的系统管理员
    async fn find_system_admin_id(&self) -> Result<Option<i64>>;

    /// 班级管理方法
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class>;
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    async fn get_class_detail(&self, class_id: i64) -> Result<Option<ClassDetail>>;
    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse>;
    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>>;
    async fn delete_class(&self, class_id: i64) -> Result<bool>;

    /// 学生管理方法
    async fn create_student(&self, record: CreateStudentRecord) -> Result<Student>;
    // 同一事务内创建 student 账号与学生档案；record.user_id 会被新账号 ID 覆盖
    async fn create_student_with_account(
        &self,
        account: CreateUserRequest,
        record: CreateStudentRecord,
    ) -> Result<Student>;
    async fn get_student_by_id(&self, student_id: i64) -> Result<Option<Student>>;
    async fn get_student_by_user_id(&self, user_id: i64) -> Result<Option<Student>>;
    async fn get_student_detail(&self, student_id: i64) -> Result<Option<StudentDetail>>;
    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse>;
    // 班级全部学生，按姓名排序
    async fn list_class_students(&self, class_id: i64) -> Result<Vec<StudentDetail>>;
    async fn update_student(
        &self,
        student_id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>>;
    // 转班并写入一条入班记录
    async fn transfer_student(&self, student_id: i64, class_id: i64) -> Result<Option<Student>>;
    async fn delete_student(&self, student_id: i64, delete_profile: bool) -> Result<bool>;
    async fn list_enrollments(&self, student_id: i64) -> Result<Vec<Enrollment>>;
    async fn find_existing_enrollment_numbers(&self, numbers: &[String]) -> Result<Vec<String>>;

    /// 学科管理方法
    async fn create_subject(&self, subject: CreateSubjectRequest) -> Result<Subject>;
    async fn get_subject_by_id(&self, subject_id: i64) -> Result<Option<Subject>>;
    async fn list_subjects_with_pagination(
        &self,
        query: SubjectListQuery,
    ) -> Result<SubjectListResponse>;
    async fn list_all_subjects(&self) -> Result<Vec<Subject>>;
    async fn update_subject(
        &self,
        subject_id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>>;
    async fn delete_subject(&self, subject_id: i64) -> Result<bool>;

    /// 任课分配方法
    async fn create_allocation(&self, allocation: CreateAllocationRequest)
    -> Result<TeacherAllocation>;
    async fn get_allocation_by_id(&self, allocation_id: i64) -> Result<Option<TeacherAllocation>>;
    async fn list_allocations_with_pagination(
        &self,
        query: AllocationListQuery,
    ) -> Result<AllocationListResponse>;
    async fn list_teacher_allocations(&self, teacher_id: i64) -> Result<Vec<TeacherAllocation>>;
    // subject_id 为 None 时只要求教师在该班任课
    async fn is_teacher_allocated(
        &self,
        teacher_id: i64,
        class_id: i64,
        subject_id: Option<i64>,
    ) -> Result<bool>;
    async fn delete_allocation(&self, allocation_id: i64) -> Result<bool>;

    /// 课表管理方法
    async fn create_schedule(&self, schedule: CreateScheduleRequest) -> Result<Schedule>;
    async fn get_schedule_by_id(&self, schedule_id: i64) -> Result<Option<Schedule>>;
    async fn list_schedules_with_pagination(
        &self,
        query: ScheduleListQuery,
    ) -> Result<ScheduleListResponse>;
    // 不分页，按星期与开始时间排序
    async fn list_schedules(&self, query: ScheduleListQuery) -> Result<Vec<ScheduleDetail>>;
    // 某天与该班级或该教师相关的全部课时，用于冲突检测
    async fn list_day_slots(
        &self,
        day_of_week: i32,
        class_id: i64,
        teacher_id: i64,
    ) -> Result<Vec<Schedule>>;
    async fn update_schedule(
        &self,
        schedule_id: i64,
        update: UpdateScheduleRequest,
    ) -> Result<Option<Schedule>>;
    async fn delete_schedule(&self, schedule_id: i64) -> Result<bool>;

    /// 评估管理方法
    async fn create_assessment(
        &self,
        assessment: CreateAssessmentRequest,
        created_by: i64,
    ) -> Result<Assessment>;
    async fn get_assessment_by_id(&self, assessment_id: i64) -> Result<Option<Assessment>>;
    async fn get_assessment_detail(&self, assessment_id: i64)
    -> Result<Option<AssessmentDetail>>;
    async fn list_assessments_with_pagination(
        &self,
        query: AssessmentListQuery,
    ) -> Result<AssessmentListResponse>;
    async fn update_assessment(
        &self,
        assessment_id: i64,
        update: UpdateAssessmentRequest,
    ) -> Result<Option<Assessment>>;
    async fn delete_assessment(&self, assessment_id: i64) -> Result<bool>;

    /// 成绩管理方法
    // 按 (assessment, student) 插入或覆盖
    async fn upsert_grade(
        &self,
        assessment_id: i64,
        entry: BulkGradeEntry,
        graded_by: i64,
    ) -> Result<Grade>;
    // 同一事务内批量写入，任一失败整体回滚
    async fn bulk_upsert_grades(
        &self,
        assessment_id: i64,
        entries: Vec<BulkGradeEntry>,
        graded_by: i64,
    ) -> Result<Vec<Grade>>;
    async fn get_grade_by_id(&self, grade_id: i64) -> Result<Option<Grade>>;
    async fn list_grades_with_pagination(&self, query: GradeListQuery)
    -> Result<GradeListResponse>;
    async fn list_student_grades(&self, student_id: i64) -> Result<Vec<GradeDetail>>;
    async fn update_grade(
        &self,
        grade_id: i64,
        update: UpdateGradeRequest,
        graded_by: i64,
    ) -> Result<Option<Grade>>;
    async fn delete_grade(&self, grade_id: i64) -> Result<bool>;
    // 成绩与评估参数的扁平视图，供平均分计算；包含未评分的记录
    async fn list_scored_assessments(
        &self,
        class_id: Option<i64>,
        student_id: Option<i64>,
    ) -> Result<Vec<ScoredAssessment>>;
    // 已录入的最高分；没有成绩时为 None
    async fn highest_score(&self, assessment_id: i64) -> Result<Option<f64>>;

    /// 考勤管理方法
    async fn upsert_attendance(&self, record: AttendanceUpsert) -> Result<AttendanceRecord>;
    async fn record_roll_call(&self, records: Vec<AttendanceUpsert>)
    -> Result<Vec<AttendanceRecord>>;
    async fn get_attendance_by_id(&self, attendance_id: i64) -> Result<Option<AttendanceRecord>>;
    async fn list_attendance_with_pagination(
        &self,
        query: AttendanceListQuery,
    ) -> Result<AttendanceListResponse>;
    async fn list_student_attendance(
        &self,
        student_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<AttendanceDetail>>;
    async fn update_attendance(
        &self,
        attendance_id: i64,
        status: AttendanceStatus,
        justification: Option<String>,
        recorded_by: i64,
    ) -> Result<Option<AttendanceRecord>>;
    async fn delete_attendance(&self, attendance_id: i64) -> Result<bool>;
    // 按学生与状态分组计数，分页字段被忽略
    async fn attendance_tallies(&self, query: AttendanceListQuery) -> Result<Vec<AttendanceTally>>;

    /// 事件记录方法
    async fn create_incident(
        &self,
        incident: CreateIncidentRequest,
        reporter_id: i64,
    ) -> Result<Incident>;
    async fn get_incident_by_id(&self, incident_id: i64) -> Result<Option<Incident>>;
    async fn get_incident_detail(&self, incident_id: i64) -> Result<Option<IncidentDetail>>;
    async fn list_incidents_with_pagination(
        &self,
        query: IncidentListQuery,
    ) -> Result<IncidentListResponse>;
    async fn update_incident(
        &self,
        incident_id: i64,
        update: UpdateIncidentRequest,
    ) -> Result<Option<Incident>>;
    async fn delete_incident(&self, incident_id: i64) -> Result<bool>;

    /// 公告方法
    async fn create_announcement(
        &self,
        announcement: CreateAnnouncementRequest,
        author_id: i64,
    ) -> Result<Announcement>;
    async fn get_announcement_by_id(&self, announcement_id: i64) -> Result<Option<Announcement>>;
    async fn list_announcements_with_pagination(
        &self,
        query: AnnouncementListQuery,
    ) -> Result<AnnouncementListResponse>;
    async fn update_announcement(
        &self,
        announcement_id: i64,
        update: UpdateAnnouncementRequest,
    ) -> Result<Option<Announcement>>;
    async fn delete_announcement(&self, announcement_id: i64) -> Result<bool>;

    /// 统计方法
    async fn dashboard_counts(&self) -> Result<DashboardCounts>;
    async fn count_classes_per_year(&self) -> Result<Vec<YearCount>>;
    // 学生档案 ID -> 姓名
    async fn student_names(&self, student_ids: &[i64]) -> Result<HashMap<i64, String>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
