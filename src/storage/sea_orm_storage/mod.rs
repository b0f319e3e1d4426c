//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod allocations;
mod announcements;
mod assessments;
mod attendance;
mod classes;
mod grades;
mod incidents;
mod schedules;
mod stats;
mod students;
mod subjects;
mod users;

use std::collections::HashMap;
use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ColumnTrait, Condition, ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};
use tracing::info;

use crate::config::AppConfig;
use crate::entity::prelude::{Classes, Students, Subjects, Users};
use crate::entity::{
    classes as classes_entity, students as students_entity, subjects as subjects_entity,
    users as users_entity,
};
use crate::errors::{Result, SchoolSystemError};
use crate::utils::sql::contains_pattern;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按配置连接数据库并执行迁移
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config.database.pool_size, config.database.timeout)
                .await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);
        Ok(storage)
    }

    /// 在已有连接上执行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("数据库迁移失败: {e}")))?;
        Ok(Self { db })
    }

    /// 单连接的内存 SQLite，测试使用
    pub async fn new_in_memory() -> Result<Self> {
        let db = Self::connect_sqlite("sqlite::memory:", 1, 5).await?;
        Self::from_connection(db).await
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(
        url: &str,
        pool_size: u32,
        timeout_secs: u64,
    ) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");
        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| SchoolSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        if !in_memory {
            opt = opt
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory")
                .pragma("wal_autocheckpoint", "1000");
        }

        // 内存库每个连接都是独立的数据库，只能用一个连接
        let max_connections = if in_memory { 1 } else { pool_size.max(1) };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(timeout_secs))
            .idle_timeout(if in_memory {
                None
            } else {
                Some(Duration::from_secs(300))
            })
            .max_lifetime(if in_memory { None } else { Some(Duration::from_secs(1800)) })
            .connect_with(opt)
            .await
            .map_err(|e| SchoolSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| SchoolSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 推断数据库类型
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(SchoolSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 批量查询用户姓名
    pub(crate) async fn user_name_map(&self, ids: Vec<i64>) -> Result<HashMap<i64, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = Users::find()
            .filter(users_entity::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(db_err("查询用户姓名失败"))?;
        Ok(rows.into_iter().map(|u| (u.id, u.full_name)).collect())
    }

    pub(crate) async fn class_name_map(&self, ids: Vec<i64>) -> Result<HashMap<i64, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = Classes::find()
            .filter(classes_entity::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(db_err("查询班级名称失败"))?;
        Ok(rows.into_iter().map(|c| (c.id, c.name)).collect())
    }

    pub(crate) async fn subject_name_map(&self, ids: Vec<i64>) -> Result<HashMap<i64, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = Subjects::find()
            .filter(subjects_entity::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(db_err("查询学科名称失败"))?;
        Ok(rows.into_iter().map(|s| (s.id, s.name)).collect())
    }

    /// 学生档案 ID -> 学生姓名
    pub(crate) async fn student_name_map(&self, ids: Vec<i64>) -> Result<HashMap<i64, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = Students::find()
            .filter(students_entity::Column::Id.is_in(ids))
            .find_also_related(Users)
            .all(&self.db)
            .await
            .map_err(db_err("查询学生姓名失败"))?;
        Ok(rows
            .into_iter()
            .filter_map(|(s, u)| u.map(|u| (s.id, u.full_name)))
            .collect())
    }
}

use crate::models::{
    MAX_PAGE, MAX_PAGE_SIZE,
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
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn list_users(&self, query: UserListQuery) -> Result<Vec<User>> {
        self.list_users_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn find_existing_usernames(&self, usernames: &[String]) -> Result<Vec<String>> {
        self.find_existing_usernames_impl(usernames).await
    }

    async fn find_existing_emails(&self, emails: &[String]) -> Result<Vec<String>> {
        self.find_existing_emails_impl(emails).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn get_role_links(&self, user_id: i64) -> Result<RoleLinks> {
        self.get_role_links_impl(user_id).await
    }

    async fn find_system_admin_id(&self) -> Result<Option<i64>> {
        self.find_system_admin_id_impl().await
    }

    // 班级模块
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(class).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_detail(&self, class_id: i64) -> Result<Option<ClassDetail>> {
        self.get_class_detail_impl(class_id).await
    }

    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        self.list_classes_with_pagination_impl(query).await
    }

    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        self.update_class_impl(class_id, update).await
    }

    async fn delete_class(&self, class_id: i64) -> Result<bool> {
        self.delete_class_impl(class_id).await
    }

    // 学生模块
    async fn create_student(&self, record: CreateStudentRecord) -> Result<Student> {
        self.create_student_impl(record).await
    }

    async fn create_student_with_account(
        &self,
        account: CreateUserRequest,
        record: CreateStudentRecord,
    ) -> Result<Student> {
        self.create_student_with_account_impl(account, record).await
    }

    async fn get_student_by_id(&self, student_id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(student_id).await
    }

    async fn get_student_by_user_id(&self, user_id: i64) -> Result<Option<Student>> {
        self.get_student_by_user_id_impl(user_id).await
    }

    async fn get_student_detail(&self, student_id: i64) -> Result<Option<StudentDetail>> {
        self.get_student_detail_impl(student_id).await
    }

    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        self.list_students_with_pagination_impl(query).await
    }

    async fn list_class_students(&self, class_id: i64) -> Result<Vec<StudentDetail>> {
        self.list_class_students_impl(class_id).await
    }

    async fn update_student(
        &self,
        student_id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        self.update_student_impl(student_id, update).await
    }

    async fn transfer_student(&self, student_id: i64, class_id: i64) -> Result<Option<Student>> {
        self.transfer_student_impl(student_id, class_id).await
    }

    async fn delete_student(&self, student_id: i64, delete_profile: bool) -> Result<bool> {
        self.delete_student_impl(student_id, delete_profile).await
    }

    async fn list_enrollments(&self, student_id: i64) -> Result<Vec<Enrollment>> {
        self.list_enrollments_impl(student_id).await
    }

    async fn find_existing_enrollment_numbers(&self, numbers: &[String]) -> Result<Vec<String>> {
        self.find_existing_enrollment_numbers_impl(numbers).await
    }

    // 学科模块
    async fn create_subject(&self, subject: CreateSubjectRequest) -> Result<Subject> {
        self.create_subject_impl(subject).await
    }

    async fn get_subject_by_id(&self, subject_id: i64) -> Result<Option<Subject>> {
        self.get_subject_by_id_impl(subject_id).await
    }

    async fn list_subjects_with_pagination(
        &self,
        query: SubjectListQuery,
    ) -> Result<SubjectListResponse> {
        self.list_subjects_with_pagination_impl(query).await
    }

    async fn list_all_subjects(&self) -> Result<Vec<Subject>> {
        self.list_all_subjects_impl().await
    }

    async fn update_subject(
        &self,
        subject_id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        self.update_subject_impl(subject_id, update).await
    }

    async fn delete_subject(&self, subject_id: i64) -> Result<bool> {
        self.delete_subject_impl(subject_id).await
    }

    // 任课分配模块
    async fn create_allocation(
        &self,
        allocation: CreateAllocationRequest,
    ) -> Result<TeacherAllocation> {
        self.create_allocation_impl(allocation).await
    }

    async fn get_allocation_by_id(&self, allocation_id: i64) -> Result<Option<TeacherAllocation>> {
        self.get_allocation_by_id_impl(allocation_id).await
    }

    async fn list_allocations_with_pagination(
        &self,
        query: AllocationListQuery,
    ) -> Result<AllocationListResponse> {
        self.list_allocations_with_pagination_impl(query).await
    }

    async fn list_teacher_allocations(&self, teacher_id: i64) -> Result<Vec<TeacherAllocation>> {
        self.list_teacher_allocations_impl(teacher_id).await
    }

    async fn is_teacher_allocated(
        &self,
        teacher_id: i64,
        class_id: i64,
        subject_id: Option<i64>,
    ) -> Result<bool> {
        self.is_teacher_allocated_impl(teacher_id, class_id, subject_id).await
    }

    async fn delete_allocation(&self, allocation_id: i64) -> Result<bool> {
        self.delete_allocation_impl(allocation_id).await
    }

    // 课表模块
    async fn create_schedule(&self, schedule: CreateScheduleRequest) -> Result<Schedule> {
        self.create_schedule_impl(schedule).await
    }

    async fn get_schedule_by_id(&self, schedule_id: i64) -> Result<Option<Schedule>> {
        self.get_schedule_by_id_impl(schedule_id).await
    }

    async fn list_schedules_with_pagination(
        &self,
        query: ScheduleListQuery,
    ) -> Result<ScheduleListResponse> {
        self.list_schedules_with_pagination_impl(query).await
    }

    async fn list_schedules(&self, query: ScheduleListQuery) -> Result<Vec<ScheduleDetail>> {
        self.list_schedules_impl(query).await
    }

    async fn list_day_slots(
        &self,
        day_of_week: i32,
        class_id: i64,
        teacher_id: i64,
    ) -> Result<Vec<Schedule>> {
        self.list_day_slots_impl(day_of_week, class_id, teacher_id).await
    }

    async fn update_schedule(
        &self,
        schedule_id: i64,
        update: UpdateScheduleRequest,
    ) -> Result<Option<Schedule>> {
        self.update_schedule_impl(schedule_id, update).await
    }

    async fn delete_schedule(&self, schedule_id: i64) -> Result<bool> {
        self.delete_schedule_impl(schedule_id).await
    }

    // 评估模块
    async fn create_assessment(
        &self,
        assessment: CreateAssessmentRequest,
        created_by: i64,
    ) -> Result<Assessment> {
        self.create_assessment_impl(assessment, created_by).await
    }

    async fn get_assessment_by_id(&self, assessment_id: i64) -> Result<Option<Assessment>> {
        self.get_assessment_by_id_impl(assessment_id).await
    }

    async fn get_assessment_detail(&self, assessment_id: i64) -> Result<Option<AssessmentDetail>> {
        self.get_assessment_detail_impl(assessment_id).await
    }

    async fn list_assessments_with_pagination(
        &self,
        query: AssessmentListQuery,
    ) -> Result<AssessmentListResponse> {
        self.list_assessments_with_pagination_impl(query).await
    }

    async fn update_assessment(
        &self,
        assessment_id: i64,
        update: UpdateAssessmentRequest,
    ) -> Result<Option<Assessment>> {
        self.update_assessment_impl(assessment_id, update).await
    }

    async fn delete_assessment(&self, assessment_id: i64) -> Result<bool> {
        self.delete_assessment_impl(assessment_id).await
    }

    // 成绩模块
    async fn upsert_grade(
        &self,
        assessment_id: i64,
        entry: BulkGradeEntry,
        graded_by: i64,
    ) -> Result<Grade> {
        self.upsert_grade_impl(assessment_id, entry, graded_by).await
    }

    async fn bulk_upsert_grades(
        &self,
        assessment_id: i64,
        entries: Vec<BulkGradeEntry>,
        graded_by: i64,
    ) -> Result<Vec<Grade>> {
        self.bulk_upsert_grades_impl(assessment_id, entries, graded_by).await
    }

    async fn get_grade_by_id(&self, grade_id: i64) -> Result<Option<Grade>> {
        self.get_grade_by_id_impl(grade_id).await
    }

    async fn list_grades_with_pagination(
        &self,
        query: GradeListQuery,
    ) -> Result<GradeListResponse> {
        self.list_grades_with_pagination_impl(query).await
    }

    async fn list_student_grades(&self, student_id: i64) -> Result<Vec<GradeDetail>> {
        self.list_student_grades_impl(student_id).await
    }

    async fn update_grade(
        &self,
        grade_id: i64,
        update: UpdateGradeRequest,
        graded_by: i64,
    ) -> Result<Option<Grade>> {
        self.update_grade_impl(grade_id, update, graded_by).await
    }

    async fn delete_grade(&self, grade_id: i64) -> Result<bool> {
        self.delete_grade_impl(grade_id).await
    }

    async fn list_scored_assessments(
        &self,
        class_id: Option<i64>,
        student_id: Option<i64>,
    ) -> Result<Vec<ScoredAssessment>> {
        self.list_scored_assessments_impl(class_id, student_id).await
    }

    async fn highest_score(&self, assessment_id: i64) -> Result<Option<f64>> {
        self.highest_score_impl(assessment_id).await
    }

    // 考勤模块
    async fn upsert_attendance(&self, record: AttendanceUpsert) -> Result<AttendanceRecord> {
        self.upsert_attendance_impl(record).await
    }

    async fn record_roll_call(
        &self,
        records: Vec<AttendanceUpsert>,
    ) -> Result<Vec<AttendanceRecord>> {
        self.record_roll_call_impl(records).await
    }

    async fn get_attendance_by_id(&self, attendance_id: i64) -> Result<Option<AttendanceRecord>> {
        self.get_attendance_by_id_impl(attendance_id).await
    }

    async fn list_attendance_with_pagination(
        &self,
        query: AttendanceListQuery,
    ) -> Result<AttendanceListResponse> {
        self.list_attendance_with_pagination_impl(query).await
    }

    async fn list_student_attendance(
        &self,
        student_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<AttendanceDetail>> {
        self.list_student_attendance_impl(student_id, start_date, end_date).await
    }

    async fn update_attendance(
        &self,
        attendance_id: i64,
        status: AttendanceStatus,
        justification: Option<String>,
        recorded_by: i64,
    ) -> Result<Option<AttendanceRecord>> {
        self.update_attendance_impl(attendance_id, status, justification, recorded_by).await
    }

    async fn delete_attendance(&self, attendance_id: i64) -> Result<bool> {
        self.delete_attendance_impl(attendance_id).await
    }

    async fn attendance_tallies(&self, query: AttendanceListQuery) -> Result<Vec<AttendanceTally>> {
        self.attendance_tallies_impl(query).await
    }

    // 事件模块
    async fn create_incident(
        &self,
        incident: CreateIncidentRequest,
        reporter_id: i64,
    ) -> Result<Incident> {
        self.create_incident_impl(incident, reporter_id).await
    }

    async fn get_incident_by_id(&self, incident_id: i64) -> Result<Option<Incident>> {
        self.get_incident_by_id_impl(incident_id).await
    }

    async fn get_incident_detail(&self, incident_id: i64) -> Result<Option<IncidentDetail>> {
        self.get_incident_detail_impl(incident_id).await
    }

    async fn list_incidents_with_pagination(
        &self,
        query: IncidentListQuery,
    ) -> Result<IncidentListResponse> {
        self.list_incidents_with_pagination_impl(query).await
    }

    async fn update_incident(
        &self,
        incident_id: i64,
        update: UpdateIncidentRequest,
    ) -> Result<Option<Incident>> {
        self.update_incident_impl(incident_id, update).await
    }

    async fn delete_incident(&self, incident_id: i64) -> Result<bool> {
        self.delete_incident_impl(incident_id).await
    }

    // 公告模块
    async fn create_announcement(
        &self,
        announcement: CreateAnnouncementRequest,
        author_id: i64,
    ) -> Result<Announcement> {
        self.create_announcement_impl(announcement, author_id).await
    }

    async fn get_announcement_by_id(&self, announcement_id: i64) -> Result<Option<Announcement>> {
        self.get_announcement_by_id_impl(announcement_id).await
    }

    async fn list_announcements_with_pagination(
        &self,
        query: AnnouncementListQuery,
    ) -> Result<AnnouncementListResponse> {
        self.list_announcements_with_pagination_impl(query).await
    }

    async fn update_announcement(
        &self,
        announcement_id: i64,
        update: UpdateAnnouncementRequest,
    ) -> Result<Option<Announcement>> {
        self.update_announcement_impl(announcement_id, update).await
    }

    async fn delete_announcement(&self, announcement_id: i64) -> Result<bool> {
        self.delete_announcement_impl(announcement_id).await
    }

    // 统计模块
    async fn dashboard_counts(&self) -> Result<DashboardCounts> {
        self.dashboard_counts_impl().await
    }

    async fn count_classes_per_year(&self) -> Result<Vec<YearCount>> {
        self.count_classes_per_year_impl().await
    }

    async fn student_names(&self, student_ids: &[i64]) -> Result<HashMap<i64, String>> {
        self.student_names_impl(student_ids).await
    }
}

/// 数据库错误附加上下文；约束冲突保留其分类
pub(crate) fn db_err(context: &'static str) -> impl FnOnce(DbErr) -> SchoolSystemError {
    move |e| match SchoolSystemError::from(e) {
        SchoolSystemError::DatabaseOperation(msg) => {
            SchoolSystemError::DatabaseOperation(format!("{context}: {msg}"))
        }
        classified => classified,
    }
}

/// 规范化分页参数，页码过大时截断以免偏移量溢出
pub(crate) fn page_params(page: Option<i64>, size: Option<i64>) -> (u64, u64) {
    (
        page.unwrap_or(1).clamp(1, MAX_PAGE) as u64,
        size.unwrap_or(10).clamp(1, MAX_PAGE_SIZE) as u64,
    )
}

/// 任一列包含搜索词（通配符已转义）
pub(crate) fn like_any<C: ColumnTrait>(columns: &[C], search: &str) -> Condition {
    let pattern = contains_pattern(search);
    columns.iter().fold(Condition::any(), |cond, column| {
        cond.add(column.like(LikeExpr::new(pattern.clone()).escape('\\')))
    })
}

/// 对 id 去重
pub(crate) fn unique_ids(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("school.db").unwrap(),
            "sqlite://school.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert!(SeaOrmStorage::build_database_url("postgres://u@h/db").is_ok());
        assert!(SeaOrmStorage::build_database_url("oracle://x").is_err());
    }

    #[test]
    fn test_page_params_clamp() {
        assert_eq!(page_params(None, None), (1, 10));
        assert_eq!(page_params(Some(0), Some(500)), (1, 100));
        assert_eq!(page_params(Some(3), Some(0)), (3, 1));
    }

    #[test]
    fn test_page_params_huge_page_keeps_offset_in_range() {
        let (page, size) = page_params(Some(i64::MAX), Some(100));
        assert_eq!(page, MAX_PAGE as u64);
        let offset = (page - 1).checked_mul(size).unwrap();
        assert!(offset <= i64::MAX as u64);
    }

    #[test]
    fn test_unique_ids() {
        assert_eq!(unique_ids([3, 1, 3, 2, 1]), vec![1, 2, 3]);
    }

    #[test]
    fn test_db_err_keeps_classification() {
        let err = db_err("ctx")(DbErr::Custom("boom".into()));
        assert_eq!(err.code(), "E005");
        assert!(err.message().starts_with("ctx: "));
    }
}
