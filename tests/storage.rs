//! 存储层集成测试（内存 SQLite，每个用例独立建库并执行迁移）

use chrono::NaiveDate;

use rust_school_system::errors::SchoolSystemError;
use rust_school_system::models::assessments::requests::CreateAssessmentRequest;
use rust_school_system::models::attendance::entities::AttendanceStatus;
use rust_school_system::models::attendance::requests::{AttendanceListQuery, AttendanceUpsert};
use rust_school_system::models::classes::requests::CreateClassRequest;
use rust_school_system::models::grades::requests::{BulkGradeEntry, GradeListQuery};
use rust_school_system::models::students::requests::CreateStudentRecord;
use rust_school_system::models::subjects::requests::CreateSubjectRequest;
use rust_school_system::models::teacher_allocations::requests::CreateAllocationRequest;
use rust_school_system::models::users::entities::{RoleLinks, User, UserRole};
use rust_school_system::models::users::requests::{CreateUserRequest, UserListQuery};
use rust_school_system::storage::Storage;
use rust_school_system::storage::sea_orm_storage::SeaOrmStorage;

async fn storage() -> SeaOrmStorage {
    SeaOrmStorage::new_in_memory()
        .await
        .expect("in-memory storage should initialize")
}

async fn add_user(storage: &SeaOrmStorage, username: &str, role: UserRole) -> User {
    storage
        .create_user(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@school.test"),
            password: "hashed".to_string(),
            full_name: format!("{username} full"),
            role,
        })
        .await
        .expect("user should be created")
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

/// 班级 + 学科 + 两名学生，返回 (class_id, subject_id, [student_id; 2])
async fn seed_class(storage: &SeaOrmStorage) -> (i64, i64, [i64; 2]) {
    let class = storage
        .create_class(CreateClassRequest {
            name: "7A".to_string(),
            year: 2025,
            coord_id: None,
        })
        .await
        .unwrap();
    let subject = storage
        .create_subject(CreateSubjectRequest {
            name: "Math".to_string(),
            description: None,
            workload_hours: 80,
        })
        .await
        .unwrap();

    let mut ids = [0; 2];
    for (i, name) in ["ana", "bruno"].iter().enumerate() {
        let user = add_user(storage, name, UserRole::Student).await;
        let student = storage
            .create_student(CreateStudentRecord {
                user_id: user.id,
                class_id: Some(class.id),
                enrollment_number: format!("2025-{i:03}"),
                birth_date: None,
            })
            .await
            .unwrap();
        ids[i] = student.id;
    }
    (class.id, subject.id, ids)
}

async fn seed_assessment(storage: &SeaOrmStorage, class_id: i64, subject_id: i64) -> i64 {
    let admin = add_user(storage, "admin", UserRole::Admin).await;
    storage
        .create_assessment(
            CreateAssessmentRequest {
                class_id,
                subject_id,
                name: "Quiz 1".to_string(),
                date: date(10),
                bimester: 1,
                max_score: 10.0,
                weight: 1.0,
            },
            admin.id,
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_user_uniqueness_and_lookup() {
    let storage = storage().await;
    let teacher = add_user(&storage, "maria", UserRole::Teacher).await;

    let duplicate = storage
        .create_user(CreateUserRequest {
            username: "maria".to_string(),
            email: "other@school.test".to_string(),
            password: "hashed".to_string(),
            full_name: "Other".to_string(),
            role: UserRole::Teacher,
        })
        .await;
    assert!(matches!(duplicate, Err(SchoolSystemError::Conflict(_))));

    let by_email = storage
        .get_user_by_username_or_email("maria@school.test")
        .await
        .unwrap()
        .expect("lookup by email");
    assert_eq!(by_email.id, teacher.id);
    assert_eq!(by_email.role, UserRole::Teacher);

    add_user(&storage, "joao", UserRole::Student).await;
    let teachers = storage
        .list_users_with_pagination(UserListQuery {
            page: Some(1),
            size: Some(10),
            role: Some(UserRole::Teacher),
            status: None,
            search: None,
        })
        .await
        .unwrap();
    assert_eq!(teachers.pagination.total, 1);
    assert_eq!(storage.count_users().await.unwrap(), 2);
}

#[tokio::test]
async fn test_transfer_records_enrollment_history() {
    let storage = storage().await;
    let (class_id, _, [ana, _]) = seed_class(&storage).await;
    let other = storage
        .create_class(CreateClassRequest {
            name: "7B".to_string(),
            year: 2025,
            coord_id: None,
        })
        .await
        .unwrap();

    let moved = storage
        .transfer_student(ana, other.id)
        .await
        .unwrap()
        .expect("student exists");
    assert_eq!(moved.class_id, Some(other.id));

    let history = storage.list_enrollments(ana).await.unwrap();
    let classes: Vec<i64> = history.iter().map(|e| e.class_id).collect();
    assert_eq!(classes.len(), 2);
    assert!(classes.contains(&class_id));
    assert!(classes.contains(&other.id));

    assert_eq!(storage.list_class_students(class_id).await.unwrap().len(), 1);
    assert!(storage.transfer_student(9999, other.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleting_class_keeps_students_unassigned() {
    let storage = storage().await;
    let (class_id, _, [ana, _]) = seed_class(&storage).await;

    assert!(storage.delete_class(class_id).await.unwrap());
    let student = storage.get_student_by_id(ana).await.unwrap().unwrap();
    assert_eq!(student.class_id, None);
}

#[tokio::test]
async fn test_grade_upsert_overwrites_existing_row() {
    let storage = storage().await;
    let (class_id, subject_id, [ana, _]) = seed_class(&storage).await;
    let assessment_id = seed_assessment(&storage, class_id, subject_id).await;

    let entry = |score: f64| BulkGradeEntry {
        student_id: ana,
        score: Some(score),
        remarks: None,
    };
    let first = storage.upsert_grade(assessment_id, entry(6.0), 1).await.unwrap();
    let second = storage.upsert_grade(assessment_id, entry(8.5), 1).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.score, Some(8.5));
    assert_eq!(storage.highest_score(assessment_id).await.unwrap(), Some(8.5));
}

#[tokio::test]
async fn test_bulk_grades_roll_back_on_failure() {
    let storage = storage().await;
    let (class_id, subject_id, [ana, bruno]) = seed_class(&storage).await;
    let assessment_id = seed_assessment(&storage, class_id, subject_id).await;
    assert_eq!(storage.highest_score(assessment_id).await.unwrap(), None);

    let entries = vec![
        BulkGradeEntry {
            student_id: ana,
            score: Some(7.0),
            remarks: None,
        },
        // 不存在的学生触发外键错误
        BulkGradeEntry {
            student_id: 9999,
            score: Some(5.0),
            remarks: None,
        },
    ];
    assert!(storage.bulk_upsert_grades(assessment_id, entries, 1).await.is_err());

    let query = GradeListQuery {
        assessment_id: Some(assessment_id),
        ..Default::default()
    };
    let listed = storage.list_grades_with_pagination(query.clone()).await.unwrap();
    assert!(listed.items.is_empty());

    let entries = vec![
        BulkGradeEntry {
            student_id: ana,
            score: Some(7.0),
            remarks: None,
        },
        BulkGradeEntry {
            student_id: bruno,
            score: None,
            remarks: Some("absent on exam day".to_string()),
        },
    ];
    let saved = storage
        .bulk_upsert_grades(assessment_id, entries, 1)
        .await
        .unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(storage.highest_score(assessment_id).await.unwrap(), Some(7.0));
}

#[tokio::test]
async fn test_attendance_upsert_and_tallies() {
    let storage = storage().await;
    let (class_id, subject_id, [ana, bruno]) = seed_class(&storage).await;

    let record = |student_id: i64, day: u32, status: AttendanceStatus| AttendanceUpsert {
        student_id,
        subject_id,
        class_id,
        date: date(day),
        status,
        justification: None,
        recorded_by: 1,
    };

    let first = storage
        .upsert_attendance(record(ana, 3, AttendanceStatus::Absent))
        .await
        .unwrap();
    let again = storage
        .upsert_attendance(record(ana, 3, AttendanceStatus::Present))
        .await
        .unwrap();
    assert_eq!(first.id, again.id);
    assert_eq!(again.status, AttendanceStatus::Present);

    storage
        .record_roll_call(vec![
            record(ana, 4, AttendanceStatus::Absent),
            record(bruno, 4, AttendanceStatus::Present),
        ])
        .await
        .unwrap();

    let tallies = storage
        .attendance_tallies(AttendanceListQuery {
            class_id: Some(class_id),
            ..Default::default()
        })
        .await
        .unwrap();
    let count = |student_id: i64, status: AttendanceStatus| {
        tallies
            .iter()
            .find(|t| t.student_id == student_id && t.status == status)
            .map(|t| t.count)
            .unwrap_or(0)
    };
    assert_eq!(count(ana, AttendanceStatus::Present), 1);
    assert_eq!(count(ana, AttendanceStatus::Absent), 1);
    assert_eq!(count(bruno, AttendanceStatus::Present), 1);

    let ana_records = storage
        .list_student_attendance(ana, Some(date(4)), None)
        .await
        .unwrap();
    assert_eq!(ana_records.len(), 1);
}

#[tokio::test]
async fn test_teacher_allocation_checks() {
    let storage = storage().await;
    let (class_id, subject_id, _) = seed_class(&storage).await;
    let teacher = add_user(&storage, "carla", UserRole::Teacher).await;

    let request = CreateAllocationRequest {
        teacher_id: teacher.id,
        class_id,
        subject_id,
    };
    let allocation = storage.create_allocation(request.clone()).await.unwrap();
    assert!(matches!(
        storage.create_allocation(request).await,
        Err(SchoolSystemError::Conflict(_))
    ));

    assert!(
        storage
            .is_teacher_allocated(teacher.id, class_id, Some(subject_id))
            .await
            .unwrap()
    );
    assert!(
        storage
            .is_teacher_allocated(teacher.id, class_id, None)
            .await
            .unwrap()
    );
    assert!(
        !storage
            .is_teacher_allocated(teacher.id, class_id, Some(subject_id + 1))
            .await
            .unwrap()
    );

    assert!(storage.delete_allocation(allocation.id).await.unwrap());
    assert!(storage.list_teacher_allocations(teacher.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_dashboard_counts() {
    let storage = storage().await;
    seed_class(&storage).await;
    add_user(&storage, "carla", UserRole::Teacher).await;
    add_user(&storage, "admin", UserRole::Admin).await;

    let counts = storage.dashboard_counts().await.unwrap();
    assert_eq!(counts.total_students, 2);
    assert_eq!(counts.total_teachers, 1);
    assert_eq!(counts.total_classes, 1);
    assert_eq!(counts.total_subjects, 1);
}

#[tokio::test]
async fn test_role_links_report_student_record() {
    let storage = storage().await;
    let (_, _, [ana, _]) = seed_class(&storage).await;
    let student = storage.get_student_by_id(ana).await.unwrap().unwrap();

    let links = storage.get_role_links(student.user_id).await.unwrap();
    assert!(links.has_student_record);
    assert_eq!(links.allocation_count, 0);
    assert_eq!(links.coordinated_classes, 0);
    assert!(
        links
            .blocking_link(UserRole::Student, UserRole::Teacher)
            .is_some()
    );
}

#[tokio::test]
async fn test_role_links_report_allocations() {
    let storage = storage().await;
    let (class_id, subject_id, _) = seed_class(&storage).await;
    let teacher = add_user(&storage, "carla", UserRole::Teacher).await;
    assert_eq!(
        storage.get_role_links(teacher.id).await.unwrap(),
        RoleLinks::default()
    );

    storage
        .create_allocation(CreateAllocationRequest {
            teacher_id: teacher.id,
            class_id,
            subject_id,
        })
        .await
        .unwrap();

    let links = storage.get_role_links(teacher.id).await.unwrap();
    assert!(!links.has_student_record);
    assert_eq!(links.allocation_count, 1);
    assert!(links.blocking_link(UserRole::Teacher, UserRole::Coord).is_some());
}

#[tokio::test]
async fn test_role_links_report_coordinated_classes() {
    let storage = storage().await;
    let coord = add_user(&storage, "diana", UserRole::Coord).await;
    for name in ["8A", "8B"] {
        storage
            .create_class(CreateClassRequest {
                name: name.to_string(),
                year: 2025,
                coord_id: Some(coord.id),
            })
            .await
            .unwrap();
    }

    let links = storage.get_role_links(coord.id).await.unwrap();
    assert_eq!(links.coordinated_classes, 2);
    assert_eq!(links.allocation_count, 0);
    assert!(links.blocking_link(UserRole::Coord, UserRole::Admin).is_some());
    assert!(links.blocking_link(UserRole::Coord, UserRole::Coord).is_none());
}

#[tokio::test]
async fn test_system_admin_is_earliest_admin() {
    let storage = storage().await;
    assert_eq!(storage.find_system_admin_id().await.unwrap(), None);

    add_user(&storage, "carla", UserRole::Teacher).await;
    let first = add_user(&storage, "root", UserRole::Admin).await;
    add_user(&storage, "backup", UserRole::Admin).await;

    assert_eq!(storage.find_system_admin_id().await.unwrap(), Some(first.id));
}
