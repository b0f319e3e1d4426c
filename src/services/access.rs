//! 按角色划定数据范围

use crate::errors::Result;
use crate::models::students::entities::Student;
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

/// 教师任课的 (班级, 学科) 组合
pub(crate) async fn allocation_pairs(storage: &dyn Storage, teacher_id: i64) -> Result<Vec<(i64, i64)>> {
    Ok(storage
        .list_teacher_allocations(teacher_id)
        .await?
        .into_iter()
        .map(|a| (a.class_id, a.subject_id))
        .collect())
}

/// 教师任课的班级（去重）
pub(crate) async fn allocated_class_ids(storage: &dyn Storage, teacher_id: i64) -> Result<Vec<i64>> {
    let mut ids: Vec<i64> = allocation_pairs(storage, teacher_id)
        .await?
        .into_iter()
        .map(|(class_id, _)| class_id)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// 能否维护某班某学科的评估、成绩与考勤
pub(crate) async fn can_teach(
    storage: &dyn Storage,
    user: &User,
    class_id: i64,
    subject_id: i64,
) -> Result<bool> {
    match user.role {
        UserRole::Admin | UserRole::Coord => Ok(true),
        UserRole::Teacher => {
            storage
                .is_teacher_allocated(user.id, class_id, Some(subject_id))
                .await
        }
        UserRole::Student => Ok(false),
    }
}

/// 当前学生用户的档案
pub(crate) async fn student_profile(storage: &dyn Storage, user: &User) -> Result<Option<Student>> {
    if user.role != UserRole::Student {
        return Ok(None);
    }
    storage.get_student_by_user_id(user.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middlewares::ClassAccess;
    use crate::middlewares::require_class_access::resolve_class_access;
    use crate::models::announcements::requests::AnnouncementAudience;
    use crate::models::classes::requests::CreateClassRequest;
    use crate::models::schedules::requests::ScheduleListQuery;
    use crate::models::students::requests::CreateStudentRecord;
    use crate::models::subjects::requests::CreateSubjectRequest;
    use crate::models::teacher_allocations::requests::CreateAllocationRequest;
    use crate::models::users::requests::CreateUserRequest;
    use crate::services::announcements::manage::audience_for;
    use crate::services::reports::report_card::can_view_card;
    use crate::services::schedules::manage::scope_schedule_query;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    /// 两个班级（7A 由 coord_a 协调，7B 由 coord_b 协调），
    /// 教师只在 7A 任教 Math，两个班各一名学生
    struct School {
        storage: SeaOrmStorage,
        class_a: i64,
        class_b: i64,
        math: i64,
        history: i64,
        admin: User,
        coord_a: User,
        coord_b: User,
        teacher: User,
        student_a: User,
        student_b: User,
        card_a: Student,
        card_b: Student,
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
            .unwrap()
    }

    async fn add_class(storage: &SeaOrmStorage, name: &str, coord_id: i64) -> i64 {
        storage
            .create_class(CreateClassRequest {
                name: name.to_string(),
                year: 2025,
                coord_id: Some(coord_id),
            })
            .await
            .unwrap()
            .id
    }

    async fn add_subject(storage: &SeaOrmStorage, name: &str) -> i64 {
        storage
            .create_subject(CreateSubjectRequest {
                name: name.to_string(),
                description: None,
                workload_hours: 80,
            })
            .await
            .unwrap()
            .id
    }

    async fn enroll(storage: &SeaOrmStorage, user: &User, class_id: Option<i64>, number: &str) -> Student {
        storage
            .create_student(CreateStudentRecord {
                user_id: user.id,
                class_id,
                enrollment_number: number.to_string(),
                birth_date: None,
            })
            .await
            .unwrap()
    }

    async fn school() -> School {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let admin = add_user(&storage, "admin", UserRole::Admin).await;
        let coord_a = add_user(&storage, "coord_a", UserRole::Coord).await;
        let coord_b = add_user(&storage, "coord_b", UserRole::Coord).await;
        let teacher = add_user(&storage, "carla", UserRole::Teacher).await;
        let student_a = add_user(&storage, "ana", UserRole::Student).await;
        let student_b = add_user(&storage, "bruno", UserRole::Student).await;

        let class_a = add_class(&storage, "7A", coord_a.id).await;
        let class_b = add_class(&storage, "7B", coord_b.id).await;
        let math = add_subject(&storage, "Math").await;
        let history = add_subject(&storage, "History").await;
        storage
            .create_allocation(CreateAllocationRequest {
                teacher_id: teacher.id,
                class_id: class_a,
                subject_id: math,
            })
            .await
            .unwrap();

        let card_a = enroll(&storage, &student_a, Some(class_a), "2025-001").await;
        let card_b = enroll(&storage, &student_b, Some(class_b), "2025-002").await;

        School {
            storage,
            class_a,
            class_b,
            math,
            history,
            admin,
            coord_a,
            coord_b,
            teacher,
            student_a,
            student_b,
            card_a,
            card_b,
        }
    }

    #[tokio::test]
    async fn test_class_access_by_role() {
        let s = school().await;
        let access = async |user: &User, class_id: i64| {
            resolve_class_access(&s.storage, user, class_id).await.unwrap()
        };

        assert_eq!(access(&s.admin, s.class_b).await, Some(ClassAccess::Admin));
        assert_eq!(access(&s.coord_a, s.class_a).await, Some(ClassAccess::Coordinator));
        // 其他班级的协调员只读
        assert_eq!(access(&s.coord_a, s.class_b).await, Some(ClassAccess::Management));
        assert_eq!(access(&s.coord_b, s.class_a).await, Some(ClassAccess::Management));

        assert_eq!(access(&s.teacher, s.class_a).await, Some(ClassAccess::Teacher));
        assert_eq!(access(&s.teacher, s.class_b).await, None);

        assert_eq!(access(&s.student_a, s.class_a).await, Some(ClassAccess::Student));
        assert_eq!(access(&s.student_a, s.class_b).await, None);
        assert_eq!(access(&s.student_b, s.class_a).await, None);
    }

    #[tokio::test]
    async fn test_can_teach_requires_matching_allocation() {
        let s = school().await;
        let storage = &s.storage;

        assert!(can_teach(storage, &s.teacher, s.class_a, s.math).await.unwrap());
        assert!(!can_teach(storage, &s.teacher, s.class_a, s.history).await.unwrap());
        assert!(!can_teach(storage, &s.teacher, s.class_b, s.math).await.unwrap());

        assert!(can_teach(storage, &s.coord_b, s.class_a, s.history).await.unwrap());
        assert!(can_teach(storage, &s.admin, s.class_b, s.math).await.unwrap());
        assert!(!can_teach(storage, &s.student_a, s.class_a, s.math).await.unwrap());
    }

    #[tokio::test]
    async fn test_report_card_visibility() {
        let s = school().await;
        let storage = &s.storage;

        assert!(can_view_card(storage, &s.student_a, &s.card_a).await.unwrap());
        assert!(!can_view_card(storage, &s.student_a, &s.card_b).await.unwrap());
        assert!(!can_view_card(storage, &s.student_b, &s.card_a).await.unwrap());

        assert!(can_view_card(storage, &s.teacher, &s.card_a).await.unwrap());
        assert!(!can_view_card(storage, &s.teacher, &s.card_b).await.unwrap());
        assert!(can_view_card(storage, &s.coord_a, &s.card_b).await.unwrap());

        // 未分班的学生只有管理层能看
        let mut unassigned = s.card_b.clone();
        unassigned.class_id = None;
        assert!(!can_view_card(storage, &s.teacher, &unassigned).await.unwrap());
        assert!(can_view_card(storage, &s.admin, &unassigned).await.unwrap());
    }

    #[tokio::test]
    async fn test_announcement_audience_by_role() {
        let s = school().await;
        let storage = &s.storage;

        assert_eq!(
            audience_for(storage, &s.coord_b).await.unwrap(),
            AnnouncementAudience::All
        );
        assert_eq!(
            audience_for(storage, &s.teacher).await.unwrap(),
            AnnouncementAudience::GlobalAnd(vec![s.class_a])
        );
        assert_eq!(
            audience_for(storage, &s.student_b).await.unwrap(),
            AnnouncementAudience::GlobalAnd(vec![s.class_b])
        );

        let newcomer = add_user(storage, "davi", UserRole::Teacher).await;
        assert_eq!(
            audience_for(storage, &newcomer).await.unwrap(),
            AnnouncementAudience::GlobalAnd(Vec::new())
        );
    }

    #[tokio::test]
    async fn test_schedule_query_scoped_to_caller() {
        let s = school().await;
        let storage = &s.storage;
        let requested = ScheduleListQuery {
            class_id: Some(s.class_b),
            teacher_id: Some(s.coord_b.id),
            ..Default::default()
        };

        let scoped = scope_schedule_query(storage, &s.teacher, requested.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(scoped.teacher_id, Some(s.teacher.id));

        let scoped = scope_schedule_query(storage, &s.student_a, requested.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(scoped.class_id, Some(s.class_a));

        let scoped = scope_schedule_query(storage, &s.admin, requested.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(scoped.class_id, Some(s.class_b));
        assert_eq!(scoped.teacher_id, Some(s.coord_b.id));

        let unplaced = add_user(storage, "eva", UserRole::Student).await;
        enroll(storage, &unplaced, None, "2025-003").await;
        assert!(
            scope_schedule_query(storage, &unplaced, requested)
                .await
                .unwrap()
                .is_none()
        );
    }
}
