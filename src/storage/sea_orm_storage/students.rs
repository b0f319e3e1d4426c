//! 学生档案与入班记录

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use super::{SeaOrmStorage, db_err, like_any, page_params, unique_ids};
use crate::entity::prelude::{Enrollments, Students, Users};
use crate::entity::{date_to_string, enrollments, students, users};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    students::{
        entities::{Enrollment, Student, StudentDetail},
        requests::{CreateStudentRecord, StudentListQuery, UpdateStudentRequest},
        responses::StudentListResponse,
    },
    users::{entities::UserStatus, requests::CreateUserRequest},
};

/// 记录一次入班；同一班级重复入班时刷新时间
async fn record_enrollment<C: ConnectionTrait>(
    conn: &C,
    student_id: i64,
    class_id: i64,
    now: i64,
) -> Result<()> {
    let existing = Enrollments::find()
        .filter(enrollments::Column::StudentId.eq(student_id))
        .filter(enrollments::Column::ClassId.eq(class_id))
        .one(conn)
        .await
        .map_err(db_err("查询入班记录失败"))?;

    match existing {
        Some(row) => {
            let mut model: enrollments::ActiveModel = row.into();
            model.enrolled_at = Set(now);
            model.update(conn).await.map_err(db_err("更新入班记录失败"))?;
        }
        None => {
            enrollments::ActiveModel {
                student_id: Set(student_id),
                class_id: Set(class_id),
                enrolled_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await
            .map_err(db_err("写入入班记录失败"))?;
        }
    }
    Ok(())
}

async fn insert_student<C: ConnectionTrait>(
    conn: &C,
    record: CreateStudentRecord,
    now: i64,
) -> Result<Student> {
    let model = students::ActiveModel {
        user_id: Set(record.user_id),
        class_id: Set(record.class_id),
        enrollment_number: Set(record.enrollment_number),
        birth_date: Set(record.birth_date.map(date_to_string)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(db_err("创建学生档案失败"))?;

    if let Some(class_id) = model.class_id {
        record_enrollment(conn, model.id, class_id, now).await?;
    }
    Ok(model.into_student())
}

impl SeaOrmStorage {
    pub async fn create_student_impl(&self, record: CreateStudentRecord) -> Result<Student> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;
        let student = insert_student(&txn, record, now).await?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(student)
    }

    pub async fn create_student_with_account_impl(
        &self,
        account: CreateUserRequest,
        mut record: CreateStudentRecord,
    ) -> Result<Student> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let user = users::ActiveModel {
            username: Set(account.username),
            email: Set(account.email),
            password_hash: Set(account.password),
            full_name: Set(account.full_name),
            role: Set(account.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("创建学生账号失败"))?;

        record.user_id = user.id;
        let student = insert_student(&txn, record, now).await?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(student)
    }

    pub async fn get_student_by_id_impl(&self, student_id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(student_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询学生失败"))?;
        Ok(result.map(|m| m.into_student()))
    }

    pub async fn get_student_by_user_id_impl(&self, user_id: i64) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(students::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询学生失败"))?;
        Ok(result.map(|m| m.into_student()))
    }

    pub async fn get_student_detail_impl(&self, student_id: i64) -> Result<Option<StudentDetail>> {
        let Some(student) = Students::find_by_id(student_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询学生失败"))?
        else {
            return Ok(None);
        };
        Ok(self.attach_student_details(vec![student]).await?.pop())
    }

    /// 补全姓名、邮箱与班级名称
    async fn attach_student_details(
        &self,
        rows: Vec<students::Model>,
    ) -> Result<Vec<StudentDetail>> {
        let user_ids: Vec<i64> = rows.iter().map(|s| s.user_id).collect();
        let profiles: std::collections::HashMap<i64, users::Model> = if user_ids.is_empty() {
            Default::default()
        } else {
            Users::find()
                .filter(users::Column::Id.is_in(user_ids))
                .all(&self.db)
                .await
                .map_err(db_err("查询学生账号失败"))?
                .into_iter()
                .map(|u| (u.id, u))
                .collect()
        };
        let class_names = self
            .class_name_map(unique_ids(rows.iter().filter_map(|s| s.class_id)))
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let profile = profiles.get(&row.user_id);
                let class_name = row.class_id.and_then(|id| class_names.get(&id).cloned());
                StudentDetail {
                    full_name: profile.map(|p| p.full_name.clone()).unwrap_or_default(),
                    email: profile.map(|p| p.email.clone()).unwrap_or_default(),
                    class_name,
                    student: row.into_student(),
                }
            })
            .collect())
    }

    /// 分页列出学生，按姓名排序
    pub async fn list_students_with_pagination_impl(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        let (page, size) = page_params(query.page, query.size);

        let mut select =
            Students::find().join(JoinType::InnerJoin, students::Relation::User.def());

        if let Some(class_id) = query.class_id {
            select = select.filter(students::Column::ClassId.eq(class_id));
        }

        if let Some(class_ids) = query.class_ids {
            select = select.filter(students::Column::ClassId.is_in(class_ids));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(
                Condition::any()
                    .add(like_any(
                        &[users::Column::FullName, users::Column::Email],
                        search,
                    ))
                    .add(like_any(&[students::Column::EnrollmentNumber], search)),
            );
        }

        select = select
            .order_by_asc(users::Column::FullName)
            .order_by_asc(students::Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询学生总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询学生页数失败"))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询学生列表失败"))?;

        Ok(StudentListResponse {
            items: self.attach_student_details(rows).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_class_students_impl(&self, class_id: i64) -> Result<Vec<StudentDetail>> {
        let rows = Students::find()
            .join(JoinType::InnerJoin, students::Relation::User.def())
            .filter(students::Column::ClassId.eq(class_id))
            .order_by_asc(users::Column::FullName)
            .all(&self.db)
            .await
            .map_err(db_err("查询班级学生失败"))?;
        self.attach_student_details(rows).await
    }

    pub async fn update_student_impl(
        &self,
        student_id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        let Some(existing) = Students::find_by_id(student_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询学生失败"))?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        if let Some(full_name) = update.full_name {
            users::ActiveModel {
                id: Set(existing.user_id),
                full_name: Set(full_name),
                updated_at: Set(now),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(db_err("更新学生姓名失败"))?;
        }

        let mut model = students::ActiveModel {
            id: Set(student_id),
            updated_at: Set(now),
            ..Default::default()
        };
        if let Some(number) = update.enrollment_number {
            model.enrollment_number = Set(number);
        }
        if let Some(birth_date) = update.birth_date {
            model.birth_date = Set(birth_date.map(date_to_string));
        }
        let updated = model
            .update(&txn)
            .await
            .map_err(db_err("更新学生档案失败"))?;

        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(Some(updated.into_student()))
    }

    pub async fn transfer_student_impl(
        &self,
        student_id: i64,
        class_id: i64,
    ) -> Result<Option<Student>> {
        if self.get_student_by_id_impl(student_id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let updated = students::ActiveModel {
            id: Set(student_id),
            class_id: Set(Some(class_id)),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err("转班失败"))?;
        record_enrollment(&txn, student_id, class_id, now).await?;

        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(Some(updated.into_student()))
    }

    /// 删除学生档案；delete_profile 时连同账号删除
    pub async fn delete_student_impl(&self, student_id: i64, delete_profile: bool) -> Result<bool> {
        let Some(student) = self.get_student_by_id_impl(student_id).await? else {
            return Ok(false);
        };

        let result = if delete_profile {
            // 账号删除后学生档案随外键级联删除
            Users::delete_by_id(student.user_id)
                .exec(&self.db)
                .await
                .map_err(db_err("删除学生账号失败"))?
        } else {
            Students::delete_by_id(student_id)
                .exec(&self.db)
                .await
                .map_err(db_err("删除学生失败"))?
        };

        Ok(result.rows_affected > 0)
    }

    pub async fn list_enrollments_impl(&self, student_id: i64) -> Result<Vec<Enrollment>> {
        let rows = Enrollments::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .order_by_desc(enrollments::Column::EnrolledAt)
            .order_by_desc(enrollments::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("查询入班记录失败"))?;

        let class_names = self
            .class_name_map(unique_ids(rows.iter().map(|e| e.class_id)))
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let name = class_names.get(&row.class_id).cloned();
                row.into_enrollment(name)
            })
            .collect())
    }

    pub async fn find_existing_enrollment_numbers_impl(
        &self,
        numbers: &[String],
    ) -> Result<Vec<String>> {
        if numbers.is_empty() {
            return Ok(Vec::new());
        }
        Students::find()
            .select_only()
            .column(students::Column::EnrollmentNumber)
            .filter(students::Column::EnrollmentNumber.is_in(numbers.to_vec()))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(db_err("检查学号失败"))
    }
}

