use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};

use super::{SeaOrmStorage, db_err, like_any, page_params};
use crate::entity::prelude::{Classes, Students, TeacherAllocations};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::entity::{classes, students, teacher_allocations};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    users::{
        entities::{RoleLinks, User, UserRole, UserStatus},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

impl SeaOrmStorage {
    /// 创建用户（password 字段为哈希值）
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(req.password),
            full_name: Set(req.full_name),
            role: Set(req.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("创建用户失败"))?;

        Ok(result.into_user())
    }

    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier)),
            )
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 列表筛选条件（分页与导出共用）
    fn filtered_users(query: &UserListQuery) -> Select<Users> {
        let mut select = Users::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(like_any(
                &[Column::Username, Column::Email, Column::FullName],
                search,
            ));
        }

        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
    }

    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let (page, size) = page_params(query.page, query.size);

        let paginator = Self::filtered_users(&query).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询用户总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询用户页数失败"))?;
        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询用户列表失败"))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_users_impl(&self, query: UserListQuery) -> Result<Vec<User>> {
        let users = Self::filtered_users(&query)
            .all(&self.db)
            .await
            .map_err(db_err("查询用户列表失败"))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err("更新最后登录时间失败"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(password) = update.password {
            model.password_hash = Set(password);
        }
        if let Some(full_name) = update.full_name {
            model.full_name = Set(full_name);
        }
        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        model
            .update(&self.db)
            .await
            .map_err(db_err("更新用户失败"))?;

        self.get_user_by_id_impl(id).await
    }

    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除用户失败"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn find_existing_usernames_impl(&self, usernames: &[String]) -> Result<Vec<String>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        Users::find()
            .select_only()
            .column(Column::Username)
            .filter(Column::Username.is_in(usernames.to_vec()))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(db_err("检查用户名失败"))
    }

    pub async fn find_existing_emails_impl(&self, emails: &[String]) -> Result<Vec<String>> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }
        Users::find()
            .select_only()
            .column(Column::Email)
            .filter(Column::Email.is_in(emails.to_vec()))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(db_err("检查邮箱失败"))
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计用户数量失败"))
    }

    pub async fn get_role_links_impl(&self, user_id: i64) -> Result<RoleLinks> {
        let student_records = Students::find()
            .filter(students::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err("查询学生档案失败"))?;
        let allocation_count = TeacherAllocations::find()
            .filter(teacher_allocations::Column::TeacherId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err("查询任课分配失败"))?;
        let coordinated_classes = Classes::find()
            .filter(classes::Column::CoordId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err("查询协调班级失败"))?;

        Ok(RoleLinks {
            has_student_record: student_records > 0,
            allocation_count: allocation_count as i64,
            coordinated_classes: coordinated_classes as i64,
        })
    }

    pub async fn find_system_admin_id_impl(&self) -> Result<Option<i64>> {
        Users::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::Role.eq(UserRole::Admin.as_str()))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .into_tuple::<i64>()
            .one(&self.db)
            .await
            .map_err(db_err("查询系统管理员失败"))
    }
}
