//! 班级存储操作

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::{SeaOrmStorage, db_err, like_any, page_params, unique_ids};
use crate::entity::classes::{ActiveModel, Column, Entity as Classes};
use crate::entity::prelude::{Students, TeacherAllocations};
use crate::entity::{students, teacher_allocations};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    classes::{
        entities::{Class, ClassDetail},
        requests::{ClassListQuery, ClassScope, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
};

impl SeaOrmStorage {
    pub async fn create_class_impl(&self, req: CreateClassRequest) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            year: Set(req.year),
            coord_id: Set(req.coord_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("创建班级失败"))?;

        Ok(result.into_class())
    }

    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询班级失败"))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 班级详情：附带协调员姓名与学生人数
    pub async fn get_class_detail_impl(&self, class_id: i64) -> Result<Option<ClassDetail>> {
        let Some(class) = self.get_class_by_id_impl(class_id).await? else {
            return Ok(None);
        };
        Ok(self.attach_class_details(vec![class]).await?.pop())
    }

    /// 按班级统计学生人数
    async fn student_counts(&self, class_ids: Vec<i64>) -> Result<HashMap<i64, i64>> {
        if class_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = Students::find()
            .select_only()
            .column(students::Column::ClassId)
            .column_as(students::Column::Id.count(), "count")
            .filter(students::Column::ClassId.is_in(class_ids))
            .group_by(students::Column::ClassId)
            .into_tuple::<(Option<i64>, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("统计班级人数失败"))?;

        Ok(rows
            .into_iter()
            .filter_map(|(class_id, count)| class_id.map(|id| (id, count)))
            .collect())
    }

    async fn attach_class_details(&self, classes: Vec<Class>) -> Result<Vec<ClassDetail>> {
        let counts = self
            .student_counts(classes.iter().map(|c| c.id).collect())
            .await?;
        let coord_names = self
            .user_name_map(unique_ids(classes.iter().filter_map(|c| c.coord_id)))
            .await?;

        Ok(classes
            .into_iter()
            .map(|class| ClassDetail {
                coord_name: class.coord_id.and_then(|id| coord_names.get(&id).cloned()),
                student_count: counts.get(&class.id).copied().unwrap_or(0),
                class,
            })
            .collect())
    }

    /// 把可见范围解析为班级 ID 集合；None 表示不限制
    async fn resolve_class_scope(&self, scope: &ClassScope) -> Result<Option<Vec<i64>>> {
        match scope {
            ClassScope::All => Ok(None),
            ClassScope::AllocatedTo(teacher_id) => {
                let ids = TeacherAllocations::find()
                    .select_only()
                    .column(teacher_allocations::Column::ClassId)
                    .filter(teacher_allocations::Column::TeacherId.eq(*teacher_id))
                    .into_tuple::<i64>()
                    .all(&self.db)
                    .await
                    .map_err(db_err("查询任课班级失败"))?;
                Ok(Some(unique_ids(ids)))
            }
            ClassScope::StudentOf(user_id) => {
                let class_id = Students::find()
                    .filter(students::Column::UserId.eq(*user_id))
                    .one(&self.db)
                    .await
                    .map_err(db_err("查询学生班级失败"))?
                    .and_then(|s| s.class_id);
                Ok(Some(class_id.into_iter().collect()))
            }
        }
    }

    /// 分页列出班级，按学年倒序、名称正序
    pub async fn list_classes_with_pagination_impl(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        let (page, size) = page_params(query.page, query.size);

        let mut select = Classes::find();

        if let Some(class_ids) = self.resolve_class_scope(&query.scope).await? {
            select = select.filter(Column::Id.is_in(class_ids));
        }

        if let Some(year) = query.year {
            select = select.filter(Column::Year.eq(year));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(like_any(&[Column::Name], search));
        }

        select = select.order_by_desc(Column::Year).order_by_asc(Column::Name);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询班级总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询班级页数失败"))?;
        let classes = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询班级列表失败"))?;

        let items = self
            .attach_class_details(classes.into_iter().map(|m| m.into_class()).collect())
            .await?;

        Ok(ClassListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_class_impl(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        if self.get_class_by_id_impl(class_id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(class_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(year) = update.year {
            model.year = Set(year);
        }
        if let Some(coord_id) = update.coord_id {
            model.coord_id = Set(coord_id);
        }

        model
            .update(&self.db)
            .await
            .map_err(db_err("更新班级失败"))?;

        self.get_class_by_id_impl(class_id).await
    }

    /// 删除班级；学生保留档案，班级置空
    pub async fn delete_class_impl(&self, class_id: i64) -> Result<bool> {
        let result = Classes::delete_by_id(class_id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除班级失败"))?;

        Ok(result.rows_affected > 0)
    }
}
