//! 任课分配（教师 - 班级 - 学科）

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::{SeaOrmStorage, db_err, page_params, unique_ids};
use crate::entity::teacher_allocations::{ActiveModel, Column, Entity as TeacherAllocations};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    teacher_allocations::{
        entities::{TeacherAllocation, TeacherAllocationDetail},
        requests::{AllocationListQuery, CreateAllocationRequest},
        responses::AllocationListResponse,
    },
};

impl SeaOrmStorage {
    pub async fn create_allocation_impl(
        &self,
        req: CreateAllocationRequest,
    ) -> Result<TeacherAllocation> {
        let model = ActiveModel {
            teacher_id: Set(req.teacher_id),
            class_id: Set(req.class_id),
            subject_id: Set(req.subject_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("创建任课分配失败"))?;
        Ok(result.into_allocation())
    }

    pub async fn get_allocation_by_id_impl(
        &self,
        allocation_id: i64,
    ) -> Result<Option<TeacherAllocation>> {
        let result = TeacherAllocations::find_by_id(allocation_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询任课分配失败"))?;
        Ok(result.map(|m| m.into_allocation()))
    }

    pub async fn list_allocations_with_pagination_impl(
        &self,
        query: AllocationListQuery,
    ) -> Result<AllocationListResponse> {
        let (page, size) = page_params(query.page, query.size);

        let mut select = TeacherAllocations::find();
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }
        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(subject_id) = query.subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询任课分配总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询任课分配页数失败"))?;
        let rows: Vec<TeacherAllocation> = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询任课分配列表失败"))?
            .into_iter()
            .map(|m| m.into_allocation())
            .collect();

        let teacher_names = self
            .user_name_map(unique_ids(rows.iter().map(|a| a.teacher_id)))
            .await?;
        let class_names = self
            .class_name_map(unique_ids(rows.iter().map(|a| a.class_id)))
            .await?;
        let subject_names = self
            .subject_name_map(unique_ids(rows.iter().map(|a| a.subject_id)))
            .await?;

        let items = rows
            .into_iter()
            .map(|allocation| TeacherAllocationDetail {
                teacher_name: teacher_names.get(&allocation.teacher_id).cloned(),
                class_name: class_names.get(&allocation.class_id).cloned(),
                subject_name: subject_names.get(&allocation.subject_id).cloned(),
                allocation,
            })
            .collect();

        Ok(AllocationListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_teacher_allocations_impl(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<TeacherAllocation>> {
        let rows = TeacherAllocations::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_asc(Column::ClassId)
            .order_by_asc(Column::SubjectId)
            .all(&self.db)
            .await
            .map_err(db_err("查询教师任课失败"))?;
        Ok(rows.into_iter().map(|m| m.into_allocation()).collect())
    }

    pub async fn is_teacher_allocated_impl(
        &self,
        teacher_id: i64,
        class_id: i64,
        subject_id: Option<i64>,
    ) -> Result<bool> {
        let mut select = TeacherAllocations::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .filter(Column::ClassId.eq(class_id));
        if let Some(subject_id) = subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }
        let count = select
            .count(&self.db)
            .await
            .map_err(db_err("检查任课关系失败"))?;
        Ok(count > 0)
    }

    pub async fn delete_allocation_impl(&self, allocation_id: i64) -> Result<bool> {
        let result = TeacherAllocations::delete_by_id(allocation_id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除任课分配失败"))?;
        Ok(result.rows_affected > 0)
    }
}
