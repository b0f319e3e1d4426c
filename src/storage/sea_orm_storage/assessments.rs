//! 评估存储操作

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::{SeaOrmStorage, db_err, page_params, unique_ids};
use crate::entity::assessments::{ActiveModel, Column, Entity as Assessments, Model};
use crate::entity::prelude::Grades;
use crate::entity::{date_to_string, grades};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    assessments::{
        entities::{Assessment, AssessmentDetail},
        requests::{AssessmentListQuery, CreateAssessmentRequest, UpdateAssessmentRequest},
        responses::AssessmentListResponse,
    },
};

/// 任一 (班级, 学科) 组合
pub(crate) fn allocation_condition<C: ColumnTrait>(
    class_col: C,
    subject_col: C,
    pairs: &[(i64, i64)],
) -> Condition {
    pairs
        .iter()
        .fold(Condition::any(), |cond, (class_id, subject_id)| {
            cond.add(
                Condition::all()
                    .add(class_col.eq(*class_id))
                    .add(subject_col.eq(*subject_id)),
            )
        })
}

impl SeaOrmStorage {
    pub async fn create_assessment_impl(
        &self,
        req: CreateAssessmentRequest,
        created_by: i64,
    ) -> Result<Assessment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            class_id: Set(req.class_id),
            subject_id: Set(req.subject_id),
            name: Set(req.name),
            bimester: Set(req.bimester),
            max_score: Set(req.max_score),
            weight: Set(req.weight),
            date: Set(date_to_string(req.date)),
            created_by: Set(Some(created_by)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("创建评估失败"))?;
        Ok(result.into_assessment())
    }

    pub async fn get_assessment_by_id_impl(
        &self,
        assessment_id: i64,
    ) -> Result<Option<Assessment>> {
        let result = Assessments::find_by_id(assessment_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询评估失败"))?;
        Ok(result.map(|m| m.into_assessment()))
    }

    pub async fn get_assessment_detail_impl(
        &self,
        assessment_id: i64,
    ) -> Result<Option<AssessmentDetail>> {
        let Some(row) = Assessments::find_by_id(assessment_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询评估失败"))?
        else {
            return Ok(None);
        };
        Ok(self.attach_assessment_details(vec![row]).await?.pop())
    }

    /// 每个评估已评分（score 非空）的成绩数
    async fn graded_counts(&self, assessment_ids: Vec<i64>) -> Result<HashMap<i64, i64>> {
        if assessment_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = Grades::find()
            .select_only()
            .column(grades::Column::AssessmentId)
            .column_as(grades::Column::Id.count(), "count")
            .filter(grades::Column::AssessmentId.is_in(assessment_ids))
            .filter(grades::Column::Score.is_not_null())
            .group_by(grades::Column::AssessmentId)
            .into_tuple::<(i64, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("统计评分数量失败"))?;
        Ok(rows.into_iter().collect())
    }

    async fn attach_assessment_details(&self, rows: Vec<Model>) -> Result<Vec<AssessmentDetail>> {
        let counts = self.graded_counts(rows.iter().map(|a| a.id).collect()).await?;
        let class_names = self
            .class_name_map(unique_ids(rows.iter().map(|a| a.class_id)))
            .await?;
        let subject_names = self
            .subject_name_map(unique_ids(rows.iter().map(|a| a.subject_id)))
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| AssessmentDetail {
                class_name: class_names.get(&row.class_id).cloned(),
                subject_name: subject_names.get(&row.subject_id).cloned(),
                graded_count: counts.get(&row.id).copied().unwrap_or(0),
                assessment: row.into_assessment(),
            })
            .collect())
    }

    /// 分页列出评估，日期倒序
    pub async fn list_assessments_with_pagination_impl(
        &self,
        query: AssessmentListQuery,
    ) -> Result<AssessmentListResponse> {
        let (page, size) = page_params(query.page, query.size);

        let mut select = Assessments::find();
        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(subject_id) = query.subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }
        if let Some(bimester) = query.bimester {
            select = select.filter(Column::Bimester.eq(bimester));
        }
        if let Some(class_ids) = query.class_ids {
            select = select.filter(Column::ClassId.is_in(class_ids));
        }
        if let Some(ref pairs) = query.allocations {
            select = select.filter(allocation_condition(
                Column::ClassId,
                Column::SubjectId,
                pairs,
            ));
        }

        let paginator = select
            .order_by_desc(Column::Date)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询评估总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询评估页数失败"))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询评估列表失败"))?;

        Ok(AssessmentListResponse {
            items: self.attach_assessment_details(rows).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_assessment_impl(
        &self,
        assessment_id: i64,
        update: UpdateAssessmentRequest,
    ) -> Result<Option<Assessment>> {
        if self.get_assessment_by_id_impl(assessment_id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(assessment_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(date) = update.date {
            model.date = Set(date_to_string(date));
        }
        if let Some(bimester) = update.bimester {
            model.bimester = Set(bimester);
        }
        if let Some(max_score) = update.max_score {
            model.max_score = Set(max_score);
        }
        if let Some(weight) = update.weight {
            model.weight = Set(weight);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("更新评估失败"))?;
        Ok(Some(updated.into_assessment()))
    }

    /// 删除评估，其成绩随外键级联删除
    pub async fn delete_assessment_impl(&self, assessment_id: i64) -> Result<bool> {
        let result = Assessments::delete_by_id(assessment_id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除评估失败"))?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_allocation_condition_sql() {
        let sql = Assessments::find()
            .filter(allocation_condition(
                Column::ClassId,
                Column::SubjectId,
                &[(1, 2), (3, 4)],
            ))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains(r#""assessments"."class_id" = 1"#));
        assert!(sql.contains(r#""assessments"."subject_id" = 4"#));
        assert!(sql.contains(" OR "));
    }
}
