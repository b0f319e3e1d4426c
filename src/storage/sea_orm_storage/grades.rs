//! 成绩存储操作

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use super::assessments::allocation_condition;
use super::{SeaOrmStorage, db_err, page_params, unique_ids};
use crate::entity::grades::{ActiveModel, Column, Entity as Grades, Model, Relation};
use crate::entity::prelude::Assessments;
use crate::entity::{assessments, to_date};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    grades::{
        entities::{Grade, GradeDetail, ScoredAssessment},
        requests::{BulkGradeEntry, GradeListQuery, UpdateGradeRequest},
        responses::GradeListResponse,
    },
};

/// 按 (评估, 学生) 写入成绩，已存在则覆盖
async fn write_grade<C: ConnectionTrait>(
    conn: &C,
    assessment_id: i64,
    entry: BulkGradeEntry,
    graded_by: i64,
) -> Result<Model> {
    let now = chrono::Utc::now().timestamp();

    let existing = Grades::find()
        .filter(Column::AssessmentId.eq(assessment_id))
        .filter(Column::StudentId.eq(entry.student_id))
        .one(conn)
        .await
        .map_err(db_err("查询成绩失败"))?;

    match existing {
        Some(row) => {
            let mut model: ActiveModel = row.into();
            model.score = Set(entry.score);
            model.remarks = Set(entry.remarks);
            model.graded_by = Set(Some(graded_by));
            model.updated_at = Set(now);
            model.update(conn).await.map_err(db_err("更新成绩失败"))
        }
        None => ActiveModel {
            assessment_id: Set(assessment_id),
            student_id: Set(entry.student_id),
            score: Set(entry.score),
            remarks: Set(entry.remarks),
            graded_by: Set(Some(graded_by)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(db_err("录入成绩失败")),
    }
}

impl SeaOrmStorage {
    pub async fn upsert_grade_impl(
        &self,
        assessment_id: i64,
        entry: BulkGradeEntry,
        graded_by: i64,
    ) -> Result<Grade> {
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;
        let model = write_grade(&txn, assessment_id, entry, graded_by).await?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(model.into_grade())
    }

    pub async fn bulk_upsert_grades_impl(
        &self,
        assessment_id: i64,
        entries: Vec<BulkGradeEntry>,
        graded_by: i64,
    ) -> Result<Vec<Grade>> {
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let mut saved = Vec::with_capacity(entries.len());
        for entry in entries {
            // 出错时 txn 被丢弃，整批回滚
            let model = write_grade(&txn, assessment_id, entry, graded_by).await?;
            saved.push(model.into_grade());
        }

        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(saved)
    }

    pub async fn get_grade_by_id_impl(&self, grade_id: i64) -> Result<Option<Grade>> {
        let result = Grades::find_by_id(grade_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询成绩失败"))?;
        Ok(result.map(|m| m.into_grade()))
    }

    /// 补全评估参数与名称
    async fn attach_grade_details(&self, rows: Vec<Model>) -> Result<Vec<GradeDetail>> {
        let assessment_ids = unique_ids(rows.iter().map(|g| g.assessment_id));
        let assessments: HashMap<i64, assessments::Model> = if assessment_ids.is_empty() {
            HashMap::new()
        } else {
            Assessments::find()
                .filter(assessments::Column::Id.is_in(assessment_ids))
                .all(&self.db)
                .await
                .map_err(db_err("查询评估失败"))?
                .into_iter()
                .map(|a| (a.id, a))
                .collect()
        };

        let student_names = self
            .student_name_map(unique_ids(rows.iter().map(|g| g.student_id)))
            .await?;
        let class_names = self
            .class_name_map(unique_ids(assessments.values().map(|a| a.class_id)))
            .await?;
        let subject_names = self
            .subject_name_map(unique_ids(assessments.values().map(|a| a.subject_id)))
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let assessment = assessments.get(&row.assessment_id)?;
                Some(GradeDetail {
                    student_name: student_names.get(&row.student_id).cloned(),
                    assessment_name: assessment.name.clone(),
                    assessment_date: to_date(&assessment.date),
                    bimester: assessment.bimester,
                    max_score: assessment.max_score,
                    weight: assessment.weight,
                    class_id: assessment.class_id,
                    subject_id: assessment.subject_id,
                    subject_name: subject_names.get(&assessment.subject_id).cloned(),
                    class_name: class_names.get(&assessment.class_id).cloned(),
                    grade: row.into_grade(),
                })
            })
            .collect())
    }

    pub async fn list_grades_with_pagination_impl(
        &self,
        query: GradeListQuery,
    ) -> Result<GradeListResponse> {
        let (page, size) = page_params(query.page, query.size);

        let mut select = Grades::find().join(JoinType::InnerJoin, Relation::Assessment.def());
        if let Some(assessment_id) = query.assessment_id {
            select = select.filter(Column::AssessmentId.eq(assessment_id));
        }
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(class_id) = query.class_id {
            select = select.filter(assessments::Column::ClassId.eq(class_id));
        }
        if let Some(subject_id) = query.subject_id {
            select = select.filter(assessments::Column::SubjectId.eq(subject_id));
        }
        if let Some(ref pairs) = query.allocations {
            select = select.filter(allocation_condition(
                assessments::Column::ClassId,
                assessments::Column::SubjectId,
                pairs,
            ));
        }

        let paginator = select
            .order_by_desc(assessments::Column::Date)
            .order_by_asc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询成绩总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询成绩页数失败"))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询成绩列表失败"))?;

        Ok(GradeListResponse {
            items: self.attach_grade_details(rows).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_student_grades_impl(&self, student_id: i64) -> Result<Vec<GradeDetail>> {
        let rows = Grades::find()
            .join(JoinType::InnerJoin, Relation::Assessment.def())
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(assessments::Column::Bimester)
            .order_by_asc(assessments::Column::Date)
            .all(&self.db)
            .await
            .map_err(db_err("查询学生成绩失败"))?;
        self.attach_grade_details(rows).await
    }

    pub async fn update_grade_impl(
        &self,
        grade_id: i64,
        update: UpdateGradeRequest,
        graded_by: i64,
    ) -> Result<Option<Grade>> {
        if self.get_grade_by_id_impl(grade_id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(grade_id),
            graded_by: Set(Some(graded_by)),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(score) = update.score {
            model.score = Set(score);
        }
        if let Some(remarks) = update.remarks {
            model.remarks = Set(remarks);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("更新成绩失败"))?;
        Ok(Some(updated.into_grade()))
    }

    pub async fn delete_grade_impl(&self, grade_id: i64) -> Result<bool> {
        let result = Grades::delete_by_id(grade_id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除成绩失败"))?;
        Ok(result.rows_affected > 0)
    }

    /// 该评估已录入的最高分，用于下调满分前的检查
    pub async fn highest_score_impl(&self, assessment_id: i64) -> Result<Option<f64>> {
        let max = Grades::find()
            .select_only()
            .column_as(Column::Score.max(), "max_score")
            .filter(Column::AssessmentId.eq(assessment_id))
            .into_tuple::<Option<f64>>()
            .one(&self.db)
            .await
            .map_err(db_err("查询最高分失败"))?;
        Ok(max.flatten())
    }

    pub async fn list_scored_assessments_impl(
        &self,
        class_id: Option<i64>,
        student_id: Option<i64>,
    ) -> Result<Vec<ScoredAssessment>> {
        let mut select = Grades::find()
            .select_only()
            .column(Column::StudentId)
            .column(assessments::Column::SubjectId)
            .column(assessments::Column::Bimester)
            .column(Column::Score)
            .column(assessments::Column::MaxScore)
            .column(assessments::Column::Weight)
            .join(JoinType::InnerJoin, Relation::Assessment.def());

        if let Some(class_id) = class_id {
            select = select.filter(assessments::Column::ClassId.eq(class_id));
        }
        if let Some(student_id) = student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        let rows = select
            .order_by_asc(Column::StudentId)
            .order_by_asc(assessments::Column::SubjectId)
            .into_tuple::<(i64, i64, i32, Option<f64>, f64, f64)>()
            .all(&self.db)
            .await
            .map_err(db_err("查询成绩明细失败"))?;

        Ok(rows
            .into_iter()
            .map(
                |(student_id, subject_id, bimester, score, max_score, weight)| ScoredAssessment {
                    student_id,
                    subject_id,
                    bimester,
                    score,
                    max_score,
                    weight,
                },
            )
            .collect())
    }
}
