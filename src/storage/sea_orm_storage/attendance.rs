//! 考勤存储操作

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};

use super::assessments::allocation_condition;
use super::{SeaOrmStorage, db_err, page_params, unique_ids};
use crate::entity::attendance::{ActiveModel, Column, Entity as Attendance, Model};
use crate::entity::date_to_string;
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    attendance::{
        entities::{AttendanceDetail, AttendanceRecord, AttendanceStatus, AttendanceTally},
        requests::{AttendanceListQuery, AttendanceUpsert},
        responses::AttendanceListResponse,
    },
};

/// 按 (学生, 学科, 日期) 写入考勤，已存在则覆盖
async fn write_attendance<C: ConnectionTrait>(conn: &C, record: AttendanceUpsert) -> Result<Model> {
    let now = chrono::Utc::now().timestamp();
    let date = date_to_string(record.date);

    let existing = Attendance::find()
        .filter(Column::StudentId.eq(record.student_id))
        .filter(Column::SubjectId.eq(record.subject_id))
        .filter(Column::Date.eq(date.as_str()))
        .one(conn)
        .await
        .map_err(db_err("查询考勤失败"))?;

    match existing {
        Some(row) => {
            let mut model: ActiveModel = row.into();
            model.class_id = Set(record.class_id);
            model.status = Set(record.status.to_string());
            model.justification = Set(record.justification);
            model.recorded_by = Set(Some(record.recorded_by));
            model.updated_at = Set(now);
            model.update(conn).await.map_err(db_err("更新考勤失败"))
        }
        None => ActiveModel {
            student_id: Set(record.student_id),
            subject_id: Set(record.subject_id),
            class_id: Set(record.class_id),
            date: Set(date),
            status: Set(record.status.to_string()),
            justification: Set(record.justification),
            recorded_by: Set(Some(record.recorded_by)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(db_err("记录考勤失败")),
    }
}

impl SeaOrmStorage {
    pub async fn upsert_attendance_impl(&self, record: AttendanceUpsert) -> Result<AttendanceRecord> {
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;
        let model = write_attendance(&txn, record).await?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(model.into_record())
    }

    /// 点名：整批在同一事务内写入
    pub async fn record_roll_call_impl(
        &self,
        records: Vec<AttendanceUpsert>,
    ) -> Result<Vec<AttendanceRecord>> {
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let mut saved = Vec::with_capacity(records.len());
        for record in records {
            saved.push(write_attendance(&txn, record).await?.into_record());
        }

        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(saved)
    }

    pub async fn get_attendance_by_id_impl(
        &self,
        attendance_id: i64,
    ) -> Result<Option<AttendanceRecord>> {
        let result = Attendance::find_by_id(attendance_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询考勤失败"))?;
        Ok(result.map(|m| m.into_record()))
    }

    fn filtered_attendance(query: &AttendanceListQuery) -> Select<Attendance> {
        let mut select = Attendance::find();
        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(subject_id) = query.subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }
        // ISO 日期字符串可直接比较
        if let Some(start) = query.start_date {
            select = select.filter(Column::Date.gte(date_to_string(start)));
        }
        if let Some(end) = query.end_date {
            select = select.filter(Column::Date.lte(date_to_string(end)));
        }
        if let Some(ref pairs) = query.allocations {
            select = select.filter(allocation_condition(
                Column::ClassId,
                Column::SubjectId,
                pairs,
            ));
        }
        select
    }

    async fn attach_attendance_details(&self, rows: Vec<Model>) -> Result<Vec<AttendanceDetail>> {
        let student_names = self
            .student_name_map(unique_ids(rows.iter().map(|a| a.student_id)))
            .await?;
        let subject_names = self
            .subject_name_map(unique_ids(rows.iter().map(|a| a.subject_id)))
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| AttendanceDetail {
                student_name: student_names.get(&row.student_id).cloned(),
                subject_name: subject_names.get(&row.subject_id).cloned(),
                record: row.into_record(),
            })
            .collect())
    }

    pub async fn list_attendance_with_pagination_impl(
        &self,
        query: AttendanceListQuery,
    ) -> Result<AttendanceListResponse> {
        let (page, size) = page_params(query.page, query.size);

        let paginator = Self::filtered_attendance(&query)
            .order_by_desc(Column::Date)
            .order_by_asc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询考勤总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询考勤页数失败"))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询考勤列表失败"))?;

        Ok(AttendanceListResponse {
            items: self.attach_attendance_details(rows).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_student_attendance_impl(
        &self,
        student_id: i64,
        start_date: Option<chrono::NaiveDate>,
        end_date: Option<chrono::NaiveDate>,
    ) -> Result<Vec<AttendanceDetail>> {
        let query = AttendanceListQuery {
            student_id: Some(student_id),
            start_date,
            end_date,
            ..Default::default()
        };
        let rows = Self::filtered_attendance(&query)
            .order_by_desc(Column::Date)
            .order_by_asc(Column::SubjectId)
            .all(&self.db)
            .await
            .map_err(db_err("查询学生考勤失败"))?;
        self.attach_attendance_details(rows).await
    }

    pub async fn update_attendance_impl(
        &self,
        attendance_id: i64,
        status: AttendanceStatus,
        justification: Option<String>,
        recorded_by: i64,
    ) -> Result<Option<AttendanceRecord>> {
        if self.get_attendance_by_id_impl(attendance_id).await?.is_none() {
            return Ok(None);
        }

        let updated = ActiveModel {
            id: Set(attendance_id),
            status: Set(status.to_string()),
            justification: Set(justification),
            recorded_by: Set(Some(recorded_by)),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err("更新考勤失败"))?;
        Ok(Some(updated.into_record()))
    }

    pub async fn delete_attendance_impl(&self, attendance_id: i64) -> Result<bool> {
        let result = Attendance::delete_by_id(attendance_id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除考勤失败"))?;
        Ok(result.rows_affected > 0)
    }

    pub async fn attendance_tallies_impl(
        &self,
        query: AttendanceListQuery,
    ) -> Result<Vec<AttendanceTally>> {
        let rows = Self::filtered_attendance(&query)
            .select_only()
            .column(Column::StudentId)
            .column(Column::Status)
            .column_as(Column::Id.count(), "count")
            .group_by(Column::StudentId)
            .group_by(Column::Status)
            .into_tuple::<(i64, String, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("统计考勤失败"))?;

        Ok(rows
            .into_iter()
            .filter_map(|(student_id, status, count)| {
                let status = status.parse::<AttendanceStatus>().ok()?;
                Some(AttendanceTally {
                    student_id,
                    status,
                    count,
                })
            })
            .collect())
    }
}
