//! 课表存储操作

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Set,
};

use super::{SeaOrmStorage, db_err, page_params, unique_ids};
use crate::entity::schedules::{ActiveModel, Column, Entity as Schedules, Model};
use crate::entity::time_to_string;
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    schedules::{
        entities::{Schedule, ScheduleDetail},
        requests::{CreateScheduleRequest, ScheduleListQuery, UpdateScheduleRequest},
        responses::ScheduleListResponse,
    },
};

impl SeaOrmStorage {
    pub async fn create_schedule_impl(&self, req: CreateScheduleRequest) -> Result<Schedule> {
        let model = ActiveModel {
            class_id: Set(req.class_id),
            subject_id: Set(req.subject_id),
            teacher_id: Set(req.teacher_id),
            day_of_week: Set(req.day_of_week),
            start_time: Set(time_to_string(req.start_time)),
            end_time: Set(time_to_string(req.end_time)),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("创建课时失败"))?;
        Ok(result.into_schedule())
    }

    pub async fn get_schedule_by_id_impl(&self, schedule_id: i64) -> Result<Option<Schedule>> {
        let result = Schedules::find_by_id(schedule_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询课时失败"))?;
        Ok(result.map(|m| m.into_schedule()))
    }

    /// 星期、开始时间排序；HH:MM 定长，字符串序即时间序
    fn filtered_schedules(query: &ScheduleListQuery) -> Select<Schedules> {
        let mut select = Schedules::find();
        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }
        if let Some(day) = query.day_of_week {
            select = select.filter(Column::DayOfWeek.eq(day));
        }
        select
            .order_by_asc(Column::DayOfWeek)
            .order_by_asc(Column::StartTime)
            .order_by_asc(Column::Id)
    }

    async fn attach_schedule_details(&self, rows: Vec<Model>) -> Result<Vec<ScheduleDetail>> {
        let class_names = self
            .class_name_map(unique_ids(rows.iter().map(|s| s.class_id)))
            .await?;
        let subject_names = self
            .subject_name_map(unique_ids(rows.iter().map(|s| s.subject_id)))
            .await?;
        let teacher_names = self
            .user_name_map(unique_ids(rows.iter().map(|s| s.teacher_id)))
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ScheduleDetail {
                class_name: class_names.get(&row.class_id).cloned(),
                subject_name: subject_names.get(&row.subject_id).cloned(),
                teacher_name: teacher_names.get(&row.teacher_id).cloned(),
                schedule: row.into_schedule(),
            })
            .collect())
    }

    pub async fn list_schedules_with_pagination_impl(
        &self,
        query: ScheduleListQuery,
    ) -> Result<ScheduleListResponse> {
        let (page, size) = page_params(query.page, query.size);

        let paginator = Self::filtered_schedules(&query).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询课表总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询课表页数失败"))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询课表失败"))?;

        Ok(ScheduleListResponse {
            items: self.attach_schedule_details(rows).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_schedules_impl(&self, query: ScheduleListQuery) -> Result<Vec<ScheduleDetail>> {
        let rows = Self::filtered_schedules(&query)
            .all(&self.db)
            .await
            .map_err(db_err("查询课表失败"))?;
        self.attach_schedule_details(rows).await
    }

    pub async fn list_day_slots_impl(
        &self,
        day_of_week: i32,
        class_id: i64,
        teacher_id: i64,
    ) -> Result<Vec<Schedule>> {
        let rows = Schedules::find()
            .filter(Column::DayOfWeek.eq(day_of_week))
            .filter(
                Condition::any()
                    .add(Column::ClassId.eq(class_id))
                    .add(Column::TeacherId.eq(teacher_id)),
            )
            .order_by_asc(Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err("查询当日课时失败"))?;
        Ok(rows.into_iter().map(|m| m.into_schedule()).collect())
    }

    pub async fn update_schedule_impl(
        &self,
        schedule_id: i64,
        update: UpdateScheduleRequest,
    ) -> Result<Option<Schedule>> {
        if self.get_schedule_by_id_impl(schedule_id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(schedule_id),
            ..Default::default()
        };
        if let Some(subject_id) = update.subject_id {
            model.subject_id = Set(subject_id);
        }
        if let Some(teacher_id) = update.teacher_id {
            model.teacher_id = Set(teacher_id);
        }
        if let Some(day) = update.day_of_week {
            model.day_of_week = Set(day);
        }
        if let Some(start) = update.start_time {
            model.start_time = Set(time_to_string(start));
        }
        if let Some(end) = update.end_time {
            model.end_time = Set(time_to_string(end));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("更新课时失败"))?;
        Ok(Some(updated.into_schedule()))
    }

    pub async fn delete_schedule_impl(&self, schedule_id: i64) -> Result<bool> {
        let result = Schedules::delete_by_id(schedule_id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除课时失败"))?;
        Ok(result.rows_affected > 0)
    }
}
