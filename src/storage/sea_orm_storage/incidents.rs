//! 学生事件记录

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::{SeaOrmStorage, db_err, page_params, unique_ids};
use crate::entity::date_to_string;
use crate::entity::incidents::{ActiveModel, Column, Entity as Incidents, Model};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    incidents::{
        entities::{Incident, IncidentDetail},
        requests::{CreateIncidentRequest, IncidentListQuery, UpdateIncidentRequest},
        responses::IncidentListResponse,
    },
};

impl SeaOrmStorage {
    pub async fn create_incident_impl(
        &self,
        req: CreateIncidentRequest,
        reporter_id: i64,
    ) -> Result<Incident> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            student_id: Set(req.student_id),
            reporter_id: Set(Some(reporter_id)),
            subject_id: Set(req.subject_id),
            kind: Set(req.kind.to_string()),
            description: Set(req.description),
            attachment_url: Set(req.attachment_url),
            date: Set(date_to_string(req.date)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("创建事件记录失败"))?;
        Ok(result.into_incident())
    }

    pub async fn get_incident_by_id_impl(&self, incident_id: i64) -> Result<Option<Incident>> {
        let result = Incidents::find_by_id(incident_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询事件记录失败"))?;
        Ok(result.map(|m| m.into_incident()))
    }

    pub async fn get_incident_detail_impl(
        &self,
        incident_id: i64,
    ) -> Result<Option<IncidentDetail>> {
        let Some(row) = Incidents::find_by_id(incident_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询事件记录失败"))?
        else {
            return Ok(None);
        };
        Ok(self.attach_incident_details(vec![row]).await?.pop())
    }

    async fn attach_incident_details(&self, rows: Vec<Model>) -> Result<Vec<IncidentDetail>> {
        let student_names = self
            .student_name_map(unique_ids(rows.iter().map(|i| i.student_id)))
            .await?;
        let reporter_names = self
            .user_name_map(unique_ids(rows.iter().filter_map(|i| i.reporter_id)))
            .await?;
        let subject_names = self
            .subject_name_map(unique_ids(rows.iter().filter_map(|i| i.subject_id)))
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| IncidentDetail {
                student_name: student_names.get(&row.student_id).cloned(),
                reporter_name: row.reporter_id.and_then(|id| reporter_names.get(&id).cloned()),
                subject_name: row.subject_id.and_then(|id| subject_names.get(&id).cloned()),
                incident: row.into_incident(),
            })
            .collect())
    }

    /// 分页列出事件，日期倒序
    pub async fn list_incidents_with_pagination_impl(
        &self,
        query: IncidentListQuery,
    ) -> Result<IncidentListResponse> {
        let (page, size) = page_params(query.page, query.size);

        let mut select = Incidents::find();
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(kind) = query.kind {
            select = select.filter(Column::Kind.eq(kind.to_string()));
        }
        if let Some(reporter_id) = query.reporter_id {
            select = select.filter(Column::ReporterId.eq(reporter_id));
        }
        if let Some(start) = query.start_date {
            select = select.filter(Column::Date.gte(date_to_string(start)));
        }
        if let Some(end) = query.end_date {
            select = select.filter(Column::Date.lte(date_to_string(end)));
        }

        let paginator = select
            .order_by_desc(Column::Date)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询事件总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询事件页数失败"))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询事件列表失败"))?;

        Ok(IncidentListResponse {
            items: self.attach_incident_details(rows).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_incident_impl(
        &self,
        incident_id: i64,
        update: UpdateIncidentRequest,
    ) -> Result<Option<Incident>> {
        if self.get_incident_by_id_impl(incident_id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(incident_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(kind) = update.kind {
            model.kind = Set(kind.to_string());
        }
        if let Some(description) = update.description {
            model.description = Set(description);
        }
        if let Some(date) = update.date {
            model.date = Set(date_to_string(date));
        }
        if let Some(url) = update.attachment_url {
            model.attachment_url = Set(url);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("更新事件记录失败"))?;
        Ok(Some(updated.into_incident()))
    }

    pub async fn delete_incident_impl(&self, incident_id: i64) -> Result<bool> {
        let result = Incidents::delete_by_id(incident_id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除事件记录失败"))?;
        Ok(result.rows_affected > 0)
    }
}
