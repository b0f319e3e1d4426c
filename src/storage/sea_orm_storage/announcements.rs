//! 公告存储操作

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::{SeaOrmStorage, db_err, page_params, unique_ids};
use crate::entity::announcements::{ActiveModel, Column, Entity as Announcements};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    announcements::{
        entities::{Announcement, AnnouncementDetail},
        requests::{
            AnnouncementAudience, AnnouncementListQuery, CreateAnnouncementRequest,
            UpdateAnnouncementRequest,
        },
        responses::AnnouncementListResponse,
    },
};

impl SeaOrmStorage {
    pub async fn create_announcement_impl(
        &self,
        req: CreateAnnouncementRequest,
        author_id: i64,
    ) -> Result<Announcement> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            title: Set(req.title),
            content: Set(req.content),
            author_id: Set(Some(author_id)),
            target_class_id: Set(req.target_class_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("发布公告失败"))?;
        Ok(result.into_announcement())
    }

    pub async fn get_announcement_by_id_impl(
        &self,
        announcement_id: i64,
    ) -> Result<Option<Announcement>> {
        let result = Announcements::find_by_id(announcement_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询公告失败"))?;
        Ok(result.map(|m| m.into_announcement()))
    }

    /// 分页列出公告，最新在前
    pub async fn list_announcements_with_pagination_impl(
        &self,
        query: AnnouncementListQuery,
    ) -> Result<AnnouncementListResponse> {
        let (page, size) = page_params(query.page, query.size);

        let mut select = Announcements::find();
        if let AnnouncementAudience::GlobalAnd(ref class_ids) = query.audience {
            let mut visible = Condition::any().add(Column::TargetClassId.is_null());
            if !class_ids.is_empty() {
                visible = visible.add(Column::TargetClassId.is_in(class_ids.clone()));
            }
            select = select.filter(visible);
        }
        if let Some(class_id) = query.target_class_id {
            select = select.filter(Column::TargetClassId.eq(class_id));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询公告总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询公告页数失败"))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询公告列表失败"))?;

        let author_names = self
            .user_name_map(unique_ids(rows.iter().filter_map(|a| a.author_id)))
            .await?;
        let class_names = self
            .class_name_map(unique_ids(rows.iter().filter_map(|a| a.target_class_id)))
            .await?;

        let items = rows
            .into_iter()
            .map(|row| AnnouncementDetail {
                author_name: row.author_id.and_then(|id| author_names.get(&id).cloned()),
                target_class_name: row
                    .target_class_id
                    .and_then(|id| class_names.get(&id).cloned()),
                announcement: row.into_announcement(),
            })
            .collect();

        Ok(AnnouncementListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_announcement_impl(
        &self,
        announcement_id: i64,
        update: UpdateAnnouncementRequest,
    ) -> Result<Option<Announcement>> {
        if self.get_announcement_by_id_impl(announcement_id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(announcement_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(content) = update.content {
            model.content = Set(content);
        }
        if let Some(target) = update.target_class_id {
            model.target_class_id = Set(target);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("更新公告失败"))?;
        Ok(Some(updated.into_announcement()))
    }

    pub async fn delete_announcement_impl(&self, announcement_id: i64) -> Result<bool> {
        let result = Announcements::delete_by_id(announcement_id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除公告失败"))?;
        Ok(result.rows_affected > 0)
    }
}
