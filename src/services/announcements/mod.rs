pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::announcements::requests::{
    AnnouncementQueryParams, CreateAnnouncementRequest, UpdateAnnouncementRequest,
};
use crate::storage::Storage;

pub struct AnnouncementService {
    storage: Option<Arc<dyn Storage>>,
}

impl AnnouncementService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn list_announcements(
        &self,
        request: &HttpRequest,
        query: AnnouncementQueryParams,
    ) -> ActixResult<HttpResponse> {
        manage::list_announcements(self, request, query).await
    }

    pub async fn create_announcement(
        &self,
        request: &HttpRequest,
        data: CreateAnnouncementRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_announcement(self, request, data).await
    }

    pub async fn update_announcement(
        &self,
        request: &HttpRequest,
        announcement_id: i64,
        data: UpdateAnnouncementRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_announcement(self, request, announcement_id, data).await
    }

    pub async fn delete_announcement(
        &self,
        request: &HttpRequest,
        announcement_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::delete_announcement(self, request, announcement_id).await
    }
}
