pub mod manage;
pub mod timetable;
pub mod views;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::schedules::requests::{
    CreateScheduleRequest, ScheduleQueryParams, UpdateScheduleRequest, WeekScheduleParams,
};
use crate::storage::Storage;

pub struct ScheduleService {
    storage: Option<Arc<dyn Storage>>,
}

impl ScheduleService {
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

    pub async fn list_schedules(
        &self,
        request: &HttpRequest,
        query: ScheduleQueryParams,
    ) -> ActixResult<HttpResponse> {
        manage::list_schedules(self, request, query).await
    }

    pub async fn create_schedule(
        &self,
        request: &HttpRequest,
        data: CreateScheduleRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_schedule(self, request, data).await
    }

    pub async fn update_schedule(
        &self,
        request: &HttpRequest,
        schedule_id: i64,
        data: UpdateScheduleRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_schedule(self, request, schedule_id, data).await
    }

    pub async fn delete_schedule(
        &self,
        request: &HttpRequest,
        schedule_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::delete_schedule(self, request, schedule_id).await
    }

    // 周课表
    pub async fn week_schedule(
        &self,
        request: &HttpRequest,
        params: WeekScheduleParams,
    ) -> ActixResult<HttpResponse> {
        views::week_schedule(self, request, params).await
    }

    // 今日课表
    pub async fn today_schedule(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        views::today_schedule(self, request).await
    }
}
