pub mod manage;
pub mod summary;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::attendance::requests::{
    AttendanceQueryParams, AttendanceSummaryParams, RecordAttendanceRequest, RollCallRequest,
    UpdateAttendanceRequest,
};
use crate::storage::Storage;

pub struct AttendanceService {
    storage: Option<Arc<dyn Storage>>,
}

impl AttendanceService {
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

    pub async fn list_attendance(
        &self,
        request: &HttpRequest,
        query: AttendanceQueryParams,
    ) -> ActixResult<HttpResponse> {
        manage::list_attendance(self, request, query).await
    }

    pub async fn record_attendance(
        &self,
        request: &HttpRequest,
        data: RecordAttendanceRequest,
    ) -> ActixResult<HttpResponse> {
        manage::record_attendance(self, request, data).await
    }

    // 点名
    pub async fn roll_call(
        &self,
        request: &HttpRequest,
        data: RollCallRequest,
    ) -> ActixResult<HttpResponse> {
        manage::roll_call(self, request, data).await
    }

    pub async fn update_attendance(
        &self,
        request: &HttpRequest,
        attendance_id: i64,
        data: UpdateAttendanceRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_attendance(self, request, attendance_id, data).await
    }

    pub async fn delete_attendance(
        &self,
        request: &HttpRequest,
        attendance_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::delete_attendance(self, request, attendance_id).await
    }

    pub async fn my_attendance(
        &self,
        request: &HttpRequest,
        params: AttendanceSummaryParams,
    ) -> ActixResult<HttpResponse> {
        summary::my_attendance(self, request, params).await
    }

    pub async fn class_summary(
        &self,
        request: &HttpRequest,
        class_id: i64,
        params: AttendanceSummaryParams,
    ) -> ActixResult<HttpResponse> {
        summary::class_summary(self, request, class_id, params).await
    }
}
