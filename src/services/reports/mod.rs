pub mod calc;
pub mod class_report;
pub mod overview;
pub mod report_card;

use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::storage::Storage;

pub struct ReportService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReportService {
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

    // 全校概览
    pub async fn overview(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        overview::overview(self, request).await
    }

    pub async fn class_report(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        class_report::class_report(self, request, class_id).await
    }

    pub async fn export_class_report(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        class_report::export_class_report(self, request, class_id).await
    }

    pub async fn report_card(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        report_card::report_card(self, request, student_id).await
    }
}

/// 学科 ID -> 名称
pub(crate) async fn subject_names(storage: &dyn Storage) -> Result<HashMap<i64, String>> {
    Ok(storage
        .list_all_subjects()
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect())
}
