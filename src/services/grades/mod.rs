pub mod manage;
pub mod mine;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::grades::requests::{
    BulkGradeRequest, GradeQueryParams, UpdateGradeRequest, UpsertGradeRequest,
};
use crate::storage::Storage;

pub struct GradeService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradeService {
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

    pub async fn list_grades(
        &self,
        request: &HttpRequest,
        query: GradeQueryParams,
    ) -> ActixResult<HttpResponse> {
        manage::list_grades(self, request, query).await
    }

    pub async fn upsert_grade(
        &self,
        request: &HttpRequest,
        data: UpsertGradeRequest,
    ) -> ActixResult<HttpResponse> {
        manage::upsert_grade(self, request, data).await
    }

    // 整份评估批量录入
    pub async fn bulk_upsert_grades(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
        data: BulkGradeRequest,
    ) -> ActixResult<HttpResponse> {
        manage::bulk_upsert_grades(self, request, assessment_id, data).await
    }

    pub async fn update_grade(
        &self,
        request: &HttpRequest,
        grade_id: i64,
        data: UpdateGradeRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_grade(self, request, grade_id, data).await
    }

    pub async fn delete_grade(
        &self,
        request: &HttpRequest,
        grade_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::delete_grade(self, request, grade_id).await
    }

    pub async fn my_grades(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        mine::my_grades(self, request).await
    }
}
