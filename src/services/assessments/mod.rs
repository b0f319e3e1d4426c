pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::assessments::requests::{
    AssessmentQueryParams, CreateAssessmentRequest, UpdateAssessmentRequest,
};
use crate::storage::Storage;

pub struct AssessmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssessmentService {
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

    pub async fn list_assessments(
        &self,
        request: &HttpRequest,
        query: AssessmentQueryParams,
    ) -> ActixResult<HttpResponse> {
        manage::list_assessments(self, request, query).await
    }

    pub async fn create_assessment(
        &self,
        request: &HttpRequest,
        data: CreateAssessmentRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_assessment(self, request, data).await
    }

    pub async fn get_assessment(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::get_assessment(self, request, assessment_id).await
    }

    pub async fn update_assessment(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
        data: UpdateAssessmentRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_assessment(self, request, assessment_id, data).await
    }

    pub async fn delete_assessment(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::delete_assessment(self, request, assessment_id).await
    }
}
