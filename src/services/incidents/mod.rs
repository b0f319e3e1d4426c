pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::incidents::requests::{
    CreateIncidentRequest, IncidentQueryParams, UpdateIncidentRequest,
};
use crate::storage::Storage;

pub struct IncidentService {
    storage: Option<Arc<dyn Storage>>,
}

impl IncidentService {
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

    pub async fn list_incidents(
        &self,
        request: &HttpRequest,
        query: IncidentQueryParams,
    ) -> ActixResult<HttpResponse> {
        manage::list_incidents(self, request, query).await
    }

    pub async fn create_incident(
        &self,
        request: &HttpRequest,
        data: CreateIncidentRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_incident(self, request, data).await
    }

    pub async fn get_incident(
        &self,
        request: &HttpRequest,
        incident_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::get_incident(self, request, incident_id).await
    }

    pub async fn update_incident(
        &self,
        request: &HttpRequest,
        incident_id: i64,
        data: UpdateIncidentRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_incident(self, request, incident_id, data).await
    }

    pub async fn delete_incident(
        &self,
        request: &HttpRequest,
        incident_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::delete_incident(self, request, incident_id).await
    }
}
