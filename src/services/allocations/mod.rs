//! 教师任课分配

pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::teacher_allocations::requests::{
    AllocationQueryParams, CreateAllocationRequest,
};
use crate::storage::Storage;

pub struct AllocationService {
    storage: Option<Arc<dyn Storage>>,
}

impl AllocationService {
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

    pub async fn list_allocations(
        &self,
        request: &HttpRequest,
        query: AllocationQueryParams,
    ) -> ActixResult<HttpResponse> {
        manage::list_allocations(self, request, query).await
    }

    pub async fn create_allocation(
        &self,
        request: &HttpRequest,
        data: CreateAllocationRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_allocation(self, request, data).await
    }

    pub async fn delete_allocation(
        &self,
        request: &HttpRequest,
        allocation_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::delete_allocation(self, request, allocation_id).await
    }
}
