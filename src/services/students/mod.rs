pub mod create;
pub mod delete;
pub mod enrollments;
pub mod get;
pub mod import;
pub mod list;
pub mod transfer;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::students::requests::{
    CreateStudentRequest, DeleteStudentParams, StudentQueryParams, TransferStudentRequest,
    UpdateStudentRequest,
};
use crate::storage::Storage;

pub struct StudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl StudentService {
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

    pub async fn list_students(
        &self,
        request: &HttpRequest,
        query: StudentQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_students(self, request, query).await
    }

    pub async fn create_student(
        &self,
        request: &HttpRequest,
        data: CreateStudentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_student(self, request, data).await
    }

    pub async fn get_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_student(self, request, student_id).await
    }

    // 当前学生自己的档案
    pub async fn get_my_student(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_my_student(self, request).await
    }

    pub async fn update_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
        data: UpdateStudentRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_student(self, request, student_id, data).await
    }

    // 转班
    pub async fn transfer_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
        data: TransferStudentRequest,
    ) -> ActixResult<HttpResponse> {
        transfer::transfer_student(self, request, student_id, data).await
    }

    pub async fn delete_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
        params: DeleteStudentParams,
    ) -> ActixResult<HttpResponse> {
        delete::delete_student(self, request, student_id, params).await
    }

    // 入班历史
    pub async fn list_enrollments(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        enrollments::list_enrollments(self, request, student_id).await
    }

    pub async fn import_students(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        import::import_students(self, request, payload).await
    }
}
