use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::students::requests::{
    CreateStudentRequest, DeleteStudentParams, StudentQueryParams, TransferStudentRequest,
    UpdateStudentRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::StudentService;
use crate::utils::SafeStudentIdI64;

static STUDENT_SERVICE: Lazy<StudentService> = Lazy::new(StudentService::new_lazy);

pub async fn list_students(
    req: HttpRequest,
    query: web::Query<StudentQueryParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.list_students(&req, query.into_inner()).await
}

pub async fn create_student(
    req: HttpRequest,
    data: web::Json<CreateStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.create_student(&req, data.into_inner()).await
}

pub async fn import_students(
    req: HttpRequest,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.import_students(&req, payload).await
}

pub async fn get_my_student(req: HttpRequest) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.get_my_student(&req).await
}

pub async fn get_student(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.get_student(&req, student_id.0).await
}

pub async fn update_student(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
    data: web::Json<UpdateStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .update_student(&req, student_id.0, data.into_inner())
        .await
}

pub async fn transfer_student(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
    data: web::Json<TransferStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .transfer_student(&req, student_id.0, data.into_inner())
        .await
}

pub async fn delete_student(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
    query: web::Query<DeleteStudentParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .delete_student(&req, student_id.0, query.into_inner())
        .await
}

pub async fn list_enrollments(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.list_enrollments(&req, student_id.0).await
}

pub fn configure_students_routes(cfg: &mut web::ServiceConfig) {
    let management = || middlewares::RequireRole::new_any(UserRole::management_roles());

    cfg.service(
        web::scope("/api/v1/students")
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_students)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    )
                    .route(web::post().to(create_student).wrap(management())),
            )
            .service(
                web::resource("/import")
                    .wrap(middlewares::RateLimit::import())
                    .route(web::post().to(import_students).wrap(management())),
            )
            // 需在 /{student_id} 之前注册
            .route("/me", web::get().to(get_my_student))
            .service(
                web::resource("/{student_id}")
                    .route(web::get().to(get_student))
                    .route(web::put().to(update_student).wrap(management()))
                    .route(web::delete().to(delete_student).wrap(management())),
            )
            .route(
                "/{student_id}/class",
                web::put().to(transfer_student).wrap(management()),
            )
            .route("/{student_id}/enrollments", web::get().to(list_enrollments)),
    );
}
