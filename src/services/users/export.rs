//! 用户导出服务

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        entities::User,
        requests::{UserExportParams, UserListQuery},
    },
};
use crate::services::support::internal_failure;
use crate::utils::csv_upload::write_csv;

const EXPORT_HEADER: [&str; 8] = [
    "id",
    "username",
    "email",
    "full_name",
    "role",
    "status",
    "last_login",
    "created_at",
];

fn export_row(user: User) -> Vec<String> {
    vec![
        user.id.to_string(),
        user.username,
        user.email,
        user.full_name,
        user.role.to_string(),
        user.status.to_string(),
        user.last_login.map(|t| t.to_rfc3339()).unwrap_or_default(),
        user.created_at.to_rfc3339(),
    ]
}

pub async fn export_users(
    service: &UserService,
    params: UserExportParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let query = UserListQuery {
        role: params.role,
        status: params.status,
        search: params.search,
        ..Default::default()
    };

    let users = match storage.list_users(query).await {
        Ok(users) => users,
        Err(e) => return Ok(internal_failure("Failed to export users", e)),
    };

    match write_csv(&EXPORT_HEADER, users.into_iter().map(export_row)) {
        Ok(bytes) => Ok(HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(("Content-Disposition", "attachment; filename=\"users.csv\""))
            .body(bytes)),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::ExportFailed,
                format!("Failed to generate CSV: {e}"),
            )),
        ),
    }
}
