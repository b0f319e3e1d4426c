use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::{
    middlewares::RequireJWT,
    models::{ApiResponse, ErrorCode},
    services::support::{
        bad_request, evict_session_user, internal_failure, invalidate_dashboard, not_found,
    },
};

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(bad_request(
            ErrorCode::CannotDeleteSelf,
            "Cannot delete current user",
        ));
    }
    match storage.find_system_admin_id().await {
        Ok(Some(admin_id)) if admin_id == user_id => {
            return Ok(bad_request(
                ErrorCode::CannotDeleteSystemAdmin,
                "Cannot delete the system administrator",
            ));
        }
        Ok(_) => {}
        Err(e) => return Ok(internal_failure("Failed to resolve system administrator", e)),
    }

    match storage.delete_user(user_id).await {
        Ok(true) => {
            info!("User {} deleted", user_id);
            evict_session_user(request, user_id).await;
            invalidate_dashboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("User deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(internal_failure("User deletion failed", e)),
    }
}
