//! 用户导入服务

use std::collections::HashSet;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::UserService;
use super::create::validate_new_account;
use crate::config::AppConfig;
use crate::errors::SchoolSystemError;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::models::users::responses::ImportResult;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::support::{bad_request, internal_failure, invalidate_dashboard};
use crate::storage::Storage;
use crate::utils::csv_upload::{CsvRow, parse_rows, read_file_field};
use crate::utils::password::hash_password;

const REQUIRED_COLUMNS: [&str; 5] = ["username", "email", "password", "role", "full_name"];

/// 读取上传的 CSV 并检查行数上限；失败时直接给出响应
pub(crate) async fn read_csv_upload(
    payload: &mut Multipart,
    required: &[&str],
) -> Result<Vec<CsvRow>, HttpResponse> {
    let config = AppConfig::get();

    let bytes = read_file_field(payload, config.server.limits.max_payload_size)
        .await
        .map_err(|e| bad_request(ErrorCode::ImportFileMissing, e.message().to_string()))?;
    if bytes.is_empty() {
        return Err(bad_request(ErrorCode::ImportFileMissing, "Uploaded file is empty"));
    }

    let rows = parse_rows(&bytes, required)
        .map_err(|e| bad_request(ErrorCode::ImportFileFormatInvalid, e.message().to_string()))?;
    if rows.is_empty() {
        return Err(bad_request(
            ErrorCode::ImportFileFormatInvalid,
            "The file contains no data rows",
        ));
    }
    if rows.len() > config.school.max_import_rows {
        return Err(bad_request(
            ErrorCode::ImportRowLimitExceeded,
            format!(
                "At most {} rows can be imported at once",
                config.school.max_import_rows
            ),
        ));
    }
    Ok(rows)
}

/// 在阻塞线程池中计算密码哈希
pub(crate) async fn hash_in_background(password: String) -> Result<String, String> {
    match tokio::task::spawn_blocking(move || hash_password(&password)).await {
        Ok(Ok(hash)) => Ok(hash),
        Ok(Err(e)) => Err(format!("Password hashing failed: {}", e.message())),
        Err(e) => Err(format!("Password hashing task failed: {e}")),
    }
}

/// 导入用户
pub async fn import_users(
    service: &UserService,
    mut payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let rows = match read_csv_upload(&mut payload, &REQUIRED_COLUMNS).await {
        Ok(rows) => rows,
        Err(response) => return Ok(response),
    };

    let result = match import_user_rows(storage.as_ref(), rows).await {
        Ok(result) => result,
        Err(e) => return Ok(internal_failure("Failed to import users", e)),
    };

    if result.success > 0 {
        invalidate_dashboard(request).await;
    }
    info!(
        "User import finished: {} created, {} skipped, {} failed",
        result.success, result.skipped, result.failed
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Import completed")))
}

/// 逐行创建账号：已存在或文件内重复的记为跳过，校验或写入失败的记为失败
pub(crate) async fn import_user_rows(
    storage: &dyn Storage,
    rows: Vec<CsvRow>,
) -> Result<ImportResult, SchoolSystemError> {
    let mut result = ImportResult {
        total: rows.len(),
        ..Default::default()
    };

    // 批量检查已存在的用户名与邮箱
    let usernames: Vec<String> = rows.iter().map(|r| r.get_or_empty("username")).collect();
    let emails: Vec<String> = rows.iter().map(|r| r.get_or_empty("email")).collect();
    let existing_usernames: HashSet<String> = storage
        .find_existing_usernames(&usernames)
        .await?
        .into_iter()
        .collect();
    let existing_emails: HashSet<String> = storage
        .find_existing_emails(&emails)
        .await?
        .into_iter()
        .collect();

    let mut seen_usernames = HashSet::new();
    let mut seen_emails = HashSet::new();

    for row in rows {
        let username = row.get_or_empty("username");
        let email = row.get_or_empty("email");
        let password = row.get_or_empty("password");
        let full_name = row.get_or_empty("full_name");

        let role = match row.get_or_empty("role").to_lowercase().parse::<UserRole>() {
            Ok(role) => role,
            Err(msg) => {
                result.push_error(row.line, Some("role"), msg);
                continue;
            }
        };

        if let Err((_, msg)) = validate_new_account(&username, &email, &password, &full_name) {
            result.push_error(row.line, None, msg);
            continue;
        }

        // 已存在或文件内重复的账号跳过
        if existing_usernames.contains(&username) || !seen_usernames.insert(username.clone()) {
            result.skipped += 1;
            continue;
        }
        if existing_emails.contains(&email) || !seen_emails.insert(email.clone()) {
            result.skipped += 1;
            continue;
        }

        let hashed = match hash_in_background(password).await {
            Ok(hash) => hash,
            Err(msg) => {
                result.push_error(row.line, Some("password"), msg);
                continue;
            }
        };

        let create_req = CreateUserRequest {
            username,
            email,
            password: hashed,
            full_name,
            role,
        };

        match storage.create_user(create_req).await {
            Ok(_) => result.success += 1,
            Err(e) => {
                error!("Failed to import user at row {}: {}", row.line, e);
                result.push_error(row.line, None, e.message().to_string());
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    fn rows(csv: &str) -> Vec<CsvRow> {
        parse_rows(csv.as_bytes(), &REQUIRED_COLUMNS).unwrap()
    }

    #[tokio::test]
    async fn test_import_counts_created_skipped_and_failed_rows() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        storage
            .create_user(CreateUserRequest {
                username: "maria_s".to_string(),
                email: "maria@school.test".to_string(),
                password: "hashed".to_string(),
                full_name: "Maria Souza".to_string(),
                role: UserRole::Teacher,
            })
            .await
            .unwrap();

        let csv = "\
username,email,password,role,full_name
carla_t,carla@school.test,Escola2025x,teacher,Carla Teixeira
maria_s,other@school.test,Escola2025x,teacher,Maria Again
diana_c,maria@school.test,Escola2025x,coord,Diana Costa
carla_t,carla2@school.test,Escola2025x,teacher,Carla Twice
pedro_p,pedro@school.test,Escola2025x,janitor,Pedro Pires
joana_r,joana@school.test,short,student,Joana Ramos
";
        let result = import_user_rows(&storage, rows(csv)).await.unwrap();

        assert_eq!(result.total, 6);
        assert_eq!(result.success, 1);
        // 已存在的用户名、已存在的邮箱、文件内重复的用户名
        assert_eq!(result.skipped, 3);
        assert_eq!(result.failed, 2);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].row, 6);
        assert_eq!(result.errors[0].field.as_deref(), Some("role"));
        assert_eq!(result.errors[1].row, 7);

        assert_eq!(storage.count_users().await.unwrap(), 2);
    }
}
