//! 学生导入服务：同时创建账号与档案

use std::collections::{HashMap, HashSet};

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveDate;
use tracing::{error, info};

use super::StudentService;
use super::create::validate_birth_date;
use crate::errors::SchoolSystemError;
use crate::models::students::requests::CreateStudentRecord;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::models::users::responses::ImportResult;
use crate::models::ApiResponse;
use crate::services::support::{internal_failure, invalidate_dashboard};
use crate::services::users::create::validate_new_account;
use crate::services::users::import::{hash_in_background, read_csv_upload};
use crate::storage::Storage;
use crate::utils::csv_upload::CsvRow;
use crate::utils::validate::validate_enrollment_number;

const REQUIRED_COLUMNS: [&str; 6] = [
    "username",
    "email",
    "password",
    "full_name",
    "enrollment_number",
    "class_id",
];

pub async fn import_students(
    service: &StudentService,
    request: &HttpRequest,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let rows = match read_csv_upload(&mut payload, &REQUIRED_COLUMNS).await {
        Ok(rows) => rows,
        Err(response) => return Ok(response),
    };

    let result = match import_student_rows(storage.as_ref(), rows).await {
        Ok(result) => result,
        Err(e) => return Ok(internal_failure("Failed to import students", e)),
    };

    if result.success > 0 {
        invalidate_dashboard(request).await;
    }
    info!(
        "Student import finished: {} created, {} skipped, {} failed",
        result.success, result.skipped, result.failed
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Import completed")))
}

/// 逐行创建学生账号与档案，统计方式与用户导入一致
pub(crate) async fn import_student_rows(
    storage: &dyn Storage,
    rows: Vec<CsvRow>,
) -> Result<ImportResult, SchoolSystemError> {
    let mut result = ImportResult {
        total: rows.len(),
        ..Default::default()
    };

    let usernames: Vec<String> = rows.iter().map(|r| r.get_or_empty("username")).collect();
    let emails: Vec<String> = rows.iter().map(|r| r.get_or_empty("email")).collect();
    let numbers: Vec<String> = rows
        .iter()
        .map(|r| r.get_or_empty("enrollment_number"))
        .collect();

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
    let existing_numbers: HashSet<String> = storage
        .find_existing_enrollment_numbers(&numbers)
        .await?
        .into_iter()
        .collect();

    // 班级是否存在，按 ID 缓存
    let mut known_classes: HashMap<i64, bool> = HashMap::new();
    let mut seen = HashSet::new();

    for row in rows {
        let username = row.get_or_empty("username");
        let email = row.get_or_empty("email");
        let password = row.get_or_empty("password");
        let full_name = row.get_or_empty("full_name");
        let enrollment_number = row.get_or_empty("enrollment_number");

        if let Err((_, msg)) = validate_new_account(&username, &email, &password, &full_name) {
            result.push_error(row.line, None, msg);
            continue;
        }
        if let Err(msg) = validate_enrollment_number(&enrollment_number) {
            result.push_error(row.line, Some("enrollment_number"), msg);
            continue;
        }

        let Some(class_id) = row.get("class_id").and_then(|v| v.parse::<i64>().ok()) else {
            result.push_error(row.line, Some("class_id"), "class_id must be a number");
            continue;
        };

        let birth_date = match row.get("birth_date") {
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) if validate_birth_date(date).is_ok() => Some(date),
                _ => {
                    result.push_error(
                        row.line,
                        Some("birth_date"),
                        "birth_date must be a past date in YYYY-MM-DD format",
                    );
                    continue;
                }
            },
            None => None,
        };

        let class_exists = match known_classes.get(&class_id) {
            Some(exists) => *exists,
            None => {
                let exists = storage.get_class_by_id(class_id).await?.is_some();
                known_classes.insert(class_id, exists);
                exists
            }
        };
        if !class_exists {
            result.push_error(row.line, Some("class_id"), format!("Class {class_id} not found"));
            continue;
        }

        // 已存在或文件内重复的记录跳过
        let duplicate = existing_usernames.contains(&username)
            || existing_emails.contains(&email)
            || existing_numbers.contains(&enrollment_number)
            || !seen.insert(username.clone())
            || !seen.insert(format!("email:{email}"))
            || !seen.insert(format!("ra:{enrollment_number}"));
        if duplicate {
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

        let account = CreateUserRequest {
            username,
            email,
            password: hashed,
            full_name,
            role: UserRole::Student,
        };
        let record = CreateStudentRecord {
            user_id: 0,
            class_id: Some(class_id),
            enrollment_number,
            birth_date,
        };

        match storage.create_student_with_account(account, record).await {
            Ok(_) => result.success += 1,
            Err(e) => {
                error!("Failed to import student at row {}: {}", row.line, e);
                result.push_error(row.line, None, e.message().to_string());
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classes::requests::CreateClassRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::utils::csv_upload::parse_rows;

    #[tokio::test]
    async fn test_import_counts_created_skipped_and_failed_rows() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let class = storage
            .create_class(CreateClassRequest {
                name: "7A".to_string(),
                year: 2025,
                coord_id: None,
            })
            .await
            .unwrap();
        let existing = storage
            .create_user(CreateUserRequest {
                username: "ana_lima".to_string(),
                email: "ana@school.test".to_string(),
                password: "hashed".to_string(),
                full_name: "Ana Lima".to_string(),
                role: UserRole::Student,
            })
            .await
            .unwrap();
        storage
            .create_student(CreateStudentRecord {
                user_id: existing.id,
                class_id: Some(class.id),
                enrollment_number: "2025-001".to_string(),
                birth_date: None,
            })
            .await
            .unwrap();

        let csv = format!(
            "\
username,email,password,full_name,enrollment_number,class_id,birth_date
bruno_m,bruno@school.test,Escola2025x,Bruno Melo,2025-002,{id},2012-05-04
caio_n,caio@school.test,Escola2025x,Caio Nunes,2025-001,{id},
bruno_m,bruno2@school.test,Escola2025x,Bruno Twice,2025-003,{id},
dora_p,dora@school.test,Escola2025x,Dora Prado,2025-004,9999,
eli_r,eli@school.test,Escola2025x,Eli Rocha,2025-005,seven,
fabi_s,fabi@school.test,Escola2025x,Fabi Silva,2025-006,{id},04/05/2012
",
            id = class.id
        );
        let rows = parse_rows(csv.as_bytes(), &REQUIRED_COLUMNS).unwrap();
        let result = import_student_rows(&storage, rows).await.unwrap();

        assert_eq!(result.total, 6);
        assert_eq!(result.success, 1);
        // 已存在的学号、文件内重复的用户名
        assert_eq!(result.skipped, 2);
        assert_eq!(result.failed, 3);
        let fields: Vec<Option<&str>> = result
            .errors
            .iter()
            .map(|e| e.field.as_deref())
            .collect();
        assert_eq!(
            fields,
            vec![Some("class_id"), Some("class_id"), Some("birth_date")]
        );

        let numbers = vec!["2025-002".to_string(), "2025-003".to_string()];
        assert_eq!(
            storage.find_existing_enrollment_numbers(&numbers).await.unwrap(),
            vec!["2025-002".to_string()]
        );
        assert_eq!(storage.list_class_students(class.id).await.unwrap().len(), 2);
    }
}
