use chrono::NaiveDate;
use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;

// 学生查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub class_id: Option<i64>,
    pub search: Option<String>,
}

// 内联创建的学生账号
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct NewStudentAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

// 创建学生请求：user_id 与 account 二选一
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct CreateStudentRequest {
    pub user_id: Option<i64>,
    pub account: Option<NewStudentAccount>,
    pub class_id: Option<i64>,
    pub enrollment_number: String,
    pub birth_date: Option<NaiveDate>,
}

// 存储层创建参数
#[derive(Debug, Clone)]
pub struct CreateStudentRecord {
    pub user_id: i64,
    pub class_id: Option<i64>,
    pub enrollment_number: String,
    pub birth_date: Option<NaiveDate>,
}

// 更新学生请求
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct UpdateStudentRequest {
    pub enrollment_number: Option<String>,
    #[serde(default, deserialize_with = "crate::utils::deserialize_some")]
    #[ts(type = "string | null")]
    pub birth_date: Option<Option<NaiveDate>>,
    pub full_name: Option<String>,
}

// 转班请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct TransferStudentRequest {
    pub class_id: i64,
}

// 删除学生参数
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct DeleteStudentParams {
    /// 同时删除关联的用户账号
    #[serde(default)]
    pub delete_profile: bool,
}

// 学生列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct StudentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub class_id: Option<i64>,
    /// 限定在这些班级内（教师视角）
    pub class_ids: Option<Vec<i64>>,
    pub search: Option<String>,
}
