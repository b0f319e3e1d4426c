use super::entities::ClassDetail;
use crate::models::common::PaginationInfo;
use crate::models::students::entities::StudentDetail;
use crate::models::users::entities::User;
use serde::Serialize;
use ts_rs::TS;

// 班级列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<ClassDetail>,
}

// 可选协调员列表
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct CoordinatorListResponse {
    pub items: Vec<User>,
}

// 班级学生名单
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassStudentsResponse {
    pub class_id: i64,
    pub items: Vec<StudentDetail>,
}
