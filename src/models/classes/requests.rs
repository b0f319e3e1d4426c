use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 班级查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::utils::query::opt_parse")]
    pub year: Option<i32>,
    pub search: Option<String>,
}

// 创建班级请求
//
// coord_id 若提供，必须是 coord 角色的用户
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct CreateClassRequest {
    pub name: String,
    pub year: i32,
    pub coord_id: Option<i64>,
}

// 更新班级请求
//
// coord_id: 不传表示不修改，传 null 表示移除协调员
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "crate::utils::deserialize_some")]
    #[ts(type = "number | null")]
    pub coord_id: Option<Option<i64>>,
}

// 班级可见范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassScope {
    /// 不限制
    All,
    /// 教师任课的班级
    AllocatedTo(i64),
    /// 学生所在的班级
    StudentOf(i64),
}

// 班级列表查询参数（用于存储层）
#[derive(Debug, Clone)]
pub struct ClassListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub year: Option<i32>,
    pub search: Option<String>,
    pub scope: ClassScope,
}
