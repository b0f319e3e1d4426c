//! 统计查询

use std::collections::HashMap;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use super::{SeaOrmStorage, db_err, unique_ids};
use crate::entity::prelude::{Classes, Subjects, Users};
use crate::entity::{classes, users};
use crate::errors::Result;
use crate::models::{
    dashboard::responses::DashboardCounts, reports::responses::YearCount,
    users::entities::UserRole,
};

impl SeaOrmStorage {
    async fn count_role(&self, role: UserRole) -> Result<i64> {
        let count = Users::find()
            .filter(users::Column::Role.eq(role.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err("统计用户数量失败"))?;
        Ok(count as i64)
    }

    pub async fn dashboard_counts_impl(&self) -> Result<DashboardCounts> {
        let total_classes = Classes::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计班级数量失败"))?;
        let total_subjects = Subjects::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计学科数量失败"))?;

        Ok(DashboardCounts {
            total_students: self.count_role(UserRole::Student).await?,
            total_teachers: self.count_role(UserRole::Teacher).await?,
            total_classes: total_classes as i64,
            total_subjects: total_subjects as i64,
        })
    }

    /// 各学年班级数，学年倒序
    pub async fn count_classes_per_year_impl(&self) -> Result<Vec<YearCount>> {
        let rows = Classes::find()
            .select_only()
            .column(classes::Column::Year)
            .column_as(classes::Column::Id.count(), "count")
            .group_by(classes::Column::Year)
            .order_by_desc(classes::Column::Year)
            .into_tuple::<(i32, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err("统计学年班级失败"))?;

        Ok(rows
            .into_iter()
            .map(|(year, count)| YearCount { year, count })
            .collect())
    }

    pub async fn student_names_impl(&self, student_ids: &[i64]) -> Result<HashMap<i64, String>> {
        self.student_name_map(unique_ids(student_ids.iter().copied()))
            .await
    }
}
