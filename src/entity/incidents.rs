//! 事件记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "incidents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub reporter_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub kind: String,
    pub description: String,
    pub attachment_url: Option<String>,
    pub date: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id",
        on_delete = "Cascade"
    )]
    Student,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_incident(self) -> crate::models::incidents::entities::Incident {
        use crate::models::incidents::entities::{Incident, IncidentKind};

        Incident {
            id: self.id,
            student_id: self.student_id,
            reporter_id: self.reporter_id,
            subject_id: self.subject_id,
            kind: self.kind.parse().unwrap_or(IncidentKind::Other),
            description: self.description,
            date: super::to_date(&self.date),
            attachment_url: self.attachment_url,
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
