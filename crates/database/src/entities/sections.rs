use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One offering of a discipline in a term; unique on (discipline_id, code, term)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub discipline_id: Uuid,
    pub code: String, // Section code, e.g. "TA"
    pub term: String, // e.g. "2021.2"
    pub schedule: Option<String>,
    pub instructor_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::disciplines::Entity",
        from = "Column::DisciplineId",
        to = "super::disciplines::Column::Id"
    )]
    Discipline,
    #[sea_orm(
        belongs_to = "super::people::Entity",
        from = "Column::InstructorId",
        to = "super::people::Column::Id"
    )]
    Instructor,
    #[sea_orm(has_many = "super::section_members::Entity")]
    SectionMembers,
    #[sea_orm(has_many = "super::evaluation_sections::Entity")]
    EvaluationSections,
}

impl Related<super::disciplines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Discipline.def()
    }
}

impl Related<super::section_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SectionMembers.def()
    }
}

impl Related<super::evaluation_sections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvaluationSections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
