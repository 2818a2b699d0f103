use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a person was first seen teaching or attending a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PersonRole {
    #[sea_orm(string_value = "instructor")]
    Instructor,
    #[sea_orm(string_value = "student")]
    Student,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "people")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Student or staff id; the reconciliation key
    #[sea_orm(unique)]
    pub registration_id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: PersonRole,
    pub admin: bool,
    /// `None` until a provisioned account completes password setup
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::section_members::Entity")]
    SectionMembers,
    #[sea_orm(has_many = "super::answer_sets::Entity")]
    AnswerSets,
    #[sea_orm(has_many = "super::credential_notices::Entity")]
    CredentialNotices,
}

impl Related<super::section_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SectionMembers.def()
    }
}

impl Related<super::answer_sets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnswerSets.def()
    }
}

impl Related<super::credential_notices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CredentialNotices.def()
    }
}

// Many-to-many relationship with sections
impl Related<super::sections::Entity> for Entity {
    fn to() -> RelationDef {
        super::section_members::Relation::Section.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::section_members::Relation::Person.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
