use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A template sent out to one or more sections
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "evaluations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub template_id: Uuid,
    pub deadline: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Whether answers are still accepted at `now`
    pub fn is_open_at(&self, now: DateTimeUtc) -> bool {
        self.deadline.is_none_or(|deadline| now <= deadline)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::templates::Entity",
        from = "Column::TemplateId",
        to = "super::templates::Column::Id"
    )]
    Template,
    #[sea_orm(has_many = "super::evaluation_sections::Entity")]
    EvaluationSections,
    #[sea_orm(has_many = "super::answer_sets::Entity")]
    AnswerSets,
}

impl Related<super::templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

impl Related<super::evaluation_sections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvaluationSections.def()
    }
}

impl Related<super::answer_sets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnswerSets.def()
    }
}

// Many-to-many relationship with sections
impl Related<super::sections::Entity> for Entity {
    fn to() -> RelationDef {
        super::evaluation_sections::Relation::Section.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::evaluation_sections::Relation::Evaluation.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
