use models::question::{QuestionOptions, QuestionRef, QuestionType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub template_id: Uuid,
    pub position: i32,
    #[sea_orm(column_type = "Text")]
    pub prompt: String,
    #[sea_orm(column_type = "Text")]
    pub question_type: QuestionType,
    pub required: bool,
    #[sea_orm(column_type = "Text")]
    pub options: QuestionOptions, // JSON array of option labels
}

impl Model {
    /// The parts of this question answer validation looks at
    pub fn rules(&self) -> QuestionRef<'_> {
        QuestionRef {
            question_type: &self.question_type,
            required: self.required,
            options: self.options.as_slice(),
        }
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
    #[sea_orm(has_many = "super::answers::Entity")]
    Answers,
}

impl Related<super::templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

impl Related<super::answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
