use crate::{
    entities::{questions, templates},
    services::natural_key::insert_if_absent,
};
use chrono::Utc;
use log::{info, warn};
use models::question::{DraftError, TemplateDraft};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Invalid(#[from] DraftError),
    #[error("a template titled `{0}` already exists")]
    DuplicateTitle(String),
    #[error("template {0} does not exist")]
    NotFound(Uuid),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// A template with its questions in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateWithQuestions {
    #[serde(flatten)]
    pub template: templates::Model,
    pub questions: Vec<questions::Model>,
}

pub struct TemplateService;

impl TemplateService {
    /// Saves a validated template and its questions in one transaction
    pub async fn create_template(
        db: &DatabaseConnection,
        draft: TemplateDraft,
    ) -> Result<TemplateWithQuestions, TemplateError> {
        draft.validate()?;

        let txn = db.begin().await?;
        let result = Self::insert_template(&txn, &draft).await;

        match result {
            Ok(saved) => {
                txn.commit().await?;
                info!(
                    "Created template `{}` with {} questions",
                    saved.template.title,
                    saved.questions.len()
                );
                Ok(saved)
            }
            Err(err) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!("Rollback failed: {rollback}");
                }
                Err(err)
            }
        }
    }

    async fn insert_template(
        txn: &DatabaseTransaction,
        draft: &TemplateDraft,
    ) -> Result<TemplateWithQuestions, TemplateError> {
        let title = draft.title.trim().to_string();
        let template = templates::Model {
            id: Uuid::new_v4(),
            title: title.clone(),
            created_at: Utc::now(),
        };

        let inserted = insert_if_absent(
            txn,
            templates::ActiveModel {
                id: Set(template.id),
                title: Set(template.title.clone()),
                created_at: Set(template.created_at),
            },
            [templates::Column::Title],
        )
        .await?;

        if !inserted {
            return Err(TemplateError::DuplicateTitle(title));
        }

        let questions: Vec<questions::Model> = draft
            .questions
            .iter()
            .enumerate()
            .map(|(position, question)| questions::Model {
                id: Uuid::new_v4(),
                template_id: template.id,
                position: position as i32,
                prompt: question.prompt.trim().to_string(),
                question_type: question.question_type.clone(),
                required: question.required,
                options: question.stored_options(),
            })
            .collect();

        questions::Entity::insert_many(questions.iter().cloned().map(|q| questions::ActiveModel {
            id: Set(q.id),
            template_id: Set(q.template_id),
            position: Set(q.position),
            prompt: Set(q.prompt),
            question_type: Set(q.question_type),
            required: Set(q.required),
            options: Set(q.options),
        }))
        .exec(txn)
        .await?;

        Ok(TemplateWithQuestions {
            template,
            questions,
        })
    }

    /// Loads a template and its questions
    pub async fn find_with_questions(
        db: &DatabaseConnection,
        template_id: Uuid,
    ) -> Result<TemplateWithQuestions, TemplateError> {
        let template = templates::Entity::find_by_id(template_id)
            .one(db)
            .await?
            .ok_or(TemplateError::NotFound(template_id))?;

        let questions = questions::Entity::find()
            .filter(questions::Column::TemplateId.eq(template_id))
            .order_by_asc(questions::Column::Position)
            .all(db)
            .await?;

        Ok(TemplateWithQuestions {
            template,
            questions,
        })
    }
}
