use crate::{
    clock::Clock,
    entities::{answer_sets, evaluation_sections, evaluations, questions, section_members, sections, templates},
    services::natural_key::{insert_if_absent, vanished},
};
use chrono::{DateTime, Utc};
use log::{info, warn};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, TransactionTrait,
};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("template {0} does not exist")]
    TemplateNotFound(Uuid),
    #[error("template {0} has no questions")]
    EmptyTemplate(Uuid),
    #[error("an evaluation must target at least one section")]
    NoSections,
    #[error("section {0} does not exist")]
    SectionNotFound(Uuid),
    #[error("section {section_id} was already sent this template in evaluation {evaluation_id}")]
    AlreadyEvaluated { section_id: Uuid, evaluation_id: Uuid },
    #[error(transparent)]
    Database(#[from] DbErr),
}

pub struct EvaluationService;

impl EvaluationService {
    /// Sends a template out to a set of sections.
    ///
    /// A section can receive each template at most once.
    pub async fn create_evaluation(
        db: &DatabaseConnection,
        template_id: Uuid,
        section_ids: &[Uuid],
        deadline: Option<DateTime<Utc>>,
    ) -> Result<evaluations::Model, EvaluationError> {
        let mut targets: Vec<Uuid> = Vec::with_capacity(section_ids.len());
        for id in section_ids {
            if !targets.contains(id) {
                targets.push(*id);
            }
        }
        if targets.is_empty() {
            return Err(EvaluationError::NoSections);
        }

        let txn = db.begin().await?;
        match Self::insert_evaluation(&txn, template_id, &targets, deadline).await {
            Ok(evaluation) => {
                txn.commit().await?;
                info!(
                    "Created evaluation {} of template {template_id} for {} sections",
                    evaluation.id,
                    targets.len()
                );
                Ok(evaluation)
            }
            Err(err) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!("Rollback failed: {rollback}");
                }
                Err(err)
            }
        }
    }

    async fn insert_evaluation(
        txn: &DatabaseTransaction,
        template_id: Uuid,
        targets: &[Uuid],
        deadline: Option<DateTime<Utc>>,
    ) -> Result<evaluations::Model, EvaluationError> {
        templates::Entity::find_by_id(template_id)
            .one(txn)
            .await?
            .ok_or(EvaluationError::TemplateNotFound(template_id))?;

        let question_count = questions::Entity::find()
            .filter(questions::Column::TemplateId.eq(template_id))
            .count(txn)
            .await?;
        if question_count == 0 {
            return Err(EvaluationError::EmptyTemplate(template_id));
        }

        let found: HashSet<Uuid> = sections::Entity::find()
            .select_only()
            .column(sections::Column::Id)
            .filter(sections::Column::Id.is_in(targets.iter().copied()))
            .into_tuple::<Uuid>()
            .all(txn)
            .await?
            .into_iter()
            .collect();
        if let Some(missing) = targets.iter().find(|id| !found.contains(id)) {
            return Err(EvaluationError::SectionNotFound(*missing));
        }

        let evaluation = evaluations::ActiveModel {
            id: Set(Uuid::new_v4()),
            template_id: Set(template_id),
            deadline: Set(deadline),
            created_at: Set(Utc::now()),
        }
        .insert(txn)
        .await?;

        // Guarded by the unique (template, section) index
        for section_id in targets {
            let linked = insert_if_absent(
                txn,
                evaluation_sections::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    evaluation_id: Set(evaluation.id),
                    template_id: Set(template_id),
                    section_id: Set(*section_id),
                },
                [
                    evaluation_sections::Column::TemplateId,
                    evaluation_sections::Column::SectionId,
                ],
            )
            .await?;

            if !linked {
                let previous = evaluation_sections::Entity::find()
                    .filter(evaluation_sections::Column::TemplateId.eq(template_id))
                    .filter(evaluation_sections::Column::SectionId.eq(*section_id))
                    .one(txn)
                    .await?
                    .ok_or_else(|| vanished("evaluation section", &section_id.to_string()))?;

                return Err(EvaluationError::AlreadyEvaluated {
                    section_id: *section_id,
                    evaluation_id: previous.evaluation_id,
                });
            }
        }

        Ok(evaluation)
    }

    /// Open evaluations for the person's sections that they have not answered yet
    pub async fn pending_for(
        db: &DatabaseConnection,
        clock: &dyn Clock,
        person_id: Uuid,
    ) -> Result<Vec<evaluations::Model>, DbErr> {
        let section_ids: Vec<Uuid> = section_members::Entity::find()
            .select_only()
            .column(section_members::Column::SectionId)
            .filter(section_members::Column::PersonId.eq(person_id))
            .into_tuple()
            .all(db)
            .await?;

        if section_ids.is_empty() {
            return Ok(vec![]);
        }

        let answered: HashSet<Uuid> = answer_sets::Entity::find()
            .select_only()
            .column(answer_sets::Column::EvaluationId)
            .filter(answer_sets::Column::RespondentId.eq(person_id))
            .into_tuple::<Uuid>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        let candidates = evaluations::Entity::find()
            .join(JoinType::InnerJoin, evaluations::Relation::EvaluationSections.def())
            .filter(evaluation_sections::Column::SectionId.is_in(section_ids))
            .order_by_asc(evaluations::Column::CreatedAt)
            .all(db)
            .await?;

        let now = clock.now();
        let mut seen = HashSet::new();
        Ok(candidates
            .into_iter()
            .filter(|evaluation| seen.insert(evaluation.id))
            .filter(|evaluation| !answered.contains(&evaluation.id))
            .filter(|evaluation| evaluation.is_open_at(now))
            .collect())
    }
}
