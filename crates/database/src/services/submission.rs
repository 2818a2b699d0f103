use crate::{
    clock::Clock,
    entities::{answer_sets, answers, evaluation_sections, evaluations, questions, section_members},
    services::natural_key::insert_if_absent,
};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use models::answer::{AnswerError, AnswerRejection, AnswerValue, validate_answer};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Why a whole submission was refused; nothing is persisted in any of these cases
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("evaluation {0} does not exist")]
    EvaluationNotFound(Uuid),
    #[error("evaluation closed at {deadline}")]
    EvaluationClosed { deadline: DateTime<Utc> },
    #[error("respondent is not enrolled in any section this evaluation targets")]
    NotEnrolled,
    #[error("answers were already submitted for this evaluation")]
    DuplicateSubmission,
    #[error("{} answer(s) rejected", .0.len())]
    Rejected(Vec<AnswerRejection>),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl SubmissionError {
    /// Stable tag for API responses
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EvaluationNotFound(_) => "ReferencedEntityNotFound",
            Self::EvaluationClosed { .. } => "EvaluationClosed",
            Self::NotEnrolled => "NotEnrolled",
            Self::DuplicateSubmission => "DuplicateSubmission",
            Self::Rejected(_) => "AnswersRejected",
            Self::Database(_) => "UnexpectedFailure",
        }
    }
}

/// What a successful submission stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub answer_set_id: Uuid,
    pub evaluation_id: Uuid,
    pub respondent_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    /// Optional questions left blank are not stored
    pub answers_saved: usize,
}

pub struct SubmissionService;

impl SubmissionService {
    /// Validates and stores one respondent's answers to an evaluation.
    ///
    /// The submission is all-or-nothing: every answer is checked against its
    /// question before anything is written, and a respondent can submit only
    /// once per evaluation.
    ///
    /// # Arguments
    /// * `db` - The database connection
    /// * `clock` - Source of "now" for the deadline check
    /// * `evaluation_id` - The evaluation being answered
    /// * `respondent_id` - Id of the answering person
    /// * `answers` - Question id to raw submitted value
    pub async fn submit(
        db: &DatabaseConnection,
        clock: &dyn Clock,
        evaluation_id: Uuid,
        respondent_id: Uuid,
        answers: &Map<String, Value>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let txn = db.begin().await?;

        match Self::submit_in(&txn, clock, evaluation_id, respondent_id, answers).await {
            Ok(receipt) => {
                txn.commit().await?;
                info!(
                    "Stored {} answers for evaluation {evaluation_id}",
                    receipt.answers_saved
                );
                Ok(receipt)
            }
            Err(err) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!("Rollback failed: {rollback}");
                }
                debug!("Submission to {evaluation_id} refused: {err}");
                Err(err)
            }
        }
    }

    async fn submit_in(
        txn: &DatabaseTransaction,
        clock: &dyn Clock,
        evaluation_id: Uuid,
        respondent_id: Uuid,
        answers: &Map<String, Value>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let evaluation = evaluations::Entity::find_by_id(evaluation_id)
            .one(txn)
            .await?
            .ok_or(SubmissionError::EvaluationNotFound(evaluation_id))?;

        let now = clock.now();
        if let Some(deadline) = evaluation.deadline
            && !evaluation.is_open_at(now)
        {
            return Err(SubmissionError::EvaluationClosed { deadline });
        }

        if !Self::is_enrolled(txn, evaluation_id, respondent_id).await? {
            return Err(SubmissionError::NotEnrolled);
        }

        let already_submitted = answer_sets::Entity::find()
            .filter(answer_sets::Column::EvaluationId.eq(evaluation_id))
            .filter(answer_sets::Column::RespondentId.eq(respondent_id))
            .count(txn)
            .await?
            > 0;
        if already_submitted {
            return Err(SubmissionError::DuplicateSubmission);
        }

        let questions = questions::Entity::find()
            .filter(questions::Column::TemplateId.eq(evaluation.template_id))
            .order_by_asc(questions::Column::Position)
            .all(txn)
            .await?;

        let accepted = Self::validate_all(&questions, answers).map_err(SubmissionError::Rejected)?;

        Self::record_answers(txn, evaluation_id, respondent_id, now, accepted).await
    }

    /// Writes an answer set and its already validated answers.
    ///
    /// The answer set insert is guarded by the `(evaluation, respondent)`
    /// unique index, so a submission that lost a race to another one for the
    /// same respondent yields [`SubmissionError::DuplicateSubmission`].
    pub async fn record_answers<C>(
        conn: &C,
        evaluation_id: Uuid,
        respondent_id: Uuid,
        submitted_at: DateTime<Utc>,
        accepted: Vec<(Uuid, AnswerValue)>,
    ) -> Result<SubmissionReceipt, SubmissionError>
    where
        C: ConnectionTrait,
    {
        let answer_set_id = Uuid::new_v4();
        let inserted = insert_if_absent(
            conn,
            answer_sets::ActiveModel {
                id: Set(answer_set_id),
                evaluation_id: Set(evaluation_id),
                respondent_id: Set(respondent_id),
                submitted_at: Set(submitted_at),
            },
            [
                answer_sets::Column::EvaluationId,
                answer_sets::Column::RespondentId,
            ],
        )
        .await?;

        if !inserted {
            return Err(SubmissionError::DuplicateSubmission);
        }

        let answers_saved = accepted.len();
        if !accepted.is_empty() {
            let rows = accepted.into_iter().map(|(question_id, value)| answers::ActiveModel {
                id: Set(Uuid::new_v4()),
                answer_set_id: Set(answer_set_id),
                question_id: Set(question_id),
                value: Set(value),
            });
            answers::Entity::insert_many(rows).exec(conn).await?;
        }

        Ok(SubmissionReceipt {
            answer_set_id,
            evaluation_id,
            respondent_id,
            submitted_at,
            answers_saved,
        })
    }

    /// Whether the respondent belongs to at least one section the evaluation targets
    async fn is_enrolled(
        txn: &DatabaseTransaction,
        evaluation_id: Uuid,
        respondent_id: Uuid,
    ) -> Result<bool, DbErr> {
        let section_ids: Vec<Uuid> = evaluation_sections::Entity::find()
            .select_only()
            .column(evaluation_sections::Column::SectionId)
            .filter(evaluation_sections::Column::EvaluationId.eq(evaluation_id))
            .into_tuple()
            .all(txn)
            .await?;

        if section_ids.is_empty() {
            return Ok(false);
        }

        let memberships = section_members::Entity::find()
            .filter(section_members::Column::PersonId.eq(respondent_id))
            .filter(section_members::Column::SectionId.is_in(section_ids))
            .count(txn)
            .await?;

        Ok(memberships > 0)
    }

    /// Runs every answer through its question's rules, collecting all rejections
    fn validate_all(
        questions: &[questions::Model],
        answers: &Map<String, Value>,
    ) -> Result<Vec<(Uuid, AnswerValue)>, Vec<AnswerRejection>> {
        let mut accepted = Vec::new();
        let mut rejections = Vec::new();

        // Keys may spell the same question id differently; a repeat is rejected
        let mut submitted: HashMap<Uuid, (&String, &Value)> = HashMap::new();
        for (key, value) in answers {
            let Ok(question_id) = key.trim().parse::<Uuid>() else {
                continue;
            };
            if submitted.contains_key(&question_id) {
                let err = AnswerError::AnswerStructureInvalid(format!(
                    "question {question_id} was answered more than once"
                ));
                rejections.push(AnswerRejection::new(key.clone(), &err));
            } else {
                submitted.insert(question_id, (key, value));
            }
        }

        for question in questions {
            let submitted_value = submitted.get(&question.id);
            match validate_answer(question.rules(), submitted_value.map(|(_, value)| *value)) {
                Ok(Some(value)) => accepted.push((question.id, value)),
                Ok(None) => {}
                Err(err) => {
                    let key = submitted_value
                        .map(|(key, _)| (*key).clone())
                        .unwrap_or_else(|| question.id.to_string());
                    rejections.push(AnswerRejection::new(key, &err));
                }
            }
        }

        for key in answers.keys() {
            let known = key
                .trim()
                .parse::<Uuid>()
                .is_ok_and(|id| questions.iter().any(|question| question.id == id));
            if !known {
                rejections.push(AnswerRejection::unknown_question(key.clone()));
            }
        }

        if rejections.is_empty() {
            Ok(accepted)
        } else {
            Err(rejections)
        }
    }
}
