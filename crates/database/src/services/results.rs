use crate::entities::{answer_sets, answers, evaluations, questions, templates};
use models::{
    answer::AnswerValue,
    results::{EvaluationSummary, QuestionSummary},
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;
use uuid::Uuid;

pub struct ResultsService;

impl ResultsService {
    /// Aggregates every submitted answer set of an evaluation
    ///
    /// # Returns
    /// `None` if the evaluation does not exist
    pub async fn summarize(
        db: &DatabaseConnection,
        evaluation_id: Uuid,
    ) -> Result<Option<EvaluationSummary>, DbErr> {
        let Some(evaluation) = evaluations::Entity::find_by_id(evaluation_id).one(db).await? else {
            return Ok(None);
        };

        let template = templates::Entity::find_by_id(evaluation.template_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("template {}", evaluation.template_id))
            })?;

        let questions = questions::Entity::find()
            .filter(questions::Column::TemplateId.eq(template.id))
            .order_by_asc(questions::Column::Position)
            .all(db)
            .await?;

        let answer_set_ids: Vec<Uuid> = answer_sets::Entity::find()
            .select_only()
            .column(answer_sets::Column::Id)
            .filter(answer_sets::Column::EvaluationId.eq(evaluation_id))
            .into_tuple()
            .all(db)
            .await?;

        let mut by_question: HashMap<Uuid, Vec<AnswerValue>> = HashMap::new();
        if !answer_set_ids.is_empty() {
            let rows = answers::Entity::find()
                .filter(answers::Column::AnswerSetId.is_in(answer_set_ids.iter().copied()))
                .all(db)
                .await?;

            for row in rows {
                by_question.entry(row.question_id).or_default().push(row.value);
            }
        }

        let questions = questions
            .into_iter()
            .map(|question| {
                let answers = by_question.remove(&question.id).unwrap_or_default();
                QuestionSummary::build(
                    question.id,
                    question.prompt,
                    question.question_type,
                    question.options.as_slice(),
                    &answers,
                )
            })
            .collect();

        Ok(Some(EvaluationSummary {
            evaluation_id,
            template_title: template.title,
            respondents: answer_set_ids.len(),
            questions,
        }))
    }
}
