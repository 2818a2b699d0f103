use chrono::{DateTime, Utc};
use database::entities::evaluations;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEvaluationRequest {
    pub template_id: Uuid,
    pub section_ids: Vec<Uuid>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EvaluationResponse {
    pub id: String,
    pub template_id: String,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<evaluations::Model> for EvaluationResponse {
    fn from(evaluation: evaluations::Model) -> Self {
        Self {
            id: evaluation.id.to_string(),
            template_id: evaluation.template_id.to_string(),
            deadline: evaluation.deadline,
            created_at: evaluation.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAnswersRequest {
    /// Question id to submitted value: a string for text questions, an
    /// option index for scale questions, a list of indices for checkboxes
    #[schema(value_type = Object)]
    pub answers: Map<String, Value>,
}
