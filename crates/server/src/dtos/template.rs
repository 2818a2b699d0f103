use database::{entities::questions, services::template::TemplateWithQuestions};
use models::question::{QuestionDraft, QuestionType, TemplateDraft};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTemplateRequest {
    pub title: String,
    pub questions: Vec<QuestionRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuestionRequest {
    pub prompt: String,
    /// One of `scale`, `text`, `checkbox`
    pub question_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

impl From<CreateTemplateRequest> for TemplateDraft {
    fn from(request: CreateTemplateRequest) -> Self {
        TemplateDraft {
            title: request.title,
            questions: request
                .questions
                .into_iter()
                .map(|question| QuestionDraft {
                    prompt: question.prompt,
                    question_type: QuestionType::from(question.question_type),
                    required: question.required,
                    options: question.options,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateResponse {
    pub id: String,
    pub title: String,
    pub questions: Vec<QuestionResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionResponse {
    pub id: String,
    pub position: i32,
    pub prompt: String,
    pub question_type: String,
    pub required: bool,
    pub options: Vec<String>,
}

impl From<questions::Model> for QuestionResponse {
    fn from(question: questions::Model) -> Self {
        Self {
            id: question.id.to_string(),
            position: question.position,
            prompt: question.prompt,
            question_type: question.question_type.to_string(),
            required: question.required,
            options: question.options.0,
        }
    }
}

impl From<TemplateWithQuestions> for TemplateResponse {
    fn from(saved: TemplateWithQuestions) -> Self {
        Self {
            id: saved.template.id.to_string(),
            title: saved.template.title,
            questions: saved.questions.into_iter().map(Into::into).collect(),
        }
    }
}
