use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::services::{
    evaluation::EvaluationError, import::ImportError, submission::SubmissionError,
    template::TemplateError,
};
use log::error;
use sea_orm::DbErr;
use serde_json::{Value, json};

/// Error returned by any route, rendered as `{ type, message, details? }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
    details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", "missing subject in token")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "ReferencedEntityNotFound", message)
    }

    fn internal(err: impl std::fmt::Display) -> Self {
        error!("Request failed: {err}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "UnexpectedFailure",
            "internal server error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "type": self.kind,
            "message": self.message,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }

        (self.status, Json(body)).into_response()
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::internal(err)
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::MalformedPayload(_) => {
                Self::new(StatusCode::BAD_REQUEST, "MalformedPayload", err.to_string())
            }
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        let kind = err.kind();
        match err {
            SubmissionError::EvaluationNotFound(_) => Self::not_found(err.to_string()),
            SubmissionError::EvaluationClosed { .. } | SubmissionError::DuplicateSubmission => {
                Self::new(StatusCode::CONFLICT, kind, err.to_string())
            }
            SubmissionError::NotEnrolled => Self::new(StatusCode::FORBIDDEN, kind, err.to_string()),
            SubmissionError::Rejected(ref rejections) => {
                let details = json!(rejections);
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, kind, err.to_string())
                    .with_details(details)
            }
            SubmissionError::Database(db) => Self::internal(db),
        }
    }
}

impl From<TemplateError> for ApiError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::Invalid(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "InvalidTemplate", err.to_string())
            }
            TemplateError::DuplicateTitle(_) => {
                Self::new(StatusCode::CONFLICT, "DuplicateTitle", err.to_string())
            }
            TemplateError::NotFound(_) => Self::not_found(err.to_string()),
            TemplateError::Database(db) => Self::internal(db),
        }
    }
}

impl From<EvaluationError> for ApiError {
    fn from(err: EvaluationError) -> Self {
        match err {
            EvaluationError::TemplateNotFound(_) | EvaluationError::SectionNotFound(_) => {
                Self::not_found(err.to_string())
            }
            EvaluationError::EmptyTemplate(_) | EvaluationError::NoSections => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "InvalidEvaluation", err.to_string())
            }
            EvaluationError::AlreadyEvaluated { .. } => {
                Self::new(StatusCode::CONFLICT, "AlreadyEvaluated", err.to_string())
            }
            EvaluationError::Database(db) => Self::internal(db),
        }
    }
}
