use crate::{
    dtos::{
        evaluation::{CreateEvaluationRequest, EvaluationResponse, SubmitAnswersRequest},
        template::{CreateTemplateRequest, QuestionRequest, QuestionResponse, TemplateResponse},
    },
    routes::{evaluation, health, import, template},
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        import::import_sections,
        template::create_template,
        template::get_template,
        evaluation::create_evaluation,
        evaluation::get_pending,
        evaluation::submit_answers,
        evaluation::get_results
    ),
    components(schemas(
        CreateTemplateRequest,
        QuestionRequest,
        TemplateResponse,
        QuestionResponse,
        CreateEvaluationRequest,
        EvaluationResponse,
        SubmitAnswersRequest
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Imports", description = "Bulk roster imports"),
        (name = "Templates", description = "Evaluation templates"),
        (name = "Evaluations", description = "Evaluations, submissions and results"),
    ),
    info(
        title = "Course Evaluation API",
        version = "1.0.0",
        description = "Roster imports and course evaluations",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;
