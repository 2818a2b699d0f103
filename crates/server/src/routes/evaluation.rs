use crate::{
    dtos::evaluation::{CreateEvaluationRequest, EvaluationResponse, SubmitAnswersRequest},
    error::ApiError,
    routes::auth,
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use database::services::{
    evaluation::EvaluationService,
    results::ResultsService,
    submission::{SubmissionReceipt, SubmissionService},
};
use models::results::EvaluationSummary;
use tower_oauth2_resource_server::claims::DefaultClaims;
use uuid::Uuid;

/// Send a template to one or more sections
#[utoipa::path(
    post,
    path = "/evaluations",
    request_body = CreateEvaluationRequest,
    responses(
        (status = 201, description = "Evaluation created", body = EvaluationResponse),
        (status = 404, description = "Template or section not found"),
        (status = 409, description = "A section already received this template"),
        (status = 422, description = "Template has no questions or no sections were given"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Evaluations"
)]
pub async fn create_evaluation(
    State(state): State<AppState>,
    claims: Extension<DefaultClaims>,
    Json(request): Json<CreateEvaluationRequest>,
) -> Result<(StatusCode, Json<EvaluationResponse>), ApiError> {
    auth::require_admin(&state, &claims).await?;

    let evaluation = EvaluationService::create_evaluation(
        &state.db,
        request.template_id,
        &request.section_ids,
        request.deadline,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(evaluation.into())))
}

/// Evaluations the caller still has to answer
#[utoipa::path(
    get,
    path = "/evaluations/pending",
    responses(
        (status = 200, description = "Open evaluations not yet answered", body = Vec<EvaluationResponse>),
        (status = 401, description = "Unauthorized - invalid or missing JWT"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Evaluations"
)]
pub async fn get_pending(
    State(state): State<AppState>,
    claims: Extension<DefaultClaims>,
) -> Result<Json<Vec<EvaluationResponse>>, ApiError> {
    let person = auth::current_person(&state, &claims).await?;

    let pending = EvaluationService::pending_for(&state.db, state.clock.as_ref(), person.id).await?;
    Ok(Json(pending.into_iter().map(Into::into).collect()))
}

/// Submit the caller's answers to an evaluation
#[utoipa::path(
    post,
    path = "/evaluations/{id}/submissions",
    params(
        ("id" = Uuid, Path, description = "Evaluation ID")
    ),
    request_body = SubmitAnswersRequest,
    responses(
        (status = 201, description = "Answers stored"),
        (status = 403, description = "Caller is not enrolled in a targeted section"),
        (status = 404, description = "Evaluation not found"),
        (status = 409, description = "Already submitted, or the deadline has passed"),
        (status = 422, description = "One or more answers were rejected; see `details`"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Evaluations"
)]
pub async fn submit_answers(
    State(state): State<AppState>,
    claims: Extension<DefaultClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitAnswersRequest>,
) -> Result<(StatusCode, Json<SubmissionReceipt>), ApiError> {
    let person = auth::current_person(&state, &claims).await?;

    let receipt = SubmissionService::submit(
        &state.db,
        state.clock.as_ref(),
        id,
        person.id,
        &request.answers,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Aggregated answers of an evaluation
#[utoipa::path(
    get,
    path = "/evaluations/{id}/results",
    params(
        ("id" = Uuid, Path, description = "Evaluation ID")
    ),
    responses(
        (status = 200, description = "Respondent count and per-question tallies"),
        (status = 404, description = "Evaluation not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Evaluations"
)]
pub async fn get_results(
    State(state): State<AppState>,
    claims: Extension<DefaultClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<EvaluationSummary>, ApiError> {
    auth::require_admin(&state, &claims).await?;

    ResultsService::summarize(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("evaluation {id} does not exist")))
}
