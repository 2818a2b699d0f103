use crate::{
    dtos::template::{CreateTemplateRequest, TemplateResponse},
    error::ApiError,
    routes::auth,
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use database::services::template::TemplateService;
use tower_oauth2_resource_server::claims::DefaultClaims;
use uuid::Uuid;

/// Create an evaluation template
#[utoipa::path(
    post,
    path = "/templates",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = TemplateResponse),
        (status = 409, description = "A template with this title already exists"),
        (status = 422, description = "Template is not valid"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Templates"
)]
pub async fn create_template(
    State(state): State<AppState>,
    claims: Extension<DefaultClaims>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<TemplateResponse>), ApiError> {
    auth::require_admin(&state, &claims).await?;

    let saved = TemplateService::create_template(&state.db, request.into()).await?;
    Ok((StatusCode::CREATED, Json(saved.into())))
}

/// Get a template and its questions
#[utoipa::path(
    get,
    path = "/templates/{id}",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    responses(
        (status = 200, description = "Template found", body = TemplateResponse),
        (status = 404, description = "Template not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Templates"
)]
pub async fn get_template(
    State(state): State<AppState>,
    claims: Extension<DefaultClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<TemplateResponse>, ApiError> {
    auth::current_person(&state, &claims).await?;

    let template = TemplateService::find_with_questions(&state.db, id).await?;
    Ok(Json(template.into()))
}
