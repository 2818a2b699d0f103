use crate::{dtos::import::ImportQueryParams, error::ApiError, routes::auth, state::AppState};
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Query, State},
};
use database::services::import::ImportService;
use models::import_report::ImportReport;
use tower_oauth2_resource_server::claims::DefaultClaims;

/// Import disciplines, sections and rosters from a JSON upload
#[utoipa::path(
    post,
    path = "/imports/sections",
    params(ImportQueryParams),
    request_body(content = String, description = "JSON array of section records", content_type = "application/json"),
    responses(
        (status = 200, description = "Per-record outcomes; failed records are listed in `error_list`"),
        (status = 400, description = "Payload is not a JSON array"),
        (status = 401, description = "Unauthorized - invalid or missing JWT"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Imports"
)]
pub async fn import_sections(
    State(state): State<AppState>,
    claims: Extension<DefaultClaims>,
    Query(params): Query<ImportQueryParams>,
    body: Bytes,
) -> Result<Json<ImportReport>, ApiError> {
    auth::require_admin(&state, &claims).await?;

    let report =
        ImportService::import_sections(&state.db, &body, params.mode, state.provisioner.as_ref())
            .await?;

    Ok(Json(report))
}
