use crate::{error::ApiError, state::AppState};
use database::{entities::people, services::person::PersonService};
use tower_oauth2_resource_server::claims::DefaultClaims;

/// Resolves the JWT subject (a registration id) to a person
pub async fn current_person(
    state: &AppState,
    claims: &DefaultClaims,
) -> Result<people::Model, ApiError> {
    let sub = claims.sub.as_ref().ok_or_else(ApiError::unauthorized)?;

    PersonService::find_by_registration_id(&state.db, sub)
        .await?
        .ok_or_else(|| ApiError::forbidden(format!("no account for `{sub}`")))
}

/// Like [`current_person`], but only for administrators
pub async fn require_admin(
    state: &AppState,
    claims: &DefaultClaims,
) -> Result<people::Model, ApiError> {
    let person = current_person(state, claims).await?;
    if person.admin {
        Ok(person)
    } else {
        Err(ApiError::forbidden("administrator access required"))
    }
}
