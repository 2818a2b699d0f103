use models::import_data::ImportMode;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ImportQueryParams {
    /// `create_missing` (default) or `attach_to_existing`
    #[param(value_type = Option<String>)]
    #[serde(default)]
    pub mode: ImportMode,
}
