use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which pieces of configuration are present. Secret values are never
/// included, only whether they are set.
#[derive(Serialize, Deserialize, Debug, ToSchema, PartialEq)]
pub struct EnvCheckData {
    pub backend: String,
    pub rest_url: Option<String>,
    pub rest_key_present: bool,
    pub postgres_host: Option<String>,
    pub headless_enabled: bool,
    pub bank_configured: bool,
    pub admin_key_present: bool,
}
