use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::impl_json_request;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ProductIds {
    pub shopid: String,
    pub itemid: String,
}

/// One step of the image resolution chain, reported back with `debug=1`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TraceStep {
    FinalUrl { final_url: String },
    Ids { ids: Option<ProductIds> },
    ApiV4Ok,
    ApiV4Error { error: String },
    ApiV2Ok,
    ApiV2Error { error: String },
    HtmlStatus { status: u16 },
    HtmlLen { len: usize },
    CdnFromResponses { count: usize },
    OgImage,
    CdnFromDomImg,
    CdnFromDomBg,
    CdnFromHtml,
    DomError { stage: String, error: String },
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ImageResolveQuery {
    pub url: Option<String>,
    pub debug: Option<String>,
}

impl ImageResolveQuery {
    pub fn debug_enabled(&self) -> bool {
        self.debug.as_deref() == Some("1")
    }

    pub fn target_url(&self) -> Option<String> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ImageResolveData {
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<TraceStep>>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ImageTraceData {
    pub trace: Vec<TraceStep>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, ToSchema)]
pub struct OpenGraphData {
    pub title: Option<String>,
    pub image: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct OpenGraphQuery {
    pub url: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct OpenGraphRequest {
    pub url: Option<String>,
}
impl_json_request!(OpenGraphRequest);
