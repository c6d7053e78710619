use actix_web::web;

use super::errors::ImageResolveError;
use super::schemas::{
    ImageResolveData, ImageResolveQuery, OpenGraphData, OpenGraphQuery, OpenGraphRequest,
    TraceStep,
};
use crate::headless_client::HeadlessClient;
use crate::schemas::GenericResponse;
use crate::shopee_client::ShopeeClient;

fn resolved(
    outcome: Result<Option<String>, anyhow::Error>,
    trace: Vec<TraceStep>,
    debug: bool,
    failure_message: &str,
) -> Result<web::Json<GenericResponse<ImageResolveData>>, ImageResolveError> {
    let trace = debug.then_some(trace);
    match outcome {
        Ok(Some(image)) => Ok(web::Json(GenericResponse::success(
            "Successfully resolved image",
            Some(ImageResolveData { image, trace }),
        ))),
        Ok(None) => Err(ImageResolveError::NotFoundError(trace)),
        Err(source) => Err(ImageResolveError::UpstreamError {
            message: failure_message.to_string(),
            source,
            trace,
        }),
    }
}

#[utoipa::path(
    get,
    path = "/api/utils/shopee-image",
    tag = "Image Resolution",
    params(
        ("url" = String, Query, description = "Product or short link"),
        ("debug" = Option<String>, Query, description = "1 to include the step trace"),
    ),
    responses(
        (status=200, description= "Resolved product image", body= GenericResponse<ImageResolveData>),
        (status=404, description= "No image found"),
    )
)]
#[tracing::instrument(name = "Resolve product image", skip(client))]
pub async fn resolve_image(
    query: web::Query<ImageResolveQuery>,
    client: web::Data<ShopeeClient>,
) -> Result<web::Json<GenericResponse<ImageResolveData>>, ImageResolveError> {
    let url = query
        .target_url()
        .ok_or_else(|| ImageResolveError::ValidationError("Missing url".to_string()))?;
    let mut trace = vec![];
    let outcome = client.resolve_image(&url, &mut trace).await;
    resolved(outcome, trace, query.debug_enabled(), "Fetch failed")
}

#[utoipa::path(
    get,
    path = "/api/utils/shopee-image-headless",
    tag = "Image Resolution",
    params(
        ("url" = String, Query, description = "Product or short link"),
        ("debug" = Option<String>, Query, description = "1 to include the step trace"),
    ),
    responses(
        (status=200, description= "Resolved product image", body= GenericResponse<ImageResolveData>),
        (status=404, description= "No image found"),
        (status=501, description= "Headless browser disabled"),
    )
)]
#[tracing::instrument(name = "Resolve product image in browser", skip(client))]
pub async fn resolve_image_headless(
    query: web::Query<ImageResolveQuery>,
    client: web::Data<HeadlessClient>,
) -> Result<web::Json<GenericResponse<ImageResolveData>>, ImageResolveError> {
    let url = query
        .target_url()
        .ok_or_else(|| ImageResolveError::ValidationError("Missing url".to_string()))?;
    if !client.is_enabled() {
        return Err(ImageResolveError::NotImplementedError(
            "Headless browser is disabled".to_string(),
        ));
    }
    let mut trace = vec![];
    let outcome = client.resolve_image(&url, &mut trace).await;
    resolved(outcome, trace, query.debug_enabled(), "Headless failed")
}

async fn scrape_open_graph(
    url: Option<String>,
    client: &ShopeeClient,
) -> Result<web::Json<GenericResponse<OpenGraphData>>, ImageResolveError> {
    let url = url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ImageResolveError::ValidationError("missing_url".to_string()))?;
    let data = client
        .fetch_open_graph(&url)
        .await
        .map_err(|source| ImageResolveError::UpstreamError {
            message: "fetch_failed".to_string(),
            source,
            trace: None,
        })?;
    Ok(web::Json(GenericResponse::success(
        "Successfully fetched Open Graph data",
        Some(data),
    )))
}

#[utoipa::path(
    get,
    path = "/api/shopee/og",
    tag = "Image Resolution",
    params(("url" = String, Query, description = "Page to scrape")),
    responses(
        (status=200, description= "Open Graph title and image", body= GenericResponse<OpenGraphData>),
    )
)]
#[tracing::instrument(name = "Open Graph scrape", skip(client))]
pub async fn open_graph(
    query: web::Query<OpenGraphQuery>,
    client: web::Data<ShopeeClient>,
) -> Result<web::Json<GenericResponse<OpenGraphData>>, ImageResolveError> {
    scrape_open_graph(query.into_inner().url, &client).await
}

#[utoipa::path(
    post,
    path = "/api/shopee/og",
    tag = "Image Resolution",
    request_body(content = OpenGraphRequest, description = "Request Body"),
    responses(
        (status=200, description= "Open Graph title and image", body= GenericResponse<OpenGraphData>),
    )
)]
#[tracing::instrument(name = "Open Graph scrape", skip(client))]
pub async fn open_graph_post(
    query: web::Query<OpenGraphQuery>,
    body: Option<OpenGraphRequest>,
    client: web::Data<ShopeeClient>,
) -> Result<web::Json<GenericResponse<OpenGraphData>>, ImageResolveError> {
    let url = query
        .into_inner()
        .url
        .or_else(|| body.and_then(|body| body.url));
    scrape_open_graph(url, &client).await
}
