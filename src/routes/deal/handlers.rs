use actix_web::http::header::{CACHE_CONTROL, LOCATION};
use actix_web::{web, HttpResponse};

use super::schemas::{
    Deal, DealCreateRequest, DealIdQuery, DealItemData, DealListData, DealListQuery,
    DealUpdateRequest,
};
use super::utils::{
    admin_deal_filter, create_deal, delete_deal, public_deal_filter, redirect_location,
    update_deal,
};
use crate::configuration::StorefrontConfig;
use crate::constants::PUBLIC_DEAL_CACHE_CONTROL;
use crate::errors::GenericError;
use crate::repository::CommerceRepository;
use crate::schemas::{GenericResponse, OkData};
use crate::shopee_client::ShopeeClient;

#[utoipa::path(
    get,
    path = "/api/deals",
    tag = "Deals",
    responses(
        (status=200, description= "Active deals, newest first", body= GenericResponse<DealListData>),
    )
)]
#[tracing::instrument(name = "List public deals", skip(repository))]
pub async fn list_public_deals(
    repository: web::Data<dyn CommerceRepository>,
) -> Result<HttpResponse, GenericError> {
    let items: Vec<Deal> = repository
        .list_deals(&public_deal_filter())
        .await
        .map_err(|e| GenericError::DatabaseError("Failed to fetch deals".to_string(), e))?
        .into_iter()
        .map(|deal| deal.into_schema())
        .collect();
    Ok(HttpResponse::Ok()
        .insert_header((CACHE_CONTROL, PUBLIC_DEAL_CACHE_CONTROL))
        .json(GenericResponse::success(
            "Successfully fetched deals",
            Some(DealListData { items }),
        )))
}

#[utoipa::path(
    get,
    path = "/api/admin/deals",
    tag = "Deals Admin",
    params(
        ("x-admin-key" = String, Header, description = "Admin key"),
        ("source" = Option<String>, Query, description = "Only deals from this source"),
    ),
    responses(
        (status=200, description= "All deals, newest first", body= GenericResponse<DealListData>),
    )
)]
#[tracing::instrument(name = "List admin deals", skip(repository))]
pub async fn list_admin_deals(
    query: web::Query<DealListQuery>,
    repository: web::Data<dyn CommerceRepository>,
) -> Result<web::Json<GenericResponse<DealListData>>, GenericError> {
    let items = repository
        .list_deals(&admin_deal_filter(query.source.as_deref()))
        .await
        .map_err(|e| GenericError::DatabaseError("Failed to fetch deals".to_string(), e))?
        .into_iter()
        .map(|deal| deal.into_schema())
        .collect();
    Ok(web::Json(GenericResponse::success(
        "Successfully fetched deals",
        Some(DealListData { items }),
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/deals",
    tag = "Deals Admin",
    request_body(content = DealCreateRequest, description = "Request Body"),
    params(("x-admin-key" = String, Header, description = "Admin key")),
    responses(
        (status=200, description= "Created deal", body= GenericResponse<DealItemData>),
    )
)]
#[tracing::instrument(name = "Create deal", skip(repository, shopee_client, config))]
pub async fn create_deal_req(
    body: DealCreateRequest,
    repository: web::Data<dyn CommerceRepository>,
    shopee_client: web::Data<ShopeeClient>,
    config: web::Data<StorefrontConfig>,
) -> Result<web::Json<GenericResponse<DealItemData>>, GenericError> {
    let deal = create_deal(repository.get_ref(), &shopee_client, &config, &body).await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully created deal",
        Some(DealItemData {
            item: deal.into_schema(),
        }),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/admin/deals",
    tag = "Deals Admin",
    request_body(content = DealUpdateRequest, description = "Request Body"),
    params(("x-admin-key" = String, Header, description = "Admin key")),
    responses(
        (status=200, description= "Updated deal", body= GenericResponse<DealItemData>),
        (status=409, description= "Slug already used"),
    )
)]
#[tracing::instrument(name = "Update deal", skip(repository))]
pub async fn update_deal_req(
    body: DealUpdateRequest,
    repository: web::Data<dyn CommerceRepository>,
) -> Result<web::Json<GenericResponse<DealItemData>>, GenericError> {
    let deal = update_deal(repository.get_ref(), &body).await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully updated deal",
        Some(DealItemData {
            item: deal.into_schema(),
        }),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/deals",
    tag = "Deals Admin",
    params(
        ("x-admin-key" = String, Header, description = "Admin key"),
        ("id" = Option<String>, Query, description = "Deal id, may also be sent in the body"),
    ),
    responses(
        (status=200, description= "Deleted deal", body= GenericResponse<OkData>),
    )
)]
#[tracing::instrument(name = "Delete deal", skip(repository))]
pub async fn delete_deal_req(
    query: web::Query<DealIdQuery>,
    body: Option<web::Json<DealIdQuery>>,
    repository: web::Data<dyn CommerceRepository>,
) -> Result<web::Json<GenericResponse<OkData>>, GenericError> {
    let id = query.id.or_else(|| body.and_then(|body| body.id));
    delete_deal(repository.get_ref(), id).await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully deleted deal",
        Some(OkData::new()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/go/{slug}",
    tag = "Deals",
    params(("slug" = String, Path, description = "Deal slug")),
    responses(
        (status=302, description= "Redirect to the affiliate link or to /"),
    )
)]
#[tracing::instrument(name = "Deal redirect", skip(repository))]
pub async fn go_redirect(
    path: web::Path<String>,
    repository: web::Data<dyn CommerceRepository>,
) -> HttpResponse {
    let location = redirect_location(repository.get_ref(), &path).await;
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}
