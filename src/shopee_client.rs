use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use serde_json::Value;

use crate::configuration::ShopeeConfig;
use crate::constants::{
    ACCEPT_LANGUAGE as SHOPEE_ACCEPT_LANGUAGE, DESKTOP_USER_AGENT, MAC_USER_AGENT,
    OG_ACCEPT_LANGUAGE,
};
use crate::routes::shopee::schemas::{OpenGraphData, ProductIds, TraceStep};
use crate::routes::shopee::utils::{
    extract_product_ids, image_from_item_json, normalize_html, parse_html_image, pick_open_graph,
    ItemApiVersion,
};

/// HTTP side of the product image lookup plus the Open Graph scrape.
#[derive(Debug)]
pub struct ShopeeClient {
    http_client: Client,
    base_url: String,
    cdn_base_url: String,
}

impl ShopeeClient {
    #[tracing::instrument]
    pub fn new(config: &ShopeeConfig) -> Result<Self, anyhow::Error> {
        tracing::info!("Building the Shopee http client.");
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DESKTOP_USER_AGENT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(SHOPEE_ACCEPT_LANGUAGE),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        let http_client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .context("Failed to build the Shopee http client")?;
        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cdn_base_url: config.cdn_base_url.clone(),
        })
    }

    pub fn cdn_base_url(&self) -> &str {
        &self.cdn_base_url
    }

    /// Follows redirects (short links) and returns where they land.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_final_url(&self, url: &str) -> Result<String, anyhow::Error> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;
        Ok(response.url().to_string())
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, anyhow::Error> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("Upstream {}", status.as_u16()));
        }
        Ok(response.json::<Value>().await?)
    }

    async fn fetch_item_image_with(
        &self,
        ids: &ProductIds,
        version: ItemApiVersion,
    ) -> Result<Option<String>, anyhow::Error> {
        let url = format!(
            "{}{}?itemid={}&shopid={}",
            self.base_url,
            version.path(),
            ids.itemid,
            ids.shopid
        );
        let payload = self.fetch_json(&url).await?;
        Ok(image_from_item_json(&payload, version, &self.cdn_base_url))
    }

    /// Item API v4, then v2. Failures are recorded and skipped.
    #[tracing::instrument(skip(self, trace))]
    pub async fn fetch_item_image(
        &self,
        ids: &ProductIds,
        trace: &mut Vec<TraceStep>,
    ) -> Option<String> {
        match self.fetch_item_image_with(ids, ItemApiVersion::V4).await {
            Ok(image) => {
                trace.push(TraceStep::ApiV4Ok);
                if image.is_some() {
                    return image;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "item api v4 failed");
                trace.push(TraceStep::ApiV4Error {
                    error: e.to_string(),
                });
            }
        }
        match self.fetch_item_image_with(ids, ItemApiVersion::V2).await {
            Ok(image) => {
                trace.push(TraceStep::ApiV2Ok);
                image
            }
            Err(e) => {
                tracing::warn!(error = %e, "item api v2 failed");
                trace.push(TraceStep::ApiV2Error {
                    error: e.to_string(),
                });
                None
            }
        }
    }

    #[tracing::instrument(skip(self, trace))]
    pub async fn fetch_html_image(
        &self,
        url: &str,
        trace: &mut Vec<TraceStep>,
    ) -> Result<Option<String>, anyhow::Error> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;
        let status = response.status();
        if !status.is_success() {
            trace.push(TraceStep::HtmlStatus {
                status: status.as_u16(),
            });
            return Ok(None);
        }
        let raw = response
            .text()
            .await
            .context("Failed to read product page")?;
        let html = normalize_html(&raw);
        trace.push(TraceStep::HtmlLen { len: html.len() });
        Ok(parse_html_image(&html, &self.cdn_base_url))
    }

    /// Runs the HTTP chain: final url, item APIs, then the product page html.
    /// `Ok(None)` means every step came back empty.
    #[tracing::instrument(name = "Resolve Shopee image", skip(self, trace))]
    pub async fn resolve_image(
        &self,
        url: &str,
        trace: &mut Vec<TraceStep>,
    ) -> Result<Option<String>, anyhow::Error> {
        let final_url = self.resolve_final_url(url).await?;
        trace.push(TraceStep::FinalUrl {
            final_url: final_url.clone(),
        });

        let ids = extract_product_ids(&final_url);
        trace.push(TraceStep::Ids { ids: ids.clone() });
        if let Some(ids) = &ids {
            if let Some(image) = self.fetch_item_image(ids, trace).await {
                return Ok(Some(image));
            }
        }

        self.fetch_html_image(&final_url, trace).await
    }

    #[tracing::instrument(name = "Fetch Open Graph", skip(self))]
    pub async fn fetch_open_graph(&self, url: &str) -> Result<OpenGraphData, anyhow::Error> {
        let html = self
            .http_client
            .get(url)
            .header(USER_AGENT, MAC_USER_AGENT)
            .header(ACCEPT_LANGUAGE, OG_ACCEPT_LANGUAGE)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .text()
            .await
            .context("Failed to read page body")?;
        Ok(pick_open_graph(&html))
    }
}
