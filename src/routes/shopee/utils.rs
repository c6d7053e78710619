use regex::Regex;
use serde_json::Value;

use super::schemas::{OpenGraphData, ProductIds};
use crate::constants::{
    CDN_URL_PATTERNS, JSON_IMAGE_PATTERNS, META_IMAGE_PATTERNS, OG_IMAGE_PATTERNS,
    OG_TITLE_PATTERNS, PRODUCT_ID_PATTERNS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemApiVersion {
    V4,
    V2,
}

impl ItemApiVersion {
    pub fn path(&self) -> &'static str {
        match self {
            ItemApiVersion::V4 => "/api/v4/item/get",
            ItemApiVersion::V2 => "/api/v2/item/get",
        }
    }

    /// Where the first image hash sits in each payload shape, in lookup order.
    fn image_pointers(&self) -> [&'static str; 3] {
        match self {
            ItemApiVersion::V4 => ["/data/images/0", "/data/item/images/0", "/item/images/0"],
            ItemApiVersion::V2 => ["/item/images/0", "/data/item/images/0", "/data/images/0"],
        }
    }
}

pub fn extract_product_ids(url: &str) -> Option<ProductIds> {
    PRODUCT_ID_PATTERNS.iter().find_map(|pattern| {
        pattern.captures(url).map(|caps| ProductIds {
            shopid: caps[1].to_string(),
            itemid: caps[2].to_string(),
        })
    })
}

/// Undoes the slash escaping found in embedded JSON (`/`, `\\/`, `\/`).
pub fn normalize_html(html: &str) -> String {
    html.replace("\\u002F", "/")
        .replace("\\u002f", "/")
        .replace("\\\\/", "/")
        .replace("\\/", "/")
}

/// Absolute URLs are kept, bare hashes are prefixed with the CDN base.
pub fn build_cdn_url(cdn_base_url: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }
    let lowered = value.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return value.to_string();
    }
    format!("{}{}", cdn_base_url, value)
}

pub fn first_cdn_url(text: &str) -> Option<String> {
    CDN_URL_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(text).map(|m| m.as_str().to_string()))
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

pub fn pick_meta_image(html: &str) -> Option<String> {
    first_capture(&META_IMAGE_PATTERNS, html)
}

pub fn pick_json_image(html: &str) -> Option<String> {
    first_capture(&JSON_IMAGE_PATTERNS, html)
}

pub fn image_from_item_json(
    payload: &Value,
    version: ItemApiVersion,
    cdn_base_url: &str,
) -> Option<String> {
    version
        .image_pointers()
        .iter()
        .find_map(|pointer| payload.pointer(pointer).and_then(Value::as_str))
        .map(|hash| build_cdn_url(cdn_base_url, hash))
        .filter(|url| !url.is_empty())
}

/// Meta tags first, then image keys of embedded JSON, then any CDN url.
/// Expects html already passed through [`normalize_html`].
pub fn parse_html_image(html: &str, cdn_base_url: &str) -> Option<String> {
    if let Some(meta) = pick_meta_image(html) {
        return Some(meta);
    }
    if let Some(in_json) = pick_json_image(html) {
        return Some(build_cdn_url(cdn_base_url, &in_json));
    }
    first_cdn_url(html)
}

pub fn pick_open_graph(html: &str) -> OpenGraphData {
    OpenGraphData {
        title: first_capture(&OG_TITLE_PATTERNS, html),
        image: first_capture(&OG_IMAGE_PATTERNS, html),
    }
}
