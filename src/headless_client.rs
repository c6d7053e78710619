use std::ffi::OsStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;

use crate::configuration::HeadlessConfig;
use crate::constants::{ACCEPT_LANGUAGE, DESKTOP_USER_AGENT};
use crate::routes::shopee::schemas::{ProductIds, TraceStep};
use crate::routes::shopee::utils::{build_cdn_url, extract_product_ids, first_cdn_url};
use crate::utils::spawn_blocking_with_tracing;

const SCROLL_ROUNDS: usize = 3;
const SCROLL_PAUSE: Duration = Duration::from_millis(700);

const SCROLL_SCRIPT: &str = "window.scrollBy(0, 600); JSON.stringify(null)";
const OG_IMAGE_SCRIPT: &str = r#"JSON.stringify(Array.from(document.querySelectorAll('meta[property="og:image"]')).map(e => e.content).filter(Boolean))"#;
const IMG_SOURCES_SCRIPT: &str = r#"JSON.stringify(Array.from(document.querySelectorAll('img')).flatMap(img => [(img.getAttribute('src') || '').trim(), (img.getAttribute('srcset') || '').trim()]).filter(Boolean))"#;
const BACKGROUND_IMAGES_SCRIPT: &str = r#"JSON.stringify(Array.from(document.querySelectorAll('*')).map(n => (n.style && n.style.backgroundImage) || '').filter(Boolean))"#;

/// Same-origin fetch of the item APIs from inside the page, so the request
/// carries the page's cookies. Resolves to `{"src": ...}` or `null`.
fn item_api_script(ids: &ProductIds) -> String {
    format!(
        r#"(async () => {{
  const getJson = async (endpoint) => {{
    try {{
      const r = await fetch(endpoint, {{ credentials: 'include' }});
      if (!r.ok) return null;
      return await r.json();
    }} catch (e) {{
      return null;
    }}
  }};
  const first = (...lists) => {{
    for (const list of lists) {{
      if (Array.isArray(list) && list.length) return list[0];
    }}
    return null;
  }};
  const v4 = await getJson('/api/v4/item/get?itemid={itemid}&shopid={shopid}');
  const fromV4 = first(v4?.data?.images, v4?.data?.item?.images, v4?.item?.images);
  if (fromV4) return JSON.stringify({{ src: fromV4 }});
  const v2 = await getJson('/api/v2/item/get?itemid={itemid}&shopid={shopid}');
  const fromV2 = first(v2?.item?.images, v2?.data?.item?.images, v2?.data?.images);
  if (fromV2) return JSON.stringify({{ src: fromV2 }});
  return JSON.stringify(null);
}})()"#,
        itemid = ids.itemid,
        shopid = ids.shopid
    )
}

/// The few page operations the browser fallback needs.
pub trait BrowserPage {
    fn current_url(&self) -> String;
    /// Evaluates a script whose value is a `JSON.stringify(...)` string and
    /// parses it.
    fn evaluate_json(&self, script: &str) -> Result<Value, anyhow::Error>;
    fn content(&self) -> Result<String, anyhow::Error>;
    fn pause(&self, duration: Duration);
    /// Image CDN urls of the responses received since navigation started,
    /// in arrival order.
    fn seen_resources(&self) -> Vec<String>;
}

fn dom_strings(
    page: &dyn BrowserPage,
    script: &str,
    stage: &str,
    trace: &mut Vec<TraceStep>,
) -> Vec<String> {
    let result = page
        .evaluate_json(script)
        .and_then(|value| {
            serde_json::from_value::<Vec<String>>(value).map_err(anyhow::Error::from)
        });
    match result {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(stage, error = %e, "page evaluation failed");
            trace.push(TraceStep::DomError {
                stage: stage.to_string(),
                error: e.to_string(),
            });
            vec![]
        }
    }
}

/// Looks for the product image on an already loaded page: in-page item
/// APIs, loaded resources, `og:image`, `<img>` sources, inline backgrounds
/// and finally the rendered html.
pub fn resolve_image_on_page(
    page: &dyn BrowserPage,
    cdn_base_url: &str,
    trace: &mut Vec<TraceStep>,
) -> Result<Option<String>, anyhow::Error> {
    let final_url = page.current_url();
    trace.push(TraceStep::FinalUrl {
        final_url: final_url.clone(),
    });
    let ids = extract_product_ids(&final_url);
    trace.push(TraceStep::Ids { ids: ids.clone() });

    if let Some(ids) = &ids {
        let api_result = page
            .evaluate_json(&item_api_script(ids))
            .context("Failed to query item APIs from the page")?;
        if let Some(src) = api_result.get("src").and_then(Value::as_str) {
            let image = build_cdn_url(cdn_base_url, src);
            if !image.is_empty() {
                return Ok(Some(image));
            }
        }
    }

    for _ in 0..SCROLL_ROUNDS {
        if let Err(e) = page.evaluate_json(SCROLL_SCRIPT) {
            tracing::warn!(error = %e, "scrolling failed");
        }
        page.pause(SCROLL_PAUSE);
    }

    let resources: Vec<String> = page
        .seen_resources()
        .iter()
        .filter_map(|url| first_cdn_url(url))
        .collect();
    if let Some(image) = resources.first() {
        trace.push(TraceStep::CdnFromResponses {
            count: resources.len(),
        });
        return Ok(Some(image.clone()));
    }

    if let Some(image) = dom_strings(page, OG_IMAGE_SCRIPT, "og_image", trace)
        .into_iter()
        .next()
    {
        trace.push(TraceStep::OgImage);
        return Ok(Some(image));
    }

    let img_sources = dom_strings(page, IMG_SOURCES_SCRIPT, "img", trace).join(" ");
    if let Some(image) = first_cdn_url(&img_sources) {
        trace.push(TraceStep::CdnFromDomImg);
        return Ok(Some(image));
    }

    let backgrounds = dom_strings(page, BACKGROUND_IMAGES_SCRIPT, "background", trace).join(" ");
    if let Some(image) = first_cdn_url(&backgrounds) {
        trace.push(TraceStep::CdnFromDomBg);
        return Ok(Some(image));
    }

    let html = page.content().context("Failed to read rendered page")?;
    if let Some(image) = first_cdn_url(&html) {
        trace.push(TraceStep::CdnFromHtml);
        return Ok(Some(image));
    }
    Ok(None)
}

struct ChromePage {
    tab: Arc<Tab>,
    resources: Arc<Mutex<Vec<String>>>,
}

impl ChromePage {
    /// Starts recording CDN responses; call before navigating.
    fn attach(tab: Arc<Tab>) -> Result<Self, anyhow::Error> {
        let resources = Arc::new(Mutex::new(vec![]));
        let sink = resources.clone();
        tab.register_response_handling(
            "cdn-images",
            Box::new(move |event, _fetch_body| {
                let url = event.response.url;
                if first_cdn_url(&url).is_none() {
                    return;
                }
                if let Ok(mut urls) = sink.lock() {
                    urls.push(url);
                }
            }),
        )
        .context("Failed to listen for network responses")?;
        Ok(Self { tab, resources })
    }
}

impl BrowserPage for ChromePage {
    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    fn evaluate_json(&self, script: &str) -> Result<Value, anyhow::Error> {
        let result = self.tab.evaluate(script, true)?;
        match result.value {
            Some(Value::String(raw)) => Ok(serde_json::from_str(&raw)?),
            Some(other) => Ok(other),
            None => Ok(Value::Null),
        }
    }

    fn content(&self) -> Result<String, anyhow::Error> {
        self.tab.get_content()
    }

    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn seen_resources(&self) -> Vec<String> {
        self.resources
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }
}

/// Browser fallback of the image lookup. Every call launches its own
/// Chrome, which is shut down when the call returns.
#[derive(Debug, Clone)]
pub struct HeadlessClient {
    config: HeadlessConfig,
    cdn_base_url: String,
}

impl HeadlessClient {
    pub fn new(config: HeadlessConfig, cdn_base_url: String) -> Self {
        Self {
            config,
            cdn_base_url,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    #[tracing::instrument(name = "Resolve Shopee image in browser", skip(self, trace))]
    pub async fn resolve_image(
        &self,
        url: &str,
        trace: &mut Vec<TraceStep>,
    ) -> Result<Option<String>, anyhow::Error> {
        let config = self.config.clone();
        let cdn_base_url = self.cdn_base_url.clone();
        let url = url.to_string();
        let (result, steps) = spawn_blocking_with_tracing(move || {
            let mut steps = vec![];
            let result = browse_for_image(&config, &cdn_base_url, &url, &mut steps);
            (result, steps)
        })
        .await
        .context("Browser task panicked")?;
        trace.extend(steps);
        result
    }
}

fn launch_browser(config: &HeadlessConfig) -> Result<Browser, anyhow::Error> {
    let options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false)
        .window_size(Some((1280, 800)))
        .path(config.chrome_path.clone())
        .args(vec![OsStr::new(
            "--disable-blink-features=AutomationControlled",
        )])
        .idle_browser_timeout(Duration::from_secs(
            config.navigation_timeout_seconds + 30,
        ))
        .build()
        .map_err(|e| anyhow::anyhow!("Invalid browser launch options: {}", e))?;
    Browser::new(options).context("Failed to launch headless Chrome")
}

fn browse_for_image(
    config: &HeadlessConfig,
    cdn_base_url: &str,
    url: &str,
    trace: &mut Vec<TraceStep>,
) -> Result<Option<String>, anyhow::Error> {
    let browser = launch_browser(config)?;
    let tab = browser.new_tab().context("Failed to open browser tab")?;
    tab.set_default_timeout(Duration::from_secs(config.navigation_timeout_seconds));
    tab.set_user_agent(DESKTOP_USER_AGENT, Some(ACCEPT_LANGUAGE), None)
        .context("Failed to set user agent")?;
    let page = ChromePage::attach(tab)?;
    page.tab
        .navigate_to(url)
        .with_context(|| format!("Failed to navigate to {}", url))?;
    page.tab
        .wait_until_navigated()
        .context("Page did not finish loading")?;

    page.pause(Duration::from_millis(config.settle_milliseconds));
    resolve_image_on_page(&page, cdn_base_url, trace)
}
