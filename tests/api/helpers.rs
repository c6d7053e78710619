use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use actix_web::{web, App, HttpServer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deal_storefront::configuration::{get_configuration, BankConfig, Settings};
use deal_storefront::repository::{CommerceRepository, RepositoryError};
use deal_storefront::routes::deal::models::{
    DealListFilter, DealModel, DealPatchModel, NewDealModel,
};
use deal_storefront::routes::order::models::{
    NewOrderItemModel, NewOrderModel, OrderListFilter, OrderModel, OrderPage, OrderPatchModel,
};
use deal_storefront::routes::order::schemas::OrderStatus;
use deal_storefront::startup::Application;
use deal_storefront::telemetry::{get_subscriber, init_subscriber};
use once_cell::sync::Lazy;
use secrecy::SecretString;
use uuid::Uuid;

pub const ADMIN_KEY: &str = "test-admin-key";

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let test_log = std::env::var("TEST_LOG")
        .map(|value| value == "true")
        .unwrap_or(false);
    if test_log {
        let subscriber = get_subscriber(default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

/// Keeps deals and orders in memory so the API can be driven end to end
/// without a database.
#[derive(Default)]
pub struct InMemoryRepository {
    pub deals: Mutex<Vec<DealModel>>,
    pub orders: Mutex<Vec<OrderModel>>,
    pub order_items: Mutex<Vec<NewOrderItemModel>>,
    /// Slugs held by another writer: lookups miss them, writes collide.
    pub claimed_slugs: Mutex<Vec<String>>,
}

impl InMemoryRepository {
    pub fn seed_deal(&self, slug: &str, price: i64, active: bool) -> DealModel {
        let deal = DealModel {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            name: format!("Deal {}", slug),
            price,
            old_price: None,
            image: Some("https://down-vn.img.susercontent.com/file/abc".to_string()),
            category: Some("Shopee".to_string()),
            active,
            affiliate_link: Some(format!("https://s.shopee.vn/{}", slug)),
            source: Some("shopee".to_string()),
            source_url: None,
            updated_at: Some(Utc::now()),
        };
        self.deals.lock().unwrap().push(deal.clone());
        deal
    }

    pub fn seed_order(
        &self,
        status: OrderStatus,
        contact_email: Option<String>,
        created_at: DateTime<Utc>,
    ) -> OrderModel {
        let order = OrderModel {
            id: Uuid::new_v4(),
            guest_id: None,
            contact_email,
            service_code: None,
            target_url: None,
            payment_method: None,
            subtotal_vnd: Some(100_000),
            discount_vnd: None,
            total_vnd: Some(100_000),
            status,
            note: None,
            transfer_submitted_at: None,
            transfer_note: None,
            created_at,
        };
        self.orders.lock().unwrap().push(order.clone());
        order
    }

    pub fn claim_slug_elsewhere(&self, slug: &str) {
        self.claimed_slugs.lock().unwrap().push(slug.to_string());
    }

    fn slug_taken(&self, deals: &[DealModel], slug: &str, except: Option<Uuid>) -> bool {
        self.claimed_slugs.lock().unwrap().iter().any(|s| s == slug)
            || deals
                .iter()
                .any(|deal| deal.slug == slug && Some(deal.id) != except)
    }

    pub fn order(&self, id: Uuid) -> Option<OrderModel> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|order| order.id == id)
            .cloned()
    }
}

fn contains_ignore_case(value: &Option<String>, needle: &str) -> bool {
    value
        .as_deref()
        .is_some_and(|value| value.to_lowercase().contains(&needle.to_lowercase()))
}

#[async_trait]
impl CommerceRepository for InMemoryRepository {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list_deals(&self, filter: &DealListFilter) -> Result<Vec<DealModel>, anyhow::Error> {
        let mut deals: Vec<DealModel> = self
            .deals
            .lock()
            .unwrap()
            .iter()
            .filter(|deal| !filter.active_only || deal.active)
            .filter(|deal| filter.source.is_none() || deal.source == filter.source)
            .cloned()
            .collect();
        deals.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        deals.truncate(filter.limit as usize);
        Ok(deals)
    }

    async fn fetch_deal_by_slug(&self, slug: &str) -> Result<Option<DealModel>, anyhow::Error> {
        Ok(self
            .deals
            .lock()
            .unwrap()
            .iter()
            .find(|deal| deal.slug == slug)
            .cloned())
    }

    async fn insert_deal(&self, deal: &NewDealModel) -> Result<DealModel, anyhow::Error> {
        let mut deals = self.deals.lock().unwrap();
        if self.slug_taken(&deals, &deal.slug, None) {
            return Err(RepositoryError::UniqueViolation(deal.slug.clone()).into());
        }
        let row = DealModel {
            id: Uuid::new_v4(),
            slug: deal.slug.clone(),
            name: deal.name.clone(),
            price: deal.price,
            old_price: deal.old_price,
            image: deal.image.clone(),
            category: deal.category.clone(),
            active: deal.active,
            affiliate_link: Some(deal.affiliate_link.clone()),
            source: deal.source.clone(),
            source_url: deal.source_url.clone(),
            updated_at: Some(deal.updated_at),
        };
        deals.push(row.clone());
        Ok(row)
    }

    async fn update_deal(
        &self,
        id: Uuid,
        patch: &DealPatchModel,
    ) -> Result<Option<DealModel>, anyhow::Error> {
        let mut deals = self.deals.lock().unwrap();
        if let Some(slug) = &patch.slug {
            if self.slug_taken(&deals, slug, Some(id)) {
                return Err(RepositoryError::UniqueViolation(slug.clone()).into());
            }
        }
        let Some(deal) = deals.iter_mut().find(|deal| deal.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            deal.name = name.clone();
        }
        if let Some(slug) = &patch.slug {
            deal.slug = slug.clone();
        }
        if let Some(price) = patch.price {
            deal.price = price;
        }
        if let Some(old_price) = patch.old_price {
            deal.old_price = old_price;
        }
        if let Some(image) = &patch.image {
            deal.image = image.clone();
        }
        if let Some(category) = &patch.category {
            deal.category = category.clone();
        }
        if let Some(active) = patch.active {
            deal.active = active;
        }
        if let Some(affiliate_link) = &patch.affiliate_link {
            deal.affiliate_link = affiliate_link.clone();
        }
        if let Some(source) = &patch.source {
            deal.source = source.clone();
        }
        if let Some(source_url) = &patch.source_url {
            deal.source_url = source_url.clone();
        }
        deal.updated_at = Some(patch.updated_at);
        Ok(Some(deal.clone()))
    }

    async fn delete_deal(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        let mut deals = self.deals.lock().unwrap();
        let before = deals.len();
        deals.retain(|deal| deal.id != id);
        Ok(deals.len() != before)
    }

    async fn insert_order(&self, order: &NewOrderModel) -> Result<OrderModel, anyhow::Error> {
        let row = OrderModel {
            id: Uuid::new_v4(),
            guest_id: order.guest_id.clone(),
            contact_email: None,
            service_code: order.service_code.clone(),
            target_url: order.target_url.clone(),
            payment_method: None,
            subtotal_vnd: order.subtotal_vnd,
            discount_vnd: None,
            total_vnd: order.total_vnd,
            status: order.status,
            note: None,
            transfer_submitted_at: None,
            transfer_note: None,
            created_at: Utc::now(),
        };
        self.orders.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn insert_order_item(&self, item: &NewOrderItemModel) -> Result<(), anyhow::Error> {
        self.order_items.lock().unwrap().push(item.clone());
        Ok(())
    }

    async fn fetch_order(&self, id: Uuid) -> Result<Option<OrderModel>, anyhow::Error> {
        Ok(self.order(id))
    }

    async fn update_order(
        &self,
        id: Uuid,
        patch: &OrderPatchModel,
    ) -> Result<Option<OrderModel>, anyhow::Error> {
        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders.iter_mut().find(|order| order.id == id) else {
            return Ok(None);
        };
        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(note) = &patch.note {
            order.note = note.clone();
        }
        if let Some(payment_method) = &patch.payment_method {
            order.payment_method = payment_method.clone();
        }
        if let Some(transfer_submitted_at) = patch.transfer_submitted_at {
            order.transfer_submitted_at = transfer_submitted_at;
        }
        if let Some(transfer_note) = &patch.transfer_note {
            order.transfer_note = transfer_note.clone();
        }
        Ok(Some(order.clone()))
    }

    async fn list_orders(&self, filter: &OrderListFilter) -> Result<OrderPage, anyhow::Error> {
        let mut matching: Vec<OrderModel> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|order| filter.status.map_or(true, |status| order.status == status))
            .filter(|order| {
                filter.search.as_deref().map_or(true, |q| {
                    contains_ignore_case(&order.contact_email, q)
                        || contains_ignore_case(&order.guest_id, q)
                })
            })
            .filter(|order| filter.created_from.map_or(true, |from| order.created_at >= from))
            .filter(|order| filter.created_to.map_or(true, |to| order.created_at <= to))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect();
        Ok(OrderPage { items, total })
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub repository: Arc<InMemoryRepository>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn admin_get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client
            .get(self.url(path))
            .header("x-admin-key", ADMIN_KEY)
    }

    pub fn admin_post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client
            .post(self.url(path))
            .header("x-admin-key", ADMIN_KEY)
    }

    pub fn admin_patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(self.url(path))
            .header("x-admin-key", ADMIN_KEY)
    }

    pub fn admin_delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(self.url(path))
            .header("x-admin-key", ADMIN_KEY)
    }
}

pub fn test_bank() -> BankConfig {
    BankConfig {
        bin: "970422".to_string(),
        account: "0123456789".to_string(),
        account_name: "NGUYEN VAN A".to_string(),
        bank_name: "MB Bank".to_string(),
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with<F>(customize: F) -> TestApp
where
    F: FnOnce(&mut Settings),
{
    Lazy::force(&TRACING);

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        c.application.port = 0;
        c.application.host = "127.0.0.1".to_string();
        c.application.workers = 1;
        c.admin.api_key = SecretString::from(ADMIN_KEY);
        c.headless.enabled = false;
        customize(&mut c);
        c
    };
    let repository = Arc::new(InMemoryRepository::default());
    let application =
        Application::build_with_repository(configuration, repository.clone())
            .await
            .expect("Failed to build application.");
    let port = application.port();
    let address = format!("http://127.0.0.1:{}", port);
    let _ = tokio::spawn(application.run_until_stopped());

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build http client");

    TestApp {
        address,
        port,
        repository,
        api_client,
    }
}

/// Starts a stand-in for an upstream website and returns its base url.
pub fn spawn_upstream<F>(configure: F) -> String
where
    F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let server = HttpServer::new(move || App::new().configure(configure.clone()))
        .workers(1)
        .listen(listener)
        .expect("Failed to listen on random port")
        .run();
    let _ = tokio::spawn(server);
    format!("http://127.0.0.1:{}", port)
}
