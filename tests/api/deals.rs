use crate::helpers::spawn_app;
use serde_json::{json, Value};

#[actix_web::test]
async fn public_deals_only_lists_active_ones() {
    let app = spawn_app().await;
    app.repository.seed_deal("tai-nghe", 199_000, true);
    app.repository.seed_deal("loa", 99_000, false);

    let response = app
        .api_client
        .get(app.url("/api/deals"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let cache_control = response
        .headers()
        .get("cache-control")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    assert_eq!(
        cache_control.as_deref(),
        Some("s-maxage=15, stale-while-revalidate=60")
    );
    let body: Value = response.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["slug"], "tai-nghe");
}

#[actix_web::test]
async fn admin_deals_require_the_admin_key() {
    let app = spawn_app().await;

    let missing = app
        .api_client
        .get(app.url("/api/admin/deals"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 401);

    let wrong = app
        .api_client
        .get(app.url("/api/admin/deals"))
        .header("x-admin-key", "nope")
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status().as_u16(), 401);
    let body: Value = wrong.json().await.unwrap();
    assert_eq!(body["status"], false);
}

#[actix_web::test]
async fn admin_deals_filter_by_source() {
    let app = spawn_app().await;
    app.repository.seed_deal("a", 1, true);
    app.repository.seed_deal("b", 1, false);

    let response = app
        .admin_get("/api/admin/deals?source=shopee")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    let response = app
        .admin_get("/api/admin/deals?source=lazada")
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert!(body["data"]["items"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn create_deal_fills_defaults_and_suffixes_duplicate_slugs() {
    let app = spawn_app().await;
    let payload = json!({
        "affiliate_link": "https://s.shopee.vn/xyz",
        "name": "Tai nghe Bluetooth",
        "price": 199000
    });

    let first = app
        .admin_post("/api/admin/deals")
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 200);
    let first: Value = first.json().await.unwrap();
    assert_eq!(first["data"]["item"]["slug"], "tai-nghe-bluetooth");
    assert_eq!(first["data"]["item"]["category"], "Shopee");
    assert_eq!(first["data"]["item"]["image"], "/placeholder.png");
    assert_eq!(first["data"]["item"]["active"], true);

    let second = app
        .admin_post("/api/admin/deals")
        .json(&payload)
        .send()
        .await
        .unwrap();
    let second: Value = second.json().await.unwrap();
    let slug = second["data"]["item"]["slug"].as_str().unwrap();
    assert!(slug.starts_with("tai-nghe-bluetooth-"));
    assert_ne!(slug, "tai-nghe-bluetooth");
}

#[actix_web::test]
async fn create_deal_retries_when_slug_is_taken_concurrently() {
    let app = spawn_app().await;
    app.repository.claim_slug_elsewhere("tai-nghe-race");

    let response = app
        .admin_post("/api/admin/deals")
        .json(&json!({"affiliate_link": "https://s.shopee.vn/race", "name": "Tai nghe race"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let slug = body["data"]["item"]["slug"].as_str().unwrap();
    assert!(slug.starts_with("tai-nghe-race-"));
    assert_eq!(slug.len(), "tai-nghe-race".len() + 7);
    assert_eq!(app.repository.deals.lock().unwrap().len(), 1);
}

#[actix_web::test]
async fn create_deal_requires_affiliate_link() {
    let app = spawn_app().await;

    let response = app
        .admin_post("/api/admin/deals")
        .json(&json!({"name": "No link"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    assert!(app.repository.deals.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn update_deal_validates_and_detects_slug_conflicts() {
    let app = spawn_app().await;
    let deal = app.repository.seed_deal("first", 10, true);
    app.repository.seed_deal("second", 10, true);

    let no_id = app
        .admin_patch("/api/admin/deals")
        .json(&json!({"name": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(no_id.status().as_u16(), 400);


    let conflict = app
        .admin_patch("/api/admin/deals")
        .json(&json!({"id": deal.id, "slug": "second"}))
        .send()
        .await
        .unwrap();
    assert_eq!(conflict.status().as_u16(), 409);

    let unknown = app
        .admin_patch("/api/admin/deals")
        .json(&json!({"id": uuid::Uuid::new_v4(), "price": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status().as_u16(), 404);

    let updated = app
        .admin_patch("/api/admin/deals")
        .json(&json!({"id": deal.id, "price": 5, "old_price": null, "active": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status().as_u16(), 200);
    let body: Value = updated.json().await.unwrap();
    assert_eq!(body["data"]["item"]["price"], 5);
    assert_eq!(body["data"]["item"]["active"], false);
}

#[actix_web::test]
async fn update_deal_maps_a_concurrent_slug_claim_to_conflict() {
    let app = spawn_app().await;
    let deal = app.repository.seed_deal("first", 10, true);
    app.repository.claim_slug_elsewhere("taken-meanwhile");

    let response = app
        .admin_patch("/api/admin/deals")
        .json(&json!({"id": deal.id, "slug": "taken-meanwhile"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], false);
}

#[actix_web::test]
async fn update_deal_with_only_an_id_touches_updated_at() {
    let app = spawn_app().await;
    let deal = app.repository.seed_deal("first", 10, true);

    let response = app
        .admin_patch("/api/admin/deals")
        .json(&json!({"id": deal.id}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let stored = app.repository.deals.lock().unwrap()[0].clone();
    assert_eq!(stored.price, deal.price);
    assert_eq!(stored.slug, deal.slug);
    assert!(stored.updated_at > deal.updated_at);
}

#[actix_web::test]
async fn delete_deal_by_query_or_body() {
    let app = spawn_app().await;
    let first = app.repository.seed_deal("first", 10, true);
    let second = app.repository.seed_deal("second", 10, true);

    let by_query = app
        .admin_delete(&format!("/api/admin/deals?id={}", first.id))
        .send()
        .await
        .unwrap();
    assert_eq!(by_query.status().as_u16(), 200);

    let by_body = app
        .admin_delete("/api/admin/deals")
        .json(&json!({"id": second.id}))
        .send()
        .await
        .unwrap();
    assert_eq!(by_body.status().as_u16(), 200);
    assert!(app.repository.deals.lock().unwrap().is_empty());

    let again = app
        .admin_delete(&format!("/api/admin/deals?id={}", first.id))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status().as_u16(), 404);

    let missing = app.admin_delete("/api/admin/deals").send().await.unwrap();
    assert_eq!(missing.status().as_u16(), 400);
}

#[actix_web::test]
async fn go_redirects_active_deals_and_falls_back_to_home() {
    let app = spawn_app().await;
    app.repository.seed_deal("live", 10, true);
    app.repository.seed_deal("hidden", 10, false);

    for (slug, expected) in [
        ("live", "https://s.shopee.vn/live"),
        ("hidden", "/"),
        ("unknown", "/"),
    ] {
        let response = app
            .api_client
            .get(app.url(&format!("/api/go/{}", slug)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 302, "slug {}", slug);
        assert_eq!(
            response.headers().get("location").unwrap().to_str().unwrap(),
            expected
        );
    }
}
