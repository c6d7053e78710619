use chrono::{Duration, TimeZone, Utc};
use deal_storefront::routes::order::schemas::OrderStatus;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::helpers::{spawn_app, spawn_app_with, test_bank};

#[actix_web::test]
async fn create_service_order_returns_the_new_id() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(app.url("/api/orders"))
        .json(&json!({
            "service_code": "tiktok_follow",
            "price_vnd": 50000,
            "target_url": "https://www.tiktok.com/@someone"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let id: Uuid = body["data"]["order_id"].as_str().unwrap().parse().unwrap();
    let order = app.repository.order(id).unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.subtotal_vnd, Some(50000));
    assert_eq!(order.total_vnd, Some(50000));
}

#[actix_web::test]
async fn create_service_order_rejects_invalid_input() {
    let app = spawn_app().await;
    let cases = [
        json!({"service_code": "", "price_vnd": 1, "target_url": "https://a.vn"}),
        json!({"service_code": "x", "price_vnd": 0, "target_url": "https://a.vn"}),
        json!({"service_code": "x", "price_vnd": 1, "target_url": "not a url"}),
        json!({"service_code": "x"}),
    ];

    for case in cases {
        let response = app
            .api_client
            .post(app.url("/api/orders"))
            .json(&case)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "payload {}", case);
    }
    assert!(app.repository.orders.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn checkout_creates_order_and_item() {
    let app = spawn_app().await;
    let deal = app.repository.seed_deal("tai-nghe", 199_000, true);

    let response = app
        .api_client
        .post(app.url("/api/checkout"))
        .json(&json!({"slug": "tai-nghe", "qty": 2, "guest_id": "guest-1"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["total_vnd"], 398_000);
    assert_eq!(body["data"]["name"], "Deal tai-nghe");

    let items = app.repository.order_items.lock().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].deal_id, deal.id);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].unit_price_vnd, 199_000);
    assert_eq!(items[0].deal_snapshot.slug, "tai-nghe");
}

#[actix_web::test]
async fn checkout_rejects_unknown_or_inactive_deals() {
    let app = spawn_app().await;
    app.repository.seed_deal("hidden", 10, false);

    for slug in ["hidden", "missing"] {
        let response = app
            .api_client
            .post(app.url("/api/checkout"))
            .json(&json!({"slug": slug}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }

    let no_slug = app
        .api_client
        .post(app.url("/api/checkout"))
        .json(&json!({"qty": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(no_slug.status().as_u16(), 400);
}

#[actix_web::test]
async fn customer_status_update_uses_the_allow_list() {
    let app = spawn_app().await;
    let order = app
        .repository
        .seed_order(OrderStatus::Pending, None, Utc::now());
    let url = app.url(&format!("/api/orders/{}", order.id));

    let rejected = app
        .api_client
        .patch(&url)
        .json(&json!({"status": "refunded"}))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status().as_u16(), 400);

    let untouched = app
        .api_client
        .patch(&url)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(untouched.status().as_u16(), 200);
    assert_eq!(
        app.repository.order(order.id).unwrap().status,
        OrderStatus::Pending
    );

    let accepted = app
        .api_client
        .patch(&url)
        .json(&json!({"status": "processing", "transfer_note": "sent from VCB"}))
        .send()
        .await
        .unwrap();
    assert_eq!(accepted.status().as_u16(), 200);
    let stored = app.repository.order(order.id).unwrap();
    assert_eq!(stored.status, OrderStatus::Processing);
    assert!(stored.transfer_submitted_at.is_some());
    assert_eq!(stored.transfer_note.as_deref(), Some("sent from VCB"));

    let unknown = app
        .api_client
        .patch(app.url(&format!("/api/orders/{}", Uuid::new_v4())))
        .json(&json!({"status": "paid"}))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status().as_u16(), 404);

    let bad_id = app
        .api_client
        .patch(app.url("/api/orders/not-a-uuid"))
        .json(&json!({"status": "paid"}))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_id.status().as_u16(), 400);
}

#[actix_web::test]
async fn confirm_transfer_marks_order_for_verification() {
    let app = spawn_app().await;
    let order = app
        .repository
        .seed_order(OrderStatus::Pending, None, Utc::now());

    let response = app
        .api_client
        .post(app.url("/api/orders/confirm-transfer"))
        .json(&json!({"order_id": order.id, "note": "ck luc 9h"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["ok"], true);
    assert_eq!(body["data"]["order"]["status"], "paid_pending_verify");
    assert!(body["data"]["order"]["transfer_submitted_at"].is_string());
    let stored = app.repository.order(order.id).unwrap();
    assert_eq!(stored.payment_method.as_deref(), Some("bank"));
    assert_eq!(stored.transfer_note.as_deref(), Some("ck luc 9h"));
}

#[actix_web::test]
async fn payment_instructions_need_bank_details() {
    let app = spawn_app_with(|c| c.bank = Default::default()).await;
    let order = app
        .repository
        .seed_order(OrderStatus::Pending, None, Utc::now());

    let response = app
        .api_client
        .get(app.url(&format!("/api/orders/{}/payment", order.id)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
}

#[actix_web::test]
async fn payment_instructions_build_vietqr_link() {
    let app = spawn_app_with(|c| c.bank = test_bank()).await;
    let order = app
        .repository
        .seed_order(OrderStatus::Pending, None, Utc::now());

    let response = app
        .api_client
        .get(app.url(&format!("/api/orders/{}/payment", order.id)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let qr_url = body["data"]["qr_url"].as_str().unwrap();
    assert!(qr_url.starts_with("https://img.vietqr.io/image/970422-0123456789-compact2.png?"));
    assert!(qr_url.contains("amount=100000"));
    assert_eq!(body["data"]["add_info"], format!("ORDER {}", order.id));
}

#[actix_web::test]
async fn admin_order_list_filters_and_paginates() {
    let app = spawn_app().await;
    let email: String = SafeEmail().fake();
    let now = Utc::now();
    for days in 0..5 {
        app.repository
            .seed_order(OrderStatus::Paid, None, now - Duration::days(days));
    }
    let target = app.repository.seed_order(
        OrderStatus::Pending,
        Some(email.clone()),
        now - Duration::days(10),
    );

    let response = app
        .admin_get("/api/admin/orders?page=2&page_size=2&status=paid")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["total"], 5);
    assert_eq!(body["data"]["page"], 2);
    assert_eq!(body["data"]["page_size"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    let response = app
        .admin_get("/api/admin/orders")
        .query(&[("q", email.to_uppercase())])
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], target.id.to_string());

    let invalid = app
        .admin_get("/api/admin/orders?status=shipped")
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status().as_u16(), 400);

    let unauthorized = app
        .api_client
        .get(app.url("/api/admin/orders"))
        .send()
        .await
        .unwrap();
    assert_eq!(unauthorized.status().as_u16(), 401);
}

#[actix_web::test]
async fn admin_order_list_date_range_covers_the_whole_to_day() {
    let app = spawn_app().await;
    let before = app.repository.seed_order(
        OrderStatus::Paid,
        None,
        Utc.with_ymd_and_hms(2025, 10, 1, 23, 59, 59).unwrap(),
    );
    let first_day = app.repository.seed_order(
        OrderStatus::Paid,
        None,
        Utc.with_ymd_and_hms(2025, 10, 2, 0, 0, 0).unwrap(),
    );
    let late_on_to_day = app.repository.seed_order(
        OrderStatus::Paid,
        None,
        Utc.with_ymd_and_hms(2025, 10, 3, 23, 0, 0).unwrap(),
    );
    let after = app.repository.seed_order(
        OrderStatus::Paid,
        None,
        Utc.with_ymd_and_hms(2025, 10, 4, 0, 0, 1).unwrap(),
    );

    let response = app
        .admin_get("/api/admin/orders?from=2025-10-02&to=2025-10-03")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["total"], 2);
    let ids: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![late_on_to_day.id.to_string(), first_day.id.to_string()]
    );
    assert!(!ids.contains(&before.id.to_string().as_str()));

    // The `+` is left unencoded, so it reaches the server as a space.
    let response = app
        .admin_get("/api/admin/orders?from=2025-10-04T06:00:00+07:00")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["total"], 2);
    let ids: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![after.id.to_string(), late_on_to_day.id.to_string()]);
}

#[actix_web::test]
async fn admin_order_update_sets_and_clears_fields() {
    let app = spawn_app().await;
    let order = app
        .repository
        .seed_order(OrderStatus::PaidPendingVerify, None, Utc::now());

    let response = app
        .admin_patch("/api/admin/orders")
        .json(&json!({"id": order.id, "status": "paid", "note": "verified"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["item"]["status"], "paid");
    assert_eq!(body["data"]["item"]["note"], "verified");

    let response = app
        .admin_patch("/api/admin/orders")
        .json(&json!({"id": order.id, "note": null}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.repository.order(order.id).unwrap().note, None);

    let empty = app
        .admin_patch("/api/admin/orders")
        .json(&json!({"id": order.id}))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status().as_u16(), 400);
}
