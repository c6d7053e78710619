use crate::helpers::spawn_app;
use serde_json::Value;

#[actix_web::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(app.url("/util/health_check"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(Some(14), response.content_length());
}

#[actix_web::test]
async fn env_check_reports_presence_only() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(app.url("/util/env_check"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body = response.text().await.unwrap();
    assert!(!body.contains("test-admin-key"));
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["data"]["backend"], "memory");
    assert_eq!(body["data"]["admin_key_present"], true);
    assert_eq!(body["data"]["headless_enabled"], false);
}

#[actix_web::test]
async fn openapi_document_is_served() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(app.url("/api-docs/openapi.json"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["paths"]["/api/deals"].is_object());
}
