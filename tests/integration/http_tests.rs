use daily_price_watch::config::NotifierKind;
use daily_price_watch::{AppConfig, ProductManager};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::product_page;

fn create_test_config(shop: &MockServer, webhook: &MockServer, data_dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.products = vec![
        format!("{}/py/impresora-3d", shop.uri()),
        format!("{}/py/xiaomi-redmi", shop.uri()),
    ];
    config.scraper.request_timeout = 5;
    config.storage.data_dir = data_dir.path().to_path_buf();
    config.notifications.channel = NotifierKind::Discord;
    config.notifications.send_timeout = 5;
    config.notifications.discord.webhook_url = Some(format!("{}/api/webhooks/42/token", webhook.uri()));
    config
}

#[tokio::test]
async fn test_cycle_over_http_posts_discord_report() -> anyhow::Result<()> {
    let shop = MockServer::start().await;
    let webhook = MockServer::start().await;
    let data_dir = TempDir::new()?;

    Mock::given(method("GET"))
        .and(path("/py/impresora-3d"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Gs. 3.500.000", "En stock")))
        .mount(&shop)
        .await;
    Mock::given(method("GET"))
        .and(path("/py/xiaomi-redmi"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&shop)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/webhooks/42/token"))
        .and(body_partial_json(json!({ "username": "Daily Price Watch" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&webhook)
        .await;

    let config = create_test_config(&shop, &webhook, &data_dir);
    let manager = ProductManager::from_config(&config)?;
    let summary = manager.run_cycle().await?;

    assert_eq!(summary.products_checked, 1);
    assert_eq!(summary.products_failed, 1);
    assert!(summary.persisted);
    assert!(summary.notified);

    let requests = webhook.received_requests().await.unwrap_or_default();
    let payload: serde_json::Value = serde_json::from_slice(&requests[0].body)?;
    let content = payload["content"].as_str().unwrap_or_default();
    assert!(content.starts_with("**Cambios detectados en productos**"));
    assert!(content.contains("Precio: Gs. 3.500.000"));
    assert!(!content.contains("xiaomi-redmi"));

    assert!(config.state_path().exists());

    Ok(())
}

#[tokio::test]
async fn test_rejected_webhook_does_not_fail_cycle() -> anyhow::Result<()> {
    let shop = MockServer::start().await;
    let webhook = MockServer::start().await;
    let data_dir = TempDir::new()?;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Gs. 1.250.000", "En stock")))
        .mount(&shop)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&webhook)
        .await;

    let config = create_test_config(&shop, &webhook, &data_dir);
    let manager = ProductManager::from_config(&config)?;
    let summary = manager.run_cycle().await?;

    assert_eq!(summary.products_checked, 2);
    assert!(summary.persisted);
    assert!(!summary.notified);

    Ok(())
}
