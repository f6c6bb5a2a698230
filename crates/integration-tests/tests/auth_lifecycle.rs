//! The cart's lifetime follows the signed-in session.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use httpmock::prelude::*;
use secrecy::SecretString;
use serde_json::json;

use heavyline_core::ProductId;
use heavyline_integration_tests::{EMAIL, PASSWORD, TOKEN, TestContext};
use heavyline_storefront::AppError;
use heavyline_storefront::services::auth::AuthError;

fn password() -> SecretString {
    SecretString::from(PASSWORD)
}

#[tokio::test]
async fn test_logout_clears_cart() {
    let ctx = TestContext::new();
    ctx.mock_auth();
    ctx.mock_vehicle(1, "Трактор Т-150", 1500);
    let mut storefront = ctx.open();

    storefront.login(EMAIL, &password()).await.unwrap();
    storefront.add_to_cart(ProductId::new(1)).await.unwrap();
    storefront.add_to_cart(ProductId::new(1)).await.unwrap();
    assert_eq!(storefront.item_count(), 2);

    storefront.logout().await.unwrap();
    assert!(storefront.session().is_none());
    assert!(storefront.cart().is_empty());

    // The cleared cart is what a restart sees.
    let mut reopened = ctx.open();
    assert!(reopened.restore().await.unwrap().is_none());
    assert!(reopened.cart().is_empty());
}

#[tokio::test]
async fn test_login_keeps_persisted_cart() {
    let ctx = TestContext::new();
    ctx.mock_auth();
    ctx.mock_vehicle(4, "Каток ДУ-47", 900);
    let mut storefront = ctx.open();

    storefront.add_to_cart(ProductId::new(4)).await.unwrap();
    let session = storefront.login(EMAIL, &password()).await.unwrap();

    assert_eq!(session.email, EMAIL);
    assert_eq!(storefront.item_count(), 1);
    assert_eq!(storefront.checkout_form().email, EMAIL);
    assert_eq!(storefront.checkout_form().full_name, "Иванов Иван");
}

#[tokio::test]
async fn test_session_restores_after_restart() {
    let ctx = TestContext::new();
    ctx.mock_auth();
    ctx.mock_vehicle(2, "Экскаватор ЭО-2621", 800);

    {
        let mut storefront = ctx.open();
        storefront.login(EMAIL, &password()).await.unwrap();
        storefront.add_to_cart(ProductId::new(2)).await.unwrap();
    }

    let mut storefront = ctx.open();
    let session = storefront.restore().await.unwrap().unwrap();
    assert_eq!(session.display_name(), "Иванов Иван");
    assert_eq!(storefront.item_count(), 1);
    assert!(ctx.dir.path().join("token.json").exists());
}

#[tokio::test]
async fn test_rejected_session_clears_cart_and_token() {
    let ctx = TestContext::new();
    ctx.mock_auth();
    ctx.mock_vehicle(1, "Трактор Т-150", 1500);
    ctx.server.mock(|when, then| {
        when.method(GET).path("/vehicles/9");
        then.status(401).json_body(json!({"detail": "Could not validate credentials"}));
    });
    let mut storefront = ctx.open();

    storefront.login(EMAIL, &password()).await.unwrap();
    storefront.add_to_cart(ProductId::new(1)).await.unwrap();

    let err = storefront.add_to_cart(ProductId::new(9)).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(storefront.session().is_none());
    assert!(storefront.cart().is_empty());
    assert!(!ctx.dir.path().join("token.json").exists());
}

#[tokio::test]
async fn test_wrong_password() {
    let ctx = TestContext::new();
    ctx.server.mock(|when, then| {
        when.method(POST).path("/auth/login");
        then.status(401).json_body(json!({"detail": "Incorrect email or password"}));
    });
    let mut storefront = ctx.open();

    let err = storefront
        .login(EMAIL, &SecretString::from("wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::InvalidCredentials)));
    assert!(storefront.session().is_none());
}

#[tokio::test]
async fn test_stale_token_is_dropped_on_restore() {
    let ctx = TestContext::new();
    ctx.server.mock(|when, then| {
        when.method(GET).path("/auth/me");
        then.status(401).json_body(json!({"detail": "Token expired"}));
    });
    ctx.mock_vehicle(1, "Вилочный погрузчик", 1200);
    std::fs::write(ctx.dir.path().join("token.json"), TOKEN).unwrap();

    // Cart left behind by the previous run of the expired session.
    {
        let mut storefront = ctx.open();
        storefront.add_to_cart(ProductId::new(1)).await.unwrap();
    }

    let mut storefront = ctx.open();
    assert_eq!(storefront.item_count(), 1);
    assert!(storefront.restore().await.unwrap().is_none());
    assert!(!ctx.dir.path().join("token.json").exists());
    assert!(storefront.cart().is_empty());

    let reopened = ctx.open();
    assert!(reopened.cart().is_empty());
}

#[tokio::test]
async fn test_whoami_requires_sign_in() {
    let ctx = TestContext::new();
    let mut storefront = ctx.open();

    let err = storefront.whoami().await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::NotAuthenticated)));
}

#[tokio::test]
async fn test_my_orders() {
    let ctx = TestContext::new();
    ctx.mock_auth();
    ctx.server.mock(|when, then| {
        when.method(GET)
            .path("/requests/my/")
            .header("authorization", format!("Bearer {TOKEN}"));
        then.status(200).json_body(json!([
            {"request_id": 3, "status": "заявка обрабатывается", "request_date": "2025-02-01T10:00:00"},
            {"request_id": 4, "status": "заявка создана"}
        ]));
    });
    let mut storefront = ctx.open();
    storefront.login(EMAIL, &password()).await.unwrap();

    let orders = storefront.my_orders().await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[1].request_id.to_string(), "4");
}
