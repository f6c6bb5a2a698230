//! Integration test harness for the Heavyline storefront.
//!
//! Each test gets its own [`TestContext`]: a mock REST API and a temporary
//! data directory. Storefronts opened from the same context share the data
//! directory, so a second [`TestContext::open`] behaves like a restart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p heavyline-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use httpmock::Mock;
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

use heavyline_core::{DeliveryType, PaymentMethod};
use heavyline_storefront::storage::FileStore;
use heavyline_storefront::{Storefront, StorefrontConfig};

pub const TOKEN: &str = "test-token";
pub const EMAIL: &str = "buyer@example.ru";
pub const PASSWORD: &str = "correct horse";

/// Mock API plus a scratch data directory.
pub struct TestContext {
    pub server: MockServer,
    pub dir: TempDir,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            server: MockServer::start(),
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let mut config =
            StorefrontConfig::for_api(&self.server.base_url()).expect("mock server URL is valid");
        config.data_dir = self.dir.path().to_path_buf();
        config
    }

    /// Open a storefront on the shared data directory.
    #[must_use]
    pub fn open(&self) -> Storefront<FileStore> {
        Storefront::open(&self.config()).expect("Failed to open storefront")
    }

    /// Serve a vehicle and a single-entry price list for it.
    pub fn mock_vehicle(&self, id: i32, title: &str, price: i64) {
        let title = title.to_owned();
        self.server.mock(|when, then| {
            when.method(GET).path(format!("/vehicles/{id}"));
            then.status(200).json_body(json!({
                "vehicle_id": id,
                "title": title,
                "image_url": format!("/static/vehicles/{id}.jpg")
            }));
        });
        self.server.mock(|when, then| {
            when.method(GET).path(format!("/price-list/vehicle/{id}"));
            then.status(200).json_body(json!([
                {"price_id": id * 10, "vehicle_id": id, "price": price}
            ]));
        });
    }

    /// Accept [`EMAIL`]/[`PASSWORD`] and answer `/auth/me` for [`TOKEN`].
    pub fn mock_auth(&self) {
        self.server.mock(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .body_includes("username=buyer%40example.ru");
            then.status(200)
                .json_body(json!({"access_token": TOKEN, "token_type": "bearer"}));
        });
        self.server.mock(|when, then| {
            when.method(GET)
                .path("/auth/me")
                .header("authorization", format!("Bearer {TOKEN}"));
            then.status(200).json_body(json!({
                "user_id": 1,
                "email": EMAIL,
                "name": "Иванов Иван",
                "is_admin": false,
                "is_active": true
            }));
        });
        self.server.mock(|when, then| {
            when.method(POST).path("/auth/logout");
            then.status(200).json_body(json!({"message": "ok"}));
        });
    }

    /// Answer create-order with `status`; 2xx responses carry request 101.
    pub fn mock_create_order(&self, status: u16) -> Mock<'_> {
        self.server.mock(|when, then| {
            when.method(POST).path("/requests/create-order");
            if (200..300).contains(&status) {
                then.status(status)
                    .json_body(json!({"request_id": 101, "status": "заявка создана"}));
            } else {
                then.status(status)
                    .json_body(json!({"detail": "Ошибка при создании заявки"}));
            }
        })
    }
}

/// Fill every required checkout field.
pub fn fill_checkout_form(storefront: &mut Storefront<FileStore>) {
    let form = storefront.checkout_form_mut();
    form.full_name = "Иванов Иван".to_string();
    form.email = EMAIL.to_string();
    form.phone = "+7 900 123-45-67".to_string();
    form.city = "Челябинск".to_string();
    form.payment_method = Some(PaymentMethod::BankCard);
    form.delivery_type = Some(DeliveryType::Pickup);
}
