//! The cart survives restarts and tolerates a damaged save file.

#![allow(clippy::unwrap_used)]

use heavyline_core::{Price, ProductId, QuantityUpdate};
use heavyline_integration_tests::TestContext;

#[tokio::test]
async fn test_cart_round_trips_through_restart() {
    let ctx = TestContext::new();
    ctx.mock_vehicle(1, "Самосвал МАЗ-6501", 1000);
    ctx.mock_vehicle(2, "Автокран", 500);

    let expected = {
        let mut storefront = ctx.open();
        storefront.add_to_cart(ProductId::new(2)).await.unwrap();
        storefront.add_to_cart(ProductId::new(1)).await.unwrap();
        storefront.set_quantity(ProductId::new(1), 2).unwrap();
        storefront.cart().clone()
    };

    let storefront = ctx.open();
    assert_eq!(*storefront.cart(), expected);
    assert_eq!(storefront.total_price(), Price::from_roubles(2500).unwrap());
    let order: Vec<_> = storefront.cart().lines().iter().map(|l| l.product_id).collect();
    assert_eq!(order, vec![ProductId::new(2), ProductId::new(1)]);
}

#[tokio::test]
async fn test_emptied_cart_round_trips() {
    let ctx = TestContext::new();
    ctx.mock_vehicle(1, "Самосвал МАЗ-6501", 1000);

    {
        let mut storefront = ctx.open();
        storefront.add_to_cart(ProductId::new(1)).await.unwrap();
        storefront.clear_cart().unwrap();
    }

    assert!(ctx.open().cart().is_empty());
    let raw = std::fs::read_to_string(ctx.dir.path().join("cart.json")).unwrap();
    assert_eq!(raw, "[]");
}

#[tokio::test]
async fn test_corrupt_cart_file_loads_empty() {
    let ctx = TestContext::new();
    std::fs::write(ctx.dir.path().join("cart.json"), "[{\"id\": 1, \"quantity\": ").unwrap();

    let mut storefront = ctx.open();
    assert!(storefront.cart().is_empty());

    // And the store is usable again afterwards.
    ctx.mock_vehicle(1, "Самосвал МАЗ-6501", 1000);
    storefront.add_to_cart(ProductId::new(1)).await.unwrap();
    assert_eq!(ctx.open().item_count(), 1);
}

#[tokio::test]
async fn test_rejected_quantity_is_not_saved() {
    let ctx = TestContext::new();
    ctx.mock_vehicle(1, "Самосвал МАЗ-6501", 1000);
    let mut storefront = ctx.open();
    storefront.add_to_cart(ProductId::new(1)).await.unwrap();

    for n in [0, -1] {
        assert_eq!(
            storefront.set_quantity(ProductId::new(1), n).unwrap(),
            QuantityUpdate::Rejected
        );
    }
    assert_eq!(ctx.open().item_count(), 1);
}
