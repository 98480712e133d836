use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use bazaar_api::{app, AppState};
use bazaar_cart::catalog::StaticCatalog;
use bazaar_cart::models::{CartItem, Origin};
use bazaar_cart::service::CartService;
use bazaar_cart::store::{CartStore, MemoryCartStore};
use bazaar_core::carrier::{MockCarrier, ShippingMode};
use bazaar_core::payment::MockPaymentGateway;
use bazaar_order::checkout::CheckoutService;
use bazaar_order::fulfillment::FulfillmentOrchestrator;
use bazaar_order::memory::{MemoryEventSink, MemoryOrderStore};
use bazaar_shipping::cache::{MemoryRateCache, DEFAULT_TTL_MINUTES};
use bazaar_shipping::groups::partition;
use bazaar_shipping::provider::{ShippingProvider, StaticProviders};
use bazaar_shipping::rates::ShippingRate;
use bazaar_shipping::shop::{MockRateSource, RateShopper};
use bazaar_core::retry::RetryPolicy;
use bazaar_order::models::{Address, OrderDraft, OrderTotals};
use bazaar_shared::pii::Masked;

fn provider() -> ShippingProvider {
    ShippingProvider {
        id: Uuid::new_v4(),
        name: "quickship".to_string(),
        code: Some("QS".to_string()),
        enabled: true,
        priority: 10,
    }
}

fn test_state() -> AppState {
    let orders = Arc::new(MemoryOrderStore::new());
    let providers = Arc::new(StaticProviders::new(vec![provider()]));
    let rates = Arc::new(RateShopper::new(
        providers.clone(),
        Arc::new(MemoryRateCache::new()),
        Arc::new(MockRateSource),
        DEFAULT_TTL_MINUTES,
    ));
    let orchestrator = Arc::new(FulfillmentOrchestrator::new(
        orders.clone(),
        Arc::new(MockCarrier::new()),
        Arc::new(MemoryEventSink::new()),
        RetryPolicy {
            max_attempts: 3,
            base_delay: std::time::Duration::from_millis(1),
            backoff_multiplier: 2.0,
        },
    ));

    AppState {
        checkout: Arc::new(CheckoutService::new(orders.clone())),
        orders,
        carts: Arc::new(CartService::new(
            Arc::new(MemoryCartStore::new()),
            Arc::new(StaticCatalog::new(Vec::new())),
        )),
        rates,
        providers,
        gateway: Arc::new(MockPaymentGateway),
        orchestrator,
    }
}

fn item(seller_id: Uuid, price: f64) -> CartItem {
    CartItem {
        id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        size: Some("M".to_string()),
        color: None,
        quantity: 1,
        unit_price: price,
        unit_sale_price: None,
        product_name: "kurta".to_string(),
        thumbnail: "https://img.example.com/kurta.jpg".to_string(),
        unit_weight_kg: 0.5,
        origin: Origin {
            seller_id,
            pincode: "400001".to_string(),
            city: "Mumbai".to_string(),
            state: "Maharashtra".to_string(),
        },
    }
}

fn address() -> Address {
    Address {
        name: "Asha Rao".to_string(),
        mobile: Masked("9876543210".to_string()),
        line1: "12 MG Road".to_string(),
        line2: None,
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        pincode: "560001".to_string(),
        email: Some("asha@example.com".to_string()),
    }
}

/// One rate per group from the deterministic source, matching what the
/// quote endpoint would have returned for these items.
fn draft_for(items: &[CartItem], provider_id: Uuid) -> OrderDraft {
    let mut groups = partition(items);
    let mut shipping_total = 0.0;
    let mut items_total = 0.0;
    for group in &mut groups {
        let price = bazaar_shared::round2(45.0 + 20.0 * group.total_weight_kg);
        shipping_total += price;
        items_total += group.items_total;
        group.selected_rate = Some(ShippingRate {
            provider_id,
            courier_name: "quickship-surface".to_string(),
            courier_code: Some("QS".to_string()),
            price,
            estimated_days: 5,
            mode: ShippingMode::Surface,
            quoted_at: chrono::Utc::now(),
        });
    }

    OrderDraft {
        user_id: Some(Uuid::new_v4()),
        address: address(),
        groups,
        totals: OrderTotals {
            items_total,
            shipping_total,
            discount: 0.0,
            grand_total: items_total + shipping_total,
        },
    }
}

async fn post_json(router: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get_json(router: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_quote_partitions_by_seller() {
    let router = app(test_state());
    let items = vec![item(Uuid::new_v4(), 2000.0), item(Uuid::new_v4(), 1500.0)];

    let (status, body) = post_json(
        &router,
        "/v1/checkout/quote",
        json!({
            "items": serde_json::to_value(&items).unwrap(),
            "to_pincode": "560001",
            "mode": "surface",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let groups = body["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    for group in groups {
        assert_eq!(group["rates"]["status"], "quoted");
        assert_eq!(group["rates"]["rates"].as_array().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_quote_rejects_empty_cart() {
    let router = app(test_state());
    let (status, _) = post_json(
        &router,
        "/v1/checkout/quote",
        json!({ "items": [], "to_pincode": "560001" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_full_checkout_payment_fulfillment_flow() {
    let state = test_state();
    let router = app(state);
    let provider_id = Uuid::new_v4();
    let items = vec![item(Uuid::new_v4(), 2000.0), item(Uuid::new_v4(), 1500.0)];
    let draft = draft_for(&items, provider_id);

    // Place the order: recorded with shipments, payment registered.
    let (status, body) = post_json(
        &router,
        "/v1/orders",
        serde_json::to_value(&draft).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["code"], "BZ-1001");
    assert_eq!(body["order"]["payment_status"], "PENDING");
    assert_eq!(body["order"]["shipments"].as_array().unwrap().len(), 2);
    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    let gateway_order = body["payment"]["id"].as_str().unwrap().to_string();

    // Fulfillment before payment is refused.
    let (status, _) = post_json(
        &router,
        &format!("/v1/orders/{order_id}/fulfill"),
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Gateway confirms payment.
    let (status, _) = post_json(
        &router,
        "/v1/webhooks/payments",
        json!({
            "local_order_id": order_id,
            "gateway_order_id": gateway_order,
            "payment_id": "pay_123",
            "success": true,
            "error": null,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Explicit fulfillment run; idempotent alongside the webhook's
    // background run.
    let (status, report) = post_json(
        &router,
        &format!("/v1/orders/{order_id}/fulfill"),
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["status"], "CONFIRMED");
    assert_eq!(report["confirmed"], 2);
    assert_eq!(report["failed"], 0);

    let (status, order) = get_json(&router, &format!("/v1/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["payment_status"], "PAID");
    assert_eq!(order["fulfillment_status"], "CONFIRMED");
    for shipment in order["shipments"].as_array().unwrap() {
        assert_eq!(shipment["status"], "CONFIRMED");
        assert!(shipment["tracking_number"].is_string());
    }

    // Lookup by code matches lookup by id.
    let (status, by_code) = get_json(&router, "/v1/orders/code/BZ-1001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_code["id"], order["id"]);
}

#[tokio::test]
async fn test_successful_placement_clears_the_server_cart() {
    let cart_store = Arc::new(MemoryCartStore::new());
    let mut state = test_state();
    state.carts = Arc::new(CartService::new(
        cart_store.clone(),
        Arc::new(StaticCatalog::new(Vec::new())),
    ));
    let router = app(state);

    let mut draft = draft_for(&[item(Uuid::new_v4(), 2000.0)], Uuid::new_v4());
    let user_id = draft.user_id.unwrap();

    let mut cart = bazaar_cart::models::Cart::new(user_id);
    cart.items.push(item(Uuid::new_v4(), 500.0));
    cart_store.save(&cart, 0).await.unwrap();

    let (status, _) = post_json(
        &router,
        "/v1/orders",
        serde_json::to_value(&draft).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cart_store.load(user_id).await.unwrap().is_none());

    // A rejected draft leaves the cart alone.
    cart_store.save(&cart, 0).await.unwrap();
    draft.totals.grand_total += 100.0;
    let (status, _) = post_json(
        &router,
        "/v1/orders",
        serde_json::to_value(&draft).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(cart_store.load(user_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_mismatched_totals_rejected_with_400() {
    let router = app(test_state());
    let mut draft = draft_for(&[item(Uuid::new_v4(), 2000.0)], Uuid::new_v4());
    draft.totals.grand_total += 100.0;

    let (status, body) = post_json(
        &router,
        "/v1/orders",
        serde_json::to_value(&draft).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("reconcile"));
}

#[tokio::test]
async fn test_unknown_order_is_404() {
    let router = app(test_state());
    let (status, _) = get_json(&router, &format!("/v1/orders/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_merge_returns_local_when_catalog_is_empty() {
    // The static catalog has no products, so every merged line is dropped;
    // the endpoint still answers with a cart.
    let router = app(test_state());
    let items = vec![item(Uuid::new_v4(), 500.0)];

    let (status, body) = post_json(
        &router,
        "/v1/cart/merge",
        json!({
            "user_id": Uuid::new_v4(),
            "items": serde_json::to_value(&items).unwrap(),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_provider_toggle_and_tracking_validation() {
    let state = test_state();
    let provider_id = state.providers.list_enabled().await.unwrap()[0].id;
    let router = app(state);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/v1/providers/{provider_id}"))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "enabled": false }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Disabled provider means nothing can quote.
    let (status, body) = post_json(
        &router,
        "/v1/checkout/quote",
        json!({
            "items": serde_json::to_value(&[item(Uuid::new_v4(), 100.0)]).unwrap(),
            "to_pincode": "560001",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["groups"][0]["rates"]["status"], "not_serviceable");

    // Empty tracking number is rejected.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/v1/shipments/{}/tracking", Uuid::new_v4()))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "tracking_number": "  " }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
