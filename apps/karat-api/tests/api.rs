//! Router-level tests against an in-memory store.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use karat_api::{router, AppState};
use karat_core::{ChargeMode, Money, PricingMode, ProductItemDetail};
use karat_db::repository::catalog::{NewItemDetail, NewProduct};
use karat_db::{Database, DbConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

struct Fixture {
    app: Router,
    db: Database,
    mumbai: String,
    pune: String,
    item: ProductItemDetail,
}

async fn setup() -> Fixture {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let mumbai = db.branches().insert("MUM", "Mumbai Flagship").await.unwrap();
    let pune = db.branches().insert("PUN", "Pune Showroom").await.unwrap();
    let gold = db
        .materials()
        .insert("Gold 22K", Money::from_cents(625_000))
        .await
        .unwrap();

    let product = db
        .catalog()
        .insert_product(&NewProduct {
            sku: "GR-22-001".to_string(),
            hsn_code: Some("7113".to_string()),
            name: "Plain Gold Band".to_string(),
            material_id: Some(gold.id),
            category_id: Some("rings".to_string()),
            subcategory_id: None,
            pricing_mode: PricingMode::WeightBased,
            branch_id: mumbai.id.clone(),
        })
        .await
        .unwrap();
    let item = db
        .catalog()
        .insert_item(
            &product.id,
            &NewItemDetail {
                sku: "GR-22-001-A".to_string(),
                quantity: 20,
                net_weight_mg: 4_500,
                gross_weight_mg: 4_800,
                stone_value_cents: 0,
                rate_per_gram_cents: 0,
                making_charge_mode: ChargeMode::Percentage,
                making_charge_value: 1_200,
                wastage_mode: ChargeMode::Amount,
                wastage_value: 0,
            },
        )
        .await
        .unwrap();

    Fixture {
        app: router(AppState::new(db.clone())),
        db,
        mumbai: mumbai.id,
        pune: pune.id,
        item,
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// 10 × ₹100, 10% off, CGST ₹9, SGST ₹9.
fn invoice_body(fixture: &Fixture, payments: Value) -> Value {
    json!({
        "header": {
            "invoice_date": "2024-06-01",
            "branch_id": fixture.mumbai,
            "status": "invoice",
            "discount_type": "percentage",
            "discount_value": 1000,
            "cgst_cents": 900,
            "sgst_cents": 900
        },
        "items": [{
            "product_id": fixture.item.product_id,
            "product_item_detail_id": fixture.item.id,
            "quantity": 10,
            "rate_cents": 10000
        }],
        "payments": payments
    })
}

#[tokio::test]
async fn test_create_invoice_worked_example() {
    let fixture = setup().await;
    let body = invoice_body(&fixture, json!([{ "mode": "cash", "amount_cents": 91800 }]));

    let (status, envelope) = send(&fixture.app, "POST", "/api/sales-invoices", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(envelope["statusCode"], 201);
    let invoice = &envelope["data"]["invoice"];
    assert_eq!(invoice["invoice_no"], "INV/2024-25/0001");
    assert_eq!(invoice["total_cents"], 91_800);
    assert_eq!(invoice["amount_due_cents"], 0);
    assert_eq!(invoice["refund_cents"], 0);

    let item = fixture.db.catalog().get_item(&fixture.item.id).await.unwrap().unwrap();
    assert_eq!(item.quantity, 10);

    let id = invoice["id"].as_str().unwrap();
    let (status, fetched) =
        send(&fixture.app, "GET", &format!("/api/sales-invoices/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(fetched["data"]["payments"][0]["amount_cents"], 91_800);
}

#[tokio::test]
async fn test_cash_over_limit_is_rejected() {
    let fixture = setup().await;
    let body = invoice_body(
        &fixture,
        json!([
            { "mode": "cash", "amount_cents": 15_000_000 },
            { "mode": "cash", "amount_cents": 15_000_000 }
        ]),
    );

    let (status, envelope) = send(&fixture.app, "POST", "/api/sales-invoices", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["statusCode"], 400);
    assert!(envelope["data"].is_null());
    assert!(envelope["message"].as_str().unwrap().contains("PAN"));

    let item = fixture.db.catalog().get_item(&fixture.item.id).await.unwrap().unwrap();
    assert_eq!(item.quantity, 20);
}

#[tokio::test]
async fn test_finalized_invoice_cannot_be_updated() {
    let fixture = setup().await;
    let body = invoice_body(&fixture, json!([{ "mode": "upi", "amount_cents": 91800 }]));

    let (_, created) =
        send(&fixture.app, "POST", "/api/sales-invoices", Some(body.clone())).await;
    let id = created["data"]["invoice"]["id"].as_str().unwrap();

    let (status, envelope) =
        send(&fixture.app, "PUT", &format!("/api/sales-invoices/{id}"), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(envelope["message"].as_str().unwrap().contains("finalized"));
}

#[tokio::test]
async fn test_malformed_body_uses_envelope() {
    let fixture = setup().await;

    let (status, envelope) = send(
        &fixture.app,
        "POST",
        "/api/sales-invoices",
        Some(json!({ "header": {} })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["statusCode"], 400);
    assert!(envelope["data"].is_null());
}

#[tokio::test]
async fn test_transfer_lifecycle() {
    let fixture = setup().await;
    let body = json!({
        "transfer_date": "2024-06-01",
        "branch_from": fixture.mumbai,
        "branch_to": fixture.pune,
        "items": [{
            "product_id": fixture.item.product_id,
            "product_item_detail_id": fixture.item.id,
            "transfer_quantity": 4
        }]
    });

    let (status, created) = send(&fixture.app, "POST", "/api/stock-transfers", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["transfer"]["transfer_no"], "ST/2024-25/0001");
    assert_eq!(created["data"]["transfer"]["status_id"], 1);
    assert_eq!(created["data"]["items"][0]["resolution"], "clone");
    let id = created["data"]["transfer"]["id"].as_str().unwrap().to_string();
    let status_uri = format!("/api/stock-transfers/{id}/status");

    // Pending cannot jump to delivered
    let (status, envelope) = send(
        &fixture.app,
        "PATCH",
        &status_uri,
        Some(json!({ "status_id": 3, "delivery_date": "2024-06-03" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(envelope["data"].is_null());

    let (status, dispatched) = send(
        &fixture.app,
        "PATCH",
        &status_uri,
        Some(json!({ "status_id": 2, "dispatch_date": "2024-06-02", "vehicle_no": "MH-12-AB-1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dispatched["data"]["transfer"]["status_id"], 2);
    assert_eq!(dispatched["data"]["tracking"]["vehicle_no"], "MH-12-AB-1234");

    let (status, fetched) =
        send(&fixture.app, "GET", &format!("/api/stock-transfers/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["timeline"].as_array().unwrap().len(), 2);

    let source = fixture.db.catalog().get_item(&fixture.item.id).await.unwrap().unwrap();
    assert_eq!(source.quantity, 16);
}

#[tokio::test]
async fn test_price_quote() {
    let fixture = setup().await;
    let uri = format!(
        "/api/products/{}/items/{}/price",
        fixture.item.product_id, fixture.item.id
    );

    let (status, envelope) = send(&fixture.app, "GET", &uri, None).await;

    assert_eq!(status, StatusCode::OK);
    // 4.5 g × ₹6,250 = ₹28,125; 12% making = ₹3,375; 3% tax on ₹31,500
    assert_eq!(envelope["data"]["contribution"], 2_812_500);
    assert_eq!(envelope["data"]["making_charge"], 337_500);
    assert_eq!(envelope["data"]["selling_price"], 3_150_000);
    assert_eq!(envelope["data"]["tax"], 94_500);
    assert_eq!(envelope["data"]["final_price"], 3_244_500);
}

#[tokio::test]
async fn test_unknown_documents_are_404() {
    let fixture = setup().await;

    let (status, envelope) = send(&fixture.app, "GET", "/api/sales-invoices/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(envelope["statusCode"], 404);

    let (status, _) = send(&fixture.app, "GET", "/api/stock-transfers/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &fixture.app,
        "PATCH",
        "/api/stock-transfers/missing/status",
        Some(json!({ "status_id": 2, "dispatch_date": "2024-06-02" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let fixture = setup().await;

    let (status, envelope) = send(&fixture.app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope["data"]["database"], "up");
}
