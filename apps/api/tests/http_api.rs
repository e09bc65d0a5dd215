//! Integration tests for the API server against an in-memory database.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use tower::ServiceExt;
use uuid::Uuid;

use shop_core::{Customer, Employee, PaymentMethod, Product};
use shop_db::{Database, DbConfig};

struct TestApp {
    app: axum::Router,
    employee_id: String,
    customer_id: String,
    cola_id: String,
}

async fn setup() -> TestApp {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");

    let now = Utc::now();

    let employee = Employee {
        id: Uuid::new_v4().to_string(),
        code: "EMP01".to_string(),
        name: "Alice".to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.employees().insert(&employee).await.expect("employee");

    let customer = Customer {
        id: Uuid::new_v4().to_string(),
        code: "CUS01".to_string(),
        name: "Bob's Bakery".to_string(),
        phone: None,
        email: None,
        total_debt_cents: 0,
        total_purchase_cents: 0,
        total_purchase_count: 0,
        loyalty_points: 0,
        created_at: now,
        updated_at: now,
    };
    db.customers().insert(&customer).await.expect("customer");

    let cola = Product {
        id: Uuid::new_v4().to_string(),
        code: "COLA".to_string(),
        name: "Cola 330ml".to_string(),
        price_cents: 1_500,
        stock: 10,
        min_stock: 2,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&cola).await.expect("cola");

    let cash = PaymentMethod {
        id: Uuid::new_v4().to_string(),
        code: "cash".to_string(),
        name: "Cash".to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.payment_methods().insert(&cash).await.expect("method");

    let state = shop_api::create_default_state(db);
    TestApp {
        app: shop_api::create_app(state),
        employee_id: employee.id,
        customer_id: customer.id,
        cola_id: cola.id,
    }
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn create_body(t: &TestApp, code: &str, quantity: i64, paid: i64) -> serde_json::Value {
    serde_json::json!({
        "code": code,
        "customerId": t.customer_id,
        "employeeId": t.employee_id,
        "amountPaidCents": paid,
        "lines": [
            { "productId": t.cola_id, "quantity": quantity, "unitPriceCents": 1_500 }
        ]
    })
}

async fn create_invoice(t: &TestApp, code: &str, quantity: i64, paid: i64) -> serde_json::Value {
    let response = t
        .app
        .clone()
        .oneshot(json_request("POST", "/invoices", create_body(t, code, quantity, paid)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_health_check() {
    let t = setup().await;

    let response = t
        .app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_create_invoice_returns_hydrated_aggregate() {
    let t = setup().await;

    let json = create_invoice(&t, "HD0001", 2, 3_000).await;

    assert_eq!(json["code"], "HD0001");
    assert_eq!(json["totalCents"], 3_000);
    assert_eq!(json["finalCents"], 3_000);
    assert_eq!(json["paymentStatus"], "paid");
    assert_eq!(json["customerName"], "Bob's Bakery");
    assert_eq!(json["employeeName"], "Alice");
    assert_eq!(json["lines"][0]["productCode"], "COLA");
    assert_eq!(json["lines"][0]["lineTotalCents"], 3_000);
}

#[tokio::test]
async fn test_insufficient_stock_is_conflict_with_reason_code() {
    let t = setup().await;

    let response = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/invoices",
            create_body(&t, "HD0002", 99, 0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "INSUFFICIENT_STOCK");
}

#[tokio::test]
async fn test_validation_failure_is_bad_request() {
    let t = setup().await;

    // Zero quantity fails validation before any lookup.
    let response = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/invoices",
            create_body(&t, "HD0003", 0, 0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_settlement_round_trip() {
    let t = setup().await;

    let invoice = create_invoice(&t, "HD0010", 2, 0).await;
    let id = invoice["id"].as_str().unwrap();

    // Wrong amount is rejected.
    let response = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/invoices/{id}/payment"),
            serde_json::json!({ "amountCents": 1_000, "paymentType": "cash" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "SETTLEMENT_AMOUNT_MISMATCH");

    // Full amount settles.
    let response = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/invoices/{id}/payment"),
            serde_json::json!({ "amountCents": 3_000, "paymentType": "cash" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["paymentStatus"], "paid");
    assert_eq!(json["paymentMethodName"], "Cash");

    // Settling again is a conflict.
    let response = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/invoices/{id}/payment"),
            serde_json::json!({ "amountCents": 3_000, "paymentType": "cash" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "ALREADY_PAID");
}

#[tokio::test]
async fn test_update_and_delete() {
    let t = setup().await;

    let invoice = create_invoice(&t, "HD0020", 2, 0).await;
    let id = invoice["id"].as_str().unwrap();

    let response = t
        .app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/invoices/{id}"),
            serde_json::json!({ "discountCents": 500, "notes": "rush" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["finalCents"], 2_500);
    assert_eq!(json["notes"], "rush");

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/invoices/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone.
    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/invoices/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_paid_invoice_is_conflict() {
    let t = setup().await;

    let invoice = create_invoice(&t, "HD0021", 1, 1_500).await;
    let id = invoice["id"].as_str().unwrap();

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/invoices/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "CANNOT_DELETE_PAID_INVOICE");
}

#[tokio::test]
async fn test_queries() {
    let t = setup().await;

    create_invoice(&t, "HD0030", 1, 1_500).await;
    create_invoice(&t, "HD0031", 1, 0).await;

    let response = t
        .app
        .clone()
        .oneshot(Request::builder().uri("/invoices").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/invoices/by-status/unpaid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["code"], "HD0031");

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/invoices/by-status/partial")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/invoices/by-customer/{}", t.customer_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/invoices/search?keyword=HD0030")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_gateway_callback_settles_invoice() {
    let t = setup().await;

    let invoice = create_invoice(&t, "HD0040", 2, 0).await;
    let id = invoice["id"].as_str().unwrap();

    // A failed payment is acknowledged but changes nothing.
    let response = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/payments/callback",
            serde_json::json!({
                "orderRef": id, "resultCode": 42, "amountCents": 3_000, "payType": "cash"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["settled"], false);

    // A successful one settles.
    let response = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/payments/callback",
            serde_json::json!({
                "orderRef": id, "resultCode": 0, "amountCents": 3_000, "payType": "cash"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["settled"], true);

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/invoices/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["paymentStatus"], "paid");
}

#[tokio::test]
async fn test_payment_link_and_print() {
    let t = setup().await;

    let invoice = create_invoice(&t, "HD0050", 1, 0).await;
    let id = invoice["id"].as_str().unwrap();

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/invoices/{id}/payment-link"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["payUrl"].as_str().unwrap().contains(id));

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/invoices/{id}/print"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("INVOICE HD0050"));
    assert!(text.contains("Cola 330ml"));
}
