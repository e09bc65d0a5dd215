//! Invoice endpoints: the workflow operations (create, update, settle,
//! delete) plus the read-side queries and the print rendering.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use shop_core::{LineRequest, Money, PaymentStatus};
use shop_db::{
    CreateInvoiceRequest, Database, HydratedInvoice, InvoiceSummary, UpdateInvoiceRequest,
};

use crate::collaborators::{InvoicePrinter, PaymentGateway};
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub db: Database,
    pub gateway: Arc<dyn PaymentGateway>,
    pub printer: Arc<dyn InvoicePrinter>,
}

const DEFAULT_LIMIT: u32 = 100;

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceBody {
    pub code: String,
    pub customer_id: Option<String>,
    pub employee_id: String,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub amount_paid_cents: i64,
    pub payment_method_id: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<LineBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineBody {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceBody {
    pub notes: Option<String>,
    pub discount_cents: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleBody {
    pub amount_cents: i64,
    pub payment_type: String,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub keyword: String,
    pub limit: Option<u32>,
}

// -- Handlers --

/// `POST /invoices` - runs the creation workflow, returns the hydrated
/// invoice with 201.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateInvoiceBody>,
) -> Result<(StatusCode, Json<HydratedInvoice>), ApiError> {
    let lines = body
        .lines
        .into_iter()
        .map(|l| LineRequest {
            product_id: l.product_id,
            quantity: l.quantity,
            unit_price: Money::from_cents(l.unit_price_cents),
        })
        .collect();

    let invoice = state
        .db
        .invoice_workflow()
        .create(CreateInvoiceRequest {
            code: body.code,
            customer_id: body.customer_id,
            employee_id: body.employee_id,
            discount_cents: body.discount_cents,
            amount_paid_cents: body.amount_paid_cents,
            payment_method_id: body.payment_method_id,
            notes: body.notes,
            lines,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

/// `PUT /invoices/{id}` - updates notes/discount on an unpaid invoice.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateInvoiceBody>,
) -> Result<Json<HydratedInvoice>, ApiError> {
    let invoice = state
        .db
        .invoice_workflow()
        .update(
            &id,
            UpdateInvoiceRequest {
                notes: body.notes,
                discount_cents: body.discount_cents,
            },
        )
        .await?;

    Ok(Json(invoice))
}

/// `POST /invoices/{id}/payment` - settles an unpaid invoice in full.
pub async fn settle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<SettleBody>,
) -> Result<Json<HydratedInvoice>, ApiError> {
    let invoice = state
        .db
        .invoice_workflow()
        .settle(&id, body.amount_cents, &body.payment_type)
        .await?;

    Ok(Json(invoice))
}

/// `DELETE /invoices/{id}` - deletes an unpaid invoice and reverses its
/// side effects.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.invoice_workflow().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /invoices` - newest first.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<InvoiceSummary>>, ApiError> {
    let invoices = state
        .db
        .invoices()
        .list(params.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(invoices))
}

/// `GET /invoices/{id}` - the hydrated aggregate.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<HydratedInvoice>, ApiError> {
    let invoice = state
        .db
        .invoices()
        .get_hydrated(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("invoice {id}")))?;
    Ok(Json(invoice))
}

/// `GET /invoices/search?keyword=` - matches invoice code and customer name.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<InvoiceSummary>>, ApiError> {
    let invoices = state
        .db
        .invoices()
        .search(&params.keyword, params.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(invoices))
}

/// `GET /invoices/by-status/{status}` - `unpaid` or `paid`.
pub async fn by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<InvoiceSummary>>, ApiError> {
    let status = PaymentStatus::parse(&status)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown payment status '{status}'")))?;

    let invoices = state
        .db
        .invoices()
        .list_by_status(status, params.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(invoices))
}

/// `GET /invoices/by-customer/{id}`.
pub async fn by_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<InvoiceSummary>>, ApiError> {
    let invoices = state
        .db
        .invoices()
        .list_by_customer(&customer_id, params.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(invoices))
}

/// `GET /invoices/{id}/print` - renders the invoice through the printer
/// collaborator and returns the raw bytes.
pub async fn print(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let invoice = state
        .db
        .invoices()
        .get_hydrated(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("invoice {id}")))?;

    let bytes = state
        .printer
        .render(&invoice)
        .await
        .map_err(|e| ApiError::Collaborator(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, state.printer.content_type())],
        bytes,
    )
        .into_response())
}

/// `POST /invoices/{id}/payment-link` - asks the gateway for a hosted
/// checkout link covering the invoice's final amount.
pub async fn payment_link(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let invoice = state
        .db
        .invoices()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("invoice {id}")))?;

    let link = state
        .gateway
        .create_payment(&invoice.id, invoice.final_amount())
        .await
        .map_err(|e| ApiError::Collaborator(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "payUrl": link.pay_url,
        "orderId": link.order_id,
    })))
}
