//! Payment gateway callback.
//!
//! The gateway confirms a hosted-checkout outcome by POSTing here. A
//! success result code settles the referenced invoice through the normal
//! workflow path; anything else is acknowledged and ignored (the invoice
//! simply stays unpaid).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::routes::invoices::AppState;

/// Result code the gateway sends for a successful payment.
const RESULT_SUCCESS: i64 = 0;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackBody {
    /// The invoice id the payment was created for.
    pub order_ref: String,
    pub result_code: i64,
    pub amount_cents: i64,
    pub pay_type: String,
}

/// `POST /payments/callback`.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CallbackBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.result_code != RESULT_SUCCESS {
        warn!(
            order_ref = %body.order_ref,
            result_code = body.result_code,
            "Gateway reported failed payment"
        );
        return Ok(Json(serde_json::json!({ "settled": false })));
    }

    state
        .db
        .invoice_workflow()
        .settle(&body.order_ref, body.amount_cents, &body.pay_type)
        .await?;

    info!(order_ref = %body.order_ref, "Gateway callback settled invoice");

    Ok(Json(serde_json::json!({ "settled": true })))
}
