//! External collaborators behind traits: the payment gateway and the
//! invoice printer. The server only ever talks to the traits; the local
//! stubs here stand in until a real integration is wired up.

use async_trait::async_trait;
use thiserror::Error;

use shop_core::Money;
use shop_db::HydratedInvoice;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("payment gateway error: {0}")]
    Gateway(String),

    #[error("printer error: {0}")]
    Printer(String),
}

// =============================================================================
// Payment gateway
// =============================================================================

/// A hosted-checkout link created at the gateway.
#[derive(Debug, Clone)]
pub struct PaymentLink {
    pub pay_url: String,
    pub order_id: String,
}

/// Creates hosted-checkout payments at an external gateway. The gateway
/// later confirms the outcome through `POST /payments/callback`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment(
        &self,
        order_ref: &str,
        amount: Money,
    ) -> Result<PaymentLink, CollaboratorError>;
}

/// Local stand-in: hands out a fake checkout URL without calling anyone.
#[derive(Debug, Default, Clone)]
pub struct LocalPaymentGateway;

#[async_trait]
impl PaymentGateway for LocalPaymentGateway {
    async fn create_payment(
        &self,
        order_ref: &str,
        amount: Money,
    ) -> Result<PaymentLink, CollaboratorError> {
        Ok(PaymentLink {
            pay_url: format!(
                "https://pay.localhost/checkout/{}?amount={}",
                order_ref,
                amount.cents()
            ),
            order_id: order_ref.to_string(),
        })
    }
}

// =============================================================================
// Invoice printer
// =============================================================================

/// Renders a hydrated invoice to printable bytes.
#[async_trait]
pub trait InvoicePrinter: Send + Sync {
    /// MIME type of the rendered output.
    fn content_type(&self) -> &'static str;

    async fn render(&self, invoice: &HydratedInvoice) -> Result<Vec<u8>, CollaboratorError>;
}

/// Plain-text receipt renderer; stands in for the PDF renderer.
#[derive(Debug, Default, Clone)]
pub struct PlainTextPrinter;

#[async_trait]
impl InvoicePrinter for PlainTextPrinter {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    async fn render(&self, invoice: &HydratedInvoice) -> Result<Vec<u8>, CollaboratorError> {
        let s = &invoice.summary;
        let mut out = String::new();

        out.push_str(&format!("INVOICE {}\n", s.code));
        out.push_str(&format!("Date: {}\n", s.invoice_date.format("%Y-%m-%d %H:%M")));
        out.push_str(&format!("Cashier: {}\n", s.employee_name));
        if let Some(name) = &s.customer_name {
            out.push_str(&format!("Customer: {name}\n"));
        }
        out.push_str("----------------------------------------\n");
        for l in &invoice.lines {
            out.push_str(&format!(
                "{:<24} {:>3} x {:>8} = {:>10}\n",
                l.product_name,
                l.quantity,
                Money::from_cents(l.unit_price_cents),
                Money::from_cents(l.line_total_cents),
            ));
        }
        out.push_str("----------------------------------------\n");
        out.push_str(&format!("Total:    {}\n", Money::from_cents(s.total_cents)));
        out.push_str(&format!(
            "Discount: {}\n",
            Money::from_cents(s.discount_cents)
        ));
        out.push_str(&format!("Due:      {}\n", Money::from_cents(s.final_cents)));
        out.push_str(&format!(
            "Paid:     {} ({})\n",
            Money::from_cents(s.amount_paid_cents),
            s.payment_status.as_str()
        ));

        Ok(out.into_bytes())
    }
}
