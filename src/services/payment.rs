//! Payment gateway: invoice creation and status lookup with Monobank acquiring

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::PaymentConfig,
    error::{AppError, AppResult},
    models::InvoiceStatus,
};

const SERVICE: &str = "payment";

/// Invoice to open with the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub amount_minor: i64,
    /// ISO 4217 numeric currency code
    pub currency: i32,
    pub reference: String,
    pub description: String,
    /// Basket line label shown on the hosted page
    pub item_name: String,
    pub redirect_url: String,
    pub webhook_url: String,
    pub validity_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedInvoice {
    pub invoice_id: String,
    pub hosted_page_url: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_invoice(&self, invoice: &NewInvoice) -> AppResult<CreatedInvoice>;

    /// Current invoice status as the provider records it
    async fn invoice_status(&self, invoice_id: &str) -> AppResult<InvoiceStatus>;
}

#[derive(Clone)]
pub struct MonobankAcquiring {
    http: Client,
    config: PaymentConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceCreateBody<'a> {
    amount: i64,
    ccy: i32,
    merchant_paym_info: MerchantPaymInfo<'a>,
    redirect_url: &'a str,
    web_hook_url: &'a str,
    validity: u64,
    payment_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MerchantPaymInfo<'a> {
    reference: &'a str,
    destination: &'a str,
    comment: &'a str,
    basket_order: Vec<BasketItem<'a>>,
}

#[derive(Debug, Serialize)]
struct BasketItem<'a> {
    name: &'a str,
    qty: u32,
    sum: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceCreated {
    invoice_id: String,
    page_url: String,
}

#[derive(Debug, Deserialize)]
struct InvoiceStatusBody {
    status: InvoiceStatus,
}

impl MonobankAcquiring {
    pub fn new(http: Client, config: PaymentConfig) -> Self {
        Self { http, config }
    }

    fn token(&self) -> AppResult<&str> {
        self.config
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Configuration("Payment provider token is not configured".to_string()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn body<'a>(&'a self, invoice: &'a NewInvoice) -> InvoiceCreateBody<'a> {
        InvoiceCreateBody {
            amount: invoice.amount_minor,
            ccy: invoice.currency,
            merchant_paym_info: MerchantPaymInfo {
                reference: &invoice.reference,
                destination: &self.config.destination,
                comment: &invoice.description,
                basket_order: vec![BasketItem {
                    name: &invoice.item_name,
                    qty: 1,
                    sum: invoice.amount_minor,
                }],
            },
            redirect_url: &invoice.redirect_url,
            web_hook_url: &invoice.webhook_url,
            validity: invoice.validity_secs,
            payment_type: "debit",
        }
    }
}

#[async_trait]
impl PaymentGateway for MonobankAcquiring {
    async fn create_invoice(&self, invoice: &NewInvoice) -> AppResult<CreatedInvoice> {
        let token = self.token()?;

        let response = self
            .http
            .post(self.endpoint("/api/merchant/invoice/create"))
            .header("X-Token", token)
            .json(&self.body(invoice))
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Invoice request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let details = response.json::<serde_json::Value>().await.ok();
            return Err(AppError::Upstream {
                service: SERVICE,
                message: format!("Invoice creation rejected ({})", status),
                details,
            });
        }

        let created: InvoiceCreated = response
            .json()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Failed to parse invoice response: {}", e)))?;

        tracing::info!(invoice_id = %created.invoice_id, "Invoice created");
        Ok(CreatedInvoice {
            invoice_id: created.invoice_id,
            hosted_page_url: created.page_url,
        })
    }

    async fn invoice_status(&self, invoice_id: &str) -> AppResult<InvoiceStatus> {
        let token = self.token()?;

        let response = self
            .http
            .get(self.endpoint("/api/merchant/invoice/status"))
            .query(&[("invoiceId", invoice_id)])
            .header("X-Token", token)
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Invoice status request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let details = response.json::<serde_json::Value>().await.ok();
            return Err(AppError::Upstream {
                service: SERVICE,
                message: format!("Invoice status lookup rejected ({})", status),
                details,
            });
        }

        let body: InvoiceStatusBody = response
            .json()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Failed to parse invoice status: {}", e)))?;
        tracing::debug!(invoice_id, status = ?body.status, "Invoice status fetched");
        Ok(body.status)
    }
}
