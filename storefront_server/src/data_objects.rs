use std::fmt::Display;

use serde::{Deserialize, Serialize};
use storefront_common::Cents;
use storefront_engine::{
    db_types::{OrderId, OrderStatusType, ProductId},
    payments::CheckoutAction,
};

/// One cart row as submitted by the storefront client. Only the identity and the quantity are trusted; names and
/// prices are re-read from the catalog at snapshot time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub country: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cart: Vec<CartLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub status: OrderStatusType,
    pub total: Cents,
    /// What the buyer must do next to settle the order.
    pub payment: CheckoutAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadParams {
    /// The buyer's email address, i.e. the identity entitlements are keyed on.
    pub buyer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetUploadParams {
    /// Optional ungated excerpt to publish alongside the encrypted payload.
    #[serde(default)]
    pub preview: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeResult {
    pub deleted: u64,
}
