use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use storefront_common::Cents;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

//--------------------------------------      ProductId       ---------------------------------------------------------
/// Canonical product identity. Every reference to a catalog entry, whether in a cart, a line-item snapshot, or an
/// entitlement check, uses this opaque string id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct ProductId(pub String);

impl<S: Into<String>> From<S> for ProductId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------        OrderId        --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been created and no payment confirmation has arrived yet. For manual-settlement orders this is
    /// the resting state until an operator fulfils the order.
    Pending,
    /// A payment provider has confirmed settlement in full.
    Paid,
    /// The goods have been handed over. Terminal.
    Fulfilled,
    /// The payment provider reported a failed or declined payment. Terminal.
    Failed,
}

impl OrderStatusType {
    /// Statuses that grant entitlement to digital goods on the order.
    pub fn is_settled(&self) -> bool {
        matches!(self, OrderStatusType::Paid | OrderStatusType::Fulfilled)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Fulfilled | OrderStatusType::Failed)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Paid => write!(f, "Paid"),
            OrderStatusType::Fulfilled => write!(f, "Fulfilled"),
            OrderStatusType::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Fulfilled" => Ok(Self::Fulfilled),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

//--------------------------------------    PaymentMethod      --------------------------------------------------------
/// The closed set of payment paths. The tag is fixed on the order at checkout by the country mapping and never
/// changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Hosted card processor. Confirmation arrives on a signed webhook.
    Card,
    /// Push-payment to the buyer's handset. Confirmation arrives on an unsigned callback.
    MobileMoney,
    /// Out-of-band settlement. No confirmation channel exists; an operator fulfils the order directly.
    Manual,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "Card"),
            PaymentMethod::MobileMoney => write!(f, "MobileMoney"),
            PaymentMethod::Manual => write!(f, "Manual"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Card" => Ok(Self::Card),
            "MobileMoney" => Ok(Self::MobileMoney),
            "Manual" => Ok(Self::Manual),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------   ProductCategory     --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum ProductCategory {
    Perfume,
    Ebook,
}

impl ProductCategory {
    pub fn is_digital(&self) -> bool {
        matches!(self, ProductCategory::Ebook)
    }
}

impl Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductCategory::Perfume => write!(f, "Perfume"),
            ProductCategory::Ebook => write!(f, "Ebook"),
        }
    }
}

impl FromStr for ProductCategory {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Perfume" => Ok(Self::Perfume),
            "Ebook" => Ok(Self::Ebook),
            s => Err(ConversionError(format!("Invalid product category: {s}"))),
        }
    }
}

//--------------------------------------       Product         --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Cents,
    pub category: ProductCategory,
    pub image: String,
    pub active: bool,
    /// Short excerpt shown on the detail page for ebooks. Not gated.
    pub preview: Option<String>,
    /// Opaque handle into the asset vault for the encrypted ebook payload.
    pub asset_handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Cents,
    pub category: ProductCategory,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub preview: Option<String>,
}

//--------------------------------------       LineItem        --------------------------------------------------------
/// An immutable snapshot of a catalog entry at checkout time. Price and name are copied, not referenced, so later
/// catalog edits never alter historical orders.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Cents,
    pub quantity: i64,
    pub category: ProductCategory,
}

impl LineItem {
    pub fn subtotal(&self) -> Cents {
        self.unit_price * self.quantity
    }
}

//--------------------------------------        Order          --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub country: String,
    pub email: Option<String>,
    pub payment_method: PaymentMethod,
    /// Computed once from the line-item snapshot at creation. Never recomputed.
    pub total_price: Cents,
    pub status: OrderStatusType,
    /// The only binding between an external payment event and this order. Handed to the provider at `begin()` and
    /// echoed back in its confirmation.
    pub correlation_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder        --------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub country: String,
    pub email: Option<String>,
    pub payment_method: PaymentMethod,
}

impl NewOrder {
    /// Returns the name of the first required buyer field that is blank, if any.
    pub fn first_blank_field(&self) -> Option<&'static str> {
        if self.customer_name.trim().is_empty() {
            Some("name")
        } else if self.phone.trim().is_empty() {
            Some("phone")
        } else if self.address.trim().is_empty() {
            Some("address")
        } else if self.country.trim().is_empty() {
            Some("country")
        } else {
            None
        }
    }
}
