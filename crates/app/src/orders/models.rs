//! Order Models

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use swiftshop::{cart::CartStore, ids::TypedId, prices::Price, products::ProductId};

use crate::{
    auth::{User, UserId},
    products::{
        ProductsServiceError,
        models::{ProductRecord, price_from_wire},
    },
    timestamps::server_time,
};

/// Order Id
pub type OrderId = TypedId<Order>;

/// Order Item Id
pub type OrderItemId = TypedId<OrderItem>;

/// Fulfilment status, in the order an order moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pendente,
    Processando,
    Enviado,
    Entregue,
}

impl OrderStatus {
    /// Every status, in fulfilment order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pendente,
        OrderStatus::Processando,
        OrderStatus::Enviado,
        OrderStatus::Entregue,
    ];

    /// Wire value, also used as the display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pendente => "Pendente",
            OrderStatus::Processando => "Processando",
            OrderStatus::Enviado => "Enviado",
            OrderStatus::Entregue => "Entregue",
        }
    }

    /// Status an admin advances to next; wraps around after delivery.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            OrderStatus::Pendente => OrderStatus::Processando,
            OrderStatus::Processando => OrderStatus::Enviado,
            OrderStatus::Enviado => OrderStatus::Entregue,
            OrderStatus::Entregue => OrderStatus::Pendente,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order line with the server-authoritative unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: f64,
    pub product: ProductRecord,
}

impl OrderItem {
    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns an error when the server sent an unusable unit price.
    pub fn line_total(&self) -> Result<Price, ProductsServiceError> {
        Ok(price_from_wire(self.unit_price)?.times(self.quantity))
    }
}

/// Order Model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    #[serde(with = "server_time")]
    pub created_at: Timestamp,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub user: Option<User>,
}

impl Order {
    /// Sum of the order's line totals at the prices the server charged.
    ///
    /// # Errors
    ///
    /// Returns an error when any line carries an unusable unit price.
    pub fn items_total(&self) -> Result<Price, ProductsServiceError> {
        self.items.iter().try_fold(Price::ZERO, |total, item| {
            Ok(Price::new(total.saturating_add(*item.line_total()?)))
        })
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// One line of an order request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderRequestItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub items: Vec<OrderRequestItem>,
}

impl OrderRequest {
    /// One request line per cart line; size-split lines of a product stay separate.
    #[must_use]
    pub fn from_cart(cart: &CartStore) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| OrderRequestItem {
                    product_id: line.product_id(),
                    quantity: line.quantity,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
