//! Request and response bodies for the credit store endpoints.
//!
//! Field names follow the JSON the mobile client already consumes
//! (`total`, `totalPoints`, `cart`).

use serde::{Deserialize, Serialize};

use crate::application::CheckoutReceipt;
use crate::domain::cart::{CartEntry, CartView};
use crate::domain::catalog::CreditItem;
use crate::domain::checkout::TransactionHistory;
use crate::domain::foundation::{CartEntryId, CreditItemId};
use crate::ports::{ChargeAction, ChargeStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /add-to-cart`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartRequest {
    pub id: CreditItemId,
}

/// Body of `DELETE /remove-from-cart`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveFromCartRequest {
    pub id: CartEntryId,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreditItemResponse {
    pub id: i64,
    pub price: i64,
    pub points: i64,
}

impl From<CreditItem> for CreditItemResponse {
    fn from(item: CreditItem) -> Self {
        Self {
            id: item.id.value(),
            price: item.price,
            points: item.points,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartEntryResponse {
    pub id: String,
    pub credit_item_id: i64,
    pub points: i64,
    pub price: i64,
    pub quantity: i64,
}

impl From<CartEntry> for CartEntryResponse {
    fn from(entry: CartEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            credit_item_id: entry.credit_item_id.value(),
            points: entry.points,
            price: entry.price,
            quantity: entry.quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartViewResponse {
    pub total: i64,
    #[serde(rename = "totalPoints")]
    pub total_points: i64,
    pub cart: Vec<CartEntryResponse>,
}

impl From<CartView> for CartViewResponse {
    fn from(view: CartView) -> Self {
        Self {
            total: view.total_price,
            total_points: view.total_points,
            cart: view.entries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of a decrement: the remaining entry, or nothing once it was pruned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecrementResponse {
    pub removed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<CartEntryResponse>,
}

impl From<Option<CartEntry>> for DecrementResponse {
    fn from(entry: Option<CartEntry>) -> Self {
        Self {
            removed: entry.is_none(),
            entry: entry.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionHistoryResponse {
    pub id: String,
    pub order_id: String,
    pub price: i64,
    pub points: i64,
    pub created_at: String,
}

impl From<TransactionHistory> for TransactionHistoryResponse {
    fn from(history: TransactionHistory) -> Self {
        Self {
            id: history.id.to_string(),
            order_id: history.order_id.to_string(),
            price: history.price,
            points: history.points,
            created_at: history.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChargeActionResponse {
    pub name: String,
    pub method: String,
    pub url: String,
}

impl From<ChargeAction> for ChargeActionResponse {
    fn from(action: ChargeAction) -> Self {
        Self {
            name: action.name,
            method: action.method,
            url: action.url,
        }
    }
}

/// Body of a successful `POST /payment`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub transaction_id: String,
    pub transaction_status: ChargeStatus,
    pub actions: Vec<ChargeActionResponse>,
    pub history: TransactionHistoryResponse,
    pub point_balance: i64,
    pub cart: CartViewResponse,
}

impl From<CheckoutReceipt> for CheckoutResponse {
    fn from(receipt: CheckoutReceipt) -> Self {
        Self {
            order_id: receipt.order_id.to_string(),
            transaction_id: receipt.charge.transaction_id,
            transaction_status: receipt.charge.status,
            actions: receipt.charge.actions.into_iter().map(Into::into).collect(),
            history: receipt.history.into(),
            point_balance: receipt.point_balance,
            cart: receipt.cart.into(),
        }
    }
}
