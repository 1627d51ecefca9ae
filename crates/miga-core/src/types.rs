// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model shared across the Miga workspace: customers, conversations,
//! orders, and the read-only catalog.
//!
//! Monetary amounts are integer cents everywhere; [`format_cents`] renders
//! them as `$XX.XX` at the edges (customer-facing text, fulfillment wire).

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Generates a fresh random identifier.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Borrows the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(
    /// Unique identifier for a customer.
    CustomerId
);
id_newtype!(
    /// Unique identifier for a conversation.
    ConversationId
);
id_newtype!(
    /// Unique identifier for a stored message.
    MessageId
);
id_newtype!(
    /// Unique identifier for an order.
    OrderId
);
id_newtype!(
    /// Unique identifier for a product.
    ProductId
);
id_newtype!(
    /// Unique identifier for a category.
    CategoryId
);
id_newtype!(
    /// Unique identifier for a recipe.
    RecipeId
);

/// Who authored a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Free-form per-customer preference map (JSON object).
pub type PreferenceMap = serde_json::Map<String, serde_json::Value>;

/// A WhatsApp customer, keyed by phone number.
///
/// Created idempotently on first inbound message and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub phone_number: String,
    pub name: Option<String>,
    #[serde(default)]
    pub preferences: PreferenceMap,
    pub created_at: String,
    pub updated_at: String,
}

impl Customer {
    /// Favorite product names recorded in the preference map, if any.
    pub fn favorite_products(&self) -> Vec<String> {
        self.preferences
            .get("favorite_products")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Freeform notes recorded in the preference map, if any.
    pub fn notes(&self) -> Option<&str> {
        self.preferences.get("notes").and_then(|v| v.as_str())
    }
}

/// A customer's single active conversation (1:1, lazily created).
///
/// The `summary` column is reserved for future history summarization; the
/// conversation loop never writes it.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: ConversationId,
    pub customer_id: CustomerId,
    pub summary: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One persisted conversation message.
///
/// `seq` is a per-conversation monotonic counter; chronological order is
/// `seq` ascending, never wall-clock comparison.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub seq: i64,
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

/// Order lifecycle status.
///
/// `pending` is the only non-terminal state; both transitions out of it are
/// compare-and-set guarded in storage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// One order line, snapshotted at creation time.
///
/// Later catalog price changes never alter an existing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

/// A customer order with its immutable line items.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub items: Vec<OrderItem>,
    pub total_cents: i64,
    pub status: OrderStatus,
    /// Reference id returned by the fulfillment system; set on confirmation.
    pub external_ref: Option<String>,
    pub created_at: String,
}

/// A product category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i64,
}

/// A catalog product. `category_name` is populated by joined reads.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub category_name: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub available: bool,
}

/// One recipe ingredient. `quantity` may be withheld from customer-facing
/// rendering by the confidentiality policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
}

/// A recipe attached to exactly one product.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: RecipeId,
    pub product_id: ProductId,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    pub tips: Option<String>,
}

/// Renders integer cents as `$XX.XX`.
///
/// Catalog prices and order totals are non-negative, but a signed amount
/// still renders sanely (`-150` as `-$1.50`).
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn format_cents_renders_two_decimals() {
        assert_eq!(format_cents(1500), "$15.00");
        assert_eq!(format_cents(4550), "$45.50");
        assert_eq!(format_cents(5), "$0.05");
        assert_eq!(format_cents(18000), "$180.00");
    }

    #[test]
    fn format_cents_handles_signed_amounts() {
        assert_eq!(format_cents(0), "$0.00");
        assert_eq!(format_cents(-150), "-$1.50");
        assert_eq!(format_cents(-5), "-$0.05");
    }

    #[test]
    fn order_status_round_trips_through_strings() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Cancelled,
        ] {
            let s = status.to_string();
            assert_eq!(OrderStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(Role::from_str("assistant").unwrap(), Role::Assistant);
    }

    #[test]
    fn customer_preference_accessors() {
        let mut preferences = PreferenceMap::new();
        preferences.insert(
            "favorite_products".into(),
            serde_json::json!(["Pan Francés", "Croissant"]),
        );
        preferences.insert("notes".into(), serde_json::json!("prefiere retirar temprano"));

        let customer = Customer {
            id: CustomerId::generate(),
            phone_number: "5215551234567".into(),
            name: Some("Ana".into()),
            preferences,
            created_at: "2026-01-01T00:00:00Z".into(),
            updated_at: "2026-01-01T00:00:00Z".into(),
        };

        assert_eq!(
            customer.favorite_products(),
            vec!["Pan Francés".to_string(), "Croissant".to_string()]
        );
        assert_eq!(customer.notes(), Some("prefiere retirar temprano"));
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = OrderId("ord-1".into());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ord-1\"");
        let back: OrderId = serde_json::from_str("\"ord-1\"").unwrap();
        assert_eq!(back, id);
    }
}
