// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Miga bakery agent.
//!
//! This crate provides the domain model (customers, conversations, orders,
//! catalog), the shared error type, the completion protocol, and the trait
//! seams implemented by the provider and fulfillment crates.

pub mod chat;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use chat::{
    ChatMessage, CompletionRequest, CompletionResponse, ContentBlock, MessageBody,
    TokenUsage, ToolDefinition,
};
pub use error::MigaError;
pub use traits::{CompletionProvider, OrderSubmitter};
pub use types::{
    format_cents, Category, CategoryId, Conversation, ConversationId, Customer,
    CustomerId, Ingredient, MessageId, Order, OrderId, OrderItem, OrderStatus,
    PreferenceMap, Product, ProductId, Recipe, RecipeId, Role, StoredMessage,
};
