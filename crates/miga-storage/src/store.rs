// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [`Store`] façade: one handle over every aggregate's queries.
//!
//! Components receive an explicitly constructed `Arc<Store>`; there is no
//! process-wide singleton.

use miga_config::model::StorageConfig;
use miga_core::{
    Category, CategoryId, Conversation, Customer, CustomerId, ConversationId, Ingredient,
    MigaError, Order, OrderId, OrderItem, Product, ProductId, Recipe, RecipeId, Role,
    StoredMessage,
};
use tracing::debug;

use crate::database::Database;
use crate::queries::{catalog, conversations, customers, orders};
use crate::queries::orders::OrderTransition;

/// SQLite-backed store for customers, conversations, catalog, and orders.
pub struct Store {
    db: Database,
}

impl Store {
    /// Opens the database at the configured path, running migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, MigaError> {
        let db = Database::open(&config.database_path).await?;
        debug!(path = %config.database_path, "store opened");
        Ok(Self { db })
    }

    /// Checkpoints the WAL before shutdown.
    pub async fn close(&self) -> Result<(), MigaError> {
        self.db.close().await
    }

    // --- Customers ---

    pub async fn get_or_create_customer(&self, phone_number: &str) -> Result<Customer, MigaError> {
        customers::get_or_create(&self.db, phone_number).await
    }

    pub async fn customer_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, MigaError> {
        customers::get_by_id(&self.db, id).await
    }

    // --- Conversations ---

    pub async fn get_or_create_conversation(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Conversation, MigaError> {
        conversations::get_or_create(&self.db, customer_id).await
    }

    pub async fn append_message(
        &self,
        conversation_id: &ConversationId,
        role: Role,
        content: &str,
        cap: u32,
    ) -> Result<StoredMessage, MigaError> {
        conversations::append_message(&self.db, conversation_id, role, content, cap).await
    }

    pub async fn recent_messages(
        &self,
        conversation_id: &ConversationId,
        limit: u32,
    ) -> Result<Vec<StoredMessage>, MigaError> {
        conversations::recent_messages(&self.db, conversation_id, limit).await
    }

    pub async fn message_count(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<u32, MigaError> {
        conversations::message_count(&self.db, conversation_id).await
    }

    // --- Catalog ---

    pub async fn all_categories(&self) -> Result<Vec<Category>, MigaError> {
        catalog::all_categories(&self.db).await
    }

    pub async fn category_by_name(&self, name: &str) -> Result<Option<Category>, MigaError> {
        catalog::category_by_name(&self.db, name).await
    }

    pub async fn all_products(&self) -> Result<Vec<Product>, MigaError> {
        catalog::all_products(&self.db).await
    }

    pub async fn products_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Product>, MigaError> {
        catalog::products_by_category(&self.db, category_id).await
    }

    pub async fn product_by_id(&self, product_id: &ProductId) -> Result<Option<Product>, MigaError> {
        catalog::product_by_id(&self.db, product_id).await
    }

    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, MigaError> {
        catalog::search_products(&self.db, query).await
    }

    pub async fn recipes_by_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<Recipe>, MigaError> {
        catalog::recipes_by_product(&self.db, product_id).await
    }

    pub async fn insert_category(
        &self,
        name: &str,
        description: Option<&str>,
        display_order: i64,
    ) -> Result<CategoryId, MigaError> {
        catalog::insert_category(&self.db, name, description, display_order).await
    }

    pub async fn insert_product(
        &self,
        category_id: &CategoryId,
        name: &str,
        description: Option<&str>,
        price_cents: i64,
    ) -> Result<ProductId, MigaError> {
        catalog::insert_product(&self.db, category_id, name, description, price_cents).await
    }

    pub async fn insert_recipe(
        &self,
        product_id: &ProductId,
        name: &str,
        ingredients: &[Ingredient],
        instructions: &str,
        tips: Option<&str>,
    ) -> Result<RecipeId, MigaError> {
        catalog::insert_recipe(&self.db, product_id, name, ingredients, instructions, tips).await
    }

    pub async fn set_product_price(
        &self,
        product_id: &ProductId,
        price_cents: i64,
    ) -> Result<(), MigaError> {
        catalog::set_product_price(&self.db, product_id, price_cents).await
    }

    // --- Orders ---

    pub async fn create_order(
        &self,
        customer_id: &CustomerId,
        items: Vec<OrderItem>,
        total_cents: i64,
    ) -> Result<Order, MigaError> {
        orders::create(&self.db, customer_id, items, total_cents).await
    }

    pub async fn order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, MigaError> {
        orders::get_by_id(&self.db, order_id).await
    }

    pub async fn confirm_order(
        &self,
        order_id: &OrderId,
        external_ref: &str,
    ) -> Result<OrderTransition, MigaError> {
        orders::confirm(&self.db, order_id, external_ref).await
    }

    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<OrderTransition, MigaError> {
        orders::cancel(&self.db, order_id).await
    }

    pub async fn recent_orders(
        &self,
        customer_id: &CustomerId,
        limit: u32,
    ) -> Result<Vec<Order>, MigaError> {
        orders::recent_for_customer(&self.db, customer_id, limit).await
    }
}
