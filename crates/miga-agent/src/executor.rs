// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool execution against storage and the fulfillment boundary.
//!
//! Every tool returns `Ok(String)` for business outcomes the model should
//! see (empty catalog, missing product, illegal status transition). Only
//! transport and storage faults surface as [`MigaError`]; the loop turns
//! those into error-flagged tool results.

use std::fmt::Write as _;

use miga_core::{
    format_cents, Customer, MigaError, Order, OrderItem, OrderStatus, OrderSubmitter, Product,
};
use miga_storage::{OrderTransition, Store};
use tracing::{debug, info};

use crate::agent::AgentSettings;
use crate::tools::{OrderItemRequest, ToolCall};

/// Notice appended to recipes when detail sharing is off.
const RECIPE_CONFIDENTIALITY_NOTICE: &str =
    "⚠️ Las cantidades y el procedimiento son parte de nuestras fórmulas exclusivas.";

/// How many recent orders `get_customer_info` reports.
const RECENT_ORDER_LIMIT: u32 = 3;

fn status_es(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pendiente",
        OrderStatus::Confirmed => "confirmado",
        OrderStatus::Cancelled => "cancelado",
    }
}

fn order_not_found(order_id: &miga_core::OrderId) -> String {
    format!("No se encontró el pedido con id '{order_id}'")
}

/// Executes parsed tool calls for one conversation turn.
pub struct ToolExecutor<'a> {
    store: &'a Store,
    submitter: &'a dyn OrderSubmitter,
    settings: &'a AgentSettings,
    customer: &'a Customer,
}

impl<'a> ToolExecutor<'a> {
    pub fn new(
        store: &'a Store,
        submitter: &'a dyn OrderSubmitter,
        settings: &'a AgentSettings,
        customer: &'a Customer,
    ) -> Self {
        Self {
            store,
            submitter,
            settings,
            customer,
        }
    }

    /// Runs one tool call and renders its result for the model.
    pub async fn execute(&self, call: ToolCall) -> Result<String, MigaError> {
        debug!(customer_id = %self.customer.id, ?call, "executing tool");
        match call {
            ToolCall::GetCategories => self.get_categories().await,
            ToolCall::GetCatalog { category_id } => self.get_catalog(category_id).await,
            ToolCall::SearchProducts { query } => self.search_products(&query).await,
            ToolCall::GetRecipes { product_id } => self.get_recipes(&product_id).await,
            ToolCall::CreateOrder { items } => self.create_order(items).await,
            ToolCall::ConfirmOrder { order_id } => self.confirm_order(&order_id).await,
            ToolCall::CancelOrder { order_id } => self.cancel_order(&order_id).await,
            ToolCall::GetCustomerInfo => self.get_customer_info().await,
        }
    }

    async fn get_categories(&self) -> Result<String, MigaError> {
        let categories = self.store.all_categories().await?;
        if categories.is_empty() {
            return Ok("No hay categorías disponibles en este momento.".to_string());
        }

        let mut out = String::from("📂 Categorías disponibles:\n");
        for category in &categories {
            let _ = write!(out, "\n- {} (id: {})", category.name, category.id);
            if let Some(description) = &category.description {
                let _ = write!(out, ": {description}");
            }
        }
        Ok(out)
    }

    async fn get_catalog(
        &self,
        category_id: Option<miga_core::CategoryId>,
    ) -> Result<String, MigaError> {
        let products = match &category_id {
            Some(id) => self.store.products_by_category(id).await?,
            None => self.store.all_products().await?,
        };
        if products.is_empty() {
            return Ok("No hay productos disponibles en este momento.".to_string());
        }

        let mut out = String::from("🥖 Productos disponibles:\n");
        let mut current_category: Option<&str> = None;
        for product in &products {
            let category_name = product.category_name.as_deref().unwrap_or("Otros");
            if current_category != Some(category_name) {
                let _ = write!(out, "\n*{category_name}*\n");
                current_category = Some(category_name);
            }
            render_product_line(&mut out, product);
        }
        Ok(out)
    }

    async fn search_products(&self, query: &str) -> Result<String, MigaError> {
        let products = self.store.search_products(query).await?;
        if products.is_empty() {
            return Ok(format!("No se encontraron productos con '{query}'"));
        }

        let mut out = format!("🔍 Resultados para '{query}':\n");
        for product in &products {
            render_product_line(&mut out, product);
        }
        Ok(out)
    }

    async fn get_recipes(&self, product_id: &miga_core::ProductId) -> Result<String, MigaError> {
        let recipes = self.store.recipes_by_product(product_id).await?;
        if recipes.is_empty() {
            return Ok("No hay recetas disponibles para ese producto.".to_string());
        }

        let mut out = String::new();
        for (i, recipe) in recipes.iter().enumerate() {
            if i > 0 {
                out.push_str("\n\n");
            }
            let _ = write!(out, "📖 {}\n\nIngredientes:", recipe.name);
            for ingredient in &recipe.ingredients {
                match (&ingredient.quantity, self.settings.share_recipe_details) {
                    (Some(quantity), true) => {
                        let _ = write!(out, "\n- {}: {quantity}", ingredient.name);
                    }
                    _ => {
                        let _ = write!(out, "\n- {}", ingredient.name);
                    }
                }
            }
            if self.settings.share_recipe_details {
                let _ = write!(out, "\n\nPreparación:\n{}", recipe.instructions);
                if let Some(tips) = &recipe.tips {
                    let _ = write!(out, "\n\n💡 {tips}");
                }
            } else {
                let _ = write!(out, "\n\n{RECIPE_CONFIDENTIALITY_NOTICE}");
            }
        }
        Ok(out)
    }

    async fn create_order(&self, items: Vec<OrderItemRequest>) -> Result<String, MigaError> {
        let mut order_items = Vec::with_capacity(items.len());
        for request in &items {
            let Some(product) = self.store.product_by_id(&request.product_id).await? else {
                return Ok(format!(
                    "Error: No se encontró el producto con id '{}'. El pedido no fue creado.",
                    request.product_id
                ));
            };
            if !product.available {
                return Ok(format!(
                    "Error: El producto '{}' no está disponible actualmente. El pedido no fue creado.",
                    product.name
                ));
            }
            let subtotal_cents = i64::from(request.quantity) * product.price_cents;
            order_items.push(OrderItem {
                product_id: product.id,
                product_name: product.name,
                quantity: request.quantity,
                unit_price_cents: product.price_cents,
                subtotal_cents,
            });
        }

        let total_cents: i64 = order_items.iter().map(|item| item.subtotal_cents).sum();
        let order = self
            .store
            .create_order(&self.customer.id, order_items, total_cents)
            .await?;
        info!(order_id = %order.id, total_cents, "order created");

        let mut out = format!("🛒 Pedido creado (id: {}):\n", order.id);
        for item in &order.items {
            let _ = write!(
                out,
                "\n- {}x {}: {}",
                item.quantity,
                item.product_name,
                format_cents(item.subtotal_cents)
            );
        }
        let _ = write!(
            out,
            "\n\nTotal: {}\n\nEl pedido está pendiente. Pide al cliente que lo confirme para enviarlo a la panadería.",
            format_cents(order.total_cents)
        );
        Ok(out)
    }

    async fn confirm_order(&self, order_id: &miga_core::OrderId) -> Result<String, MigaError> {
        let Some(order) = self.store.order_by_id(order_id).await? else {
            return Ok(order_not_found(order_id));
        };
        if order.status != OrderStatus::Pending {
            return Ok(format!(
                "El pedido ya está {} y no puede confirmarse.",
                status_es(order.status)
            ));
        }

        // Submit first; only a successful submission may flip the status.
        let external_ref = match self.submitter.submit(self.customer, &order).await {
            Ok(reference) => reference,
            Err(e) => {
                return Ok(format!(
                    "Error: No se pudo enviar el pedido a la panadería. Intenta de nuevo más tarde. ({e})"
                ));
            }
        };

        match self.store.confirm_order(order_id, &external_ref).await? {
            OrderTransition::Applied(confirmed) => {
                info!(order_id = %confirmed.id, external_ref = %external_ref, "order confirmed");
                Ok(format!(
                    "✅ Pedido confirmado. Referencia: {external_ref}. Total: {}.",
                    format_cents(confirmed.total_cents)
                ))
            }
            OrderTransition::Conflict(status) => Ok(format!(
                "El pedido ya está {} y no puede confirmarse.",
                status_es(status)
            )),
            OrderTransition::NotFound => Ok(order_not_found(order_id)),
        }
    }

    async fn cancel_order(&self, order_id: &miga_core::OrderId) -> Result<String, MigaError> {
        match self.store.cancel_order(order_id).await? {
            OrderTransition::Applied(order) => {
                info!(order_id = %order.id, "order cancelled");
                Ok(format!("El pedido {} fue cancelado.", order.id))
            }
            OrderTransition::Conflict(status) => Ok(format!(
                "El pedido ya está {} y no puede cancelarse.",
                status_es(status)
            )),
            OrderTransition::NotFound => Ok(order_not_found(order_id)),
        }
    }

    async fn get_customer_info(&self) -> Result<String, MigaError> {
        let orders = self
            .store
            .recent_orders(&self.customer.id, RECENT_ORDER_LIMIT)
            .await?;

        let favorites = self.customer.favorite_products();
        let notes = self.customer.notes();
        if self.customer.name.is_none() && favorites.is_empty() && notes.is_none()
            && orders.is_empty()
        {
            return Ok("No hay información registrada para este cliente todavía.".to_string());
        }

        let mut out = String::from("👤 Información del cliente:\n");
        let _ = write!(
            out,
            "\nNombre: {}",
            self.customer.name.as_deref().unwrap_or("No registrado")
        );
        let _ = write!(out, "\nTeléfono: {}", self.customer.phone_number);
        if !favorites.is_empty() {
            let _ = write!(out, "\nProductos favoritos: {}", favorites.join(", "));
        }
        if let Some(notes) = notes {
            let _ = write!(out, "\nNotas: {notes}");
        }
        if !orders.is_empty() {
            out.push_str("\n\nPedidos recientes:");
            for order in &orders {
                let _ = write!(
                    out,
                    "\n- {}: {} ({})",
                    order.created_at,
                    format_cents(order.total_cents),
                    status_es(order.status)
                );
            }
        }
        Ok(out)
    }
}

fn render_product_line(out: &mut String, product: &Product) {
    let _ = write!(
        out,
        "- {}: {} (id: {})",
        product.name,
        format_cents(product.price_cents),
        product.id
    );
    if let Some(description) = &product.description {
        let _ = write!(out, "\n  {description}");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use miga_config::model::StorageConfig;
    use miga_core::{Ingredient, OrderId, ProductId};
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct StubSubmitter {
        result: Mutex<Option<Result<String, MigaError>>>,
    }

    impl StubSubmitter {
        fn ok(reference: &str) -> Self {
            Self {
                result: Mutex::new(Some(Ok(reference.to_string()))),
            }
        }

        fn failing() -> Self {
            Self {
                result: Mutex::new(Some(Err(MigaError::Fulfillment {
                    message: "connection refused".into(),
                    source: None,
                }))),
            }
        }
    }

    #[async_trait]
    impl OrderSubmitter for StubSubmitter {
        async fn submit(&self, _: &Customer, _: &Order) -> Result<String, MigaError> {
            self.result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok("REF-NEXT".into()))
        }
    }

    struct Fixture {
        _dir: TempDir,
        store: Store,
        customer: Customer,
        bread_id: ProductId,
        cake_id: ProductId,
    }

    async fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig {
            database_path: dir
                .path()
                .join("test.db")
                .to_string_lossy()
                .into_owned(),
        };
        let store = Store::open(&config).await.unwrap();

        let panaderia = store
            .insert_category("Panadería", Some("Panes artesanales"), 1)
            .await
            .unwrap();
        let pasteleria = store
            .insert_category("Pastelería", None, 2)
            .await
            .unwrap();
        let bread = store
            .insert_product(
                &panaderia,
                "Pan Francés",
                Some("Crujiente y recién horneado"),
                1500,
            )
            .await
            .unwrap();
        let cake = store
            .insert_product(&pasteleria, "Pastel de Chocolate", None, 18000)
            .await
            .unwrap();
        store
            .insert_recipe(
                &bread,
                "Pan Francés tradicional",
                &[
                    Ingredient {
                        name: "Harina".into(),
                        quantity: Some("500g".into()),
                    },
                    Ingredient {
                        name: "Levadura".into(),
                        quantity: Some("10g".into()),
                    },
                ],
                "Amasar, reposar y hornear a 220°C.",
                Some("Vaporizar el horno para una corteza crujiente."),
            )
            .await
            .unwrap();

        let customer = store.get_or_create_customer("5215512345678").await.unwrap();
        Fixture {
            _dir: dir,
            store,
            customer,
            bread_id: bread,
            cake_id: cake,
        }
    }

    fn settings() -> AgentSettings {
        AgentSettings::default()
    }

    #[tokio::test]
    async fn catalog_groups_by_category_and_formats_prices() {
        let fx = fixture().await;
        let submitter = StubSubmitter::ok("R");
        let settings = settings();
        let executor = ToolExecutor::new(&fx.store, &submitter, &settings, &fx.customer);

        let result = executor
            .execute(ToolCall::GetCatalog { category_id: None })
            .await
            .unwrap();
        assert!(result.contains("*Panadería*"));
        assert!(result.contains("*Pastelería*"));
        assert!(result.contains("Pan Francés: $15.00"));
        assert!(result.contains("Pastel de Chocolate: $180.00"));
    }

    #[tokio::test]
    async fn recipes_hide_quantities_and_procedure_by_default() {
        let fx = fixture().await;
        let submitter = StubSubmitter::ok("R");
        let settings = settings();
        let executor = ToolExecutor::new(&fx.store, &submitter, &settings, &fx.customer);

        let result = executor
            .execute(ToolCall::GetRecipes {
                product_id: fx.bread_id.clone(),
            })
            .await
            .unwrap();
        assert!(result.contains("Harina"));
        assert!(!result.contains("500g"));
        assert!(!result.contains("Amasar"));
        assert!(result.contains(RECIPE_CONFIDENTIALITY_NOTICE));
    }

    #[tokio::test]
    async fn recipes_render_details_when_policy_allows() {
        let fx = fixture().await;
        let submitter = StubSubmitter::ok("R");
        let mut settings = settings();
        settings.share_recipe_details = true;
        let executor = ToolExecutor::new(&fx.store, &submitter, &settings, &fx.customer);

        let result = executor
            .execute(ToolCall::GetRecipes {
                product_id: fx.bread_id.clone(),
            })
            .await
            .unwrap();
        assert!(result.contains("Harina: 500g"));
        assert!(result.contains("Amasar"));
        assert!(result.contains("Vaporizar"));
        assert!(!result.contains(RECIPE_CONFIDENTIALITY_NOTICE));
    }

    #[tokio::test]
    async fn create_order_snapshots_prices_and_requires_confirmation() {
        let fx = fixture().await;
        let submitter = StubSubmitter::ok("R");
        let settings = settings();
        let executor = ToolExecutor::new(&fx.store, &submitter, &settings, &fx.customer);

        let result = executor
            .execute(ToolCall::CreateOrder {
                items: vec![
                    OrderItemRequest {
                        product_id: fx.bread_id.clone(),
                        quantity: 2,
                    },
                    OrderItemRequest {
                        product_id: fx.cake_id.clone(),
                        quantity: 1,
                    },
                ],
            })
            .await
            .unwrap();
        assert!(result.contains("2x Pan Francés: $30.00"));
        assert!(result.contains("Total: $210.00"));
        assert!(result.contains("pendiente"));
    }

    #[tokio::test]
    async fn missing_product_aborts_whole_order() {
        let fx = fixture().await;
        let submitter = StubSubmitter::ok("R");
        let settings = settings();
        let executor = ToolExecutor::new(&fx.store, &submitter, &settings, &fx.customer);

        let result = executor
            .execute(ToolCall::CreateOrder {
                items: vec![
                    OrderItemRequest {
                        product_id: fx.bread_id.clone(),
                        quantity: 1,
                    },
                    OrderItemRequest {
                        product_id: ProductId("no-such-product".into()),
                        quantity: 1,
                    },
                ],
            })
            .await
            .unwrap();
        assert!(result.contains("No se encontró el producto"));
        assert!(result.contains("El pedido no fue creado"));
        assert!(fx
            .store
            .recent_orders(&fx.customer.id, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn confirm_applies_transition_and_reports_reference() {
        let fx = fixture().await;
        let submitter = StubSubmitter::ok("ORD-99");
        let settings = settings();
        let executor = ToolExecutor::new(&fx.store, &submitter, &settings, &fx.customer);

        let order = fx
            .store
            .create_order(
                &fx.customer.id,
                vec![OrderItem {
                    product_id: fx.bread_id.clone(),
                    product_name: "Pan Francés".into(),
                    quantity: 1,
                    unit_price_cents: 1500,
                    subtotal_cents: 1500,
                }],
                1500,
            )
            .await
            .unwrap();

        let result = executor
            .execute(ToolCall::ConfirmOrder {
                order_id: order.id.clone(),
            })
            .await
            .unwrap();
        assert!(result.contains("Referencia: ORD-99"));

        let stored = fx.store.order_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(stored.external_ref.as_deref(), Some("ORD-99"));

        // A second confirmation is rejected as a business outcome.
        let again = executor
            .execute(ToolCall::ConfirmOrder {
                order_id: order.id.clone(),
            })
            .await
            .unwrap();
        assert!(again.contains("ya está confirmado"));
    }

    #[tokio::test]
    async fn failed_submission_leaves_order_pending() {
        let fx = fixture().await;
        let submitter = StubSubmitter::failing();
        let settings = settings();
        let executor = ToolExecutor::new(&fx.store, &submitter, &settings, &fx.customer);

        let order = fx
            .store
            .create_order(&fx.customer.id, Vec::new(), 0)
            .await
            .unwrap();

        let result = executor
            .execute(ToolCall::ConfirmOrder {
                order_id: order.id.clone(),
            })
            .await
            .unwrap();
        assert!(result.contains("No se pudo enviar el pedido"));

        let stored = fx.store.order_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn cancel_is_terminal_and_conflicts_are_reported() {
        let fx = fixture().await;
        let submitter = StubSubmitter::ok("R");
        let settings = settings();
        let executor = ToolExecutor::new(&fx.store, &submitter, &settings, &fx.customer);

        let order = fx
            .store
            .create_order(&fx.customer.id, Vec::new(), 0)
            .await
            .unwrap();

        let cancelled = executor
            .execute(ToolCall::CancelOrder {
                order_id: order.id.clone(),
            })
            .await
            .unwrap();
        assert!(cancelled.contains("fue cancelado"));

        let confirm_after = executor
            .execute(ToolCall::ConfirmOrder {
                order_id: order.id.clone(),
            })
            .await
            .unwrap();
        assert!(confirm_after.contains("ya está cancelado"));

        let missing = executor
            .execute(ToolCall::CancelOrder {
                order_id: OrderId("ghost".into()),
            })
            .await
            .unwrap();
        assert!(missing.contains("No se encontró el pedido"));
    }

    #[tokio::test]
    async fn customer_info_lists_recent_orders() {
        let fx = fixture().await;
        let submitter = StubSubmitter::ok("R");
        let settings = settings();
        let executor = ToolExecutor::new(&fx.store, &submitter, &settings, &fx.customer);

        let empty = executor.execute(ToolCall::GetCustomerInfo).await.unwrap();
        assert!(empty.contains("No hay información registrada"));

        fx.store
            .create_order(&fx.customer.id, Vec::new(), 4500)
            .await
            .unwrap();

        let result = executor.execute(ToolCall::GetCustomerInfo).await.unwrap();
        assert!(result.contains("Teléfono: 5215512345678"));
        assert!(result.contains("$45.00 (pendiente)"));
    }

    #[tokio::test]
    async fn search_reports_misses_with_the_query() {
        let fx = fixture().await;
        let submitter = StubSubmitter::ok("R");
        let settings = settings();
        let executor = ToolExecutor::new(&fx.store, &submitter, &settings, &fx.customer);

        let result = executor
            .execute(ToolCall::SearchProducts {
                query: "empanada".into(),
            })
            .await
            .unwrap();
        assert_eq!(result, "No se encontraron productos con 'empanada'");

        let hit = executor
            .execute(ToolCall::SearchProducts {
                query: "chocolate".into(),
            })
            .await
            .unwrap();
        assert!(hit.contains("Pastel de Chocolate"));
    }
}
