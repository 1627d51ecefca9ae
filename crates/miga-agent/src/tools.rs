// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tool palette advertised to the model.
//!
//! Dispatch is a closed enum: every tool name maps to a strongly-typed
//! input struct parsed from the model-supplied JSON. Unknown names and
//! malformed inputs become error strings for the model, never panics.

use miga_core::{CategoryId, OrderId, ProductId, ToolDefinition};
use serde::Deserialize;

/// One line of a `create_order` request.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A parsed tool invocation.
#[derive(Debug, Clone)]
pub enum ToolCall {
    GetCategories,
    GetCatalog { category_id: Option<CategoryId> },
    SearchProducts { query: String },
    GetRecipes { product_id: ProductId },
    CreateOrder { items: Vec<OrderItemRequest> },
    ConfirmOrder { order_id: OrderId },
    CancelOrder { order_id: OrderId },
    GetCustomerInfo,
}

#[derive(Debug, Deserialize)]
struct CatalogInput {
    #[serde(default)]
    category_id: Option<CategoryId>,
}

#[derive(Debug, Deserialize)]
struct QueryInput {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Deserialize)]
struct ProductInput {
    product_id: ProductId,
}

#[derive(Debug, Deserialize)]
struct OrderItemsInput {
    #[serde(default)]
    items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
struct OrderIdInput {
    order_id: OrderId,
}

fn unknown_tool(name: &str) -> String {
    format!("Error: Herramienta '{name}' no encontrada")
}

fn invalid_input(name: &str, err: impl std::fmt::Display) -> String {
    format!("Error: Entrada inválida para '{name}': {err}")
}

impl ToolCall {
    /// Parses a model-requested tool invocation.
    ///
    /// When `ordering_enabled` is false the three order-lifecycle tools are
    /// treated exactly like unknown names, so the read-only deployment has
    /// no reachable ordering surface.
    pub fn parse(
        name: &str,
        input: &serde_json::Value,
        ordering_enabled: bool,
    ) -> Result<Self, String> {
        match name {
            "get_categories" => Ok(Self::GetCategories),
            "get_catalog" => {
                let parsed: CatalogInput = serde_json::from_value(input.clone())
                    .map_err(|e| invalid_input(name, e))?;
                Ok(Self::GetCatalog {
                    category_id: parsed.category_id,
                })
            }
            "search_products" => {
                let parsed: QueryInput = serde_json::from_value(input.clone())
                    .map_err(|e| invalid_input(name, e))?;
                if parsed.query.trim().is_empty() {
                    return Err("Error: Se requiere un texto para buscar".to_string());
                }
                Ok(Self::SearchProducts {
                    query: parsed.query,
                })
            }
            "get_recipes" => {
                let parsed: ProductInput = serde_json::from_value(input.clone())
                    .map_err(|e| invalid_input(name, e))?;
                Ok(Self::GetRecipes {
                    product_id: parsed.product_id,
                })
            }
            "create_order" if ordering_enabled => {
                let parsed: OrderItemsInput = serde_json::from_value(input.clone())
                    .map_err(|e| invalid_input(name, e))?;
                if parsed.items.is_empty() {
                    return Err(
                        "Error: Se requiere al menos un producto para crear el pedido".to_string(),
                    );
                }
                if parsed.items.iter().any(|item| item.quantity == 0) {
                    return Err("Error: La cantidad debe ser mayor a cero".to_string());
                }
                Ok(Self::CreateOrder {
                    items: parsed.items,
                })
            }
            "confirm_order" if ordering_enabled => {
                let parsed: OrderIdInput = serde_json::from_value(input.clone())
                    .map_err(|e| invalid_input(name, e))?;
                Ok(Self::ConfirmOrder {
                    order_id: parsed.order_id,
                })
            }
            "cancel_order" if ordering_enabled => {
                let parsed: OrderIdInput = serde_json::from_value(input.clone())
                    .map_err(|e| invalid_input(name, e))?;
                Ok(Self::CancelOrder {
                    order_id: parsed.order_id,
                })
            }
            "get_customer_info" => Ok(Self::GetCustomerInfo),
            other => Err(unknown_tool(other)),
        }
    }
}

/// Tool definitions advertised to the model.
///
/// With `ordering_enabled = false` the palette shrinks to the read-only
/// browsing tools.
pub fn definitions(ordering_enabled: bool) -> Vec<ToolDefinition> {
    let mut tools = vec![
        ToolDefinition {
            name: "get_categories".to_string(),
            description: "Lista todas las categorías de productos de la panadería".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
        ToolDefinition {
            name: "get_catalog".to_string(),
            description:
                "Lista los productos disponibles con precios, opcionalmente filtrados por categoría"
                    .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "category_id": {
                        "type": "string",
                        "description": "ID de la categoría para filtrar (opcional)"
                    }
                },
                "required": []
            }),
        },
        ToolDefinition {
            name: "search_products".to_string(),
            description: "Busca productos por nombre o descripción".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Texto a buscar en el catálogo"
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "get_recipes".to_string(),
            description: "Obtiene las recetas asociadas a un producto".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "product_id": {
                        "type": "string",
                        "description": "ID del producto"
                    }
                },
                "required": ["product_id"]
            }),
        },
        ToolDefinition {
            name: "get_customer_info".to_string(),
            description:
                "Obtiene la información del cliente actual: nombre, preferencias y pedidos recientes"
                    .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
    ];

    if ordering_enabled {
        tools.push(ToolDefinition {
            name: "create_order".to_string(),
            description:
                "Crea un pedido pendiente con los productos indicados. El pedido requiere confirmación posterior"
                    .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "items": {
                        "type": "array",
                        "description": "Productos del pedido",
                        "items": {
                            "type": "object",
                            "properties": {
                                "product_id": {
                                    "type": "string",
                                    "description": "ID del producto"
                                },
                                "quantity": {
                                    "type": "integer",
                                    "description": "Cantidad (mayor a cero)"
                                }
                            },
                            "required": ["product_id", "quantity"]
                        }
                    }
                },
                "required": ["items"]
            }),
        });
        tools.push(ToolDefinition {
            name: "confirm_order".to_string(),
            description: "Confirma un pedido pendiente y lo envía a la panadería".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "order_id": {
                        "type": "string",
                        "description": "ID del pedido a confirmar"
                    }
                },
                "required": ["order_id"]
            }),
        });
        tools.push(ToolDefinition {
            name: "cancel_order".to_string(),
            description: "Cancela un pedido pendiente".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "order_id": {
                        "type": "string",
                        "description": "ID del pedido a cancelar"
                    }
                },
                "required": ["order_id"]
            }),
        });
    }

    tools
}
