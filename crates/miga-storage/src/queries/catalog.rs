// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only catalog lookups (categories, products, recipes) plus the
//! insert operations used by the seed command.
//!
//! Product reads only surface available products and join the category name
//! for display; recipe ingredient lists are stored as JSON.

use miga_core::{
    Category, CategoryId, Ingredient, MigaError, Product, ProductId, Recipe, RecipeId,
};
use rusqlite::params;

use crate::database::{map_tr_err, other_err, CallError, Database};

fn row_to_category(row: &rusqlite::Row<'_>) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: CategoryId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        display_order: row.get(3)?,
    })
}

fn row_to_product(row: &rusqlite::Row<'_>) -> Result<Product, rusqlite::Error> {
    Ok(Product {
        id: ProductId(row.get(0)?),
        category_id: CategoryId(row.get(1)?),
        name: row.get(2)?,
        description: row.get(3)?,
        price_cents: row.get(4)?,
        available: row.get::<_, i64>(5)? != 0,
        category_name: row.get(6)?,
    })
}

fn row_to_recipe(row: &rusqlite::Row<'_>) -> Result<Recipe, CallError> {
    let ingredients_json: String = row.get(3)?;
    let ingredients: Vec<Ingredient> =
        serde_json::from_str(&ingredients_json).map_err(other_err)?;
    Ok(Recipe {
        id: RecipeId(row.get(0)?),
        product_id: ProductId(row.get(1)?),
        name: row.get(2)?,
        ingredients,
        instructions: row.get(4)?,
        tips: row.get(5)?,
    })
}

const PRODUCT_COLUMNS: &str = "p.id, p.category_id, p.name, p.description, p.price_cents, \
                               p.available, c.name AS category_name";

/// All categories in display order.
pub async fn all_categories(db: &Database) -> Result<Vec<Category>, MigaError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, description, display_order
                 FROM categories ORDER BY display_order, name",
            )?;
            let rows = stmt.query_map([], row_to_category)?;
            let mut categories = Vec::new();
            for row in rows {
                categories.push(row?);
            }
            Ok(categories)
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a category by exact name. Used by the seeder for idempotence.
pub async fn category_by_name(db: &Database, name: &str) -> Result<Option<Category>, MigaError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, description, display_order FROM categories WHERE name = ?1",
            )?;
            match stmt.query_row(params![name], row_to_category) {
                Ok(category) => Ok(Some(category)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All available products, grouped by category display order.
pub async fn all_products(db: &Database) -> Result<Vec<Product>, MigaError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS}
                 FROM products p JOIN categories c ON p.category_id = c.id
                 WHERE p.available = 1
                 ORDER BY c.display_order, c.name, p.name"
            ))?;
            let rows = stmt.query_map([], row_to_product)?;
            let mut products = Vec::new();
            for row in rows {
                products.push(row?);
            }
            Ok(products)
        })
        .await
        .map_err(map_tr_err)
}

/// Available products within one category.
pub async fn products_by_category(
    db: &Database,
    category_id: &CategoryId,
) -> Result<Vec<Product>, MigaError> {
    let category_id = category_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS}
                 FROM products p JOIN categories c ON p.category_id = c.id
                 WHERE p.category_id = ?1 AND p.available = 1
                 ORDER BY p.name"
            ))?;
            let rows = stmt.query_map(params![category_id], row_to_product)?;
            let mut products = Vec::new();
            for row in rows {
                products.push(row?);
            }
            Ok(products)
        })
        .await
        .map_err(map_tr_err)
}

/// A product by id, available or not (order snapshots need sold-out items too).
pub async fn product_by_id(
    db: &Database,
    product_id: &ProductId,
) -> Result<Option<Product>, MigaError> {
    let product_id = product_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS}
                 FROM products p JOIN categories c ON p.category_id = c.id
                 WHERE p.id = ?1"
            ))?;
            match stmt.query_row(params![product_id], row_to_product) {
                Ok(product) => Ok(Some(product)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Case-insensitive substring search over name and description of available
/// products.
pub async fn search_products(db: &Database, query: &str) -> Result<Vec<Product>, MigaError> {
    // LIKE metacharacters in customer input match literally, not as
    // wildcards.
    let escaped = query
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let pattern = format!("%{escaped}%");
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS}
                 FROM products p JOIN categories c ON p.category_id = c.id
                 WHERE p.available = 1
                   AND (LOWER(p.name) LIKE ?1 ESCAPE '\\'
                        OR LOWER(COALESCE(p.description, '')) LIKE ?1 ESCAPE '\\')
                 ORDER BY p.name"
            ))?;
            let rows = stmt.query_map(params![pattern], row_to_product)?;
            let mut products = Vec::new();
            for row in rows {
                products.push(row?);
            }
            Ok(products)
        })
        .await
        .map_err(map_tr_err)
}

/// All recipes attached to a product.
pub async fn recipes_by_product(
    db: &Database,
    product_id: &ProductId,
) -> Result<Vec<Recipe>, MigaError> {
    let product_id = product_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, product_id, name, ingredients, instructions, tips
                 FROM recipes WHERE product_id = ?1 ORDER BY name",
            )?;
            let rows = stmt.query_map(params![product_id], |row| Ok(row_to_recipe(row)))?;
            let mut recipes = Vec::new();
            for row in rows {
                recipes.push(row??);
            }
            Ok(recipes)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a category, returning its id.
pub async fn insert_category(
    db: &Database,
    name: &str,
    description: Option<&str>,
    display_order: i64,
) -> Result<CategoryId, MigaError> {
    let name = name.to_string();
    let description = description.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let id = uuid::Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO categories (id, name, description, display_order)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, name, description, display_order],
            )?;
            Ok(CategoryId(id))
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a product, returning its id. Price is integer cents.
pub async fn insert_product(
    db: &Database,
    category_id: &CategoryId,
    name: &str,
    description: Option<&str>,
    price_cents: i64,
) -> Result<ProductId, MigaError> {
    let category_id = category_id.0.clone();
    let name = name.to_string();
    let description = description.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let id = uuid::Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO products (id, category_id, name, description, price_cents, available)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1)",
                params![id, category_id, name, description, price_cents],
            )?;
            Ok(ProductId(id))
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a recipe for a product.
pub async fn insert_recipe(
    db: &Database,
    product_id: &ProductId,
    name: &str,
    ingredients: &[Ingredient],
    instructions: &str,
    tips: Option<&str>,
) -> Result<RecipeId, MigaError> {
    let product_id = product_id.0.clone();
    let name = name.to_string();
    let ingredients_json = serde_json::to_string(ingredients).map_err(|e| MigaError::Storage {
        source: Box::new(e),
    })?;
    let instructions = instructions.to_string();
    let tips = tips.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let id = uuid::Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO recipes (id, product_id, name, ingredients, instructions, tips)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, product_id, name, ingredients_json, instructions, tips],
            )?;
            Ok(RecipeId(id))
        })
        .await
        .map_err(map_tr_err)
}

/// Update a product's catalog price. Existing orders keep their snapshots.
pub async fn set_product_price(
    db: &Database,
    product_id: &ProductId,
    price_cents: i64,
) -> Result<(), MigaError> {
    let product_id = product_id.0.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE products SET price_cents = ?1 WHERE id = ?2",
                params![price_cents, product_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
