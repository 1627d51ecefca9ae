// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `miga seed` command implementation.
//!
//! Populates the catalog with the bakery's categories, products, and
//! recipes. Idempotent per category name: a category that already exists
//! is skipped along with its products, so re-running never duplicates.

use miga_config::model::MigaConfig;
use miga_core::{Ingredient, MigaError, ProductId};
use miga_storage::Store;
use tracing::info;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price_cents: i64,
}

struct SeedCategory {
    name: &'static str,
    description: &'static str,
    display_order: i64,
    products: &'static [SeedProduct],
}

const CATALOG: &[SeedCategory] = &[
    SeedCategory {
        name: "Panadería",
        description: "Panes artesanales horneados cada mañana",
        display_order: 1,
        products: &[
            SeedProduct {
                name: "Pan Francés",
                description: "Crujiente por fuera, suave por dentro",
                price_cents: 1500,
            },
            SeedProduct {
                name: "Pan Integral",
                description: "Con harina integral y semillas",
                price_cents: 2000,
            },
            SeedProduct {
                name: "Croissant",
                description: "Hojaldrado de mantequilla",
                price_cents: 2500,
            },
        ],
    },
    SeedCategory {
        name: "Pastelería",
        description: "Pasteles y repostería para toda ocasión",
        display_order: 2,
        products: &[
            SeedProduct {
                name: "Pastel de Chocolate",
                description: "Chocolate semiamargo con ganache",
                price_cents: 18000,
            },
            SeedProduct {
                name: "Torta de Frutas",
                description: "Frutas de temporada y crema chantilly",
                price_cents: 15000,
            },
            SeedProduct {
                name: "Cheesecake",
                description: "Estilo neoyorquino con base de galleta",
                price_cents: 16000,
            },
        ],
    },
    SeedCategory {
        name: "Bebidas",
        description: "Café de especialidad y bebidas calientes",
        display_order: 3,
        products: &[
            SeedProduct {
                name: "Café Americano",
                description: "Grano de altura recién molido",
                price_cents: 3500,
            },
            SeedProduct {
                name: "Cappuccino",
                description: "Doble espresso con leche vaporizada",
                price_cents: 4500,
            },
            SeedProduct {
                name: "Té Verde",
                description: "Hebras de té verde orgánico",
                price_cents: 3000,
            },
        ],
    },
];

/// Runs the `miga seed` command.
pub async fn run_seed(config: MigaConfig) -> Result<(), MigaError> {
    crate::serve::init_tracing(&config.agent.log_level);
    let store = Store::open(&config.storage).await?;

    let mut categories_created = 0u32;
    let mut products_created = 0u32;
    let mut pan_frances: Option<ProductId> = None;
    let mut pastel_chocolate: Option<ProductId> = None;

    for category in CATALOG {
        if store.category_by_name(category.name).await?.is_some() {
            info!(category = category.name, "category already seeded, skipping");
            continue;
        }

        let category_id = store
            .insert_category(category.name, Some(category.description), category.display_order)
            .await?;
        categories_created += 1;

        for product in category.products {
            let product_id = store
                .insert_product(
                    &category_id,
                    product.name,
                    Some(product.description),
                    product.price_cents,
                )
                .await?;
            products_created += 1;
            match product.name {
                "Pan Francés" => pan_frances = Some(product_id),
                "Pastel de Chocolate" => pastel_chocolate = Some(product_id),
                _ => {}
            }
        }
    }

    let mut recipes_created = 0u32;
    if let Some(product_id) = &pan_frances {
        store
            .insert_recipe(
                product_id,
                "Pan Francés tradicional",
                &[
                    Ingredient {
                        name: "Harina de trigo".into(),
                        quantity: Some("500g".into()),
                    },
                    Ingredient {
                        name: "Agua".into(),
                        quantity: Some("325ml".into()),
                    },
                    Ingredient {
                        name: "Levadura fresca".into(),
                        quantity: Some("10g".into()),
                    },
                    Ingredient {
                        name: "Sal".into(),
                        quantity: Some("10g".into()),
                    },
                ],
                "Amasar hasta desarrollar el gluten, fermentar una hora, formar \
                 las piezas y hornear a 220°C con vapor durante 25 minutos.",
                Some("Vaporizar el horno al inicio mejora la corteza."),
            )
            .await?;
        recipes_created += 1;
    }
    if let Some(product_id) = &pastel_chocolate {
        store
            .insert_recipe(
                product_id,
                "Pastel de Chocolate de la casa",
                &[
                    Ingredient {
                        name: "Chocolate semiamargo".into(),
                        quantity: Some("300g".into()),
                    },
                    Ingredient {
                        name: "Mantequilla".into(),
                        quantity: Some("200g".into()),
                    },
                    Ingredient {
                        name: "Huevos".into(),
                        quantity: Some("6 piezas".into()),
                    },
                    Ingredient {
                        name: "Azúcar".into(),
                        quantity: Some("180g".into()),
                    },
                    Ingredient {
                        name: "Harina".into(),
                        quantity: Some("120g".into()),
                    },
                ],
                "Fundir el chocolate con la mantequilla, batir los huevos con el \
                 azúcar, integrar todo con la harina y hornear a 170°C durante 35 \
                 minutos. Cubrir con ganache al enfriar.",
                Some("Reposar el pastel una noche intensifica el sabor."),
            )
            .await?;
        recipes_created += 1;
    }

    store.close().await?;
    println!(
        "seed complete: {categories_created} categories, {products_created} products, \
         {recipes_created} recipes created"
    );
    Ok(())
}
