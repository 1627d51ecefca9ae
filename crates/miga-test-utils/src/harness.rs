// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! Assembles a complete agent stack over a temp SQLite database with a
//! scripted provider and a recording submitter, plus a small seeded
//! catalog to exercise every tool.

use std::sync::Arc;

use miga_agent::{Agent, AgentSettings};
use miga_config::model::StorageConfig;
use miga_core::{CategoryId, Ingredient, MigaError, ProductId};
use miga_storage::Store;
use tempfile::TempDir;

use crate::mock_submitter::MockSubmitter;
use crate::scripted_provider::ScriptedProvider;

/// Product ids of the seeded fixture catalog.
#[derive(Debug, Clone)]
pub struct FixtureCatalog {
    pub panaderia: CategoryId,
    pub pasteleria: CategoryId,
    pub pan_frances: ProductId,
    pub croissant: ProductId,
    pub pastel_chocolate: ProductId,
}

/// Builder for the harness; defaults match production configuration.
pub struct TestHarnessBuilder {
    responses: Vec<miga_core::CompletionResponse>,
    settings: AgentSettings,
    always_tool: Option<(String, serde_json::Value)>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            settings: AgentSettings::default(),
            always_tool: None,
        }
    }

    /// Pre-loads the scripted provider.
    pub fn with_responses(mut self, responses: Vec<miga_core::CompletionResponse>) -> Self {
        self.responses = responses;
        self
    }

    /// Makes the provider request the same tool on every round, forcing
    /// the iteration budget to run out.
    pub fn with_endless_tool_requests(mut self, name: &str, input: serde_json::Value) -> Self {
        self.always_tool = Some((name.to_string(), input));
        self
    }

    /// Overrides the agent settings.
    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub async fn build(self) -> Result<TestHarness, MigaError> {
        let temp_dir = TempDir::new().map_err(|e| MigaError::Storage { source: e.into() })?;
        let config = StorageConfig {
            database_path: temp_dir
                .path()
                .join("test.db")
                .to_string_lossy()
                .into_owned(),
        };
        let store = Store::open(&config).await?;
        let catalog = seed_fixture_catalog(&store).await?;

        let provider = match self.always_tool {
            Some((name, input)) => ScriptedProvider::always_requesting_tool(&name, input),
            None => ScriptedProvider::new(self.responses),
        };
        let submitter = Arc::new(MockSubmitter::new());
        let agent = Agent::new(store, provider.clone(), submitter.clone(), self.settings);

        Ok(TestHarness {
            _temp_dir: temp_dir,
            agent,
            provider,
            submitter,
            catalog,
        })
    }
}

/// A fully wired agent stack for integration tests.
pub struct TestHarness {
    _temp_dir: TempDir,
    pub agent: Agent,
    pub provider: Arc<ScriptedProvider>,
    pub submitter: Arc<MockSubmitter>,
    pub catalog: FixtureCatalog,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn store(&self) -> &Store {
        self.agent.store()
    }

    /// Drives one full conversation turn.
    pub async fn send_message(&self, phone: &str, text: &str) -> Result<String, MigaError> {
        self.agent.process_message(phone, text).await
    }
}

async fn seed_fixture_catalog(store: &Store) -> Result<FixtureCatalog, MigaError> {
    let panaderia = store
        .insert_category("Panadería", Some("Panes artesanales"), 1)
        .await?;
    let pasteleria = store
        .insert_category("Pastelería", Some("Pasteles y repostería"), 2)
        .await?;

    let pan_frances = store
        .insert_product(
            &panaderia,
            "Pan Francés",
            Some("Crujiente y recién horneado"),
            1500,
        )
        .await?;
    let croissant = store
        .insert_product(&panaderia, "Croissant", Some("De mantequilla"), 2500)
        .await?;
    let pastel_chocolate = store
        .insert_product(
            &pasteleria,
            "Pastel de Chocolate",
            Some("Chocolate semiamargo"),
            18000,
        )
        .await?;

    store
        .insert_recipe(
            &pan_frances,
            "Pan Francés tradicional",
            &[
                Ingredient {
                    name: "Harina de trigo".into(),
                    quantity: Some("500g".into()),
                },
                Ingredient {
                    name: "Levadura".into(),
                    quantity: Some("10g".into()),
                },
                Ingredient {
                    name: "Sal".into(),
                    quantity: Some("10g".into()),
                },
            ],
            "Amasar, fermentar una hora y hornear a 220°C con vapor.",
            Some("La corteza mejora vaporizando el horno."),
        )
        .await?;

    Ok(FixtureCatalog {
        panaderia,
        pasteleria,
        pan_frances,
        croissant,
        pastel_chocolate,
    })
}
