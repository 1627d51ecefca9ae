// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `miga serve` command implementation.
//!
//! Wires the full stack: SQLite store, Anthropic provider, fulfillment
//! submitter, WhatsApp client, the conversation agent, and the webhook
//! server. Inbound messages flow webhook -> bounded queue -> dispatcher,
//! which runs one task per message so different customers are processed
//! concurrently (same-customer turns serialize inside the agent).

use std::sync::Arc;

use miga_agent::{install_signal_handler, Agent, AgentSettings};
use miga_anthropic::AnthropicProvider;
use miga_config::model::MigaConfig;
use miga_core::{CompletionProvider, MigaError, OrderSubmitter};
use miga_fulfillment::{HttpSubmitter, UnconfiguredSubmitter};
use miga_storage::Store;
use miga_whatsapp::{InboundText, ServerState, WhatsAppClient};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Webhook deliveries buffered ahead of the dispatcher before drops begin.
const INBOUND_QUEUE_CAPACITY: usize = 64;

/// Runs the `miga serve` command.
pub async fn run_serve(config: MigaConfig) -> Result<(), MigaError> {
    init_tracing(&config.agent.log_level);
    info!("starting miga serve");

    let store = Store::open(&config.storage).await?;

    let provider: Arc<dyn CompletionProvider> = match AnthropicProvider::new(&config.anthropic) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            eprintln!(
                "error: Anthropic provider could not be initialized. \
                 Set anthropic.api_key in miga.toml or the MIGA_ANTHROPIC_API_KEY \
                 environment variable."
            );
            return Err(e);
        }
    };

    let submitter: Arc<dyn OrderSubmitter> = match &config.fulfillment.api_url {
        Some(api_url) => Arc::new(HttpSubmitter::new(api_url.clone(), &config.fulfillment)?),
        None => {
            warn!("no fulfillment endpoint configured, order confirmation will be unavailable");
            Arc::new(UnconfiguredSubmitter)
        }
    };

    let whatsapp = match WhatsAppClient::new(&config.whatsapp) {
        Ok(client) => client,
        Err(e) => {
            eprintln!(
                "error: WhatsApp client could not be initialized. \
                 Set whatsapp.access_token and whatsapp.phone_number_id in miga.toml \
                 or via MIGA_WHATSAPP_* environment variables."
            );
            return Err(e);
        }
    };

    let agent = Arc::new(Agent::new(
        store,
        provider,
        submitter,
        AgentSettings::from(&config),
    ));

    let shutdown = install_signal_handler();
    let (inbound_tx, inbound_rx) = mpsc::channel::<InboundText>(INBOUND_QUEUE_CAPACITY);

    let dispatcher = tokio::spawn(run_dispatcher(
        inbound_rx,
        agent.clone(),
        whatsapp,
        shutdown.clone(),
    ));

    let state = ServerState {
        inbound_tx,
        verify_token: config.whatsapp.verify_token.clone(),
        app_secret: config.whatsapp.app_secret.clone(),
        service_name: config.agent.name.clone(),
    };
    miga_whatsapp::serve(&config.server, state, shutdown.clone()).await?;

    // The server only returns once the token fires; wait for the
    // dispatcher to drain, then close the store.
    if let Err(e) = dispatcher.await {
        error!(error = %e, "dispatcher task panicked");
    }
    agent.store().close().await?;
    info!("miga serve shut down cleanly");
    Ok(())
}

/// Pulls queued inbound messages and spawns one processing task each.
async fn run_dispatcher(
    mut inbound_rx: mpsc::Receiver<InboundText>,
    agent: Arc<Agent>,
    whatsapp: WhatsAppClient,
    shutdown: tokio_util::sync::CancellationToken,
) {
    loop {
        let message = tokio::select! {
            _ = shutdown.cancelled() => break,
            message = inbound_rx.recv() => match message {
                Some(message) => message,
                None => break,
            },
        };

        let agent = agent.clone();
        let whatsapp = whatsapp.clone();
        tokio::spawn(async move {
            whatsapp.mark_as_read(&message.message_id).await;

            match agent.process_message(&message.from, &message.body).await {
                Ok(reply) if reply.is_empty() => {
                    warn!(from = %message.from, "empty reply, nothing to send");
                }
                Ok(reply) => {
                    if let Err(e) = whatsapp.send_text(&message.from, &reply).await {
                        error!(from = %message.from, error = %e, "failed to deliver reply");
                    }
                }
                Err(e) => {
                    error!(from = %message.from, error = %e, "failed to process message");
                }
            }
        });
    }
    info!("dispatcher stopped");
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the configured level applies to
/// miga crates and `warn` to everything else.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("miga={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
