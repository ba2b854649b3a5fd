//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;

use chat_agent_agent::MenuAgent;
use chat_agent_config::Settings;
use chat_agent_core::MessageTransport;

use crate::contacts::ContactBook;
use crate::transport::{GatewayTransport, OutboxTransport};
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub agent: Arc<MenuAgent>,
    /// Names announced on inbound messages
    pub contacts: Arc<ContactBook>,
    /// Present when outbound calls are recorded in memory instead of sent
    pub outbox: Option<Arc<OutboxTransport>>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build the agent and its transport from settings.
    ///
    /// Uses the gateway when `transport.gateway_url` is set, the in-memory
    /// outbox otherwise.
    pub fn new(config: Settings) -> Result<Self, ServerError> {
        let contacts = Arc::new(ContactBook::new());

        let (transport, outbox): (Arc<dyn MessageTransport>, _) =
            match config.transport.gateway_url.as_deref() {
                Some(url) => {
                    let gateway = GatewayTransport::new(
                        url,
                        config.transport.gateway_token.clone(),
                        Duration::from_millis(config.effects.timeout_ms),
                    )
                    .map_err(|e| ServerError::Internal(e.to_string()))?;
                    tracing::info!(gateway = %gateway.base_url(), "Sending through chat gateway");
                    (Arc::new(gateway), None)
                },
                None => {
                    tracing::info!("No gateway configured, recording outbound messages in memory");
                    let outbox = Arc::new(OutboxTransport::new());
                    (outbox.clone(), Some(outbox))
                },
            };

        let agent = MenuAgent::from_settings(&config, transport, contacts.clone())
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        // Names and outbox history leave together with the conversation
        {
            let contacts = Arc::clone(&contacts);
            let outbox = outbox.clone();
            agent.store().on_removal(move |id| {
                contacts.forget(id);
                if let Some(outbox) = &outbox {
                    outbox.clear(id);
                }
            });
        }

        Ok(Self {
            config: Arc::new(config),
            agent: Arc::new(agent),
            contacts,
            outbox,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
