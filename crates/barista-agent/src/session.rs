//! Conversation session: owns one customer's order and dispatches tool calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};

use barista_core::config::Config;
use barista_core::{IntentKind, OrderRecord, OrderService, OrderStatus, OrderStore};
use barista_tools::{OrderHandle, ToolContext, ToolOutput, ToolRegistry};

use crate::prompt::build_instructions;
use crate::{AgentEvent, UsageSummary};

/// One conversation with the shop.
///
/// Built when a customer connects and dropped when they leave. Each session
/// has its own order, so concurrent sessions never see each other's state.
pub struct BaristaSession {
    id: String,
    started_at: DateTime<Utc>,
    config: Arc<Config>,
    tools: Arc<ToolRegistry>,
    order: OrderHandle,
    event_tx: Option<mpsc::UnboundedSender<AgentEvent>>,
    usage: UsageSummary,
}

impl BaristaSession {
    pub fn new(config: Arc<Config>, tools: Arc<ToolRegistry>, store: Arc<dyn OrderStore>) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        info!(session = %id, "Session started");
        Self {
            id,
            started_at: Utc::now(),
            config,
            tools,
            order: Arc::new(Mutex::new(OrderService::new(store))),
            event_tx: None,
            usage: UsageSummary::default(),
        }
    }

    /// Send [`AgentEvent`]s to `tx` as tool calls are handled.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<AgentEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn greeting(&self) -> &str {
        self.config.greeting()
    }

    /// Instructions for the voice platform's language model.
    pub fn instructions(&self) -> String {
        build_instructions(&self.config, &self.tools)
    }

    /// Tool definitions for the voice platform's language model.
    pub fn tool_definitions(&self) -> Vec<serde_json::Value> {
        self.tools.to_llm_tools()
    }

    pub fn usage(&self) -> UsageSummary {
        self.usage
    }

    /// Which required fields are still missing. Diagnostic only.
    pub async fn status(&self) -> OrderStatus {
        self.order.lock().await.status()
    }

    /// Snapshot of the order in flight.
    pub async fn order(&self) -> OrderRecord {
        self.order.lock().await.order().clone()
    }

    /// Run the tool the language model picked and return what to say back.
    ///
    /// Calls are handled one at a time; failures come back as an error
    /// [`ToolOutput`] rather than tearing the conversation down.
    pub async fn handle_tool_call(&mut self, name: &str, params: serde_json::Value) -> ToolOutput {
        self.usage.tool_calls += 1;
        crate::metrics::record_tool_call(name);
        self.emit(AgentEvent::ToolCall {
            tool: name.to_string(),
            params: params.clone(),
        });

        let completing = IntentKind::from_tool_name(name) == Some(IntentKind::CompleteOrder)
            && self.order.lock().await.order().is_complete();

        let context = ToolContext {
            session_key: self.id.clone(),
            order: self.order.clone(),
        };

        let output = match self.tools.get(name) {
            Some(tool) => match tool.execute(params, &context).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(%e, tool = %name, "Tool execution error");
                    ToolOutput::error(format!("Tool error: {e}"))
                }
            },
            None => ToolOutput::error(format!("Unknown tool: {name}")),
        };

        self.emit(AgentEvent::ToolResult {
            tool: name.to_string(),
            content: output.content.clone(),
            is_error: output.is_error,
        });

        if output.is_error {
            self.usage.tool_errors += 1;
            let kind = if completing { "storage" } else { "tool" };
            crate::metrics::record_error(kind);
            self.emit(AgentEvent::Error {
                kind: kind.into(),
                message: output.content.clone(),
            });
        } else if completing {
            self.usage.orders_completed += 1;
            crate::metrics::record_order_completed();
            self.emit(AgentEvent::OrderCompleted {
                summary: output.content.clone(),
            });
        }

        output
    }

    /// End the session and log what it did.
    pub fn shutdown(self) -> UsageSummary {
        let duration = Utc::now() - self.started_at;
        info!(
            session = %self.id,
            duration_secs = duration.num_seconds(),
            tool_calls = self.usage.tool_calls,
            tool_errors = self.usage.tool_errors,
            orders_completed = self.usage.orders_completed,
            "Usage"
        );
        self.usage
    }

    fn emit(&self, event: AgentEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barista_core::MemoryOrderStore;
    use serde_json::json;

    fn session() -> (BaristaSession, Arc<MemoryOrderStore>) {
        let store = Arc::new(MemoryOrderStore::new());
        let session = BaristaSession::new(
            Arc::new(Config::default()),
            Arc::new(ToolRegistry::with_order_tools()),
            store.clone(),
        );
        (session, store)
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let (mut a, _) = session();
        let (b, _) = session();
        a.handle_tool_call("set_drink_type", json!({"drink_type": "mocha"}))
            .await;
        assert_eq!(a.order().await.drink_type, "mocha");
        assert!(b.order().await.drink_type.is_empty());
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (mut session, _) = session();
        let out = session.handle_tool_call("order_status", json!({})).await;
        assert!(out.is_error);
        assert_eq!(out.content, "Unknown tool: order_status");
        assert_eq!(session.usage().tool_errors, 1);
    }

    #[tokio::test]
    async fn test_bad_arguments_become_tool_error() {
        let (mut session, _) = session();
        let out = session.handle_tool_call("set_size", json!({"size": 16})).await;
        assert!(out.is_error);
        assert!(out.content.starts_with("Tool error:"));
    }

    #[tokio::test]
    async fn test_events_and_usage() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (session, store) = session();
        let mut session = session.with_events(tx);

        session
            .handle_tool_call("complete_order", json!({}))
            .await;
        for (tool, params) in [
            ("set_drink_type", json!({"drink_type": "latte"})),
            ("set_size", json!({"size": "medium"})),
            ("set_milk", json!({"milk_type": "oat"})),
            ("set_name", json!({"name": "Sam"})),
            ("complete_order", json!({})),
        ] {
            session.handle_tool_call(tool, params).await;
        }

        let usage = session.shutdown();
        assert_eq!(usage.tool_calls, 6);
        assert_eq!(usage.tool_errors, 0);
        assert_eq!(usage.orders_completed, 1);
        assert_eq!(store.list().await.unwrap().len(), 1);

        let mut completed = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let AgentEvent::OrderCompleted { summary } = event {
                completed.push(summary);
            }
        }
        assert_eq!(completed.len(), 1);
        assert!(completed[0].contains("Sam"));
    }

    #[tokio::test]
    async fn test_status_is_diagnostic() {
        let (mut session, _) = session();
        session
            .handle_tool_call("set_name", json!({"name": "Sam"}))
            .await;
        assert_eq!(
            session.status().await.to_string(),
            "Missing: drink type, size, milk type"
        );
        assert!(!session.tool_definitions().iter().any(|t| t["name"] == "order_status"));
    }
}
