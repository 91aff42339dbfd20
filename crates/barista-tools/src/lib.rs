//! Tools exposed to the language model during a conversation.
//!
//! The speech pipeline's model decides which order update the customer
//! asked for and calls the matching tool. Each tool implements [`Tool`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use barista_core::OrderService;

pub mod order;

pub use order::{OrderTool, register_order_tools};

/// Shared handle to one conversation's order service.
pub type OrderHandle = Arc<Mutex<OrderService>>;

/// Context provided to tools during execution.
pub struct ToolContext {
    pub session_key: String,
    pub order: OrderHandle,
}

/// Output from a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// The core tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name as exposed to the LLM (e.g., "set_size").
    fn name(&self) -> &str;

    /// JSON Schema describing the tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Human-readable description for the LLM.
    fn description(&self) -> &str;

    /// Execute the tool with the given parameters.
    async fn execute(
        &self,
        params: serde_json::Value,
        context: &ToolContext,
    ) -> anyhow::Result<ToolOutput>;
}

/// Registry of available tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the six order tools.
    pub fn with_order_tools() -> Self {
        let mut registry = Self::new();
        register_order_tools(&mut registry);
        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    pub fn list(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    /// Generate tool definitions for the LLM API request.
    pub fn to_llm_tools(&self) -> Vec<serde_json::Value> {
        self.tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name(),
                    "description": t.description(),
                    "input_schema": t.parameters_schema(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lists_order_tools() {
        let registry = ToolRegistry::with_order_tools();
        assert_eq!(
            registry.list(),
            vec![
                "set_drink_type",
                "set_size",
                "set_milk",
                "add_extra",
                "set_name",
                "complete_order"
            ]
        );
        assert!(registry.get("set_milk").is_some());
        assert!(registry.get("order_status").is_none());
    }

    #[test]
    fn test_to_llm_tools() {
        let registry = ToolRegistry::with_order_tools();
        let defs = registry.to_llm_tools();
        assert_eq!(defs.len(), 6);

        let add_extra = defs.iter().find(|d| d["name"] == "add_extra").unwrap();
        assert_eq!(add_extra["input_schema"]["required"][0], "extra");
        assert!(
            add_extra["input_schema"]["properties"]["extra"]["description"]
                .as_str()
                .unwrap()
                .contains("caramel")
        );

        let complete = defs.iter().find(|d| d["name"] == "complete_order").unwrap();
        assert!(complete["input_schema"]["properties"].as_object().unwrap().is_empty());
    }
}
