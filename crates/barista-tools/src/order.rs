//! Order tools: one tool per intent, all applied to the session's order.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use barista_core::{Intent, IntentKind};

use crate::{Tool, ToolContext, ToolOutput, ToolRegistry};

/// Spoken when an order could not be saved.
const SAVE_FAILED: &str = "I'm sorry, something went wrong saving your order. \
     I still have everything you told me, so let me try that again in a moment.";

pub struct OrderTool {
    kind: IntentKind,
}

impl OrderTool {
    pub fn new(kind: IntentKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> IntentKind {
        self.kind
    }
}

/// Register `set_drink_type`, `set_size`, `set_milk`, `add_extra`,
/// `set_name`, and `complete_order`.
///
/// The status query stays off this list; it is a diagnostic, not part of
/// the conversation.
pub fn register_order_tools(registry: &mut ToolRegistry) {
    for kind in IntentKind::ALL {
        registry.register(Box::new(OrderTool::new(kind)));
    }
}

#[async_trait]
impl Tool for OrderTool {
    fn name(&self) -> &str {
        self.kind.tool_name()
    }

    fn description(&self) -> &str {
        self.kind.description()
    }

    fn parameters_schema(&self) -> serde_json::Value {
        match (self.kind.argument(), self.kind.argument_description()) {
            (Some(arg), Some(desc)) => json!({
                "type": "object",
                "properties": {
                    arg: {
                        "type": "string",
                        "description": desc
                    }
                },
                "required": [arg]
            }),
            _ => json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        context: &ToolContext,
    ) -> anyhow::Result<ToolOutput> {
        let intent = Intent::from_tool_call(self.name(), &params)?;
        debug!(session = %context.session_key, ?intent, "order tool");

        let mut service = context.order.lock().await;
        match service.apply(intent).await {
            Ok(reply) => Ok(ToolOutput::text(reply)),
            // Already logged by the service
            Err(e) => {
                debug!(session = %context.session_key, %e, "order not completed");
                Ok(ToolOutput::error(SAVE_FAILED))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use barista_core::{JsonOrderStore, OrderService, OrderStore};
    use tokio::sync::Mutex;
    use tracing_subscriber::layer::SubscriberExt;

    fn context(store: Arc<dyn OrderStore>) -> ToolContext {
        ToolContext {
            session_key: "test".into(),
            order: Arc::new(Mutex::new(OrderService::new(store))),
        }
    }

    async fn call(ctx: &ToolContext, kind: IntentKind, params: serde_json::Value) -> ToolOutput {
        OrderTool::new(kind).execute(params, ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_set_drink_type_tool() {
        let ctx = context(Arc::new(barista_core::MemoryOrderStore::new()));
        let out = call(&ctx, IntentKind::SetDrinkType, json!({"drink_type": "cappuccino"})).await;
        assert!(!out.is_error);
        assert_eq!(out.content, "Got it, a cappuccino. What size would you like?");
        assert_eq!(ctx.order.lock().await.order().drink_type, "cappuccino");
    }

    #[tokio::test]
    async fn test_add_extra_tool_is_idempotent() {
        let ctx = context(Arc::new(barista_core::MemoryOrderStore::new()));
        call(&ctx, IntentKind::AddExtra, json!({"extra": "caramel"})).await;
        call(&ctx, IntentKind::AddExtra, json!({"extra": "caramel"})).await;
        assert_eq!(ctx.order.lock().await.order().extras, vec!["caramel"]);
    }

    #[tokio::test]
    async fn test_missing_parameter_is_an_error() {
        let ctx = context(Arc::new(barista_core::MemoryOrderStore::new()));
        let result = OrderTool::new(IntentKind::SetSize)
            .execute(json!({"drink_type": "latte"}), &ctx)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_complete_order_tool_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(Arc::new(JsonOrderStore::new(dir.path().to_path_buf())));

        call(&ctx, IntentKind::SetDrinkType, json!({"drink_type": "americano"})).await;
        call(&ctx, IntentKind::SetSize, json!({"size": "venti"})).await;
        call(&ctx, IntentKind::SetMilk, json!({"milk_type": "none"})).await;
        call(&ctx, IntentKind::SetName, json!({"name": "Jo Ann"})).await;
        let out = call(&ctx, IntentKind::CompleteOrder, json!({})).await;

        assert!(!out.is_error);
        assert!(out.content.contains("a venti americano with none milk, no extras."));
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        let name = files[0].as_ref().unwrap().file_name().into_string().unwrap();
        assert!(name.starts_with("order_") && name.ends_with("_Jo_Ann.json"), "{name}");
    }

    #[tokio::test]
    async fn test_complete_order_tool_reports_save_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("orders");
        std::fs::write(&blocker, "").unwrap();
        let ctx = context(Arc::new(JsonOrderStore::new(blocker)));

        call(&ctx, IntentKind::SetDrinkType, json!({"drink_type": "latte"})).await;
        call(&ctx, IntentKind::SetSize, json!({"size": "small"})).await;
        call(&ctx, IntentKind::SetMilk, json!({"milk_type": "oat"})).await;
        call(&ctx, IntentKind::SetName, json!({"name": "Sam"})).await;
        let out = call(&ctx, IntentKind::CompleteOrder, json!({})).await;

        assert!(out.is_error);
        assert!(out.content.starts_with("I'm sorry"));
        assert!(ctx.order.lock().await.order().is_complete());
    }

    struct ErrorCount(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorCount {
        fn on_event(&self, event: &tracing::Event<'_>, _: tracing_subscriber::layer::Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn test_save_failure_logged_once() {
        let errors = Arc::new(AtomicUsize::new(0));
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(ErrorCount(errors.clone())),
        );

        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("orders");
        std::fs::write(&blocker, "").unwrap();
        let ctx = context(Arc::new(JsonOrderStore::new(blocker)));

        call(&ctx, IntentKind::SetDrinkType, json!({"drink_type": "latte"})).await;
        call(&ctx, IntentKind::SetSize, json!({"size": "small"})).await;
        call(&ctx, IntentKind::SetMilk, json!({"milk_type": "oat"})).await;
        call(&ctx, IntentKind::SetName, json!({"name": "Sam"})).await;
        let out = call(&ctx, IntentKind::CompleteOrder, json!({})).await;

        assert!(out.is_error);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }
}
