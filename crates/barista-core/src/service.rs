//! Order service: applies intents to the active order and finalizes it.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{error, info};

use crate::error::Result;
use crate::intent::Intent;
use crate::order::{OrderRecord, OrderStatus};
use crate::order_store::OrderStore;

/// Owns the single order in flight for one conversation.
///
/// Every mutator returns the acknowledgment the voice layer speaks back.
pub struct OrderService {
    order: OrderRecord,
    store: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            order: OrderRecord::new(),
            store,
        }
    }

    /// Read-only view of the active order.
    pub fn order(&self) -> &OrderRecord {
        &self.order
    }

    pub fn status(&self) -> OrderStatus {
        self.order.status()
    }

    pub fn set_drink_type(&mut self, drink_type: &str) -> String {
        self.order.set_drink_type(drink_type);
        info!("Drink type set to: {drink_type}");
        format!("Got it, a {drink_type}. What size would you like?")
    }

    pub fn set_size(&mut self, size: &str) -> String {
        self.order.set_size(size);
        info!("Size set to: {size}");
        format!("Perfect, a {size} size. What type of milk would you like?")
    }

    pub fn set_milk(&mut self, milk_type: &str) -> String {
        self.order.set_milk(milk_type);
        info!("Milk type set to: {milk_type}");
        if self.order.extras.is_empty() {
            format!(
                "Great, {milk_type} milk. Would you like any extras like whipped cream, caramel, or an extra shot?"
            )
        } else {
            format!("Perfect, {milk_type} milk. And what name should I put on the order?")
        }
    }

    pub fn add_extra(&mut self, extra: &str) -> String {
        self.order.add_extra(extra);
        info!(extras = ?self.order.extras, "Extra added: {extra}");
        format!("Added {extra}. Anything else, or what name should I put on the order?")
    }

    pub fn set_name(&mut self, name: &str) -> String {
        self.order.set_name(name);
        info!("Name set to: {name}");
        if self.order.has_drink_details() {
            format!("Thanks {name}! I have everything I need. Let me complete your order now.")
        } else {
            format!("Thanks {name}! I still need a few more details about your order.")
        }
    }

    /// Validate, persist, summarize, and reset the order.
    ///
    /// A missing required field is not an error: the clarifying question
    /// comes back as `Ok`. A storage failure is returned as `Err` and the
    /// order is kept so nothing the customer said is lost.
    pub async fn complete_order(&mut self) -> Result<String> {
        self.complete_order_at(Local::now()).await
    }

    pub async fn complete_order_at(&mut self, placed_at: DateTime<Local>) -> Result<String> {
        if let Some(field) = self.order.first_missing() {
            return Ok(field.prompt().to_string());
        }

        let stored = match self.store.save(&self.order, placed_at).await {
            Ok(stored) => stored,
            Err(e) => {
                error!(%e, name = %self.order.name, "Failed to save order");
                return Err(e);
            }
        };
        match &stored.path {
            Some(path) => info!("Order saved to {}", path.display()),
            None => info!(id = %stored.id, "Order saved"),
        }

        let summary = format!(
            "Perfect! I've got your order: a {} {} with {} milk, {}. \
             Your order has been saved. We'll call your name, {}, when it's ready!",
            self.order.size,
            self.order.drink_type,
            self.order.milk,
            self.order.extras_phrase(),
            self.order.name,
        );

        self.order.reset();
        Ok(summary)
    }

    /// Single entry point for the conversation layer.
    pub async fn apply(&mut self, intent: Intent) -> Result<String> {
        match intent {
            Intent::SetDrinkType(v) => Ok(self.set_drink_type(&v)),
            Intent::SetSize(v) => Ok(self.set_size(&v)),
            Intent::SetMilk(v) => Ok(self.set_milk(&v)),
            Intent::AddExtra(v) => Ok(self.add_extra(&v)),
            Intent::SetName(v) => Ok(self.set_name(&v)),
            Intent::CompleteOrder => self.complete_order().await,
        }
    }
}
