//! Core types, config, errors, and the order state machine for Barista.

pub mod config;
pub mod error;
pub mod intent;
pub mod order;
pub mod order_store;
pub mod service;

pub use intent::{Intent, IntentKind};
pub use order::{OrderField, OrderRecord, OrderStatus};
pub use order_store::{JsonOrderStore, MemoryOrderStore, OrderStore, StoredOrder};
pub use service::OrderService;
