//! The order record: one customer's drink order, filled in field by field.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single in-progress (or just-completed) order.
///
/// String fields are unset while empty. `extras` keeps first-mention order
/// and never holds duplicates; an empty list is a valid final state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub drink_type: String,
    pub size: String,
    pub milk: String,
    pub extras: Vec<String>,
    pub name: String,
}

/// Required fields, in the order completion validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderField {
    DrinkType,
    Size,
    Milk,
    Name,
}

impl OrderField {
    pub const REQUIRED: [OrderField; 4] = [
        OrderField::DrinkType,
        OrderField::Size,
        OrderField::Milk,
        OrderField::Name,
    ];

    /// Spoken label used in status reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::DrinkType => "drink type",
            Self::Size => "size",
            Self::Milk => "milk type",
            Self::Name => "name",
        }
    }

    /// Clarifying question asked when completion finds this field unset.
    pub fn prompt(self) -> &'static str {
        match self {
            Self::DrinkType => {
                "I still need to know what drink you'd like. What can I get for you?"
            }
            Self::Size => "What size would you like for your drink?",
            Self::Milk => "What type of milk would you like?",
            Self::Name => "What name should I put on the order?",
        }
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of the diagnostic status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    Complete,
    Missing(Vec<OrderField>),
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => f.write_str("complete"),
            Self::Missing(fields) => {
                let labels: Vec<&str> = fields.iter().map(|field| field.label()).collect();
                write!(f, "Missing: {}", labels.join(", "))
            }
        }
    }
}

impl OrderRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_drink_type(&mut self, value: impl Into<String>) {
        self.drink_type = value.into();
    }

    pub fn set_size(&mut self, value: impl Into<String>) {
        self.size = value.into();
    }

    pub fn set_milk(&mut self, value: impl Into<String>) {
        self.milk = value.into();
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.name = value.into();
    }

    /// Append an extra unless it is already on the order.
    ///
    /// Returns `true` when the extra was newly added.
    pub fn add_extra(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.extras.contains(&value) {
            return false;
        }
        self.extras.push(value);
        true
    }

    /// Current value of a required field.
    pub fn field(&self, field: OrderField) -> &str {
        match field {
            OrderField::DrinkType => &self.drink_type,
            OrderField::Size => &self.size,
            OrderField::Milk => &self.milk,
            OrderField::Name => &self.name,
        }
    }

    /// Unset required fields, in validation order.
    pub fn missing_fields(&self) -> Vec<OrderField> {
        OrderField::REQUIRED
            .into_iter()
            .filter(|field| self.field(*field).is_empty())
            .collect()
    }

    pub fn first_missing(&self) -> Option<OrderField> {
        OrderField::REQUIRED
            .into_iter()
            .find(|field| self.field(*field).is_empty())
    }

    /// Drink, size, and milk are known (the name may still be missing).
    pub fn has_drink_details(&self) -> bool {
        !self.drink_type.is_empty() && !self.size.is_empty() && !self.milk.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.first_missing().is_none()
    }

    pub fn status(&self) -> OrderStatus {
        let missing = self.missing_fields();
        if missing.is_empty() {
            OrderStatus::Complete
        } else {
            OrderStatus::Missing(missing)
        }
    }

    /// Extras as spoken in the summary: comma-joined, or "no extras".
    pub fn extras_phrase(&self) -> String {
        if self.extras.is_empty() {
            "no extras".to_string()
        } else {
            self.extras.join(", ")
        }
    }

    /// Back to the fully-unset initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
