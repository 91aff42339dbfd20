//! Intents: the discrete order updates the conversation layer can request.

use serde::{Deserialize, Serialize};

use crate::error::{BaristaError, Result};

/// A single update derived from the conversation, carrying its argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "value", rename_all = "snake_case")]
pub enum Intent {
    SetDrinkType(String),
    SetSize(String),
    SetMilk(String),
    AddExtra(String),
    SetName(String),
    CompleteOrder,
}

/// Payload-free mirror of [`Intent`], used to describe the tool surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    SetDrinkType,
    SetSize,
    SetMilk,
    AddExtra,
    SetName,
    CompleteOrder,
}

impl IntentKind {
    pub const ALL: [IntentKind; 6] = [
        IntentKind::SetDrinkType,
        IntentKind::SetSize,
        IntentKind::SetMilk,
        IntentKind::AddExtra,
        IntentKind::SetName,
        IntentKind::CompleteOrder,
    ];

    /// Tool name as exposed to the language model.
    pub fn tool_name(self) -> &'static str {
        match self {
            Self::SetDrinkType => "set_drink_type",
            Self::SetSize => "set_size",
            Self::SetMilk => "set_milk",
            Self::AddExtra => "add_extra",
            Self::SetName => "set_name",
            Self::CompleteOrder => "complete_order",
        }
    }

    /// Name of the single string argument, if the intent takes one.
    pub fn argument(self) -> Option<&'static str> {
        match self {
            Self::SetDrinkType => Some("drink_type"),
            Self::SetSize => Some("size"),
            Self::SetMilk => Some("milk_type"),
            Self::AddExtra => Some("extra"),
            Self::SetName => Some("name"),
            Self::CompleteOrder => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::SetDrinkType => "Set the type of drink the customer wants to order.",
            Self::SetSize => "Set the size of the drink.",
            Self::SetMilk => "Set the type of milk for the drink.",
            Self::AddExtra => {
                "Add an extra item to the order. Call once per extra; repeats are ignored."
            }
            Self::SetName => "Set the customer's name for the order.",
            Self::CompleteOrder => {
                "Complete the order by saving it. Call this as soon as drink type, size, milk, \
                 and name are all known (extras may be empty); do not wait for the customer to \
                 say that's all."
            }
        }
    }

    /// Description of the argument, with the vocabulary the model should expect.
    pub fn argument_description(self) -> Option<&'static str> {
        match self {
            Self::SetDrinkType => Some(
                "The type of drink (e.g., latte, cappuccino, americano, espresso, mocha, frappuccino, etc.)",
            ),
            Self::SetSize => Some("The size (small, medium, large, or tall, grande, venti)"),
            Self::SetMilk => {
                Some("The type of milk (whole, skim, almond, oat, soy, coconut, or none)")
            }
            Self::AddExtra => Some(
                "The extra item (e.g., whipped cream, caramel, vanilla, chocolate, extra shot, etc.)",
            ),
            Self::SetName => Some("The customer's name"),
            Self::CompleteOrder => None,
        }
    }

    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tool_name() == name)
    }

    /// Attach an argument to build the concrete intent.
    pub fn with_argument(self, value: String) -> Intent {
        match self {
            Self::SetDrinkType => Intent::SetDrinkType(value),
            Self::SetSize => Intent::SetSize(value),
            Self::SetMilk => Intent::SetMilk(value),
            Self::AddExtra => Intent::AddExtra(value),
            Self::SetName => Intent::SetName(value),
            Self::CompleteOrder => Intent::CompleteOrder,
        }
    }
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Self::SetDrinkType(_) => IntentKind::SetDrinkType,
            Self::SetSize(_) => IntentKind::SetSize,
            Self::SetMilk(_) => IntentKind::SetMilk,
            Self::AddExtra(_) => IntentKind::AddExtra,
            Self::SetName(_) => IntentKind::SetName,
            Self::CompleteOrder => IntentKind::CompleteOrder,
        }
    }

    /// Resolve a model tool call (`name` + JSON arguments) into an intent.
    pub fn from_tool_call(name: &str, params: &serde_json::Value) -> Result<Self> {
        let kind = IntentKind::from_tool_name(name)
            .ok_or_else(|| BaristaError::Intent(format!("unknown tool '{name}'")))?;

        let Some(arg) = kind.argument() else {
            return Ok(Intent::CompleteOrder);
        };

        let value = params
            .get(arg)
            .and_then(|v| v.as_str())
            .ok_or_else(|| BaristaError::Intent(format!("missing '{arg}' parameter")))?;

        Ok(kind.with_argument(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_names_round_trip() {
        for kind in IntentKind::ALL {
            assert_eq!(IntentKind::from_tool_name(kind.tool_name()), Some(kind));
        }
        assert_eq!(IntentKind::from_tool_name("order_status"), None);
    }

    #[test]
    fn test_from_tool_call_with_argument() {
        let intent = Intent::from_tool_call("set_milk", &json!({"milk_type": "oat"})).unwrap();
        assert_eq!(intent, Intent::SetMilk("oat".into()));
        assert_eq!(intent.kind(), IntentKind::SetMilk);
    }

    #[test]
    fn test_from_tool_call_accepts_empty_string() {
        let intent = Intent::from_tool_call("set_name", &json!({"name": ""})).unwrap();
        assert_eq!(intent, Intent::SetName(String::new()));
    }

    #[test]
    fn test_complete_order_ignores_params() {
        let intent = Intent::from_tool_call("complete_order", &json!({})).unwrap();
        assert_eq!(intent, Intent::CompleteOrder);
    }

    #[test]
    fn test_from_tool_call_errors() {
        let err = Intent::from_tool_call("refund", &json!({})).unwrap_err();
        assert!(err.to_string().contains("unknown tool"));

        let err = Intent::from_tool_call("add_extra", &json!({"extra": 3})).unwrap_err();
        assert!(err.to_string().contains("'extra'"));

        let err = Intent::from_tool_call("set_size", &json!({})).unwrap_err();
        assert!(matches!(err, BaristaError::Intent(_)));
    }

    #[test]
    fn test_intent_serde_shape() {
        let json = serde_json::to_value(Intent::AddExtra("caramel".into())).unwrap();
        assert_eq!(json, json!({"intent": "add_extra", "value": "caramel"}));

        let json = serde_json::to_value(Intent::CompleteOrder).unwrap();
        assert_eq!(json, json!({"intent": "complete_order"}));
    }
}
