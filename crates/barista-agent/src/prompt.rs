//! Instructions handed to the voice platform's language model.

use barista_core::config::Config;
use barista_core::order::OrderField;
use barista_tools::ToolRegistry;

const BARISTA_PERSONA: &str = "\
You are a friendly and enthusiastic barista at a coffee shop.
Your job is to take voice orders from customers in a warm, welcoming manner.

When a customer approaches, greet them warmly and ask what they'd like to order.
You need to collect the following information for each order:
- drinkType: The type of drink (e.g., latte, cappuccino, americano, espresso, mocha, frappuccino, etc.)
- size: The size of the drink (small, medium, large, or tall, grande, venti)
- milk: The type of milk (whole, skim, almond, oat, soy, coconut, or none)
- extras: Any additional items (e.g., whipped cream, caramel, vanilla, chocolate, extra shot, etc.) - this can be an empty list if the customer doesn't want any extras
- name: The customer's name for the order

Ask clarifying questions one at a time until you have all the information.
Be conversational and friendly. If a customer mentions multiple things at once, acknowledge them and use the appropriate tools to capture each detail.

Your responses should be natural, friendly, and concise. Speak as if you're having a real conversation with a customer.";

/// Build the instructions for the conversation model.
///
/// `agent.instructions` in the config replaces the persona; the tool usage
/// rules are always appended so the order tools keep being called.
pub fn build_instructions(config: &Config, tools: &ToolRegistry) -> String {
    let mut parts = Vec::new();

    parts.push(
        config
            .instructions_override()
            .unwrap_or(BARISTA_PERSONA)
            .to_string(),
    );

    let tool_names = tools.list();
    if !tool_names.is_empty() {
        let mut usage = String::from(
            "IMPORTANT: Use the function tools to update the order state as the customer provides information:",
        );
        for tool in tools.tools() {
            usage.push_str(&format!("\n- {}: {}", tool.name(), tool.description()));
        }
        parts.push(usage);
    }

    let required: Vec<&str> = OrderField::REQUIRED
        .iter()
        .map(|field| field.label())
        .collect();
    parts.push(format!(
        "Once you have collected {} (extras can be empty), you MUST call the complete_order tool \
         to finalize and save the order. Do not wait for the customer to explicitly say \"that's all\".",
        required.join(", ")
    ));

    parts.join("\n\n")
}
