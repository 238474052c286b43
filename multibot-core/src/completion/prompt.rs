use crate::models::ChatContext;

use super::PromptMessage;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an intelligent customer service chatbot specializing in home services. 
You help customers with inquiries about:
- Plumbing services
- Electrical work
- HVAC maintenance and repair
- Home cleaning services
- Landscaping and gardening
- General home maintenance

Be helpful, professional, and provide accurate information. If you don't know something specific, 
suggest contacting a professional service provider. Always prioritize safety and recommend 
professional help for complex or dangerous situations.";

pub const FALLBACK_REPLY: &str = "I apologize, but I am unable to respond at the moment.";

/// Fixed score reported with every reply.
pub const DEFAULT_CONFIDENCE: f32 = 0.9;

const BASE_SUGGESTIONS: [&str; 4] = [
    "Schedule a service appointment",
    "Get a quote for repairs",
    "Emergency service information",
    "Maintenance tips and advice",
];

/// The extra system line describing the caller's business, if the context
/// names any of industry, service or location.
pub fn context_message(context: &ChatContext) -> Option<String> {
    if !context.has_business_context() {
        return None;
    }

    Some(format!(
        "Additional Context: Industry: {}, Service: {}, Location: {}",
        context.industry.as_deref().unwrap_or("Home Services"),
        context.service.as_deref().unwrap_or("General"),
        context.location.as_deref().unwrap_or("Not specified"),
    ))
}

/// System prompt first, optional business context second, user message last.
pub fn build_messages(message: &str, context: Option<&ChatContext>) -> Vec<PromptMessage> {
    let system_prompt = context
        .and_then(|c| c.system_prompt.as_deref())
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);

    let mut messages = vec![PromptMessage::system(system_prompt)];
    if let Some(extra) = context.and_then(context_message) {
        messages.push(PromptMessage::system(extra));
    }
    messages.push(PromptMessage::user(message));
    messages
}

pub fn generate_suggestions(context: Option<&ChatContext>) -> Vec<String> {
    let base = BASE_SUGGESTIONS.iter().map(|s| s.to_string());

    match context.and_then(|c| c.service.as_deref()) {
        Some(service) if !service.is_empty() => vec![
            format!("Learn more about {}", service),
            format!("Get {} pricing", service),
            format!("Schedule {} appointment", service),
        ]
        .into_iter()
        .chain(base)
        .collect(),
        _ => base.collect(),
    }
}
