//! Onboarding reply template.
//!
//! Admins may customize the reply sent to inbound Telegram messages. The
//! template is parsed and validated when the channel config is loaded, so a
//! typo'd placeholder surfaces as a config error instead of leaking into
//! every reply.

use std::collections::HashMap;

use herald_common::error::AppError;

/// Reply used when no template is configured.
pub const DEFAULT_ONBOARDING: &str = "Your Telegram ID: {userid}";

/// Placeholder names the renderer knows how to fill.
const KNOWN_PLACEHOLDERS: &[&str] = &["userid"];

/// A validated message template with named `{placeholder}` slots.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    raw: String,
}

impl MessageTemplate {
    /// Validate and wrap a raw template string.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        for name in placeholders(raw) {
            if !KNOWN_PLACEHOLDERS.contains(&name.as_str()) {
                return Err(AppError::Config(format!(
                    "Unknown placeholder '{{{}}}' in onboarding template",
                    name
                )));
            }
        }
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    /// The default onboarding template.
    pub fn default_onboarding() -> Self {
        Self {
            raw: DEFAULT_ONBOARDING.to_string(),
        }
    }

    /// Substitute every placeholder from the given name → value map.
    pub fn render(&self, values: &HashMap<&str, String>) -> String {
        let mut out = self.raw.clone();
        for (name, value) in values {
            out = out.replace(&format!("{{{}}}", name), value);
        }
        out
    }
}

/// Names appearing between `{` and `}` pairs, left to right.
fn placeholders(raw: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = raw;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start + 1..].find('}') else {
            break;
        };
        names.push(rest[start + 1..start + 1 + len].to_string());
        rest = &rest[start + 1 + len + 1..];
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn userid(value: &str) -> HashMap<&'static str, String> {
        HashMap::from([("userid", value.to_string())])
    }

    #[test]
    fn test_default_onboarding_reply() {
        let template = MessageTemplate::default_onboarding();
        assert_eq!(
            template.render(&userid("987654321")),
            "Your Telegram ID: 987654321"
        );
    }

    #[test]
    fn test_custom_template() {
        let template = MessageTemplate::parse("Welcome! Register id {userid} on your profile.")
            .unwrap();
        assert_eq!(
            template.render(&userid("42")),
            "Welcome! Register id 42 on your profile."
        );
    }

    #[test]
    fn test_placeholder_repeats_are_all_replaced() {
        let template = MessageTemplate::parse("{userid} {userid}").unwrap();
        assert_eq!(template.render(&userid("7")), "7 7");
    }

    #[test]
    fn test_template_without_placeholders_is_valid() {
        let template = MessageTemplate::parse("Hello there").unwrap();
        assert_eq!(template.render(&userid("7")), "Hello there");
    }

    #[test]
    fn test_unknown_placeholder_rejected_at_parse_time() {
        let result = MessageTemplate::parse("Your id: {user_id}");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_unclosed_brace_is_literal() {
        let template = MessageTemplate::parse("smile {").unwrap();
        assert_eq!(template.render(&userid("7")), "smile {");
    }
}
