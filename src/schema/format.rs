//! Human-readable rendering of schema violations.
//!
//! Every validation failure surfaces to callers as exactly one sentence. The
//! formatter depends only on the [`Violation`] shape produced by a schema
//! engine adapter, never on any engine's own error types.

use serde_json::Value;

/// A single structured validation failure reported by a schema engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The failing schema keyword together with its parameters.
    pub keyword: Keyword,
    /// JSON pointer to the offending value, e.g. `/a/0/b`.
    pub instance_path: String,
}

impl Violation {
    /// Whether this violation names a concrete keyword rather than a
    /// union (`anyOf`/`oneOf`) failure.
    pub fn is_concrete(&self) -> bool {
        !matches!(self.keyword, Keyword::AnyOf | Keyword::OneOf { .. })
    }

    /// Nesting depth of the instance path; deeper violations are more
    /// specific.
    pub fn depth(&self) -> usize {
        self.instance_path.chars().filter(|c| *c == '/').count()
    }
}

/// Schema keywords the formatter renders with a bespoke sentence. Anything
/// else arrives as [`Keyword::Other`] carrying the engine's own message.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyword {
    Type { expected: String },
    Required { property: String },
    AdditionalProperties { unexpected: Vec<String> },
    Enum { options: Vec<Value> },
    Pattern { pattern: String },
    Format { format: String },
    Minimum { limit: Value, exclusive: bool },
    Maximum { limit: Value, exclusive: bool },
    MultipleOf { factor: f64 },
    AnyOf,
    OneOf { multiple_valid: bool },
    MinLength { limit: u64 },
    MaxLength { limit: u64 },
    MinItems { limit: u64 },
    MaxItems { limit: u64 },
    UniqueItems,
    MinProperties { limit: u64 },
    MaxProperties { limit: u64 },
    Other { message: String },
}

/// Render a JSON pointer (`/a/0/b`) as a bracketed path (`a[0][b]`).
///
/// The root pointer renders as an empty string.
pub fn render_pointer(pointer: &str) -> String {
    let mut out = String::new();
    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        if out.is_empty() {
            out.push_str(&segment);
        } else {
            out.push('[');
            out.push_str(&segment);
            out.push(']');
        }
    }
    out
}

/// Render one violation as one sentence.
pub fn format_violation(violation: &Violation) -> String {
    let path = render_pointer(&violation.instance_path);
    let subject = if path.is_empty() {
        "The value".to_string()
    } else {
        path.clone()
    };

    match &violation.keyword {
        Keyword::Type { expected } => format!("{subject} is not of type {expected}."),
        Keyword::Required { property } => {
            if path.is_empty() {
                format!("{property} is a required property.")
            } else {
                format!("{path}[{property}] is a required property.")
            }
        }
        Keyword::AdditionalProperties { unexpected } => match unexpected.as_slice() {
            [] => format!("{subject} contains additional properties that are not allowed."),
            [single] => {
                format!("{subject} contains the additional property \"{single}\", which is not allowed.")
            }
            many => format!(
                "{subject} contains additional properties that are not allowed: {}.",
                quote_list(many)
            ),
        },
        Keyword::Enum { options } => format!(
            "{subject} is not one of the allowed values: {}.",
            options
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Keyword::Pattern { pattern } => {
            format!("{subject} does not match the required pattern \"{pattern}\".")
        }
        Keyword::Format { format } => format!("{subject} is not a valid {format}."),
        Keyword::Minimum { limit, exclusive } => {
            if *exclusive {
                format!("{subject} must be greater than {limit}.")
            } else {
                format!("{subject} must be greater than or equal to {limit}.")
            }
        }
        Keyword::Maximum { limit, exclusive } => {
            if *exclusive {
                format!("{subject} must be less than {limit}.")
            } else {
                format!("{subject} must be less than or equal to {limit}.")
            }
        }
        Keyword::MultipleOf { factor } => format!("{subject} must be a multiple of {factor}."),
        Keyword::AnyOf => format!("{subject} does not match any of the allowed schemas."),
        Keyword::OneOf { multiple_valid } => {
            if *multiple_valid {
                format!("{subject} matches more than one of the allowed schemas.")
            } else {
                format!("{subject} does not match exactly one of the allowed schemas.")
            }
        }
        Keyword::MinLength { limit } => format!(
            "{subject} must be at least {} long.",
            count(*limit, "character", "characters")
        ),
        Keyword::MaxLength { limit } => format!(
            "{subject} must be at most {} long.",
            count(*limit, "character", "characters")
        ),
        Keyword::MinItems { limit } => format!(
            "{subject} must contain at least {}.",
            count(*limit, "item", "items")
        ),
        Keyword::MaxItems { limit } => format!(
            "{subject} must contain at most {}.",
            count(*limit, "item", "items")
        ),
        Keyword::UniqueItems => format!("{subject} must not contain duplicate items."),
        Keyword::MinProperties { limit } => format!(
            "{subject} must contain at least {}.",
            count(*limit, "property", "properties")
        ),
        Keyword::MaxProperties { limit } => format!(
            "{subject} must contain at most {}.",
            count(*limit, "property", "properties")
        ),
        Keyword::Other { message } => {
            if message.is_empty() {
                format!("{subject} does not match the expected schema.")
            } else {
                let mut sentence = message.clone();
                if !sentence.ends_with('.') {
                    sentence.push('.');
                }
                sentence
            }
        }
    }
}

fn count(n: u64, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("1 {singular}")
    } else {
        format!("{n} {plural}")
    }
}

fn quote_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violation(keyword: Keyword, instance_path: &str) -> Violation {
        Violation {
            keyword,
            instance_path: instance_path.to_string(),
        }
    }

    #[test]
    fn test_render_pointer() {
        assert_eq!(render_pointer(""), "");
        assert_eq!(render_pointer("/a"), "a");
        assert_eq!(render_pointer("/a/0/b"), "a[0][b]");
        assert_eq!(render_pointer("/a~1b/c"), "a/b[c]");
    }

    #[test]
    fn test_required_at_root() {
        let message = format_violation(&violation(
            Keyword::Required {
                property: "url".to_string(),
            },
            "",
        ));
        assert_eq!(message, "url is a required property.");
    }

    #[test]
    fn test_required_nested() {
        let message = format_violation(&violation(
            Keyword::Required {
                property: "title".to_string(),
            },
            "/site/0",
        ));
        assert_eq!(message, "site[0][title] is a required property.");
    }

    #[test]
    fn test_type_with_path() {
        let message = format_violation(&violation(
            Keyword::Type {
                expected: "string".to_string(),
            },
            "/url",
        ));
        assert_eq!(message, "url is not of type string.");
    }

    #[test]
    fn test_min_length_singular_and_plural() {
        let singular = format_violation(&violation(Keyword::MinLength { limit: 1 }, "/name"));
        assert_eq!(singular, "name must be at least 1 character long.");
        let plural = format_violation(&violation(Keyword::MinLength { limit: 5 }, "/name"));
        assert_eq!(plural, "name must be at least 5 characters long.");
    }

    #[test]
    fn test_min_properties_plural_form() {
        let message = format_violation(&violation(Keyword::MinProperties { limit: 2 }, ""));
        assert_eq!(message, "The value must contain at least 2 properties.");
    }

    #[test]
    fn test_additional_properties_singular_and_plural() {
        let singular = format_violation(&violation(
            Keyword::AdditionalProperties {
                unexpected: vec!["extra".to_string()],
            },
            "",
        ));
        assert_eq!(
            singular,
            "The value contains the additional property \"extra\", which is not allowed."
        );
        let plural = format_violation(&violation(
            Keyword::AdditionalProperties {
                unexpected: vec!["a".to_string(), "b".to_string()],
            },
            "/meta",
        ));
        assert_eq!(
            plural,
            "meta contains additional properties that are not allowed: \"a\", \"b\"."
        );
    }

    #[test]
    fn test_enum_options() {
        let message = format_violation(&violation(
            Keyword::Enum {
                options: vec![json!("draft"), json!("published")],
            },
            "/status",
        ));
        assert_eq!(
            message,
            "status is not one of the allowed values: \"draft\", \"published\"."
        );
    }

    #[test]
    fn test_other_falls_back_to_engine_message() {
        let message = format_violation(&violation(
            Keyword::Other {
                message: "value does not satisfy the \"not\" schema".to_string(),
            },
            "",
        ));
        assert_eq!(message, "value does not satisfy the \"not\" schema.");
    }

    #[test]
    fn test_other_with_empty_message_is_generic() {
        let message = format_violation(&violation(
            Keyword::Other {
                message: String::new(),
            },
            "/a",
        ));
        assert_eq!(message, "a does not match the expected schema.");
    }
}
