//! Injectable schema engine interface and the default draft-04 adapter.
//!
//! The registry never talks to a JSON-Schema library directly. It compiles
//! schemas through [`SchemaEngine`] and receives structured [`Violation`]s
//! back, so any draft-04-capable engine can be swapped in (tests inject
//! stubs). [`Draft4Engine`] is the default adapter over the `jsonschema`
//! crate.

use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::{Draft, JSONSchema, ValidationError};
use serde_json::Value;
use thiserror::Error;

use super::format::{Keyword, Violation};

/// A schema failed to compile.
#[derive(Debug, Error)]
#[error("schema compilation failed: {message}")]
pub struct SchemaCompileError {
    pub message: String,
}

/// A compiled schema ready to validate values.
pub trait CompiledSchema: Send + Sync {
    /// Validate a value; an empty vector means the value conforms.
    fn validate(&self, value: &Value) -> Vec<Violation>;
}

/// Compiles JSON-Schema documents into reusable validators.
pub trait SchemaEngine: Send + Sync {
    fn compile(&self, schema: &Value) -> Result<Box<dyn CompiledSchema>, SchemaCompileError>;
}

/// Default engine: the `jsonschema` crate in draft-04 mode with format
/// validation enabled (`date-time`, `email`, `hostname`, `ipv4`, `ipv6`,
/// `uuid`, and friends). No type coercion; additional properties are
/// reported, never stripped.
#[derive(Debug, Default)]
pub struct Draft4Engine;

impl SchemaEngine for Draft4Engine {
    fn compile(&self, schema: &Value) -> Result<Box<dyn CompiledSchema>, SchemaCompileError> {
        // `uuid` is not a draft-04 built-in format, so it gets a custom
        // checker; the rest are covered by the engine.
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft4)
            .should_validate_formats(true)
            .with_format("uuid", is_uuid)
            .compile(schema)
            .map_err(|err| SchemaCompileError {
                message: err.to_string(),
            })?;
        Ok(Box::new(CompiledDraft4 { schema: compiled }))
    }
}

/// Hyphenated 8-4-4-4-12 hex form, e.g.
/// `123e4567-e89b-12d3-a456-426614174000`.
fn is_uuid(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| match i {
        8 | 13 | 18 | 23 => *b == b'-',
        _ => b.is_ascii_hexdigit(),
    })
}

struct CompiledDraft4 {
    schema: JSONSchema,
}

impl CompiledSchema for CompiledDraft4 {
    fn validate(&self, value: &Value) -> Vec<Violation> {
        // Fast path: most values conform, and `is_valid` avoids building
        // error objects entirely.
        if self.schema.is_valid(value) {
            return Vec::new();
        }
        match self.schema.validate(value) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(to_violation).collect(),
        }
    }
}

/// Map one engine error into the crate's own violation model. Keywords the
/// formatter has no bespoke sentence for keep the engine's message.
fn to_violation(err: ValidationError<'_>) -> Violation {
    let engine_message = err.to_string();
    let instance_path = err.instance_path.to_string();
    let keyword = match err.kind {
        ValidationErrorKind::Type { kind } => Keyword::Type {
            expected: type_names(kind),
        },
        ValidationErrorKind::Required { property } => Keyword::Required {
            property: property
                .as_str()
                .map(str::to_owned)
                .unwrap_or_else(|| property.to_string()),
        },
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            Keyword::AdditionalProperties { unexpected }
        }
        ValidationErrorKind::Enum { options } => Keyword::Enum {
            options: match options {
                Value::Array(items) => items,
                other => vec![other],
            },
        },
        ValidationErrorKind::Pattern { pattern } => Keyword::Pattern { pattern },
        ValidationErrorKind::Format { format } => Keyword::Format {
            format: format.to_string(),
        },
        ValidationErrorKind::Minimum { limit } => Keyword::Minimum {
            limit,
            exclusive: false,
        },
        ValidationErrorKind::ExclusiveMinimum { limit } => Keyword::Minimum {
            limit,
            exclusive: true,
        },
        ValidationErrorKind::Maximum { limit } => Keyword::Maximum {
            limit,
            exclusive: false,
        },
        ValidationErrorKind::ExclusiveMaximum { limit } => Keyword::Maximum {
            limit,
            exclusive: true,
        },
        ValidationErrorKind::MultipleOf { multiple_of } => Keyword::MultipleOf {
            factor: multiple_of,
        },
        ValidationErrorKind::AnyOf => Keyword::AnyOf,
        ValidationErrorKind::OneOfNotValid => Keyword::OneOf {
            multiple_valid: false,
        },
        ValidationErrorKind::OneOfMultipleValid => Keyword::OneOf {
            multiple_valid: true,
        },
        ValidationErrorKind::MinLength { limit } => Keyword::MinLength { limit },
        ValidationErrorKind::MaxLength { limit } => Keyword::MaxLength { limit },
        ValidationErrorKind::MinItems { limit } => Keyword::MinItems { limit },
        ValidationErrorKind::MaxItems { limit } => Keyword::MaxItems { limit },
        ValidationErrorKind::UniqueItems => Keyword::UniqueItems,
        ValidationErrorKind::MinProperties { limit } => Keyword::MinProperties { limit },
        ValidationErrorKind::MaxProperties { limit } => Keyword::MaxProperties { limit },
        _ => Keyword::Other {
            message: engine_message,
        },
    };
    Violation {
        keyword,
        instance_path,
    }
}

fn type_names(kind: TypeKind) -> String {
    match kind {
        TypeKind::Single(primitive) => primitive.to_string(),
        TypeKind::Multiple(primitives) => {
            let names: Vec<String> = primitives.into_iter().map(|p| p.to_string()).collect();
            names.join(" or ")
        }
    }
}
