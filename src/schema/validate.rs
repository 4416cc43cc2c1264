//! Value checking policy on top of an injectable schema engine.
//!
//! Ability schemas come from plugins and server payloads, so malformed or
//! underspecified declarations are warnings, never hard failures: a schema
//! that is not an object, or that declares none of `type`/`anyOf`/`oneOf`,
//! passes everything. A schema that looks real but fails to compile is
//! reported as a generic invalid-schema failure instead of propagating the
//! engine's exception.

use log::warn;
use serde_json::Value;

use super::engine::SchemaEngine;
use super::format::{format_violation, Violation};

/// Outcome of checking a value against a schema declaration.
///
/// `Invalid` carries exactly one human-readable sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum Validity {
    Valid,
    Invalid(String),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// Check a value against a schema declaration.
///
/// An absent value substitutes the schema's own top-level `default` (null
/// when there is none). Pure and reentrant; checking the same pair twice
/// yields the same result.
pub fn check_value(engine: &dyn SchemaEngine, value: Option<&Value>, schema: &Value) -> Validity {
    let Some(definition) = schema.as_object() else {
        warn!("Ignoring non-object schema declaration; treating value as valid");
        return Validity::Valid;
    };
    let declares_shape = definition.contains_key("type")
        || definition.contains_key("anyOf")
        || definition.contains_key("oneOf");
    if !declares_shape {
        warn!("Schema declares none of \"type\", \"anyOf\" or \"oneOf\"; treating value as valid");
        return Validity::Valid;
    }

    let null = Value::Null;
    let effective = value.or_else(|| definition.get("default")).unwrap_or(&null);

    let compiled = match engine.compile(schema) {
        Ok(compiled) => compiled,
        Err(err) => {
            warn!("Schema failed to compile: {err}");
            return Validity::Invalid("The provided schema is not valid.".to_string());
        }
    };

    let violations = compiled.validate(effective);
    if violations.is_empty() {
        return Validity::Valid;
    }

    match select_violation(violations, engine, definition, effective) {
        Some(selected) => Validity::Invalid(format_violation(&selected)),
        None => Validity::Valid,
    }
}

/// Pick the most specific violation: concrete keywords beat union failures,
/// deeper instance paths beat shallower ones. A bare top-level union failure
/// is refined by re-checking each branch schema.
fn select_violation(
    violations: Vec<Violation>,
    engine: &dyn SchemaEngine,
    definition: &serde_json::Map<String, Value>,
    value: &Value,
) -> Option<Violation> {
    let best = violations
        .into_iter()
        .max_by_key(|v| (v.is_concrete(), v.depth()))?;

    if best.is_concrete() {
        return Some(best);
    }
    let refined = if best.instance_path.is_empty() {
        refine_union(engine, definition, value)
    } else {
        // The union lives on a subschema; refine against the schema and
        // value at that path, then re-anchor the branch violation's path.
        subschema_at(definition, &best.instance_path)
            .zip(value.pointer(&best.instance_path))
            .and_then(|(subschema, sub_value)| refine_union(engine, subschema, sub_value))
            .map(|violation| Violation {
                instance_path: format!("{}{}", best.instance_path, violation.instance_path),
                ..violation
            })
    };
    Some(refined.unwrap_or(best))
}

/// Walk a JSON pointer through `properties`/`items` to the subschema
/// governing that location.
fn subschema_at<'a>(
    definition: &'a serde_json::Map<String, Value>,
    pointer: &str,
) -> Option<&'a serde_json::Map<String, Value>> {
    let mut current = definition;
    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        let next = current
            .get("properties")
            .and_then(Value::as_object)
            .and_then(|properties| properties.get(&segment))
            .or_else(|| match current.get("items") {
                Some(items @ Value::Object(_)) => Some(items),
                Some(Value::Array(items)) => {
                    segment.parse::<usize>().ok().and_then(|index| items.get(index))
                }
                _ => None,
            });
        current = next?.as_object()?;
    }
    Some(current)
}

/// Re-validate a value against each `anyOf`/`oneOf` branch and surface the
/// most specific concrete violation, trying branches whose declared `type`
/// matches the value first.
fn refine_union(
    engine: &dyn SchemaEngine,
    definition: &serde_json::Map<String, Value>,
    value: &Value,
) -> Option<Violation> {
    let branches = definition
        .get("anyOf")
        .or_else(|| definition.get("oneOf"))?
        .as_array()?;

    let mut ordered: Vec<&Value> = branches.iter().collect();
    ordered.sort_by_key(|branch| !branch_matches_type(branch, value));

    for branch in ordered {
        let Ok(compiled) = engine.compile(branch) else {
            continue;
        };
        let candidate = compiled
            .validate(value)
            .into_iter()
            .filter(Violation::is_concrete)
            .max_by_key(Violation::depth);
        if let Some(violation) = candidate {
            return Some(violation);
        }
    }
    None
}

fn branch_matches_type(branch: &Value, value: &Value) -> bool {
    let Some(declared) = branch.get("type").and_then(Value::as_str) else {
        return false;
    };
    match value {
        Value::Null => declared == "null",
        Value::Bool(_) => declared == "boolean",
        Value::Number(n) => {
            declared == "number" || (declared == "integer" && (n.is_i64() || n.is_u64()))
        }
        Value::String(_) => declared == "string",
        Value::Array(_) => declared == "array",
        Value::Object(_) => declared == "object",
    }
}
