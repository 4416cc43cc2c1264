//! Execution protocol for registered abilities.
//!
//! One attempt per call, in a fixed order: lookup, callback presence,
//! permission, input validation, invocation, output validation. Each
//! classified failure carries a stable code; whatever an ability's own
//! callbacks return as an error passes through unmodified.

use std::sync::Arc;

use log::error;
use serde_json::Value;
use thiserror::Error;

use crate::schema::{check_value, SchemaEngine, Validity};

use super::ability::AbilityKind;
use super::store::AbilitiesState;

/// Why an execution failed.
///
/// The first five variants are classified failures with stable codes. The
/// `Callback` variant is the pass-through channel for errors raised by the
/// ability's own callback or permission callback; it has no code.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("Ability \"{name}\" is not registered.")]
    NotFound { name: String },

    #[error("Ability \"{name}\" does not define an execute callback in this process.")]
    MissingCallback { name: String },

    #[error("Execution of ability \"{name}\" was denied.")]
    PermissionDenied { name: String },

    #[error("Invalid input for ability \"{name}\": {reason}")]
    InvalidInput { name: String, reason: String },

    #[error("Invalid output from ability \"{name}\": {reason}")]
    InvalidOutput { name: String, reason: String },

    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}

impl ExecuteError {
    /// Stable machine-readable code, `None` for pass-through callback
    /// errors.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            ExecuteError::NotFound { .. } => Some("ability_not_found"),
            ExecuteError::MissingCallback { .. } => Some("ability_missing_callback"),
            ExecuteError::PermissionDenied { .. } => Some("ability_permission_denied"),
            ExecuteError::InvalidInput { .. } => Some("ability_invalid_input"),
            ExecuteError::InvalidOutput { .. } => Some("ability_invalid_output"),
            ExecuteError::Callback(_) => None,
        }
    }
}

/// Run one ability against a state snapshot.
///
/// Suspends only while awaiting the permission callback and the execute
/// callback. No retries, no timeout; a caller wanting a deadline races the
/// future externally.
pub(crate) async fn execute(
    state: AbilitiesState,
    engine: &dyn SchemaEngine,
    name: &str,
    input: Option<Value>,
) -> Result<Value, ExecuteError> {
    let Some(ability) = state.ability(name) else {
        return Err(ExecuteError::NotFound {
            name: name.to_string(),
        });
    };

    let callback = match &ability.kind {
        AbilityKind::Client { callback } => Arc::clone(callback),
        AbilityKind::ServerOnly => {
            return Err(ExecuteError::MissingCallback {
                name: name.to_string(),
            });
        }
    };

    let call_input = input.clone().unwrap_or(Value::Null);

    if let Some(permission) = &ability.permission {
        let allowed = permission(call_input.clone()).await?;
        if !allowed {
            return Err(ExecuteError::PermissionDenied {
                name: name.to_string(),
            });
        }
    }

    if let Some(schema) = &ability.input_schema {
        if let Validity::Invalid(reason) = check_value(engine, input.as_ref(), schema) {
            return Err(ExecuteError::InvalidInput {
                name: name.to_string(),
                reason,
            });
        }
    }

    let result = match callback(call_input).await {
        Ok(value) => value,
        Err(err) => {
            error!("Ability \"{name}\" failed during execution: {err:#}");
            return Err(ExecuteError::Callback(err));
        }
    };

    if let Some(schema) = &ability.output_schema {
        if let Validity::Invalid(reason) = check_value(engine, Some(&result), schema) {
            return Err(ExecuteError::InvalidOutput {
                name: name.to_string(),
                reason,
            });
        }
    }

    Ok(result)
}
