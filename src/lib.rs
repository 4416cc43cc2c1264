//! # Abilities
//!
//! A registry, JSON-Schema contract validator, and invocation engine for
//! named abilities: self-describing capabilities any part of a host
//! application can register and invoke uniformly, with validated
//! input/output and permission gating.
//!
//! ```
//! use abilities::{AbilityDraft, AbilityRegistry, CategoryArgs};
//! use serde_json::json;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let registry = AbilityRegistry::new();
//! registry.register_ability_category(
//!     "nav",
//!     CategoryArgs::new("Navigation", "Navigation abilities"),
//! )?;
//! registry.register_ability(
//!     AbilityDraft::new("my-plugin/go")
//!         .label("Go")
//!         .description("Navigate to a URL")
//!         .category("nav")
//!         .input_schema(json!({
//!             "type": "object",
//!             "required": ["url"],
//!             "properties": {"url": {"type": "string"}}
//!         }))
//!         .callback(|input| async move { Ok(json!({"ok": true, "url": input["url"]})) }),
//! )?;
//! let result = registry
//!     .execute_ability("my-plugin/go", Some(json!({"url": "https://x"})))
//!     .await?;
//! assert_eq!(result["ok"], json!(true));
//! # Ok(())
//! # }
//! ```

pub mod abilities;
pub mod schema;

pub use abilities::{
    Ability, AbilityAnnotations, AbilityCategory, AbilityDraft, AbilityKind, AbilityRegistry,
    CategoryArgs, ExecuteError, RegisterError,
};
pub use schema::{check_value, Draft4Engine, SchemaEngine, Validity};
