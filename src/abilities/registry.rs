//! Process-scoped registry context.
//!
//! `AbilityRegistry` owns the normalized state and the schema engine. It is
//! an explicit, injectable object; nothing here is global, so tests create
//! and drop registries freely. Writes validate then dispatch under one
//! write lock; reads clone cheap state snapshots; execution never holds the
//! lock across an await point.

use std::sync::Arc;

use log::warn;
use parking_lot::RwLock;
use serde_json::Value;

use crate::schema::{Draft4Engine, SchemaEngine};

use super::ability::{
    Ability, AbilityCategory, AbilityDescriptor, AbilityDraft, CategoryArgs, CategoryDescriptor,
};
use super::execution::{execute, ExecuteError};
use super::registration::{
    build_ability, build_category, validate_ability, validate_category, RegisterError,
};
use super::store::{reduce, AbilitiesState, Action};

/// The abilities registry: normalized store, contract validation, and the
/// execution entry point.
pub struct AbilityRegistry {
    state: RwLock<AbilitiesState>,
    engine: Arc<dyn SchemaEngine>,
}

impl Default for AbilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AbilityRegistry {
    /// A registry validating contracts with the default draft-04 engine.
    pub fn new() -> Self {
        Self::with_engine(Arc::new(Draft4Engine))
    }

    /// A registry with an injected schema engine.
    pub fn with_engine(engine: Arc<dyn SchemaEngine>) -> Self {
        Self {
            state: RwLock::new(AbilitiesState::default()),
            engine,
        }
    }

    fn dispatch(&self, action: Action) {
        let mut state = self.state.write();
        *state = reduce(&state, action);
    }

    /// Register an ability. Fails without mutating anything if any
    /// invariant is violated; see [`RegisterError`].
    pub fn register_ability(&self, draft: AbilityDraft) -> Result<(), RegisterError> {
        // Validate and dispatch under one write lock so two concurrent
        // registrations cannot both pass the uniqueness check.
        let mut state = self.state.write();
        validate_ability(&state, &draft)?;
        *state = reduce(
            &state,
            Action::RegisterAbility(Arc::new(build_ability(draft))),
        );
        Ok(())
    }

    /// Remove an ability. Unknown names are a no-op, never an error.
    pub fn unregister_ability(&self, name: &str) {
        self.dispatch(Action::UnregisterAbility(name.to_string()));
    }

    /// Register a category under a slug.
    pub fn register_ability_category(
        &self,
        slug: &str,
        args: CategoryArgs,
    ) -> Result<(), RegisterError> {
        let mut state = self.state.write();
        validate_category(&state, slug, &args)?;
        *state = reduce(
            &state,
            Action::RegisterCategory(Arc::new(build_category(slug, args))),
        );
        Ok(())
    }

    /// Remove a category. Unknown slugs are a no-op, never an error.
    pub fn unregister_ability_category(&self, slug: &str) {
        self.dispatch(Action::UnregisterCategory(slug.to_string()));
    }

    /// Look up one ability by name.
    pub fn get_ability(&self, name: &str) -> Option<Arc<Ability>> {
        self.state.read().ability(name)
    }

    /// All abilities, optionally filtered by category slug.
    pub fn get_abilities(&self, category: Option<&str>) -> Vec<Arc<Ability>> {
        self.state.read().abilities(category)
    }

    /// Look up one category by slug.
    pub fn get_ability_category(&self, slug: &str) -> Option<Arc<AbilityCategory>> {
        self.state.read().category(slug)
    }

    /// All categories.
    pub fn get_ability_categories(&self) -> Vec<Arc<AbilityCategory>> {
        self.state.read().categories()
    }

    /// Execute an ability by name: permission check, input validation,
    /// invocation, output validation, in that order. The sole asynchronous
    /// entry point; rejects with a classified [`ExecuteError`].
    pub async fn execute_ability(
        &self,
        name: &str,
        input: Option<Value>,
    ) -> Result<Value, ExecuteError> {
        let snapshot = self.state.read().clone();
        execute(snapshot, self.engine.as_ref(), name, input).await
    }

    /// Merge a server payload of categories into the store. Entries are
    /// sanitized through [`CategoryDescriptor`] and stamped as
    /// server-registered; malformed entries are skipped with a warning.
    /// Returns the number of categories merged.
    pub fn hydrate_server_categories(&self, payload: &Value) -> usize {
        let Some(entries) = payload.as_array() else {
            warn!("Server category payload is not an array; nothing merged");
            return 0;
        };
        let mut merged = 0;
        for entry in entries {
            match serde_json::from_value::<CategoryDescriptor>(entry.clone()) {
                Ok(descriptor) => {
                    self.dispatch(Action::RegisterCategory(Arc::new(
                        descriptor.into_category(),
                    )));
                    merged += 1;
                }
                Err(err) => warn!("Skipping malformed server category: {err}"),
            }
        }
        merged
    }

    /// Merge a server payload of abilities into the store. Entries are
    /// sanitized through [`AbilityDescriptor`] and stored as server-only
    /// records; malformed entries are skipped with a warning. Returns the
    /// number of abilities merged.
    pub fn hydrate_server_abilities(&self, payload: &Value) -> usize {
        let Some(entries) = payload.as_array() else {
            warn!("Server ability payload is not an array; nothing merged");
            return 0;
        };
        let mut merged = 0;
        for entry in entries {
            match serde_json::from_value::<AbilityDescriptor>(entry.clone()) {
                Ok(descriptor) => {
                    self.dispatch(Action::RegisterAbility(Arc::new(descriptor.into_ability())));
                    merged += 1;
                }
                Err(err) => warn!("Skipping malformed server ability: {err}"),
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nav_registry() -> AbilityRegistry {
        let registry = AbilityRegistry::new();
        registry
            .register_ability_category(
                "nav",
                CategoryArgs::new("Navigation", "Navigation abilities"),
            )
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_register_and_execute_end_to_end() {
        let registry = nav_registry();
        registry
            .register_ability(
                AbilityDraft::new("my-plugin/go")
                    .label("Go")
                    .description("Navigate to a URL")
                    .category("nav")
                    .input_schema(json!({
                        "type": "object",
                        "required": ["url"],
                        "properties": {"url": {"type": "string"}}
                    }))
                    .callback(|input| async move {
                        let url = input["url"].clone();
                        Ok(json!({"ok": true, "url": url}))
                    }),
            )
            .unwrap();

        let result = registry
            .execute_ability("my-plugin/go", Some(json!({"url": "https://x"})))
            .await
            .unwrap();
        assert_eq!(result, json!({"ok": true, "url": "https://x"}));
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_input_end_to_end() {
        let registry = nav_registry();
        registry
            .register_ability(
                AbilityDraft::new("my-plugin/go")
                    .label("Go")
                    .description("Navigate to a URL")
                    .category("nav")
                    .input_schema(json!({
                        "type": "object",
                        "required": ["url"],
                        "properties": {"url": {"type": "string"}}
                    }))
                    .callback(|input| async move { Ok(input) }),
            )
            .unwrap();

        let err = registry
            .execute_ability("my-plugin/go", Some(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("ability_invalid_input"));
        assert!(err.to_string().contains("url is a required property"));
    }

    #[test]
    fn test_register_requires_existing_category() {
        let registry = AbilityRegistry::new();
        let err = registry
            .register_ability(
                AbilityDraft::new("my-plugin/go")
                    .label("Go")
                    .description("Navigate")
                    .category("nav"),
            )
            .unwrap_err();
        assert!(matches!(err, RegisterError::UnknownCategory { .. }));
        assert!(registry.get_abilities(None).is_empty());
    }

    #[test]
    fn test_second_registration_fails_first_survives() {
        let registry = nav_registry();
        let make = || {
            AbilityDraft::new("my-plugin/go")
                .label("Go")
                .description("Navigate")
                .category("nav")
        };
        registry.register_ability(make().label("First")).unwrap();
        let err = registry
            .register_ability(make().label("Second"))
            .unwrap_err();
        assert!(matches!(err, RegisterError::AlreadyRegistered { .. }));
        assert_eq!(registry.get_ability("my-plugin/go").unwrap().label, "First");
    }

    #[test]
    fn test_unregister_unknown_is_a_no_op() {
        let registry = nav_registry();
        registry.unregister_ability("missing/ability");
        registry.unregister_ability_category("missing");
        assert_eq!(registry.get_ability_categories().len(), 1);
    }

    #[test]
    fn test_get_abilities_filters_by_category() {
        let registry = nav_registry();
        registry
            .register_ability_category("media", CategoryArgs::new("Media", "Media abilities"))
            .unwrap();
        for (name, category) in [
            ("a/go", "nav"),
            ("a/back", "nav"),
            ("a/play", "media"),
        ] {
            registry
                .register_ability(
                    AbilityDraft::new(name)
                        .label(name)
                        .description("An ability")
                        .category(category),
                )
                .unwrap();
        }
        assert_eq!(registry.get_abilities(Some("nav")).len(), 2);
        assert_eq!(registry.get_abilities(Some("media")).len(), 1);
        assert_eq!(registry.get_abilities(None).len(), 3);
    }

    #[test]
    fn test_registered_ability_is_client_stamped() {
        let registry = nav_registry();
        registry
            .register_ability(
                AbilityDraft::new("my-plugin/go")
                    .label("Go")
                    .description("Navigate")
                    .category("nav"),
            )
            .unwrap();
        let ability = registry.get_ability("my-plugin/go").unwrap();
        assert!(ability.meta.annotations.client_registered);
    }

    #[test]
    fn test_hydrate_server_abilities_sanitizes_and_skips_malformed() {
        let registry = nav_registry();
        let merged = registry.hydrate_server_abilities(&json!([
            {
                "name": "server/search",
                "label": "Search",
                "description": "Server-side search",
                "category": "nav",
                "callback": "not transferable",
                "internal_debug": {"x": 1}
            },
            {"label": "missing the name field"}
        ]));
        assert_eq!(merged, 1);
        let ability = registry.get_ability("server/search").unwrap();
        assert!(ability.meta.annotations.server_registered);
        assert!(!ability.meta.annotations.client_registered);
    }

    #[tokio::test]
    async fn test_hydrated_server_ability_cannot_execute_locally() {
        let registry = nav_registry();
        registry.hydrate_server_abilities(&json!([
            {"name": "server/search", "label": "Search", "description": "d", "category": "nav"}
        ]));
        let err = registry
            .execute_ability("server/search", None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("ability_missing_callback"));
    }

    #[test]
    fn test_hydrate_server_categories() {
        let registry = AbilityRegistry::new();
        let merged = registry.hydrate_server_categories(&json!([
            {"slug": "search", "label": "Search", "description": "Search abilities"},
            "not an object"
        ]));
        assert_eq!(merged, 1);
        let category = registry.get_ability_category("search").unwrap();
        assert!(category.meta.annotations.server_registered);
    }
}
