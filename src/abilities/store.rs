//! Normalized in-memory state for abilities and categories.
//!
//! Two independent maps keyed by ability name and category slug. State is
//! cheap to clone (maps and records behind `Arc`) and mutated only through
//! the pure [`reduce`] function, so holders of an old state never observe a
//! later mutation. Unregistering an absent key returns a state sharing the
//! same inner maps, which keeps downstream memoization intact.

use std::collections::HashMap;
use std::sync::Arc;

use super::ability::{Ability, AbilityCategory};

/// The registry's normalized state.
#[derive(Debug, Clone, Default)]
pub struct AbilitiesState {
    abilities: Arc<HashMap<String, Arc<Ability>>>,
    categories: Arc<HashMap<String, Arc<AbilityCategory>>>,
}

/// Store mutations. Uniqueness and referential integrity are enforced by
/// the registration validator before any action is dispatched; the reducer
/// itself inserts or overwrites unconditionally.
#[derive(Debug, Clone)]
pub enum Action {
    RegisterAbility(Arc<Ability>),
    UnregisterAbility(String),
    RegisterCategory(Arc<AbilityCategory>),
    UnregisterCategory(String),
}

/// Pure reducer: `(state, action) -> state`.
pub fn reduce(state: &AbilitiesState, action: Action) -> AbilitiesState {
    match action {
        Action::RegisterAbility(ability) => {
            let mut abilities = (*state.abilities).clone();
            abilities.insert(ability.name.clone(), ability);
            AbilitiesState {
                abilities: Arc::new(abilities),
                categories: Arc::clone(&state.categories),
            }
        }
        Action::UnregisterAbility(name) => {
            if !state.abilities.contains_key(&name) {
                return state.clone();
            }
            let mut abilities = (*state.abilities).clone();
            abilities.remove(&name);
            AbilitiesState {
                abilities: Arc::new(abilities),
                categories: Arc::clone(&state.categories),
            }
        }
        Action::RegisterCategory(category) => {
            let mut categories = (*state.categories).clone();
            categories.insert(category.slug.clone(), category);
            AbilitiesState {
                abilities: Arc::clone(&state.abilities),
                categories: Arc::new(categories),
            }
        }
        Action::UnregisterCategory(slug) => {
            if !state.categories.contains_key(&slug) {
                return state.clone();
            }
            let mut categories = (*state.categories).clone();
            categories.remove(&slug);
            AbilitiesState {
                abilities: Arc::clone(&state.abilities),
                categories: Arc::new(categories),
            }
        }
    }
}

impl AbilitiesState {
    /// Look up one ability by name.
    pub fn ability(&self, name: &str) -> Option<Arc<Ability>> {
        self.abilities.get(name).cloned()
    }

    /// All abilities, optionally filtered by category slug, in name order.
    pub fn abilities(&self, category: Option<&str>) -> Vec<Arc<Ability>> {
        let mut list: Vec<Arc<Ability>> = self
            .abilities
            .values()
            .filter(|ability| category.map_or(true, |slug| ability.category == slug))
            .cloned()
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    /// Look up one category by slug.
    pub fn category(&self, slug: &str) -> Option<Arc<AbilityCategory>> {
        self.categories.get(slug).cloned()
    }

    /// All categories in slug order.
    pub fn categories(&self) -> Vec<Arc<AbilityCategory>> {
        let mut list: Vec<Arc<AbilityCategory>> = self.categories.values().cloned().collect();
        list.sort_by(|a, b| a.slug.cmp(&b.slug));
        list
    }

    pub fn has_ability(&self, name: &str) -> bool {
        self.abilities.contains_key(name)
    }

    pub fn has_category(&self, slug: &str) -> bool {
        self.categories.contains_key(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::ability::{AbilityKind, AbilityMeta, CategoryMeta};

    fn ability(name: &str, category: &str) -> Arc<Ability> {
        Arc::new(Ability {
            name: name.to_string(),
            label: name.to_string(),
            description: format!("{name} ability"),
            category: category.to_string(),
            input_schema: None,
            output_schema: None,
            kind: AbilityKind::ServerOnly,
            permission: None,
            meta: AbilityMeta::default(),
        })
    }

    fn category(slug: &str) -> Arc<AbilityCategory> {
        Arc::new(AbilityCategory {
            slug: slug.to_string(),
            label: slug.to_string(),
            description: format!("{slug} category"),
            meta: CategoryMeta::default(),
        })
    }

    #[test]
    fn test_register_then_lookup() {
        let state = AbilitiesState::default();
        let state = reduce(&state, Action::RegisterAbility(ability("a/one", "nav")));
        assert!(state.has_ability("a/one"));
        assert_eq!(state.ability("a/one").unwrap().category, "nav");
    }

    #[test]
    fn test_unregister_removes_only_that_key() {
        let state = AbilitiesState::default();
        let state = reduce(&state, Action::RegisterAbility(ability("a/one", "nav")));
        let state = reduce(&state, Action::RegisterAbility(ability("a/two", "nav")));
        let state = reduce(&state, Action::UnregisterAbility("a/one".to_string()));
        assert!(!state.has_ability("a/one"));
        assert!(state.has_ability("a/two"));
    }

    #[test]
    fn test_unregister_unknown_key_preserves_identity() {
        let state = AbilitiesState::default();
        let state = reduce(&state, Action::RegisterAbility(ability("a/one", "nav")));
        let next = reduce(&state, Action::UnregisterAbility("missing/one".to_string()));
        assert!(Arc::ptr_eq(&state.abilities, &next.abilities));
        assert!(Arc::ptr_eq(&state.categories, &next.categories));
    }

    #[test]
    fn test_unregister_unknown_category_preserves_identity() {
        let state = AbilitiesState::default();
        let state = reduce(&state, Action::RegisterCategory(category("nav")));
        let next = reduce(&state, Action::UnregisterCategory("missing".to_string()));
        assert!(Arc::ptr_eq(&state.categories, &next.categories));
    }

    #[test]
    fn test_register_overwrites_at_key() {
        let state = AbilitiesState::default();
        let state = reduce(&state, Action::RegisterAbility(ability("a/one", "nav")));
        let state = reduce(&state, Action::RegisterAbility(ability("a/one", "media")));
        assert_eq!(state.abilities(None).len(), 1);
        assert_eq!(state.ability("a/one").unwrap().category, "media");
    }

    #[test]
    fn test_abilities_filtered_by_category() {
        let state = AbilitiesState::default();
        let state = reduce(&state, Action::RegisterAbility(ability("a/one", "nav")));
        let state = reduce(&state, Action::RegisterAbility(ability("a/two", "media")));
        let state = reduce(&state, Action::RegisterAbility(ability("a/three", "nav")));
        let nav = state.abilities(Some("nav"));
        assert_eq!(nav.len(), 2);
        assert!(nav.iter().all(|a| a.category == "nav"));
        assert_eq!(state.abilities(None).len(), 3);
    }

    #[test]
    fn test_selectors_return_handles_to_same_records() {
        let state = AbilitiesState::default();
        let state = reduce(&state, Action::RegisterAbility(ability("a/one", "nav")));
        let first = state.ability("a/one").unwrap();
        let second = state.ability("a/one").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_reducer_leaves_input_state_untouched() {
        let state = AbilitiesState::default();
        let state = reduce(&state, Action::RegisterAbility(ability("a/one", "nav")));
        let _next = reduce(&state, Action::UnregisterAbility("a/one".to_string()));
        assert!(state.has_ability("a/one"));
    }
}
