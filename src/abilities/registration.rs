//! Invariant checks applied before any registration mutates the store.
//!
//! Checks run in a fixed order and stop at the first failure, so a caller
//! always sees the most fundamental problem first. Nothing is written to the
//! store unless every check passes.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::ability::{
    Ability, AbilityCategory, AbilityDraft, AbilityKind, AbilityMeta, CategoryArgs,
};
use super::store::AbilitiesState;

static ABILITY_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]+/[a-z0-9-]+$").unwrap());
static CATEGORY_SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap());

/// A registration violated an invariant. Nothing was written.
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("Ability name is required.")]
    MissingName,

    #[error("Ability name \"{name}\" is invalid; use a namespaced slug such as \"my-plugin/my-ability\" (lowercase alphanumeric and dashes, exactly one slash).")]
    InvalidName { name: String },

    #[error("Ability \"{name}\" is missing the required field \"{field}\".")]
    MissingField { name: String, field: &'static str },

    #[error("Ability \"{name}\" declares the invalid category slug \"{category}\"; slugs are lowercase alphanumeric segments separated by dashes.")]
    InvalidCategorySlug { name: String, category: String },

    #[error("Ability \"{name}\" references the unknown category \"{category}\"; register the category first.")]
    UnknownCategory { name: String, category: String },

    #[error("Ability \"{name}\" is already registered; unregister it before registering it again.")]
    AlreadyRegistered { name: String },

    #[error("Category slug is required.")]
    MissingSlug,

    #[error("Category slug \"{slug}\" is invalid; slugs are lowercase alphanumeric segments separated by dashes.")]
    InvalidSlug { slug: String },

    #[error("Category \"{slug}\" is already registered; unregister it before registering it again.")]
    CategoryAlreadyRegistered { slug: String },

    #[error("Category \"{slug}\" is missing the required field \"{field}\".")]
    CategoryMissingField { slug: String, field: &'static str },
}

/// Validate an ability draft against the current state.
pub fn validate_ability(state: &AbilitiesState, draft: &AbilityDraft) -> Result<(), RegisterError> {
    if draft.name.is_empty() {
        return Err(RegisterError::MissingName);
    }
    if !ABILITY_NAME_PATTERN.is_match(&draft.name) {
        return Err(RegisterError::InvalidName {
            name: draft.name.clone(),
        });
    }
    if draft.label.is_empty() {
        return Err(RegisterError::MissingField {
            name: draft.name.clone(),
            field: "label",
        });
    }
    if draft.description.is_empty() {
        return Err(RegisterError::MissingField {
            name: draft.name.clone(),
            field: "description",
        });
    }
    if draft.category.is_empty() {
        return Err(RegisterError::MissingField {
            name: draft.name.clone(),
            field: "category",
        });
    }
    if !CATEGORY_SLUG_PATTERN.is_match(&draft.category) {
        return Err(RegisterError::InvalidCategorySlug {
            name: draft.name.clone(),
            category: draft.category.clone(),
        });
    }
    if !state.has_category(&draft.category) {
        return Err(RegisterError::UnknownCategory {
            name: draft.name.clone(),
            category: draft.category.clone(),
        });
    }
    if state.has_ability(&draft.name) {
        return Err(RegisterError::AlreadyRegistered {
            name: draft.name.clone(),
        });
    }
    Ok(())
}

/// Build the stored record from a validated draft, stamping provenance.
pub fn build_ability(draft: AbilityDraft) -> Ability {
    let mut annotations = draft.annotations;
    if !annotations.server_registered {
        annotations.client_registered = true;
    }
    let kind = match draft.callback {
        Some(callback) => AbilityKind::Client { callback },
        None => AbilityKind::ServerOnly,
    };
    Ability {
        name: draft.name,
        label: draft.label,
        description: draft.description,
        category: draft.category,
        input_schema: draft.input_schema,
        output_schema: draft.output_schema,
        kind,
        permission: draft.permission,
        meta: AbilityMeta { annotations },
    }
}

/// Validate a category registration against the current state.
pub fn validate_category(
    state: &AbilitiesState,
    slug: &str,
    args: &CategoryArgs,
) -> Result<(), RegisterError> {
    if slug.is_empty() {
        return Err(RegisterError::MissingSlug);
    }
    if !CATEGORY_SLUG_PATTERN.is_match(slug) {
        return Err(RegisterError::InvalidSlug {
            slug: slug.to_string(),
        });
    }
    if state.has_category(slug) {
        return Err(RegisterError::CategoryAlreadyRegistered {
            slug: slug.to_string(),
        });
    }
    if args.label.is_empty() {
        return Err(RegisterError::CategoryMissingField {
            slug: slug.to_string(),
            field: "label",
        });
    }
    if args.description.is_empty() {
        return Err(RegisterError::CategoryMissingField {
            slug: slug.to_string(),
            field: "description",
        });
    }
    Ok(())
}

/// Build the stored category record, stamping provenance.
pub fn build_category(slug: &str, args: CategoryArgs) -> AbilityCategory {
    let mut meta = args.meta.unwrap_or_default();
    if !meta.annotations.server_registered {
        meta.annotations.client_registered = true;
    }
    AbilityCategory {
        slug: slug.to_string(),
        label: args.label,
        description: args.description,
        meta,
    }
}
