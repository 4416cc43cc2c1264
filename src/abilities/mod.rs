//! Ability registry: data model, normalized store, registration
//! invariants, and the execution engine.
//!
//! Registration flows one way (caller → validation → store); execution
//! round-trips through the store, the schema layer, and the ability's own
//! callback. See [`registry::AbilityRegistry`] for the public surface.

pub mod ability;
pub mod execution;
pub mod registration;
pub mod registry;
pub mod store;

pub use ability::{
    Ability, AbilityAnnotations, AbilityCallback, AbilityCategory, AbilityDescriptor,
    AbilityDraft, AbilityKind, AbilityMeta, CategoryAnnotations, CategoryArgs,
    CategoryDescriptor, CategoryMeta, PermissionCallback,
};
pub use execution::ExecuteError;
pub use registration::RegisterError;
pub use registry::AbilityRegistry;
pub use store::{reduce, AbilitiesState, Action};
