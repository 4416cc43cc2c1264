//! Core ability and category types.
//!
//! An ability is a named, independently invocable capability with declared
//! input/output contracts. Whether it can execute in this process is a
//! property of its [`AbilityKind`]: client abilities hold an invocable,
//! server-only abilities are catalog entries executed over another
//! transport.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;

/// Async invocable behind a client-executable ability.
pub type AbilityCallback =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, anyhow::Error>> + Send + Sync>;

/// Async predicate gating execution for a given input.
pub type PermissionCallback =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<bool, anyhow::Error>> + Send + Sync>;

/// How an ability executes.
#[derive(Clone)]
pub enum AbilityKind {
    /// Executable in this process; holds the invocable.
    Client { callback: AbilityCallback },
    /// Known to the registry but executed elsewhere.
    ServerOnly,
}

impl fmt::Debug for AbilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbilityKind::Client { .. } => f.write_str("Client"),
            AbilityKind::ServerOnly => f.write_str("ServerOnly"),
        }
    }
}

/// Boolean metadata describing provenance and risk. The allow-list of
/// annotations any stored ability can carry; unknown keys in payloads are
/// dropped during deserialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AbilityAnnotations {
    pub readonly: bool,
    pub destructive: bool,
    pub idempotent: bool,
    #[serde(rename = "serverRegistered")]
    pub server_registered: bool,
    #[serde(rename = "clientRegistered")]
    pub client_registered: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AbilityMeta {
    pub annotations: AbilityAnnotations,
}

/// Provenance annotations a category can carry (subset of the ability set).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CategoryAnnotations {
    #[serde(rename = "serverRegistered")]
    pub server_registered: bool,
    #[serde(rename = "clientRegistered")]
    pub client_registered: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CategoryMeta {
    pub annotations: CategoryAnnotations,
}

/// A registered ability. Names are `namespace/identifier` slugs, unique
/// across the registry, and always reference an existing category.
#[derive(Clone)]
pub struct Ability {
    pub name: String,
    pub label: String,
    pub description: String,
    pub category: String,
    pub input_schema: Option<Value>,
    pub output_schema: Option<Value>,
    pub kind: AbilityKind,
    pub permission: Option<PermissionCallback>,
    pub meta: AbilityMeta,
}

impl fmt::Debug for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ability")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("category", &self.category)
            .field("kind", &self.kind)
            .field("has_permission", &self.permission.is_some())
            .field("meta", &self.meta)
            .finish()
    }
}

/// A grouping slug every ability must reference.
#[derive(Debug, Clone)]
pub struct AbilityCategory {
    pub slug: String,
    pub label: String,
    pub description: String,
    pub meta: CategoryMeta,
}

/// Registration payload for an ability, built up with chained setters.
///
/// A draft with a callback becomes a client ability; one without becomes
/// server-only.
#[derive(Clone, Default)]
pub struct AbilityDraft {
    pub name: String,
    pub label: String,
    pub description: String,
    pub category: String,
    pub input_schema: Option<Value>,
    pub output_schema: Option<Value>,
    pub callback: Option<AbilityCallback>,
    pub permission: Option<PermissionCallback>,
    pub annotations: AbilityAnnotations,
}

impl fmt::Debug for AbilityDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbilityDraft")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("has_callback", &self.callback.is_some())
            .field("has_permission", &self.permission.is_some())
            .finish()
    }
}

impl AbilityDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    pub fn output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn annotations(mut self, annotations: AbilityAnnotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Set the execute callback, making this a client ability.
    pub fn callback<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, anyhow::Error>> + Send + 'static,
    {
        self.callback = Some(Arc::new(move |input| Box::pin(f(input))));
        self
    }

    /// Set the permission predicate awaited before every execution.
    pub fn permission<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, anyhow::Error>> + Send + 'static,
    {
        self.permission = Some(Arc::new(move |input| Box::pin(f(input))));
        self
    }
}

/// Wire shape for a server-registered ability. Deserialization keeps only
/// the allow-listed fields, so stored records stay uniform no matter what
/// the payload carried.
#[derive(Debug, Clone, Deserialize)]
pub struct AbilityDescriptor {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub input_schema: Option<Value>,
    #[serde(default)]
    pub output_schema: Option<Value>,
    #[serde(default)]
    pub meta: AbilityMeta,
}

impl AbilityDescriptor {
    /// Build the stored record: server provenance, no local invocable.
    pub fn into_ability(self) -> Ability {
        let mut meta = self.meta;
        meta.annotations.server_registered = true;
        Ability {
            name: self.name,
            label: self.label,
            description: self.description,
            category: self.category,
            input_schema: self.input_schema,
            output_schema: self.output_schema,
            kind: AbilityKind::ServerOnly,
            permission: None,
            meta,
        }
    }
}

/// Wire shape for a server-registered category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDescriptor {
    pub slug: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub meta: CategoryMeta,
}

impl CategoryDescriptor {
    pub fn into_category(self) -> AbilityCategory {
        let mut meta = self.meta;
        meta.annotations.server_registered = true;
        AbilityCategory {
            slug: self.slug,
            label: self.label,
            description: self.description,
            meta,
        }
    }
}

/// Arguments for registering a category under a slug.
#[derive(Debug, Clone, Default)]
pub struct CategoryArgs {
    pub label: String,
    pub description: String,
    pub meta: Option<CategoryMeta>,
}

impl CategoryArgs {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            meta: None,
        }
    }

    pub fn meta(mut self, meta: CategoryMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}
