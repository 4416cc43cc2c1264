//! JSON-Schema contract validation.
//!
//! Three layers: an injectable engine interface with a default draft-04
//! adapter, a checking policy that decides when schemas apply at all, and a
//! formatter that turns structured violations into single sentences.

pub mod engine;
pub mod format;
pub mod validate;

pub use engine::{CompiledSchema, Draft4Engine, SchemaCompileError, SchemaEngine};
pub use format::{format_violation, render_pointer, Keyword, Violation};
pub use validate::{check_value, Validity};
