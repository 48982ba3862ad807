//! Derived-state engine: dependency graph, store and the pure rules it runs.
//!
//! # Responsibility
//! - `graph`: dependency declaration and propagation order.
//! - `store`: state fields, named actions and cached derived values.
//! - `reconciler`, `corrector`, `compiler`: the rules recomputation applies.
//! - `inputs`: read-only collaborator interfaces injected at mount.

pub mod compiler;
pub mod corrector;
pub mod graph;
pub mod inputs;
pub mod reconciler;
pub mod store;
