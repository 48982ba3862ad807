//! Dashboard domain model.
//!
//! # Responsibility
//! - Define the filter state, upstream feed shapes and emitted query shapes.
//! - Keep wire naming (serde) next to the types that carry it.
//!
//! # Invariants
//! - Derived fields (`DateFilter::interval`, top-customers grouping) have no
//!   independent setters.
//! - Loading state is an explicit variant, never a nullable boolean.

pub mod currency;
pub mod date_filter;
pub mod display;
pub mod flags;
pub mod preferences;
pub mod query;
pub mod revenue_source;
pub mod schema;
