//! Use-case services over the store and its persistence.
//!
//! # Invariants
//! - Services stay storage-agnostic; SQL lives in `repo`.

pub mod dashboard_service;
