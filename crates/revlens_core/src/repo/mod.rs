//! Repository layer for persisted dashboard state.
//!
//! # Responsibility
//! - Define the preference storage contract used by the service layer.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Read paths reject invalid persisted values instead of masking them.

pub mod preference_repo;
