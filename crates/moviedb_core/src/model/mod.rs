//! Domain model for the movie catalog.
//!
//! # Responsibility
//! - Define the records and query shapes used by the repository.
//! - Keep field rules next to the data they constrain.
//!
//! # Invariants
//! - Every stored movie is identified by a store-assigned `MovieId` >= 1.
//! - Deletion is a hard delete; there are no tombstones.

pub mod filters;
pub mod movie;
