//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Repository writes must enforce `Movie::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `EditConflict`) in
//!   addition to store errors.

mod deadline;
pub mod movie_repo;
