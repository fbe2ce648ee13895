//! Field-level rule accumulator.
//!
//! # Responsibility
//! - Collect every violated rule of a candidate record in one pass.
//! - Report violations as a `field -> message` map.
//!
//! # Invariants
//! - Only the first message recorded for a field is kept.
//! - A `Validator` is owned by a single validation call; there is no shared state.

use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::hash::Hash;

/// Accumulates rule violations keyed by field name.
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<&'static str, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether no violation has been recorded.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records `message` for `field` unless that field already has one.
    pub fn add_error(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    /// Records `message` for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &'static str, message: impl Into<String>) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn errors(&self) -> &BTreeMap<&'static str, String> {
        &self.errors
    }

    /// Converts the accumulated state into a result.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.valid() {
            return Ok(());
        }
        Err(ValidationError {
            errors: self.errors,
        })
    }
}

/// Returns whether every value in `values` is distinct.
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| seen.insert(value))
}

/// Returns whether `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

/// Rejected candidate with every violated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    errors: BTreeMap<&'static str, String>,
}

impl ValidationError {
    pub fn errors(&self) -> &BTreeMap<&'static str, String> {
        &self.errors
    }

    /// Returns the message recorded for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed:")?;
        for (field, message) in &self.errors {
            write!(f, " {field}: {message};")?;
        }
        Ok(())
    }
}

impl Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::{permitted_value, unique, Validator};

    #[test]
    fn first_message_per_field_wins() {
        let mut v = Validator::new();
        v.check(false, "title", "must be provided");
        v.check(false, "title", "must not be more than 500 characters long");

        let err = v.into_result().expect_err("two failed checks must be invalid");
        assert_eq!(err.field("title"), Some("must be provided"));
        assert_eq!(err.errors().len(), 1);
    }

    #[test]
    fn passing_checks_leave_validator_valid() {
        let mut v = Validator::new();
        v.check(true, "runtime", "must be a positive integer");
        assert!(v.valid());
        assert!(v.into_result().is_ok());
    }

    #[test]
    fn display_lists_every_field() {
        let mut v = Validator::new();
        v.add_error("year", "must be provided");
        v.add_error("genres", "must be provided");
        let rendered = v.into_result().unwrap_err().to_string();
        assert!(rendered.contains("year: must be provided"));
        assert!(rendered.contains("genres: must be provided"));
    }

    #[test]
    fn unique_is_case_sensitive() {
        assert!(unique(&["Drama", "drama"]));
        assert!(!unique(&["drama", "comedy", "drama"]));
        assert!(unique::<&str>(&[]));
    }

    #[test]
    fn permitted_value_checks_membership() {
        assert!(permitted_value(&"id", &["id", "-id"]));
        assert!(!permitted_value(&"rating", &["id", "-id"]));
    }
}
