//! Movie domain model and its validation rules.
//!
//! # Responsibility
//! - Define the catalog record persisted by the movie repository.
//! - Own the field rules every write must satisfy.
//!
//! # Invariants
//! - `id`, `created_at` and `version` are assigned by the store, never by callers.
//! - `(id, version)` identifies exactly one historical state of a record.
//! - `genres` holds 2..=4 distinct labels; order is kept for display only.

use crate::validator::{unique, ValidationError, Validator};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identity. Valid identities start at 1.
pub type MovieId = i64;

pub const TITLE_MAX_CHARS: usize = 500;
/// Exclusive lower bound for `year`.
pub const EARLIEST_YEAR: i32 = 1888;
pub const GENRES_MIN: usize = 2;
pub const GENRES_MAX: usize = 4;

/// Catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// `0` until the store assigns one.
    pub id: MovieId,
    /// `None` until the store assigns one.
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
    pub title: String,
    pub year: i32,
    /// Minutes.
    pub runtime: i32,
    pub genres: Vec<String>,
    /// Concurrency token. `0` until stored, then 1, 2, ... per successful update.
    pub version: i32,
}

impl Movie {
    /// Creates an unsaved candidate record.
    pub fn new(
        title: impl Into<String>,
        year: i32,
        runtime: i32,
        genres: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: 0,
            created_at: None,
            title: title.into(),
            year,
            runtime,
            genres: genres.into_iter().map(Into::into).collect(),
            version: 0,
        }
    }

    /// Validates against the current UTC calendar year.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_for_year(Utc::now().year())
    }

    /// Validates with an explicit upper bound for `year` (exclusive).
    pub fn validate_for_year(&self, current_year: i32) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        validate_movie(&mut v, self, current_year);
        v.into_result()
    }
}

/// Records every violated movie rule into `v`.
///
/// Rules are evaluated independently so the caller sees all violations at once.
pub fn validate_movie(v: &mut Validator, movie: &Movie, current_year: i32) {
    v.check(!movie.title.is_empty(), "title", "must be provided");
    v.check(
        movie.title.chars().count() <= TITLE_MAX_CHARS,
        "title",
        format!("must not be more than {TITLE_MAX_CHARS} characters long"),
    );

    v.check(movie.year != 0, "year", "must be provided");
    v.check(
        movie.year > EARLIEST_YEAR && movie.year < current_year,
        "year",
        format!("must be after {EARLIEST_YEAR} and before {current_year}"),
    );

    v.check(movie.runtime != 0, "runtime", "must be provided");
    v.check(movie.runtime > 0, "runtime", "must be a positive integer");

    v.check(!movie.genres.is_empty(), "genres", "must be provided");
    v.check(
        (GENRES_MIN..=GENRES_MAX).contains(&movie.genres.len()),
        "genres",
        format!("must contain between {GENRES_MIN} and {GENRES_MAX} genres"),
    );
    v.check(unique(movie.genres.as_slice()), "genres", "must not contain duplicate values");
}
