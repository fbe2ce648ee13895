//! Listing filters.
//!
//! `Filters` carries pagination and sort preferences from the caller. The
//! repository records them in diagnostics but orders by identity and returns
//! every matching row.

use crate::validator::{permitted_value, ValidationError, Validator};
use serde::{Deserialize, Serialize};

pub const PAGE_MAX: u32 = 10_000_000;
pub const PAGE_SIZE_MAX: u32 = 100;
pub const DEFAULT_SORT_SAFELIST: &[&str] = &[
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

/// Pagination and sort preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub page: u32,
    pub page_size: u32,
    pub sort: String,
    #[serde(skip, default = "default_sort_safelist")]
    pub sort_safelist: Vec<String>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            sort: "id".to_string(),
            sort_safelist: default_sort_safelist(),
        }
    }
}

impl Filters {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        validate_filters(&mut v, self);
        v.into_result()
    }
}

/// Records every violated filter rule into `v`.
pub fn validate_filters(v: &mut Validator, filters: &Filters) {
    v.check(filters.page > 0, "page", "must be greater than zero");
    v.check(
        filters.page <= PAGE_MAX,
        "page",
        format!("must be a maximum of {PAGE_MAX}"),
    );
    v.check(filters.page_size > 0, "page_size", "must be greater than zero");
    v.check(
        filters.page_size <= PAGE_SIZE_MAX,
        "page_size",
        format!("must be a maximum of {PAGE_SIZE_MAX}"),
    );
    v.check(
        permitted_value(&filters.sort, filters.sort_safelist.as_slice()),
        "sort",
        "invalid sort value",
    );
}

/// Search criteria for `MovieRepository::list_movies`.
///
/// Empty `title` and empty `genres` each match every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieListQuery {
    /// Full-text terms matched against the title; all terms must be present.
    pub title: String,
    /// Genres every returned movie must carry.
    pub genres: Vec<String>,
    pub filters: Filters,
}

impl MovieListQuery {
    pub fn new(
        title: impl Into<String>,
        genres: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            title: title.into(),
            genres: genres.into_iter().map(Into::into).collect(),
            filters: Filters::default(),
        }
    }
}

fn default_sort_safelist() -> Vec<String> {
    DEFAULT_SORT_SAFELIST
        .iter()
        .map(|value| (*value).to_string())
        .collect()
}
