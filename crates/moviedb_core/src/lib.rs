//! Core persistence for the movie catalog.
//! This crate owns record validation, optimistic-concurrency updates and
//! filtered listing over SQLite.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod validator;

pub use db::{DbError, DbResult, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::filters::{Filters, MovieListQuery};
pub use model::movie::{Movie, MovieId};
pub use repo::movie_repo::{MovieRepository, RepoError, RepoResult, SqliteMovieRepository};
pub use validator::{ValidationError, Validator};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
