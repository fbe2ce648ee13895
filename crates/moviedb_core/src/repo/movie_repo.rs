//! Movie repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/get/update/delete/list over canonical `movies` storage.
//! - Keep SQL details inside the core persistence boundary.
//! - Translate "no row" store signals into domain outcomes.
//!
//! # Invariants
//! - Write paths call `Movie::validate()` before any SQL runs.
//! - Every operation is one statement bounded by its own deadline.
//! - Updates match on `(id, version)` and bump `version` in the same statement;
//!   a miss is always `EditConflict`, never a silent overwrite.
//! - A version already at `i32::MAX` is never bumped, so every committed
//!   version fits `Movie::version`.
//! - Read paths reject invalid persisted state instead of masking it.

use super::deadline::Deadline;
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{DbError, StoreConfig};
use crate::model::filters::MovieListQuery;
use crate::model::movie::{Movie, MovieId};
use crate::search::title_match::{build_title_match, TitleMatch};
use crate::validator::ValidationError;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, InterruptHandle, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const MOVIE_SELECT_SQL: &str = "SELECT
    id,
    created_at,
    title,
    year,
    runtime,
    genres,
    version
FROM movies";

pub type RepoResult<T> = Result<T, RepoError>;

/// Domain outcome of a failed repository operation.
#[derive(Debug)]
pub enum RepoError {
    /// Candidate rejected before the store was touched.
    Validation(ValidationError),
    /// Transient store failure; the original cause is kept as `source()`.
    Db(DbError),
    /// No movie with this identity, or the identity is below 1.
    NotFound(MovieId),
    /// No row matched `(id, version)`: the movie changed or vanished since
    /// the caller read it.
    EditConflict { id: MovieId, version: i32 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "movie not found: {id}"),
            Self::EditConflict { id, version } => write!(
                f,
                "unable to update movie {id} at version {version} due to an edit conflict"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::EditConflict { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for movie persistence.
pub trait MovieRepository {
    /// Stores a new movie and writes the assigned `id`, `created_at` and
    /// `version` back into `movie`.
    fn insert_movie(&self, movie: &mut Movie) -> RepoResult<()>;
    fn get_movie(&self, id: MovieId) -> RepoResult<Movie>;
    /// Applies `movie` if the stored version still equals `movie.version`, then
    /// writes the new version back into `movie`.
    fn update_movie(&self, movie: &mut Movie) -> RepoResult<()>;
    fn delete_movie(&self, id: MovieId) -> RepoResult<()>;
    /// Lists matching movies ordered by ascending identity.
    fn list_movies(&self, query: &MovieListQuery) -> RepoResult<Vec<Movie>>;
}

/// SQLite-backed movie repository.
pub struct SqliteMovieRepository<'conn> {
    conn: &'conn Connection,
    query_timeout: Duration,
}

impl<'conn> SqliteMovieRepository<'conn> {
    /// Constructs a repository from a migrated connection with the default
    /// per-operation deadline.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::try_with_config(conn, &StoreConfig::default())
    }

    /// Constructs a repository using the deadline from `config`.
    pub fn try_with_config(conn: &'conn Connection, config: &StoreConfig) -> RepoResult<Self> {
        config.validate()?;
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            query_timeout: config.query_timeout(),
        })
    }

    /// Returns a handle that aborts the statement currently running on this
    /// repository's connection, from any thread.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.conn.get_interrupt_handle()
    }

    fn deadline(&self) -> Deadline<'conn> {
        Deadline::arm(self.conn, self.query_timeout)
    }
}

impl MovieRepository for SqliteMovieRepository<'_> {
    fn insert_movie(&self, movie: &mut Movie) -> RepoResult<()> {
        movie.validate()?;
        let genres = genres_to_db(&movie.genres)?;

        let deadline = self.deadline();
        let (id, created_at, version) = self
            .conn
            .query_row(
                "INSERT INTO movies (title, year, runtime, genres)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, created_at, version;",
                params![movie.title.as_str(), movie.year, movie.runtime, genres],
                |row| {
                    Ok((
                        row.get::<_, MovieId>(0)?,
                        row.get::<_, DateTime<Utc>>(1)?,
                        row.get::<_, i32>(2)?,
                    ))
                },
            )
            .map_err(|err| deadline.classify(err))?;

        movie.id = id;
        movie.created_at = Some(created_at);
        movie.version = version;

        debug!(
            "event=movie_insert module=repo status=ok id={id} duration_ms={}",
            deadline.elapsed_ms()
        );
        Ok(())
    }

    fn get_movie(&self, id: MovieId) -> RepoResult<Movie> {
        if id < 1 {
            return Err(RepoError::NotFound(id));
        }

        let deadline = self.deadline();
        let mut stmt = self
            .conn
            .prepare(&format!("{MOVIE_SELECT_SQL} WHERE id = ?1;"))
            .map_err(|err| deadline.classify(err))?;
        let mut rows = stmt.query([id]).map_err(|err| deadline.classify(err))?;

        let movie = match rows.next().map_err(|err| deadline.classify(err))? {
            Some(row) => parse_movie_row(row)?,
            None => return Err(RepoError::NotFound(id)),
        };
        Ok(movie)
    }

    fn update_movie(&self, movie: &mut Movie) -> RepoResult<()> {
        movie.validate()?;
        let genres = genres_to_db(&movie.genres)?;

        let deadline = self.deadline();
        let mut stmt = self
            .conn
            .prepare(
                "UPDATE movies
                 SET
                    title = ?1,
                    year = ?2,
                    runtime = ?3,
                    genres = ?4,
                    version = version + 1
                 WHERE id = ?5
                   AND version = ?6
                   AND version < ?7
                 RETURNING version;",
            )
            .map_err(|err| deadline.classify(err))?;
        let mut rows = stmt
            .query(params![
                movie.title.as_str(),
                movie.year,
                movie.runtime,
                genres,
                movie.id,
                movie.version,
                i32::MAX,
            ])
            .map_err(|err| deadline.classify(err))?;

        let Some(row) = rows.next().map_err(|err| deadline.classify(err))? else {
            // Every miss of the (id, version) guard lands here.
            warn!(
                "event=movie_update module=repo status=conflict id={} version={}",
                movie.id, movie.version
            );
            return Err(RepoError::EditConflict {
                id: movie.id,
                version: movie.version,
            });
        };

        let new_version: i32 = row.get(0)?;
        movie.version = new_version;

        debug!(
            "event=movie_update module=repo status=ok id={} version={new_version} duration_ms={}",
            movie.id,
            deadline.elapsed_ms()
        );
        Ok(())
    }

    fn delete_movie(&self, id: MovieId) -> RepoResult<()> {
        if id < 1 {
            return Err(RepoError::NotFound(id));
        }

        let deadline = self.deadline();
        let changed = self
            .conn
            .execute("DELETE FROM movies WHERE id = ?1;", [id])
            .map_err(|err| deadline.classify(err))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=movie_delete module=repo status=ok id={id}");
        Ok(())
    }

    fn list_movies(&self, query: &MovieListQuery) -> RepoResult<Vec<Movie>> {
        let mut sql = format!("{MOVIE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        match build_title_match(&query.title) {
            TitleMatch::Any => {}
            TitleMatch::Nothing => return Ok(Vec::new()),
            TitleMatch::Terms(match_expr) => {
                sql.push_str(
                    " AND id IN (SELECT rowid FROM movies_fts WHERE movies_fts MATCH ?)",
                );
                bind_values.push(Value::Text(match_expr));
            }
        }

        if !query.genres.is_empty() {
            sql.push_str(
                " AND NOT EXISTS (
                    SELECT 1 FROM json_each(?) AS wanted
                    WHERE wanted.value NOT IN (SELECT value FROM json_each(movies.genres))
                )",
            );
            bind_values.push(Value::Text(genres_to_db(&query.genres)?));
        }

        sql.push_str(" ORDER BY id ASC;");

        let deadline = self.deadline();
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| deadline.classify(err))?;
        let mut rows = stmt
            .query(params_from_iter(bind_values))
            .map_err(|err| deadline.classify(err))?;
        let mut movies = Vec::new();

        while let Some(row) = rows.next().map_err(|err| deadline.classify(err))? {
            movies.push(parse_movie_row(row)?);
        }

        debug!(
            "event=movie_list module=repo status=ok count={} title_filter={} genre_filter_count={} page={} page_size={} sort={} duration_ms={}",
            movies.len(),
            !query.title.is_empty(),
            query.genres.len(),
            query.filters.page,
            query.filters.page_size,
            query.filters.sort,
            deadline.elapsed_ms()
        );
        Ok(movies)
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::Db(DbError::SchemaNotReady {
            expected_version,
            actual_version,
        }));
    }
    Ok(())
}

fn parse_movie_row(row: &Row<'_>) -> RepoResult<Movie> {
    let id: MovieId = row.get("id")?;
    let genres_text: String = row.get("genres")?;
    let genres = serde_json::from_str::<Vec<String>>(&genres_text).map_err(|err| {
        DbError::CorruptRow(format!("invalid genres value in movies.genres for id {id}: {err}"))
    })?;

    Ok(Movie {
        id,
        created_at: Some(row.get("created_at")?),
        title: row.get("title")?,
        year: row.get("year")?,
        runtime: row.get("runtime")?,
        genres,
        version: row.get("version")?,
    })
}

fn genres_to_db(genres: &[String]) -> RepoResult<String> {
    serde_json::to_string(genres)
        .map_err(|err| RepoError::Db(DbError::CorruptRow(format!("unencodable genres: {err}"))))
}
