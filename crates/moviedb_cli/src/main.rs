//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `moviedb_core` linkage and schema bootstrap.
//! - List the movies stored in the database given as first argument
//!   (in-memory when omitted).
//! - Write core logs under `--log-dir <absolute dir>` when given.

use moviedb_core::db::{open_db, open_db_in_memory};
use moviedb_core::{
    default_log_level, init_logging, MovieListQuery, MovieRepository, SqliteMovieRepository,
};
use std::process::ExitCode;

const USAGE: &str = "usage: moviedb_cli [DB_PATH] [--log-dir ABSOLUTE_DIR]";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    db_path: Option<String>,
    log_dir: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--log-dir" {
            let dir = args.next().ok_or("--log-dir needs a directory")?;
            parsed.log_dir = Some(dir);
        } else if arg.starts_with("--") {
            return Err(format!("unknown option `{arg}`"));
        } else if parsed.db_path.is_none() {
            parsed.db_path = Some(arg);
        } else {
            return Err(format!("unexpected argument `{arg}`"));
        }
    }
    Ok(parsed)
}

fn main() -> ExitCode {
    println!("moviedb_core version={}", moviedb_core::core_version());

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = args.log_dir.as_deref() {
        if let Err(err) = init_logging(default_log_level(), log_dir) {
            eprintln!("failed to start logging: {err}");
            return ExitCode::FAILURE;
        }
    }

    let conn = match args.db_path.as_deref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    };
    let conn = match conn {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open database: {err}");
            return ExitCode::FAILURE;
        }
    };

    let movies = SqliteMovieRepository::try_new(&conn)
        .and_then(|repo| repo.list_movies(&MovieListQuery::default()));
    match movies {
        Ok(movies) => {
            println!("movies={}", movies.len());
            for movie in movies {
                println!(
                    "{}\t{}\t{}\tv{}",
                    movie.id,
                    movie.year,
                    movie.title,
                    movie.version
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to list movies: {err}");
            ExitCode::FAILURE
        }
    }
}
