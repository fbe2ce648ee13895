use chrono::{Datelike, Utc};
use moviedb_core::model::movie::validate_movie;
use moviedb_core::{Movie, Validator};

fn inception() -> Movie {
    Movie::new("Inception", 2010, 148, ["action", "sci-fi"])
}

#[test]
fn valid_movie_passes() {
    assert!(inception().validate().is_ok());
}

#[test]
fn empty_title_fails_on_title() {
    let mut movie = inception();
    movie.title.clear();

    let err = movie.validate().unwrap_err();
    assert_eq!(err.field("title"), Some("must be provided"));
}

#[test]
fn title_length_is_counted_in_characters() {
    let mut movie = inception();
    movie.title = "é".repeat(500);
    assert!(movie.validate().is_ok());

    movie.title.push('é');
    let err = movie.validate().unwrap_err();
    assert_eq!(
        err.field("title"),
        Some("must not be more than 500 characters long")
    );
}

#[test]
fn current_year_is_rejected() {
    let mut movie = inception();
    movie.year = Utc::now().year();

    let err = movie.validate().unwrap_err();
    assert!(err.field("year").is_some());
}

#[test]
fn year_bounds_are_exclusive() {
    let mut movie = inception();

    movie.year = 1888;
    assert!(movie.validate_for_year(2024).unwrap_err().field("year").is_some());

    movie.year = 1889;
    assert!(movie.validate_for_year(2024).is_ok());

    movie.year = 2023;
    assert!(movie.validate_for_year(2024).is_ok());

    movie.year = 2024;
    assert!(movie.validate_for_year(2024).unwrap_err().field("year").is_some());
}

#[test]
fn missing_year_and_runtime_report_provided_message() {
    let mut movie = inception();
    movie.year = 0;
    movie.runtime = 0;

    let err = movie.validate().unwrap_err();
    assert_eq!(err.field("year"), Some("must be provided"));
    assert_eq!(err.field("runtime"), Some("must be provided"));
}

#[test]
fn negative_runtime_is_rejected() {
    let mut movie = inception();
    movie.runtime = -5;

    let err = movie.validate().unwrap_err();
    assert_eq!(err.field("runtime"), Some("must be a positive integer"));
}

#[test]
fn five_distinct_genres_fail_on_genres() {
    let mut movie = inception();
    movie.genres = ["a", "b", "c", "d", "e"].map(String::from).to_vec();

    let err = movie.validate().unwrap_err();
    assert_eq!(
        err.field("genres"),
        Some("must contain between 2 and 4 genres")
    );
}

#[test]
fn single_genre_is_rejected() {
    let mut movie = inception();
    movie.genres = vec!["drama".to_string()];

    assert!(movie.validate().unwrap_err().field("genres").is_some());
}

#[test]
fn four_genres_are_accepted() {
    let mut movie = inception();
    movie.genres = ["a", "b", "c", "d"].map(String::from).to_vec();

    assert!(movie.validate().is_ok());
}

#[test]
fn empty_genres_report_provided_message() {
    let mut movie = inception();
    movie.genres.clear();

    let err = movie.validate().unwrap_err();
    assert_eq!(err.field("genres"), Some("must be provided"));
}

#[test]
fn duplicate_genres_are_rejected_case_sensitively() {
    let mut movie = inception();
    movie.genres = vec!["drama".to_string(), "drama".to_string()];
    assert_eq!(
        movie.validate().unwrap_err().field("genres"),
        Some("must not contain duplicate values")
    );

    movie.genres = vec!["drama".to_string(), "Drama".to_string()];
    assert!(movie.validate().is_ok());
}

#[test]
fn every_violated_field_is_reported_at_once() {
    let movie = Movie::new("", 0, 0, Vec::<String>::new());

    let err = movie.validate().unwrap_err();
    let fields: Vec<_> = err.errors().keys().copied().collect();
    assert_eq!(fields, vec!["genres", "runtime", "title", "year"]);
}

#[test]
fn validate_movie_accumulates_into_caller_validator() {
    let mut v = Validator::new();
    v.add_error("title", "already taken");

    let mut movie = inception();
    movie.title.clear();
    validate_movie(&mut v, &movie, 2024);

    assert_eq!(v.errors().get("title").map(String::as_str), Some("already taken"));
    assert_eq!(v.errors().len(), 1);
}

#[test]
fn new_movie_has_store_fields_unset() {
    let movie = inception();
    assert_eq!(movie.id, 0);
    assert_eq!(movie.version, 0);
    assert!(movie.created_at.is_none());
    assert_eq!(movie.genres, vec!["action".to_string(), "sci-fi".to_string()]);
}

#[test]
fn serialization_omits_created_at() {
    let mut movie = inception();
    movie.created_at = Some(Utc::now());

    let json = serde_json::to_value(&movie).unwrap();
    assert!(json.get("created_at").is_none());
    assert_eq!(json["title"], "Inception");
    assert_eq!(json["genres"][1], "sci-fi");
}
