use super::*;

#[test]
fn test_key_value_replaces_dbname() {
    let result = replace_database("host=db port=5432 dbname=mapi user=postgres", "postgres").unwrap();
    assert_eq!(result, "host=db port=5432 dbname=postgres user=postgres");
}

#[test]
fn test_key_value_appends_missing_dbname() {
    let result = replace_database("host=db user=postgres", "postgres").unwrap();
    assert_eq!(result, "host=db user=postgres dbname=postgres");
}

#[test]
fn test_key_value_preserves_quoted_values() {
    let result = replace_database(
        "host=db password='s3cret pass\\'word' dbname='my db'",
        "postgres",
    )
    .unwrap();
    assert_eq!(
        result,
        "host=db password='s3cret pass\\'word' dbname=postgres"
    );
}

#[test]
fn test_key_value_tolerates_spaces_around_equals() {
    let result = replace_database("host = db dbname = mapi", "postgres").unwrap();
    assert_eq!(result, "host=db dbname=postgres");
}

#[test]
fn test_key_value_quotes_new_value_when_needed() {
    let result = replace_database("host=db", "my db").unwrap();
    assert_eq!(result, "host=db dbname='my db'");
}

#[test]
fn test_key_value_rejects_garbage() {
    assert!(replace_database("host", "postgres").is_err());
    assert!(replace_database("host=db password='unterminated", "postgres").is_err());
}

#[test]
fn test_url_replaces_path() {
    let result =
        replace_database("postgres://user:pw@localhost:5432/mapi?sslmode=disable", "postgres")
            .unwrap();
    assert_eq!(
        result,
        "postgres://user:pw@localhost:5432/postgres?sslmode=disable"
    );
}

#[test]
fn test_url_without_database() {
    assert_eq!(
        replace_database("postgresql://localhost", "postgres").unwrap(),
        "postgresql://localhost/postgres"
    );
    assert_eq!(
        replace_database("postgresql://localhost?connect_timeout=5", "postgres").unwrap(),
        "postgresql://localhost/postgres?connect_timeout=5"
    );
}

#[test]
fn test_rewritten_strings_parse() {
    let rewritten = replace_database("host=db dbname=mapi user=merchant", "postgres").unwrap();
    let config: tokio_postgres::Config = rewritten.parse().unwrap();
    assert_eq!(config.get_dbname(), Some("postgres"));
    assert_eq!(config.get_user(), Some("merchant"));
}

#[test]
fn test_url_drops_dbname_parameter() {
    let result =
        replace_database("postgres://master@localhost/app?dbname=app&sslmode=disable", "postgres")
            .unwrap();
    assert_eq!(result, "postgres://master@localhost/postgres?sslmode=disable");

    let config: tokio_postgres::Config = result.parse().unwrap();
    assert_eq!(config.get_dbname(), Some("postgres"));
    assert_eq!(config.get_user(), Some("master"));
}

#[test]
fn test_url_with_only_dbname_parameter() {
    assert_eq!(
        replace_database("postgres://master@localhost/app?dbname=app", "postgres").unwrap(),
        "postgres://master@localhost/postgres"
    );
}

#[test]
fn test_url_rejects_garbage() {
    assert!(matches!(
        replace_database("postgres://user@[::1", "postgres"),
        Err(DbError::InvalidConnectionString(_))
    ));
}
