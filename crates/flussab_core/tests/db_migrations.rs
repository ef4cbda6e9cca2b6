use flussab_core::db::migrations::latest_version;
use flussab_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "topics");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flussab.sqlite3");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO topics (id, name, details, expanded) VALUES (1, 'kept', '[]', 0);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM topics;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schema_rejects_blank_topic_names() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO topics (id, name, details, expanded) VALUES (1, '   ', '[]', 0);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn topics_table_has_expected_columns() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn.prepare("PRAGMA table_info(topics);").unwrap();
    let columns: Vec<(String, String, bool, bool)> = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)? == 1,
                row.get::<_, i64>(5)? == 1,
            ))
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let expected = [
        ("id", "INTEGER", true, true),
        ("name", "TEXT", true, false),
        ("details", "TEXT", true, false),
        ("expanded", "INTEGER", true, false),
    ];
    assert_eq!(columns.len(), expected.len());
    for ((name, ty, not_null, pk), (want_name, want_ty, want_not_null, want_pk)) in
        columns.iter().zip(expected)
    {
        assert_eq!(name, want_name);
        assert_eq!(ty, want_ty);
        assert_eq!(*not_null, want_not_null, "not-null flag of {name}");
        assert_eq!(*pk, want_pk, "primary-key flag of {name}");
    }
}

#[test]
fn new_topic_rows_default_to_no_details_and_collapsed() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO topics (id, name) VALUES (7, 'Garden');", [])
        .unwrap();

    let (details, expanded): (String, i64) = conn
        .query_row(
            "SELECT details, expanded FROM topics WHERE id = 7;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(details, "[]");
    assert_eq!(expanded, 0);
}

#[test]
fn schema_rejects_expanded_values_other_than_zero_or_one() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO topics (id, name, details, expanded) VALUES (1, 'Work', '[]', 2);",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
