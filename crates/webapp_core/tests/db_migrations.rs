use webapp_core::db::migrations::latest_version;
use webapp_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "applications");
    assert_table_exists(&conn, "application_permissions");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("applications.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "applications");
}

#[test]
fn deleting_application_cascades_to_permissions() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO applications (id, name, version, manifest_json, path)
         VALUES ('aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa', 'A', '1', '{}', '/a');
         INSERT INTO application_permissions (app_id, permission_name, decision)
         VALUES ('aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa', 'contacts', 'ALLOW');
         DELETE FROM applications;",
    )
    .unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM application_permissions;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn decision_column_rejects_unknown_values() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO applications (id, name, version, manifest_json, path)
         VALUES ('bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb', 'B', '1', '{}', '/b');",
    )
    .unwrap();

    let result = conn.execute(
        "INSERT INTO application_permissions (app_id, permission_name, decision)
         VALUES ('bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb', 'contacts', 'MAYBE');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    webapp_core::db::migrations::schema_version(conn).unwrap()
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
