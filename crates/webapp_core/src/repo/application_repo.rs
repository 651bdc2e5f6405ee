//! Durable application store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist application records together with their PERSISTENT permissions.
//! - Keep SQL details inside the store boundary.
//!
//! # Invariants
//! - A record and its permission rows are written in one transaction.
//! - `id` is unique across stored records (primary key).
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::application::{ApplicationId, ApplicationManifest, ApplicationRecord};
use crate::model::permission::StoredPermission;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const APPLICATION_SELECT_SQL: &str = "SELECT
    id,
    manifest_json,
    path
FROM applications";

pub type RepoResult<T> = Result<T, RepoError>;

/// Store error for application persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Insert collided with an existing record.
    Duplicate(ApplicationId),
    NotFound(ApplicationId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Duplicate(id) => write!(f, "application already stored: {id}"),
            Self::NotFound(id) => write!(f, "application not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted application data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Duplicate(_) | Self::NotFound(_) | Self::InvalidData(_) => None,
        }
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

/// Durable record store keyed by application id.
pub trait ApplicationStore {
    fn contains(&self, id: &ApplicationId) -> RepoResult<bool>;
    fn add(&self, record: &ApplicationRecord) -> RepoResult<()>;
    /// Removes a record; `Ok(false)` when the id was unknown.
    fn remove(&self, id: &ApplicationId) -> RepoResult<bool>;
    fn get(&self, id: &ApplicationId) -> RepoResult<Option<ApplicationRecord>>;
    fn list(&self) -> RepoResult<Vec<ApplicationRecord>>;
    /// Upserts one PERSISTENT permission for a stored record.
    fn update_permission(
        &self,
        id: &ApplicationId,
        permission_name: &str,
        value: StoredPermission,
    ) -> RepoResult<()>;
}

/// SQLite-backed application store.
pub struct SqliteApplicationStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteApplicationStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_permissions(
        &self,
        id: &ApplicationId,
    ) -> RepoResult<BTreeMap<String, StoredPermission>> {
        let mut stmt = self.conn.prepare(
            "SELECT permission_name, decision
             FROM application_permissions
             WHERE app_id = ?1
             ORDER BY permission_name ASC;",
        )?;
        let mut rows = stmt.query([id.as_str()])?;
        let mut permissions = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get("permission_name")?;
            let decision: String = row.get("decision")?;
            let value = StoredPermission::parse(&decision).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid decision `{decision}` in application_permissions.decision"
                ))
            })?;
            permissions.insert(name, value);
        }
        Ok(permissions)
    }

    fn record_from_row(&self, row: &Row<'_>) -> RepoResult<ApplicationRecord> {
        let id_text: String = row.get("id")?;
        let id = ApplicationId::parse(&id_text).map_err(|_| {
            RepoError::InvalidData(format!("invalid id value `{id_text}` in applications.id"))
        })?;

        let manifest_json: String = row.get("manifest_json")?;
        let manifest: ApplicationManifest =
            serde_json::from_str(&manifest_json).map_err(|err| {
                RepoError::InvalidData(format!(
                    "invalid manifest json for `{id_text}` in applications.manifest_json: {err}"
                ))
            })?;

        let path: String = row.get("path")?;
        let persistent_permissions = self.load_permissions(&id)?;
        Ok(ApplicationRecord {
            id,
            manifest,
            path: PathBuf::from(path),
            persistent_permissions,
        })
    }
}

impl ApplicationStore for SqliteApplicationStore<'_> {
    fn contains(&self, id: &ApplicationId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM applications WHERE id = ?1);",
            [id.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn add(&self, record: &ApplicationRecord) -> RepoResult<()> {
        let manifest_json = serde_json::to_string(&record.manifest)
            .map_err(|err| RepoError::InvalidData(format!("manifest not serializable: {err}")))?;

        let tx = self.conn.unchecked_transaction()?;
        let inserted = tx.execute(
            "INSERT INTO applications (id, name, version, manifest_json, path)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                record.id.as_str(),
                record.manifest.name.as_str(),
                record.manifest.version.as_str(),
                manifest_json,
                record.path.to_string_lossy(),
            ],
        );
        if let Err(err) = inserted {
            let err = DbError::from(err);
            if err.is_constraint_violation() {
                return Err(RepoError::Duplicate(record.id.clone()));
            }
            return Err(err.into());
        }

        for (name, value) in &record.persistent_permissions {
            tx.execute(
                "INSERT INTO application_permissions (app_id, permission_name, decision)
                 VALUES (?1, ?2, ?3);",
                params![record.id.as_str(), name.as_str(), value.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove(&self, id: &ApplicationId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM applications WHERE id = ?1;", [id.as_str()])?;
        Ok(changed > 0)
    }

    fn get(&self, id: &ApplicationId) -> RepoResult<Option<ApplicationRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{APPLICATION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(self.record_from_row(row)?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> RepoResult<Vec<ApplicationRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{APPLICATION_SELECT_SQL} ORDER BY installed_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(self.record_from_row(row)?);
        }
        Ok(records)
    }

    fn update_permission(
        &self,
        id: &ApplicationId,
        permission_name: &str,
        value: StoredPermission,
    ) -> RepoResult<()> {
        let known: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM applications WHERE id = ?1;",
                [id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if known.is_none() {
            return Err(RepoError::NotFound(id.clone()));
        }

        self.conn.execute(
            "INSERT INTO application_permissions (app_id, permission_name, decision)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(app_id, permission_name) DO UPDATE SET decision = excluded.decision;",
            params![id.as_str(), permission_name, value.as_str()],
        )?;
        Ok(())
    }
}
