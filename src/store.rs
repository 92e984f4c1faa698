//! Climate store access
//!
//! The store is a SQLite file prepared offline. This service only ever reads it: every request
//! opens its own read-only connection and drops it once its query has completed.

use crate::error::ClimateApiError;
use crate::models::{Measurement, Station, Table};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use expanduser::expanduser;
use rusqlite::{Connection, OpenFlags};
use tracing::{event, Level};

/// Handle on the climate store.
///
/// Holds no connection itself, only what is needed to open one.
#[derive(Clone, Debug)]
pub struct Store {
    /// Absolute path of the SQLite file.
    path: PathBuf,

    /// How long a connection waits on a locked database before failing.
    busy_timeout: Duration,
}

impl Store {
    /// Returns a new Store for the database at `path`.
    ///
    /// A leading `~` in the path is expanded to the user's home directory.
    pub fn new(path: &str, busy_timeout: Duration) -> Result<Self, ClimateApiError> {
        let expanded = expanduser(path).map_err(|source| ClimateApiError::StorePath {
            path: path.to_string(),
            source,
        })?;
        Ok(Self {
            path: expanded,
            busy_timeout,
        })
    }

    /// Path of the SQLite file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a read-only connection to the store.
    pub fn connect(&self) -> Result<Connection, ClimateApiError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(&self.path, flags)
            .and_then(|connection| {
                connection.busy_timeout(self.busy_timeout)?;
                Ok(connection)
            })
            .map_err(|source| ClimateApiError::StoreOpen {
                path: self.path.display().to_string(),
                source,
            })?;
        Ok(connection)
    }

    /// Check that the store provides every table and column this service reads.
    pub fn verify_schema(&self) -> Result<(), ClimateApiError> {
        let connection = self.connect()?;
        verify_table::<Measurement>(&connection)?;
        verify_table::<Station>(&connection)?;
        event!(
            Level::INFO,
            "Verified climate store schema at {}",
            self.path.display()
        );
        Ok(())
    }
}

/// Check that a table exists and has all of its declared columns.
fn verify_table<T: Table>(connection: &Connection) -> Result<(), ClimateApiError> {
    let mut statement = connection.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = statement
        .query_map([T::NAME], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<_>, _>>()?;
    match T::COLUMNS
        .iter()
        .find(|column| !columns.contains(**column))
    {
        Some(column) => Err(ClimateApiError::SchemaMismatch {
            table: T::NAME,
            column: *column,
        }),
        None => Ok(()),
    }
}
