//! SQLite-backed implementation of the record store.

use std::{fmt, time::Duration};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use log::debug;
use rusqlite::{Connection, Transaction, TransactionBehavior};

mod catalog;
mod deliveries;
mod error;
mod ledger;
mod profiles;
mod rows;
mod schema;

pub use error::StoreError;

/// How long a connection waits for another writer before giving up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MEMORY_PATH: &str = ":memory:";

/// Connection tunables for [`SqliteStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Time to wait for the write lock held by another connection.
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl StoreOptions {
    /// Set the busy timeout.
    #[must_use]
    pub const fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

/// Record store backed by a single SQLite connection.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use mealdrop_core::{NewMealCenter, SqliteStore};
///
/// let mut store = SqliteStore::open_in_memory()?;
/// let center = store.create_meal_center(
///     &NewMealCenter::new("Central Kitchen", "1 High St", "0123 456")?,
///     Coord { x: -0.12, y: 51.5 },
/// )?;
/// assert_eq!(store.meal_center(center.id)?, center);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct SqliteStore {
    connection: Connection,
    path: Utf8PathBuf,
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open or create the database at `path` with default options.
    ///
    /// Parent directories are created when missing and the schema is
    /// initialised if absent.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the directory, connection or schema cannot
    /// be set up.
    pub fn open(path: &Utf8Path) -> Result<Self, StoreError> {
        Self::open_with_options(path, StoreOptions::default())
    }

    /// Open or create the database at `path`.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the directory, connection or schema cannot
    /// be set up.
    pub fn open_with_options(path: &Utf8Path, options: StoreOptions) -> Result<Self, StoreError> {
        ensure_parent_dir(path)?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::initialise(connection, path.to_path_buf(), options)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the connection or schema cannot be set up.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: Utf8PathBuf::from(MEMORY_PATH),
            source,
        })?;
        Self::initialise(connection, Utf8PathBuf::from(MEMORY_PATH), StoreOptions::default())
    }

    /// Location of the database, `:memory:` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn initialise(
        connection: Connection,
        path: Utf8PathBuf,
        options: StoreOptions,
    ) -> Result<Self, StoreError> {
        connection
            .busy_timeout(options.busy_timeout)
            .map_err(|source| StoreError::Configure { source })?;
        connection
            .pragma_update(None, "foreign_keys", true)
            .map_err(|source| StoreError::Configure { source })?;
        schema::apply(&connection)?;
        debug!("opened record store at {path}");
        Ok(Self { connection, path })
    }

    /// Begin a transaction holding the database write lock.
    fn write_transaction(&mut self) -> Result<Transaction<'_>, StoreError> {
        Ok(self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

fn ensure_parent_dir(path: &Utf8Path) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base, relative) = if parent.is_absolute() {
        ("/", parent.strip_prefix("/").unwrap_or(parent))
    } else {
        (".", parent)
    };
    let create = |source| StoreError::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    };
    let dir = fs_utf8::Dir::open_ambient_dir(base, ambient_authority()).map_err(create)?;
    dir.create_dir_all(relative).map_err(create)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    fn utf8(dir: &TempDir, relative: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(relative)).expect("utf-8 path")
    }

    #[rstest]
    fn open_creates_nested_database(temp_dir: TempDir) {
        let path = utf8(&temp_dir, "nested/deeper/mealdrop.db");
        let store = SqliteStore::open(&path).expect("open store");
        assert_eq!(store.path(), path.as_path());
        assert!(path.exists(), "database file should exist");
    }

    #[rstest]
    fn reopening_keeps_schema_and_rows(temp_dir: TempDir) {
        let path = utf8(&temp_dir, "mealdrop.db");
        {
            let mut store = SqliteStore::open(&path).expect("open store");
            store
                .create_dietary_restriction("Vegan", "No animal products")
                .expect("create restriction");
        }
        let store = SqliteStore::open(&path).expect("reopen store");
        let restrictions = store.dietary_restrictions().expect("list restrictions");
        assert_eq!(restrictions.len(), 1);
    }

    #[rstest]
    fn foreign_keys_are_enforced() {
        let store = SqliteStore::open_in_memory().expect("open store");
        let enabled: bool = store
            .connection
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .expect("read pragma");
        assert!(enabled);
    }

    #[rstest]
    fn options_builder_sets_timeout() {
        let options = StoreOptions::default().with_busy_timeout(Duration::from_millis(250));
        assert_eq!(options.busy_timeout, Duration::from_millis(250));
        assert_eq!(StoreOptions::default().busy_timeout, DEFAULT_BUSY_TIMEOUT);
    }

    #[cfg(unix)]
    #[rstest]
    fn directory_below_a_file_is_reported(temp_dir: TempDir) {
        let blocker = utf8(&temp_dir, "blocker");
        std::fs::write(blocker.as_std_path(), b"not a directory").expect("write file");
        let path = blocker.join("mealdrop.db");
        let err = SqliteStore::open(&path).expect_err("parent is a file");
        assert!(matches!(err, StoreError::CreateDirectory { .. }));
    }
}
