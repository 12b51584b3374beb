//! Persistence for the bearer token between process runs.
//!
//! The holder is handed one [`TokenStore`] at construction. Two stores ship
//! with the crate: [`MemoryTokenStore`] for tests and short-lived processes,
//! and [`FileTokenStore`], which keeps the token in a single file inside a
//! capability-scoped directory.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use zeroize::Zeroizing;

/// Failure reading or writing a persisted token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenStoreError {
    /// The configured location cannot hold a token file.
    #[error("invalid token path {}: {message}", path.display())]
    InvalidPath {
        /// Offending path.
        path: PathBuf,
        /// Why it was rejected.
        message: String,
    },
    /// The filesystem refused the operation.
    #[error("token store I/O failed for {}: {message}", path.display())]
    Io {
        /// Token file path.
        path: PathBuf,
        /// Underlying I/O error.
        message: String,
    },
}

/// Storage for the single bearer token of a session.
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any.
    ///
    /// # Errors
    /// Returns [`TokenStoreError`] when the backing storage fails.
    fn load(&self) -> Result<Option<Zeroizing<String>>, TokenStoreError>;

    /// Replace the stored token.
    ///
    /// # Errors
    /// Returns [`TokenStoreError`] when the backing storage fails.
    fn save(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Forget the stored token. Clearing an empty store succeeds.
    ///
    /// # Errors
    /// Returns [`TokenStoreError`] when the backing storage fails.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Token kept in process memory.
///
/// # Examples
/// ```
/// use tenantry_session::{MemoryTokenStore, TokenStore};
///
/// let store = MemoryTokenStore::default();
/// store.save("abc").expect("memory store never fails");
/// assert_eq!(store.load().expect("load").as_deref().map(String::as_str), Some("abc"));
/// ```
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<Zeroizing<String>>>,
}

impl MemoryTokenStore {
    fn slot(&self) -> MutexGuard<'_, Option<Zeroizing<String>>> {
        // A panic while holding the lock cannot leave a half-written token.
        self.token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<Zeroizing<String>>, TokenStoreError> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.slot() = Some(Zeroizing::new(token.to_owned()));
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.slot() = None;
        Ok(())
    }
}

/// Token kept in a file.
///
/// Only the parent directory is opened with ambient authority; every later
/// operation is confined to it. Writes go through a temporary file and a
/// rename so readers never observe a partial token.
#[derive(Debug)]
pub struct FileTokenStore {
    dir: Dir,
    path: PathBuf,
    file_name: String,
}

impl FileTokenStore {
    /// Open a store backed by `path`. The parent directory must exist.
    ///
    /// # Errors
    /// Returns [`TokenStoreError::InvalidPath`] when `path` has no file name
    /// and [`TokenStoreError::Io`] when the parent directory cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TokenStoreError> {
        let path = path.as_ref();
        let invalid = |message: &str| TokenStoreError::InvalidPath {
            path: path.to_path_buf(),
            message: message.to_owned(),
        };
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| invalid("path must end in a UTF-8 file name"))?
            .to_owned();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let dir = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(|err| io_error(path, &err))?;
        Ok(Self {
            dir,
            path: path.to_path_buf(),
            file_name,
        })
    }

    fn temp_name(&self) -> String {
        format!(".{}.tmp.{}", self.file_name, std::process::id())
    }

    fn write_temp(&self, temp_name: &str, token: &str) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        let mut file = self.dir.open_with(temp_name, &options)?;
        file.write_all(token.as_bytes())?;
        file.sync_all()
    }
}

fn io_error(path: &Path, err: &io::Error) -> TokenStoreError {
    TokenStoreError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Zeroizing<String>>, TokenStoreError> {
        match self.dir.read_to_string(&self.file_name) {
            Ok(raw) => {
                let raw = Zeroizing::new(raw);
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| Zeroizing::new(token.to_owned())))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&self.path, &err)),
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        let temp_name = self.temp_name();
        if let Err(err) = self.write_temp(&temp_name, token) {
            // Best effort: a stale temp file is overwritten by the next save.
            let _cleanup = self.dir.remove_file(&temp_name);
            return Err(io_error(&self.path, &err));
        }
        self.dir
            .rename(&temp_name, &self.dir, &self.file_name)
            .map_err(|err| io_error(&self.path, &err))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match self.dir.remove_file(&self.file_name) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&self.path, &err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn file_store() -> (tempfile::TempDir, FileTokenStore) {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = FileTokenStore::open(temp.path().join("token")).expect("open store");
        (temp, store)
    }

    #[rstest]
    fn memory_store_replaces_and_clears() {
        let store = MemoryTokenStore::default();
        assert_eq!(store.load().expect("load"), None);

        store.save("first").expect("save");
        store.save("second").expect("save");
        assert_eq!(
            store.load().expect("load").as_deref().map(String::as_str),
            Some("second")
        );

        store.clear().expect("clear");
        assert_eq!(store.load().expect("load"), None);
    }

    #[rstest]
    fn file_store_survives_reopen() {
        let (temp, store) = file_store();
        store.save("header.payload.sig").expect("save");
        drop(store);

        let reopened = FileTokenStore::open(temp.path().join("token")).expect("reopen");
        assert_eq!(
            reopened.load().expect("load").as_deref().map(String::as_str),
            Some("header.payload.sig")
        );
    }

    #[rstest]
    fn file_store_treats_missing_and_blank_files_as_empty() {
        let (temp, store) = file_store();
        assert_eq!(store.load().expect("missing file"), None);

        std::fs::write(temp.path().join("token"), "  \n").expect("write blank");
        assert_eq!(store.load().expect("blank file"), None);
    }

    #[rstest]
    fn file_store_clear_is_idempotent() {
        let (temp, store) = file_store();
        store.save("abc").expect("save");

        store.clear().expect("first clear");
        store.clear().expect("second clear");

        assert!(!temp.path().join("token").exists());
    }

    #[rstest]
    fn file_store_leaves_no_temp_files() {
        let (temp, store) = file_store();
        store.save("abc").expect("save");

        let names: Vec<_> = std::fs::read_dir(temp.path())
            .expect("list dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("token")]);
    }

    #[rstest]
    fn opening_a_missing_directory_fails() {
        let temp = tempfile::tempdir().expect("temp dir");
        let err = FileTokenStore::open(temp.path().join("absent").join("token"))
            .expect_err("parent missing");
        assert!(matches!(err, TokenStoreError::Io { .. }));
    }
}
