//! File-based cache backend for persistent storage.

use crate::backend::CacheBackend;
use crate::error::{CacheError, CacheResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A file-based cache backend.
///
/// Each key is stored as one file under the backend's directory, so data
/// survives process restarts. Keys must be plain names — anything that
/// looks like a path traversal is rejected with
/// [`CacheError::InvalidKey`].
///
/// # Example
///
/// ```no_run
/// use closetsync_local::{CacheBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("./cache")).unwrap();
/// backend.write("closetsync_wardrobe", b"[]").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Opens a backend rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path) -> CacheResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Returns the backing directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> CacheResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\', '.']) {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl CacheBackend for FileBackend {
    fn read(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let path = self.entry_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> CacheResult<()> {
        let path = self.entry_path(key)?;
        // Write-then-rename so a crash mid-write never leaves a torn file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CacheResult<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&mut self) -> CacheResult<()> {
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}
