//! On-disk cache of fetched catalog resources.
//!
//! Resources are stored as `<root>/<entity id>/<file name>`, one directory
//! per entity. An entry is fresh for as long as its file exists; there is no
//! expiry and no validation of the stored bytes.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::types::EntityId;

/// The kinds of resource cached per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Normalized detail record, stored as JSON.
    DetailJson,
    /// Thumbnail image bytes.
    Thumbnail,
    /// OpenCTM hologram bytes.
    Model,
}

impl ResourceKind {
    /// File name of this resource inside an entity directory.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::DetailJson => "ship_info.json",
            Self::Thumbnail => "thumbnail.jpg",
            Self::Model => "model.ctm",
        }
    }
}

/// Filesystem cache rooted at a directory.
///
/// The root does not need to exist until the first write.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a resource, whether or not it exists.
    #[must_use]
    pub fn path(&self, id: &EntityId, kind: ResourceKind) -> PathBuf {
        self.root.join(id.as_str()).join(kind.file_name())
    }

    /// Check if a resource is cached.
    #[must_use]
    pub fn has(&self, id: &EntityId, kind: ResourceKind) -> bool {
        self.path(id, kind).is_file()
    }

    /// Store a resource, replacing any previous content.
    ///
    /// The bytes are staged in a temporary file next to the resource and
    /// renamed into place, so the resource is either absent, the previous
    /// content, or complete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory or file cannot be written.
    pub fn write(&self, id: &EntityId, kind: ResourceKind, bytes: &[u8]) -> Result<PathBuf> {
        let dir = self.root.join(id.as_str());
        let path = dir.join(kind.file_name());
        fs::create_dir_all(&dir).map_err(|e| Error::io("create directory", &dir, e))?;

        let mut staged = NamedTempFile::new_in(&dir).map_err(|e| Error::io("write", &dir, e))?;
        staged
            .write_all(bytes)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| Error::io("write", &path, e))?;
        staged
            .persist(&path)
            .map_err(|e| Error::io("write", &path, e.error))?;

        tracing::debug!(path = %path.display(), len = bytes.len(), "cached resource");
        Ok(path)
    }

    /// Read a cached resource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the resource is not cached or cannot be read.
    pub fn read_bytes(&self, id: &EntityId, kind: ResourceKind) -> Result<Vec<u8>> {
        let path = self.path(id, kind);
        fs::read(&path).map_err(|e| Error::io("read", path, e))
    }

    /// Read a cached resource as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the resource is not cached, cannot be read, or
    /// is not valid UTF-8.
    pub fn read_text(&self, id: &EntityId, kind: ResourceKind) -> Result<String> {
        let path = self.path(id, kind);
        fs::read_to_string(&path).map_err(|e| Error::io("read", path, e))
    }

    /// Check if nothing is cached.
    ///
    /// A missing root counts as empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        fs::read_dir(&self.root).map_or(true, |mut entries| entries.next().is_none())
    }

    /// Remove the whole cache tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the root does not exist or cannot be removed.
    pub fn clear(&self) -> Result<()> {
        fs::remove_dir_all(&self.root).map_err(|e| Error::io("clear", &self.root, e))?;
        tracing::info!(root = %self.root.display(), "cache cleared");
        Ok(())
    }
}

/// Per-resource async locks.
///
/// A fetch holds the lock for its key from the cache check until the write,
/// so concurrent requests for one resource share a single download. An entry
/// lives only while some task holds or waits for it.
#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    locks: Mutex<HashMap<LockKey, Arc<tokio::sync::Mutex<()>>>>,
}

type LockKey = (EntityId, ResourceKind);

impl KeyLocks {
    /// Wait for exclusive access to a key.
    pub(crate) async fn lock(&self, id: &EntityId, kind: ResourceKind) -> KeyGuard<'_> {
        let key = (id.clone(), kind);
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        KeyGuard {
            _guard: lock.lock_owned().await,
            locks: self,
            key,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Exclusive access to one key, released on drop.
pub(crate) struct KeyGuard<'a> {
    _guard: tokio::sync::OwnedMutexGuard<()>,
    locks: &'a KeyLocks,
    key: LockKey,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Two references: the map's and the one inside this guard.
        if locks.get(&self.key).is_some_and(|lock| Arc::strong_count(lock) == 2) {
            locks.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    #[test]
    fn test_layout() {
        let store = CacheStore::new("/var/cache/rsi");
        assert_eq!(
            store.path(&id("116"), ResourceKind::DetailJson),
            Path::new("/var/cache/rsi/116/ship_info.json")
        );
        assert_eq!(
            store.path(&id("116"), ResourceKind::Thumbnail),
            Path::new("/var/cache/rsi/116/thumbnail.jpg")
        );
        assert_eq!(
            store.path(&id("116"), ResourceKind::Model),
            Path::new("/var/cache/rsi/116/model.ctm")
        );
    }

    #[test]
    fn test_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("cache"));
        let ship = id("42");

        assert!(!store.has(&ship, ResourceKind::Thumbnail));
        assert!(store.is_empty());

        let path = store
            .write(&ship, ResourceKind::Thumbnail, &[0xFF, 0xD8, 0xFF])
            .unwrap();
        assert_eq!(path, store.path(&ship, ResourceKind::Thumbnail));
        assert!(store.has(&ship, ResourceKind::Thumbnail));
        assert!(!store.has(&ship, ResourceKind::Model));
        assert!(!store.is_empty());
        assert_eq!(
            store.read_bytes(&ship, ResourceKind::Thumbnail).unwrap(),
            vec![0xFF, 0xD8, 0xFF]
        );

        // Overwrites.
        store.write(&ship, ResourceKind::Thumbnail, b"new").unwrap();
        assert_eq!(store.read_text(&ship, ResourceKind::Thumbnail).unwrap(), "new");
    }

    #[test]
    fn test_read_missing_is_io_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let err = store.read_bytes(&id("1"), ResourceKind::Model).unwrap_err();
        assert!(matches!(
            err,
            Error::Io { ref source, .. } if source.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("cache"));

        // Nothing to clear yet.
        let err = store.clear().unwrap_err();
        assert!(matches!(err, Error::Io { operation: "clear", .. }));

        store.write(&id("7"), ResourceKind::DetailJson, b"{}").unwrap();
        store.clear().unwrap();
        assert!(!store.has(&id("7"), ResourceKind::DetailJson));
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let ship = id("9");

        // A non-empty directory where the file should go makes the final
        // rename fail after the bytes were written.
        let target = store.path(&ship, ResourceKind::Thumbnail);
        fs::create_dir_all(target.join("blocker")).unwrap();

        let err = store
            .write(&ship, ResourceKind::Thumbnail, &[0xAB; 64 * 1024])
            .unwrap_err();
        assert!(matches!(err, Error::Io { operation: "write", .. }));
        assert!(!store.has(&ship, ResourceKind::Thumbnail));

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("9"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("thumbnail.jpg")]);

        // Retrying once the obstruction is gone stores the full content.
        fs::remove_dir_all(&target).unwrap();
        store.write(&ship, ResourceKind::Thumbnail, &[0xAB; 64 * 1024]).unwrap();
        assert_eq!(store.read_bytes(&ship, ResourceKind::Thumbnail).unwrap().len(), 64 * 1024);
    }

    #[tokio::test]
    async fn test_key_locks_exclude_per_key() {
        let locks = KeyLocks::default();
        let held = locks.lock(&id("1"), ResourceKind::Model).await;

        // Same key waits, other kinds do not.
        let thumbnail = locks.lock(&id("1"), ResourceKind::Thumbnail).await;
        let waiting = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            locks.lock(&id("1"), ResourceKind::Model),
        )
        .await;
        assert!(waiting.is_err());
        assert_eq!(locks.len(), 2);

        drop(thumbnail);
        drop(held);
        let _again = locks.lock(&id("1"), ResourceKind::Model).await;
    }

    #[tokio::test]
    async fn test_key_locks_forget_released_keys() {
        let locks = KeyLocks::default();
        for n in 0..100 {
            let _guard = locks.lock(&id(&n.to_string()), ResourceKind::DetailJson).await;
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_key_locks_keep_contended_keys() {
        let locks = Arc::new(KeyLocks::default());
        let held = locks.lock(&id("1"), ResourceKind::Model).await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock(&id("1"), ResourceKind::Model).await;
            })
        };
        tokio::task::yield_now().await;

        // The waiter still references the entry, so it survives this release.
        drop(held);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert_eq!(locks.len(), 0);
    }
}
