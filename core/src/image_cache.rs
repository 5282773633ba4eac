//! File-based image store with TTL and size-capped eviction. Not a hot
//! path: one process-wide mutex serializes every operation.

use crate::error::PulseErr;
use crate::error::Result;
use rand::Rng;
use sha2::Digest;
use sha2::Sha256;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;

/// Derive a cache key from an arbitrary URL or free-form source string:
/// SHA-256, hex, truncated to 16 characters.
pub fn cache_key(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    digest
        .iter()
        .take(8)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Category-based banner keys use a literal prefix so they can never
/// collide with URL-derived keys.
pub fn banner_key(category: &str) -> String {
    format!("banner-{category}")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub files: usize,
    pub total_bytes: u64,
}

#[derive(Debug)]
pub struct ImageCache {
    dir: PathBuf,
    ttl: Duration,
    /// Total size cap in MiB; `0` disables the cap.
    max_size_mb: u64,
    lock: Mutex<()>,
}

impl ImageCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration, max_size_mb: u64) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            max_size_mb,
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the bytes stored under `key`; `fresh` is the TTL verdict.
    pub fn get(&self, key: &str) -> Result<Option<(Vec<u8>, bool)>> {
        let _guard = self.lock();
        let path = self.image_path(key);
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let bytes = fs::read(&path)?;
        let fresh = metadata
            .modified()
            .ok()
            .and_then(|mtime| SystemTime::now().duration_since(mtime).ok())
            .is_some_and(|age| age < self.ttl);
        Ok(Some((bytes, fresh)))
    }

    pub fn has(&self, key: &str) -> bool {
        let _guard = self.lock();
        self.image_path(key).exists()
    }

    /// Atomic write: hidden temp file with 0600 permissions, then rename.
    /// On any error the temp file is removed; no partial file is ever
    /// visible under the target name. Runs eviction afterwards.
    pub fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        {
            let _guard = self.lock();
            fs::create_dir_all(&self.dir)?;
            let suffix: u32 = rand::rng().random();
            let tmp = self.dir.join(format!(".tmp-{key}-{suffix:08x}.img"));
            if let Err(source) = write_image(&tmp, bytes) {
                let _ = fs::remove_file(&tmp);
                return Err(PulseErr::CacheWrite {
                    key: key.to_string(),
                    source,
                });
            }
            if let Err(source) = fs::rename(&tmp, self.image_path(key)) {
                let _ = fs::remove_file(&tmp);
                return Err(PulseErr::CacheWrite {
                    key: key.to_string(),
                    source,
                });
            }
        }
        self.evict()
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock();
        match fs::remove_file(self.image_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Enforce the size cap: while the directory exceeds
    /// `max_size_mb * 2^20` bytes, remove oldest-modified images first.
    /// With `max_size_mb == 0` the cap is disabled and this is a no-op.
    pub fn evict(&self) -> Result<()> {
        let _guard = self.lock();
        if self.max_size_mb == 0 {
            return Ok(());
        }
        let cap = self.max_size_mb * (1 << 20);
        let mut entries = self.image_entries()?;
        let mut total: u64 = entries.iter().map(|entry| entry.size).sum();
        if total <= cap {
            return Ok(());
        }
        entries.sort_by_key(|entry| entry.mtime);
        for entry in entries {
            if total <= cap {
                break;
            }
            match fs::remove_file(&entry.path) {
                Ok(()) => {
                    total = total.saturating_sub(entry.size);
                    tracing::debug!("evicted {} ({} bytes)", entry.path.display(), entry.size);
                }
                Err(err) => tracing::warn!("evict failed for {}: {err}", entry.path.display()),
            }
        }
        Ok(())
    }

    /// Remove images older than the TTL, regardless of total size.
    pub fn clean(&self) -> Result<()> {
        let _guard = self.lock();
        let now = SystemTime::now();
        for entry in self.image_entries()? {
            let expired = now
                .duration_since(entry.mtime)
                .is_ok_and(|age| age >= self.ttl);
            if expired && let Err(err) = fs::remove_file(&entry.path) {
                tracing::warn!("clean failed for {}: {err}", entry.path.display());
            }
        }
        Ok(())
    }

    /// Remove every image.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock();
        for entry in self.image_entries()? {
            fs::remove_file(&entry.path)?;
        }
        Ok(())
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let _guard = self.lock();
        let entries = self.image_entries()?;
        Ok(CacheStats {
            files: entries.len(),
            total_bytes: entries.iter().map(|entry| entry.size).sum(),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        match self.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn image_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.img"))
    }

    fn image_entries(&self) -> Result<Vec<ImageEntry>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut images = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.ends_with(".img") || name.starts_with('.') {
                continue;
            }
            let metadata = entry.metadata()?;
            images.push(ImageEntry {
                path: entry.path(),
                size: metadata.len(),
                mtime: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }
        Ok(images)
    }
}

struct ImageEntry {
    path: PathBuf,
    size: u64,
    mtime: SystemTime,
}

fn write_image(tmp: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}
