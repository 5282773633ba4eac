//! Content-addressed snapshot store: one JSON document per collector name,
//! written atomically, freshness judged by file modification time.
//!
//! The store is shared between the daemon (writer) and the rendering
//! surfaces (readers) with no locking: rename atomicity guarantees readers
//! observe either the old or the new complete document, never a mix.

use crate::error::PulseErr;
use crate::error::Result;
use crate::snapshot::Snapshot;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;

/// A snapshot read back from disk together with its freshness verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached {
    pub snapshot: Snapshot,
    /// `now - mtime < ttl` at read time. Stale data is still returned;
    /// surfaces decide whether to annotate it.
    pub fresh: bool,
    /// Age derived from the file modification time.
    pub age: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the snapshot stored under `key`. A missing file is `Ok(None)`;
    /// a corrupt file is a [`PulseErr::CacheRead`] and the file is left in
    /// place for inspection.
    pub fn get(&self, key: &str, ttl: Duration) -> Result<Option<Cached>> {
        let path = self.snapshot_path(key);
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let contents = fs::read_to_string(&path)?;
        let snapshot: Snapshot =
            serde_json::from_str(&contents).map_err(|source| PulseErr::CacheRead {
                key: key.to_string(),
                source,
            })?;
        let age = metadata
            .modified()
            .ok()
            .and_then(|mtime| SystemTime::now().duration_since(mtime).ok())
            .unwrap_or(Duration::MAX);
        Ok(Some(Cached {
            snapshot,
            fresh: age < ttl,
            age,
        }))
    }

    /// Atomically persist `snapshot` under `key`: write to a hidden temp
    /// file in the same directory, fsync, then rename over the target.
    pub fn set(&self, key: &str, snapshot: &Snapshot) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let serialized = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.dir.join(format!(".{key}.tmp-{}", std::process::id()));
        let write = |tmp: &Path| -> std::io::Result<()> {
            let mut file = File::create(tmp)?;
            file.write_all(&serialized)?;
            file.sync_all()?;
            Ok(())
        };
        if let Err(source) = write(&tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(PulseErr::CacheWrite {
                key: key.to_string(),
                source,
            });
        }
        fs::rename(&tmp, self.snapshot_path(key)).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            PulseErr::CacheWrite {
                key: key.to_string(),
                source,
            }
        })
    }

    /// Base names of every `*.json` snapshot in the store, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut keys: Vec<String> = entries
            .filter_map(|entry| {
                let name = entry.ok()?.file_name().into_string().ok()?;
                let stem = name.strip_suffix(".json")?;
                if stem.starts_with('.') {
                    return None;
                }
                Some(stem.to_string())
            })
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn snapshot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::BillingPayload;
    use crate::snapshot::BillingTotal;
    use crate::snapshot::COLLECTOR_BILLING;
    use crate::snapshot::Payload;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn billing_snapshot(current_usd: f64) -> Snapshot {
        Snapshot::new(
            COLLECTOR_BILLING,
            Payload::Billing(BillingPayload {
                providers: Vec::new(),
                total: BillingTotal {
                    current_usd,
                    forecast_usd: None,
                    budget_usd: None,
                },
                history: None,
            }),
        )
    }

    #[test]
    fn round_trip_preserves_payload() {
        let dir = TempDir::new().expect("tempdir");
        let store = CacheStore::new(dir.path());
        let snapshot = billing_snapshot(142.0);
        store.set("billing", &snapshot).expect("set");

        let cached = store
            .get("billing", Duration::MAX)
            .expect("get")
            .expect("present");
        assert_eq!(cached.snapshot, snapshot);
        assert!(cached.fresh);
    }

    #[test]
    fn missing_key_is_none_not_error() {
        let dir = TempDir::new().expect("tempdir");
        let store = CacheStore::new(dir.path());
        assert_eq!(store.get("billing", Duration::MAX).expect("get"), None);
    }

    #[test]
    fn zero_ttl_marks_everything_stale() {
        let dir = TempDir::new().expect("tempdir");
        let store = CacheStore::new(dir.path());
        store.set("billing", &billing_snapshot(1.0)).expect("set");

        let cached = store
            .get("billing", Duration::ZERO)
            .expect("get")
            .expect("present");
        assert!(!cached.fresh);
    }

    #[test]
    fn corrupt_file_errors_and_is_preserved() {
        let dir = TempDir::new().expect("tempdir");
        let store = CacheStore::new(dir.path());
        let path = dir.path().join("billing.json");
        fs::write(&path, "{ not json").expect("write");

        let err = store
            .get("billing", Duration::MAX)
            .expect_err("should fail");
        assert!(matches!(err, PulseErr::CacheRead { .. }));
        // Operators may inspect the corrupt file; it is never removed.
        assert!(path.exists());
    }

    #[test]
    fn overwrite_replaces_content() {
        let dir = TempDir::new().expect("tempdir");
        let store = CacheStore::new(dir.path());
        store.set("billing", &billing_snapshot(1.0)).expect("set");
        store.set("billing", &billing_snapshot(2.0)).expect("set");

        let cached = store
            .get("billing", Duration::MAX)
            .expect("get")
            .expect("present");
        match cached.snapshot.payload {
            Payload::Billing(billing) => assert_eq!(billing.total.current_usd, 2.0),
            other => panic!("expected billing payload, got {other:?}"),
        }
    }

    #[test]
    fn keys_lists_sorted_snapshot_names() {
        let dir = TempDir::new().expect("tempdir");
        let store = CacheStore::new(dir.path());
        store.set("claude", &billing_snapshot(0.0)).expect("set");
        store.set("billing", &billing_snapshot(0.0)).expect("set");
        // Leftover temp files and unrelated files are ignored.
        fs::write(dir.path().join(".claude.tmp-1.json"), "x").expect("write");
        fs::write(dir.path().join("daemon.pid"), "123").expect("write");

        assert_eq!(store.keys().expect("keys"), vec!["billing", "claude"]);
    }

    #[test]
    fn keys_on_missing_dir_is_empty() {
        let store = CacheStore::new("/nonexistent/ppulse-test");
        assert!(store.keys().expect("keys").is_empty());
    }
}
