//! Per-shell-session image assignment: each session owns at most one cached
//! decorative image, and the least-recently-seen sessions are evicted once
//! the cap is reached.

use crate::error::Result;
use crate::image_cache::ImageCache;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

const SESSIONS_INDEX_FILE: &str = "sessions.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub category: String,
    /// Addresses exactly one file in the session image store; never shared
    /// between sessions because the session id is part of the key.
    pub image_cache_key: String,
    pub created_at: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
}

/// Key of the session image inside the session image store.
fn session_key(session_id: &str, category: &str) -> String {
    format!("session-{session_id}-{category}")
}

pub struct SessionManager {
    images: Arc<ImageCache>,
    index_path: PathBuf,
    max_sessions: usize,
    state: Mutex<HashMap<String, SessionInfo>>,
}

impl SessionManager {
    /// `images` must be rooted at the sessions directory; the index lives
    /// next to the image files.
    pub fn new(images: Arc<ImageCache>, max_sessions: usize) -> Self {
        let index_path = images.dir().join(SESSIONS_INDEX_FILE);
        let state = load_index(&index_path);
        Self {
            images,
            index_path,
            max_sessions,
            state: Mutex::new(state),
        }
    }

    /// Resolve the image for `session_id`: cached bytes when the session
    /// exists and its image is still fresh, otherwise run the downloader,
    /// store the result, and evict the least-recently-used sessions past
    /// the cap. Downloader errors propagate and leave no partial state.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        session_id: &str,
        category: &str,
        fetch: F,
    ) -> Result<Vec<u8>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
    {
        let key = session_key(session_id, category);
        let now = Utc::now();

        // Fast path: known session with a fresh cached image.
        {
            let mut state = self.lock();
            if let Some(info) = state.get_mut(session_id)
                && info.category == category
                && let Some((bytes, true)) = self.images.get(&key)?
            {
                info.last_access = now;
                let snapshot: Vec<SessionInfo> = state.values().cloned().collect();
                drop(state);
                self.save_index(&snapshot)?;
                return Ok(bytes);
            }
        }

        let bytes = fetch().await?;
        self.images.put(&key, &bytes)?;

        let snapshot = {
            let mut state = self.lock();
            let entry = state
                .entry(session_id.to_string())
                .or_insert_with(|| SessionInfo {
                    session_id: session_id.to_string(),
                    category: category.to_string(),
                    image_cache_key: key.clone(),
                    created_at: now,
                    last_access: now,
                });
            // A category switch retires the previous image file.
            if entry.image_cache_key != key {
                let _ = self.images.remove(&entry.image_cache_key);
                entry.category = category.to_string();
                entry.image_cache_key = key.clone();
            }
            entry.last_access = now;

            while state.len() > self.max_sessions {
                let Some(oldest) = state
                    .values()
                    .min_by_key(|info| info.last_access)
                    .map(|info| info.session_id.clone())
                else {
                    break;
                };
                if let Some(evicted) = state.remove(&oldest) {
                    tracing::debug!("evicting session {oldest}");
                    let _ = self.images.remove(&evicted.image_cache_key);
                }
            }
            state.values().cloned().collect::<Vec<_>>()
        };
        self.save_index(&snapshot)?;
        Ok(bytes)
    }

    pub fn sessions(&self) -> Vec<SessionInfo> {
        let mut sessions: Vec<SessionInfo> = self.lock().values().cloned().collect();
        sessions.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        sessions
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionInfo>> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Atomic index write, same temp-and-rename discipline as the stores.
    fn save_index(&self, sessions: &[SessionInfo]) -> Result<()> {
        if let Some(parent) = self.index_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self
            .index_path
            .with_file_name(format!(".{SESSIONS_INDEX_FILE}.tmp-{}", std::process::id()));
        let serialized = serde_json::to_vec_pretty(sessions)?;
        if let Err(err) = fs::write(&tmp, &serialized) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        fs::rename(&tmp, &self.index_path).inspect_err(|_| {
            let _ = fs::remove_file(&tmp);
        })?;
        Ok(())
    }
}

fn load_index(path: &Path) -> HashMap<String, SessionInfo> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("failed to read session index: {err}");
            }
            return HashMap::new();
        }
    };
    match serde_json::from_str::<Vec<SessionInfo>>(&contents) {
        Ok(sessions) => sessions
            .into_iter()
            .map(|info| (info.session_id.clone(), info))
            .collect(),
        Err(err) => {
            tracing::warn!("failed to parse session index, starting empty: {err}");
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PulseErr;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tempfile::TempDir;

    fn manager(dir: &TempDir, max_sessions: usize) -> SessionManager {
        let images = Arc::new(ImageCache::new(
            dir.path().join("sessions"),
            Duration::from_secs(3_600),
            0,
        ));
        SessionManager::new(images, max_sessions)
    }

    #[tokio::test]
    async fn fetch_once_then_cached() {
        let dir = TempDir::new().expect("tempdir");
        let manager = manager(&dir, 5);

        let bytes = manager
            .get_or_fetch("s1", "scenery", || async { Ok(b"img-1".to_vec()) })
            .await
            .expect("fetch");
        assert_eq!(bytes, b"img-1");

        // Second resolve must not invoke the downloader.
        let bytes = manager
            .get_or_fetch("s1", "scenery", || async {
                Err(PulseErr::ConfigInvalid("should not be called".to_string()))
            })
            .await
            .expect("cached");
        assert_eq!(bytes, b"img-1");
    }

    #[tokio::test]
    async fn downloader_error_leaves_no_state() {
        let dir = TempDir::new().expect("tempdir");
        let manager = manager(&dir, 5);

        let err = manager
            .get_or_fetch("s1", "scenery", || async {
                Err(PulseErr::CollectorTransient {
                    collector: "waifu".to_string(),
                    message: "503".to_string(),
                })
            })
            .await
            .expect_err("should fail");
        assert!(matches!(err, PulseErr::CollectorTransient { .. }));
        assert!(manager.sessions().is_empty());
        assert!(!dir.path().join("sessions").join("sessions.json").exists());
    }

    #[tokio::test]
    async fn eviction_removes_least_recently_accessed() {
        let dir = TempDir::new().expect("tempdir");
        let manager = manager(&dir, 2);

        for sid in ["s1", "s2"] {
            manager
                .get_or_fetch(sid, "scenery", || async { Ok(b"img".to_vec()) })
                .await
                .expect("fetch");
        }
        // Touch s1 so s2 becomes the eviction candidate.
        manager
            .get_or_fetch("s1", "scenery", || async { Ok(b"img".to_vec()) })
            .await
            .expect("cached");

        manager
            .get_or_fetch("s3", "scenery", || async { Ok(b"img".to_vec()) })
            .await
            .expect("fetch");

        let ids: Vec<String> = manager
            .sessions()
            .into_iter()
            .map(|info| info.session_id)
            .collect();
        assert_eq!(ids, vec!["s1", "s3"]);
    }

    #[tokio::test]
    async fn index_survives_reload() {
        let dir = TempDir::new().expect("tempdir");
        {
            let manager = manager(&dir, 5);
            manager
                .get_or_fetch("s1", "scenery", || async { Ok(b"img".to_vec()) })
                .await
                .expect("fetch");
        }
        let reloaded = manager(&dir, 5);
        let sessions = reloaded.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, "s1");
        assert_eq!(sessions[0].image_cache_key, "session-s1-scenery");
    }

    #[tokio::test]
    async fn category_switch_replaces_image() {
        let dir = TempDir::new().expect("tempdir");
        let manager = manager(&dir, 5);
        manager
            .get_or_fetch("s1", "scenery", || async { Ok(b"a".to_vec()) })
            .await
            .expect("fetch");
        manager
            .get_or_fetch("s1", "catgirl", || async { Ok(b"b".to_vec()) })
            .await
            .expect("fetch");

        let sessions = manager.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].image_cache_key, "session-s1-catgirl");
        assert!(!dir
            .path()
            .join("sessions")
            .join("session-s1-scenery.img")
            .exists());
    }
}
