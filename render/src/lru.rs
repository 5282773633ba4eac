//! In-memory cache of fully rendered escape-sequence blobs, keyed by
//! (session, protocol, cols, rows). Repainting the banner for the same
//! session and geometry is then a map lookup instead of an image decode.

use crate::protocol::ImageProtocol;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::MutexGuard;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderedKey {
    pub session_id: String,
    pub protocol: ImageProtocol,
    pub cols: u16,
    pub rows: u16,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<RenderedKey, String>,
    /// Recency order, least-recent first.
    order: VecDeque<RenderedKey>,
}

pub struct RenderedOutputCache {
    max_entries: usize,
    inner: Mutex<Inner>,
}

impl RenderedOutputCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Look up a rendered blob, refreshing its recency on hit.
    pub fn get(&self, key: &RenderedKey) -> Option<String> {
        let mut inner = self.lock();
        let value = inner.entries.get(key).cloned()?;
        touch(&mut inner.order, key);
        Some(value)
    }

    /// Insert or replace, making `key` the most recent and evicting the
    /// least-recent entry past capacity.
    pub fn put(&self, key: RenderedKey, rendered: String) {
        let mut inner = self.lock();
        inner.entries.insert(key.clone(), rendered);
        touch(&mut inner.order, &key);
        while inner.entries.len() > self.max_entries {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Surviving keys, least-recent first.
    pub fn keys(&self) -> Vec<RenderedKey> {
        self.lock().order.iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn touch(order: &mut VecDeque<RenderedKey>, key: &RenderedKey) {
    if let Some(pos) = order.iter().position(|k| k == key) {
        order.remove(pos);
    }
    order.push_back(key.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(session: &str) -> RenderedKey {
        RenderedKey {
            session_id: session.to_string(),
            protocol: ImageProtocol::Kitty,
            cols: 40,
            rows: 20,
        }
    }

    #[test]
    fn put_get_round_trips() {
        let cache = RenderedOutputCache::new(4);
        cache.put(key("s1"), "blob".to_string());
        assert_eq!(cache.get(&key("s1")), Some("blob".to_string()));
        assert_eq!(cache.get(&key("s2")), None);
    }

    #[test]
    fn geometry_is_part_of_the_key() {
        let cache = RenderedOutputCache::new(4);
        cache.put(key("s1"), "40x20".to_string());
        let mut wider = key("s1");
        wider.cols = 80;
        assert_eq!(cache.get(&wider), None);
    }

    #[test]
    fn touched_entries_survive_pressure() {
        // put s1, s2, s3, touch s1, put s4 => survivors {s1, s3, s4}.
        let cache = RenderedOutputCache::new(3);
        cache.put(key("s1"), "1".to_string());
        cache.put(key("s2"), "2".to_string());
        cache.put(key("s3"), "3".to_string());
        assert!(cache.get(&key("s1")).is_some());
        cache.put(key("s4"), "4".to_string());

        assert_eq!(cache.len(), 3);
        assert!(cache.get(&key("s2")).is_none());
        for session in ["s1", "s3", "s4"] {
            assert!(cache.get(&key(session)).is_some(), "{session} evicted");
        }
    }

    #[test]
    fn replace_updates_value_and_recency() {
        let cache = RenderedOutputCache::new(2);
        cache.put(key("s1"), "old".to_string());
        cache.put(key("s2"), "2".to_string());
        cache.put(key("s1"), "new".to_string());
        cache.put(key("s3"), "3".to_string());

        // s2 was least-recent after s1's replacement.
        assert_eq!(cache.get(&key("s2")), None);
        assert_eq!(cache.get(&key("s1")), Some("new".to_string()));
    }

    #[test]
    fn eviction_order_is_exact_lru() {
        let cache = RenderedOutputCache::new(2);
        cache.put(key("a"), "a".to_string());
        cache.put(key("b"), "b".to_string());
        let _ = cache.get(&key("a"));
        cache.put(key("c"), "c".to_string());
        let sessions: Vec<String> = cache.keys().into_iter().map(|k| k.session_id).collect();
        assert_eq!(sessions, vec!["a", "c"]);
    }
}
