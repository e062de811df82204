//! In-process session cache.
//!
//! Accelerates a single live conversation. Strictly a cache: entries may
//! be evicted by TTL or capacity at any time, and nothing is ever written
//! here that has not already been persisted through the session store.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::session::{NegotiationSession, SessionId};

#[derive(Debug, Clone)]
pub struct SessionCacheConfig {
    pub capacity: usize,
    pub ttl: Duration,
}

impl Default for SessionCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            ttl: Duration::from_secs(30 * 60),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    session: NegotiationSession,
    cached_at: Instant,
}

/// TTL + capacity bounded cache, injected into the copilot (no
/// module-level singleton).
#[derive(Debug)]
pub struct SessionCache {
    config: SessionCacheConfig,
    inner: RwLock<HashMap<SessionId, CacheEntry>>,
}

impl SessionCache {
    pub fn new(config: SessionCacheConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, id: SessionId) -> Option<NegotiationSession> {
        let map = self.inner.read().ok()?;
        let entry = map.get(&id)?;
        if entry.cached_at.elapsed() > self.config.ttl {
            return None;
        }
        Some(entry.session.clone())
    }

    pub fn put(&self, session: NegotiationSession) {
        let Ok(mut map) = self.inner.write() else {
            return;
        };
        // Expired entries go first; then the oldest entry makes room.
        let ttl = self.config.ttl;
        map.retain(|_, e| e.cached_at.elapsed() <= ttl);
        if map.len() >= self.config.capacity && !map.contains_key(&session.id) {
            if let Some(oldest) = map
                .iter()
                .min_by_key(|(_, e)| e.cached_at)
                .map(|(id, _)| *id)
            {
                map.remove(&oldest);
            }
        }
        map.insert(
            session.id,
            CacheEntry {
                session,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn remove(&self, id: SessionId) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(&id);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }
}
