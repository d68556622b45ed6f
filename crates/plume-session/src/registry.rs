//! One cache per render, created on demand.
//!
//! [`SessionRegistry`] maps [`RenderId`] to a shared
//! [`SessionCache`]. Render threads ask for their render's cache with
//! [`instance`](SessionRegistry::instance); the framework forwards the
//! session-start hook with
//! [`on_session_start`](SessionRegistry::on_session_start) and retires
//! the cache with [`end_session`](SessionRegistry::end_session).
//!
//! The registry lock is held only for map operations. Cache
//! construction happens outside it; if two threads race to create the
//! same render's cache, the first insert wins and the other cache is
//! discarded before any thread sees it.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use plume_cache::{CacheConfig, SessionCache};
use plume_core::{Particle, RenderId, SessionStatus};

use crate::error::SessionError;

/// Shared handle to one render's cache.
pub type SharedSessionCache<P> = Arc<SessionCache<P>>;

/// Registry of per-render caches.
pub struct SessionRegistry<P> {
    config: CacheConfig,
    sessions: Mutex<IndexMap<RenderId, SharedSessionCache<P>>>,
}

// Compile-time assertion: SessionRegistry must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SessionRegistry<i32>>();
};

impl<P: Particle> SessionRegistry<P> {
    /// Create a registry whose caches all use `config`.
    pub fn new(config: CacheConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            config,
            sessions: Mutex::new(IndexMap::new()),
        })
    }

    /// The cache for `render`, creating it on first request.
    pub fn instance(&self, render: RenderId) -> Result<SharedSessionCache<P>, SessionError> {
        if let Some(cache) = self.get(render) {
            return Ok(cache);
        }

        let fresh = Arc::new(SessionCache::new(self.config.clone())?);
        let (cache, inserted) = {
            let mut sessions = self.sessions.lock();
            let cache = sessions
                .entry(render)
                .or_insert_with(|| Arc::clone(&fresh));
            (Arc::clone(cache), Arc::ptr_eq(cache, &fresh))
        };
        if inserted {
            tracing::debug!(render = render.0, cache = %cache.id(), "render session registered");
        }
        Ok(cache)
    }

    /// The cache for `render`, if one exists.
    pub fn get(&self, render: RenderId) -> Option<SharedSessionCache<P>> {
        self.sessions.lock().get(&render).cloned()
    }

    /// Forward a session start to `render`'s cache.
    pub fn on_session_start(
        &self,
        render: RenderId,
        status: SessionStatus,
    ) -> Result<(), SessionError> {
        let cache = self
            .get(render)
            .ok_or(SessionError::UnknownSession { render })?;
        cache.on_session_start(status);
        Ok(())
    }

    /// Remove `render`'s cache from the registry.
    ///
    /// The cache itself is dropped once every holder of the returned
    /// handle (and every render thread still using it) lets go.
    pub fn end_session(&self, render: RenderId) -> Option<SharedSessionCache<P>> {
        let removed = self.sessions.lock().shift_remove(&render);
        if let Some(cache) = &removed {
            tracing::debug!(
                render = render.0,
                cache = %cache.id(),
                holders = Arc::strong_count(cache),
                "render session ended"
            );
        }
        removed
    }
}

impl<P> SessionRegistry<P> {
    /// Renders with a live cache, in registration order.
    pub fn active_sessions(&self) -> Vec<RenderId> {
        self.sessions.lock().keys().copied().collect()
    }

    /// Number of registered renders.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether no render is registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// The configuration every new cache is built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}
