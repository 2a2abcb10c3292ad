//! Language profile cache implementation.

use async_trait::async_trait;
use fabula_core::LanguageProfile;
use fabula_error::FabulaResult;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OnceCell;

/// Source of language profiles for codes not yet cached.
#[async_trait]
pub trait ProfileResolver: Send + Sync {
    /// Produce the profile for `code`.
    ///
    /// # Errors
    ///
    /// Any error makes the cache fall back to [`LanguageProfile::fallback`].
    async fn resolve(&self, code: &str) -> FabulaResult<LanguageProfile>;
}

#[async_trait]
impl<R: ProfileResolver + ?Sized> ProfileResolver for Arc<R> {
    async fn resolve(&self, code: &str) -> FabulaResult<LanguageProfile> {
        (**self).resolve(code).await
    }
}

/// Resolver that never goes remote: every code gets its fallback profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticResolver;

#[async_trait]
impl ProfileResolver for StaticResolver {
    async fn resolve(&self, code: &str) -> FabulaResult<LanguageProfile> {
        Ok(LanguageProfile::fallback(code))
    }
}

type Slot = Arc<OnceCell<Arc<LanguageProfile>>>;

/// Memoizes one [`LanguageProfile`] per language code.
///
/// Concurrent callers asking for the same uncached code trigger a single
/// resolution and all receive the same `Arc`. Entries are never evicted or
/// replaced for the lifetime of the cache.
///
/// # Example
///
/// ```
/// use fabula_cache::{LanguageProfileCache, StaticResolver};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cache = LanguageProfileCache::new(StaticResolver);
/// let first = cache.get_profile("te").await;
/// let second = cache.get_profile("te").await;
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(first.language_name, "TE");
/// # }
/// ```
pub struct LanguageProfileCache<R> {
    resolver: R,
    slots: Mutex<HashMap<String, Slot>>,
}

impl<R> std::fmt::Debug for LanguageProfileCache<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageProfileCache")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl<R> LanguageProfileCache<R> {
    /// Create an empty cache backed by `resolver`.
    pub fn new(resolver: R) -> Self {
        tracing::debug!("Creating new LanguageProfileCache");
        Self {
            resolver,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// The resolver consulted on cache misses.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    // A panic while holding the map lock cannot leave the map half-written,
    // so a poisoned lock is still safe to use.
    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn slot(&self, code: &str) -> Slot {
        Arc::clone(self.slots().entry(code.to_string()).or_default())
    }

    /// Cached profile for `code`, without resolving.
    pub fn cached(&self, code: &str) -> Option<Arc<LanguageProfile>> {
        self.slots().get(code).and_then(|slot| slot.get().cloned())
    }

    /// True once a profile for `code` has been stored.
    pub fn contains(&self, code: &str) -> bool {
        self.cached(code).is_some()
    }

    /// Number of stored profiles.
    pub fn len(&self) -> usize {
        self.slots()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    /// True when no profile has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: ProfileResolver> LanguageProfileCache<R> {
    /// Profile for `code`, resolving it on first use.
    ///
    /// Always yields a complete profile: resolver errors and profiles with
    /// blank fields are replaced by the code's fallback profile, which is
    /// then cached like any other.
    #[tracing::instrument(skip(self))]
    pub async fn get_profile(&self, code: &str) -> Arc<LanguageProfile> {
        let slot = self.slot(code);
        if let Some(profile) = slot.get() {
            tracing::debug!("Cache hit");
            return Arc::clone(profile);
        }

        let profile = slot
            .get_or_init(|| async {
                tracing::info!("Resolving language profile");
                let profile = match self.resolver.resolve(code).await {
                    Ok(profile) if profile.is_complete() => profile,
                    Ok(_) => {
                        tracing::warn!("Resolved profile has blank fields, using fallback");
                        LanguageProfile::fallback(code)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Profile resolution failed, using fallback");
                        LanguageProfile::fallback(code)
                    }
                };
                Arc::new(profile)
            })
            .await;

        Arc::clone(profile)
    }
}
