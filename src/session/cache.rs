//! Ephemeral per-tab mirror of the current profile.
//!
//! Other page code reads the mirror synchronously; only the session store writes it.
//! Entries are hints: [`StaleProfile`] has to be revalidated before it is trusted.

use super::{store::SessionStore, types::UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};
use tracing::debug;

/// Key holding the serialized [`UserProfile`].
pub const USER_KEY: &str = "user";
/// Key holding the [`CacheMeta`] for [`USER_KEY`].
pub const USER_META_KEY: &str = "user.meta";

/// String key/value storage scoped to one tab. Writes are last-write-wins.
pub trait EphemeralCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EphemeralCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Written next to the profile so readers can tell how old the mirror is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMeta {
    pub cached_at: DateTime<Utc>,
    pub sequence: u64,
}

pub(crate) fn write_profile(cache: &dyn EphemeralCache, profile: &UserProfile, sequence: u64) {
    match serde_json::to_string(profile) {
        Ok(serialized) => {
            cache.set(USER_KEY, serialized);
            let meta = CacheMeta {
                cached_at: Utc::now(),
                sequence,
            };
            if let Ok(meta) = serde_json::to_string(&meta) {
                cache.set(USER_META_KEY, meta);
            }
        }
        Err(err) => {
            // A mirror we cannot write must not outlive the profile it described.
            debug!("failed to serialize profile for cache: {err}");
            clear_profile(cache);
        }
    }
}

pub(crate) fn clear_profile(cache: &dyn EphemeralCache) {
    cache.remove(USER_KEY);
    cache.remove(USER_META_KEY);
}

/// A profile read back from the mirror, typically after a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleProfile {
    profile: UserProfile,
    meta: Option<CacheMeta>,
}

impl StaleProfile {
    /// Read the mirror. Returns `None` when it is empty or unreadable.
    #[must_use]
    pub fn read(cache: &dyn EphemeralCache) -> Option<Self> {
        let profile = serde_json::from_str(&cache.get(USER_KEY)?).ok()?;
        let meta = cache
            .get(USER_META_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok());
        Some(Self { profile, meta })
    }

    /// Display name for placeholder rendering while the store loads.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.profile.full_name
    }

    #[must_use]
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.meta.map(|meta| meta.cached_at)
    }

    /// Re-run the session check and return the profile the backend confirms.
    /// `None` means the cached user is no longer signed in.
    pub async fn revalidate(self, store: &SessionStore) -> Option<UserProfile> {
        store.initialize().await;
        store.profile()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::types::{PlanTier, Subscription, SubscriptionStatus};

    fn profile() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            email: "a@b.com".to_string(),
            full_name: "A B".to_string(),
            subscription: Subscription {
                status: SubscriptionStatus::Inactive,
                plan: PlanTier::Free,
                expires_at: None,
            },
        }
    }

    #[test]
    fn write_then_read_stale_profile() {
        let cache = MemoryCache::new();
        write_profile(&cache, &profile(), 7);

        assert_eq!(
            cache.get(USER_KEY).unwrap(),
            serde_json::to_string(&profile()).unwrap()
        );

        let stale = StaleProfile::read(&cache).unwrap();
        assert_eq!(stale.display_name(), "A B");
        assert!(stale.cached_at().is_some());
        assert_eq!(stale.meta.unwrap().sequence, 7);
    }

    #[test]
    fn clear_removes_both_keys() {
        let cache = MemoryCache::new();
        write_profile(&cache, &profile(), 1);
        clear_profile(&cache);

        assert!(cache.get(USER_KEY).is_none());
        assert!(cache.get(USER_META_KEY).is_none());
        assert!(StaleProfile::read(&cache).is_none());
    }

    #[test]
    fn garbage_in_cache_reads_as_empty() {
        let cache = MemoryCache::new();
        cache.set(USER_KEY, "{not json".to_string());
        assert!(StaleProfile::read(&cache).is_none());
    }
}
