// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::{Arc, RwLock};

use crate::credentials::SystemCredentials;

/// In-memory copy of the decrypted credentials, owned by one vault.
///
/// Emptied whenever a stored credential changes. Each invalidation bumps a
/// generation counter; a fill started under an older generation is dropped.
#[derive(Debug, Default)]
pub struct CredentialCache {
    inner: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    credentials: Option<Arc<SystemCredentials>>,
    generation: u64,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CacheState> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CacheState> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self) -> Option<Arc<SystemCredentials>> {
        self.read().credentials.clone()
    }

    /// Current generation. Take it before reading the store for a fill.
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    pub fn set(&self, credentials: Arc<SystemCredentials>) {
        self.write().credentials = Some(credentials);
    }

    /// Store `credentials` only if nothing was invalidated since `generation`.
    pub fn fill(&self, generation: u64, credentials: Arc<SystemCredentials>) -> bool {
        let mut state = self.write();
        if state.generation != generation {
            return false;
        }
        state.credentials = Some(credentials);
        true
    }

    pub fn invalidate(&self) {
        let mut state = self.write();
        state.credentials = None;
        state.generation = state.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn bundle(user: &str) -> Arc<SystemCredentials> {
        let secret = || SecretString::from("x".to_string());
        Arc::new(SystemCredentials {
            admin_username: user.to_string(),
            admin_password_hash: secret(),
            jwt_secret: secret(),
            admin_token: secret(),
            readonly_token: secret(),
            agent_token: secret(),
            vault_master_key: secret(),
            initialized_at: "2026-01-01T00:00:00Z".to_string(),
        })
    }

    #[test]
    fn set_get_invalidate() {
        let cache = CredentialCache::new();
        assert!(cache.get().is_none());

        cache.set(bundle("admin"));
        assert_eq!(cache.get().unwrap().admin_username, "admin");

        cache.set(bundle("ops"));
        assert_eq!(cache.get().unwrap().admin_username, "ops");

        cache.invalidate();
        assert!(cache.get().is_none());
    }

    #[test]
    fn fill_after_invalidation_is_dropped() {
        let cache = CredentialCache::new();
        let generation = cache.generation();

        cache.invalidate();
        assert!(!cache.fill(generation, bundle("stale")));
        assert!(cache.get().is_none());

        assert!(cache.fill(cache.generation(), bundle("fresh")));
        assert_eq!(cache.get().unwrap().admin_username, "fresh");
    }
}
