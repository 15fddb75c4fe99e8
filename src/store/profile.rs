use std::sync::Arc;

use super::{
    AUTH_TOKEN_KEY, KeyValueStore, LoadFailure, PROFILE_KEY, USER_EMAIL_KEY, read_json, write_json,
};
use crate::core::profile::UserProfile;
use crate::error::PersistenceError;

/// The signed-in user's profile plus the token sent to the weather backend.
pub struct ProfileStore {
    kv: Arc<dyn KeyValueStore>,
    profile: UserProfile,
}

impl ProfileStore {
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        let profile = match read_json::<UserProfile>(kv.as_ref(), PROFILE_KEY) {
            Ok(profile) => profile,
            Err(LoadFailure::Missing) => UserProfile::default(),
            Err(LoadFailure::Unreadable(e)) => {
                log::error!("Failed to read user profile: {}", e);
                UserProfile::default()
            }
            Err(LoadFailure::Corrupt(e)) => {
                log::warn!("Discarding unreadable user profile: {}", e);
                UserProfile::default()
            }
        };
        Self { kv, profile }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn is_signed_in(&self) -> bool {
        !self.profile.is_anonymous()
    }

    /// Apply `edit` and save. The profile is left as it was if the save fails.
    pub fn update(&mut self, edit: impl FnOnce(&mut UserProfile)) -> Result<(), PersistenceError> {
        let mut next = self.profile.clone();
        edit(&mut next);
        if let Err(e) = write_json(self.kv.as_ref(), PROFILE_KEY, &next) {
            log::error!("Failed to save user profile: {}", e);
            return Err(e);
        }
        self.profile = next;
        Ok(())
    }

    /// Record an email sign-in. Credentials are checked by the identity
    /// provider before this is called.
    pub fn sign_in_with_email(&mut self, email: &str) -> Result<(), PersistenceError> {
        let email = email.trim().to_string();
        let previous = self.profile.clone();
        self.update(|p| p.email = email.clone())?;

        if let Err(e) = write_json(self.kv.as_ref(), USER_EMAIL_KEY, &email) {
            log::error!("Failed to remember sign-in email, reverting profile: {}", e);
            if let Err(restore) = write_json(self.kv.as_ref(), PROFILE_KEY, &previous) {
                log::error!("Failed to restore user profile: {}", restore);
            }
            self.profile = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn signed_in_email(&self) -> Option<String> {
        read_json::<String>(self.kv.as_ref(), USER_EMAIL_KEY).ok()
    }

    /// Forget the profile, the remembered email and the auth token.
    pub fn sign_out(&mut self) -> Result<(), PersistenceError> {
        // In-memory profile tracks the userProfile slot, whatever fails after it
        self.kv.remove(PROFILE_KEY)?;
        self.profile = UserProfile::default();

        for key in [USER_EMAIL_KEY, AUTH_TOKEN_KEY] {
            if let Err(e) = self.kv.remove(key) {
                log::error!("Failed to clear {} on sign-out: {}", key, e);
                return Err(e.into());
            }
        }
        log::info!("Signed out, local profile cleared");
        Ok(())
    }

    pub fn auth_token(&self) -> Option<String> {
        match read_json::<String>(self.kv.as_ref(), AUTH_TOKEN_KEY) {
            Ok(token) if !token.is_empty() => Some(token),
            Ok(_) | Err(LoadFailure::Missing) => None,
            Err(LoadFailure::Unreadable(e)) => {
                log::warn!("Failed to read auth token: {}", e);
                None
            }
            Err(LoadFailure::Corrupt(e)) => {
                log::warn!("Ignoring malformed auth token: {}", e);
                None
            }
        }
    }

    pub fn set_auth_token(&self, token: &str) -> Result<(), PersistenceError> {
        write_json(self.kv.as_ref(), AUTH_TOKEN_KEY, token)
    }

    pub fn clear_auth_token(&self) -> Result<(), PersistenceError> {
        self.kv.remove(AUTH_TOKEN_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::HashSet;
    use std::io;
    use std::sync::Mutex;

    /// Fails writes and removals for the keys it is told about.
    #[derive(Default)]
    struct BrokenKeys {
        inner: MemoryStore,
        broken: Mutex<HashSet<&'static str>>,
    }

    impl BrokenKeys {
        fn break_key(&self, key: &'static str) {
            self.broken.lock().unwrap().insert(key);
        }

        fn check(&self, key: &str) -> io::Result<()> {
            if self.broken.lock().unwrap().contains(key) {
                return Err(io::Error::other(format!("{} is read-only", key)));
            }
            Ok(())
        }
    }

    impl KeyValueStore for BrokenKeys {
        fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &[u8]) -> io::Result<()> {
            self.check(key)?;
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> io::Result<()> {
            self.check(key)?;
            self.inner.remove(key)
        }
    }

    #[test]
    fn profile_survives_reload() {
        let kv = Arc::new(MemoryStore::new());
        let mut store = ProfileStore::load(kv.clone());
        assert!(!store.is_signed_in());

        store
            .update(|p| {
                p.name = "Chahel".into();
                p.preferred_climate = "tropical".into();
                p.preferred_activities = vec!["hiking".into(), "food".into()];
            })
            .unwrap();

        let reloaded = ProfileStore::load(kv);
        assert!(reloaded.is_signed_in());
        assert_eq!(reloaded.profile(), store.profile());
    }

    #[test]
    fn corrupt_profile_falls_back_to_default() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(PROFILE_KEY, b"\"not a profile\"").unwrap();
        let store = ProfileStore::load(kv);
        assert_eq!(store.profile(), &UserProfile::default());
    }

    #[test]
    fn sign_in_then_out() {
        let kv = Arc::new(MemoryStore::new());
        let mut store = ProfileStore::load(kv.clone());

        store.sign_in_with_email(" traveler@example.com ").unwrap();
        store.set_auth_token("abc123").unwrap();
        assert!(store.is_signed_in());
        assert_eq!(store.profile().email, "traveler@example.com");
        assert_eq!(store.signed_in_email().as_deref(), Some("traveler@example.com"));
        assert_eq!(store.auth_token().as_deref(), Some("abc123"));

        store.sign_out().unwrap();
        assert!(!store.is_signed_in());
        assert_eq!(store.auth_token(), None);
        assert_eq!(store.signed_in_email(), None);
        assert_eq!(kv.get(PROFILE_KEY).unwrap(), None);
    }

    #[test]
    fn empty_token_counts_as_absent() {
        let store = ProfileStore::load(Arc::new(MemoryStore::new()));
        store.set_auth_token("").unwrap();
        assert_eq!(store.auth_token(), None);
        store.set_auth_token("t").unwrap();
        store.clear_auth_token().unwrap();
        assert_eq!(store.auth_token(), None);
    }

    #[test]
    fn failed_profile_write_does_not_remember_email() {
        let kv = Arc::new(BrokenKeys::default());
        kv.break_key(PROFILE_KEY);
        let mut store = ProfileStore::load(kv.clone());

        assert!(store.sign_in_with_email("a@b.c").is_err());
        assert!(!store.is_signed_in());
        assert_eq!(store.profile().email, "");
        assert!(store.signed_in_email().is_none());
    }

    #[test]
    fn failed_email_write_reverts_profile() {
        let kv = Arc::new(BrokenKeys::default());
        kv.break_key(USER_EMAIL_KEY);
        let mut store = ProfileStore::load(kv.clone());

        assert!(store.sign_in_with_email("a@b.c").is_err());
        assert!(!store.is_signed_in());
        assert!(store.signed_in_email().is_none());
        assert!(!ProfileStore::load(kv).is_signed_in());
    }

    #[test]
    fn sign_out_keeps_profile_in_step_with_disk() {
        let kv = Arc::new(BrokenKeys::default());
        let mut store = ProfileStore::load(kv.clone());
        store.sign_in_with_email("a@b.c").unwrap();

        kv.break_key(PROFILE_KEY);
        assert!(store.sign_out().is_err());
        assert!(store.is_signed_in());
        assert!(ProfileStore::load(kv.clone()).is_signed_in());

        let kv = Arc::new(BrokenKeys::default());
        let mut store = ProfileStore::load(kv.clone());
        store.sign_in_with_email("a@b.c").unwrap();
        kv.break_key(USER_EMAIL_KEY);
        assert!(store.sign_out().is_err());
        assert!(!store.is_signed_in());
        assert!(!ProfileStore::load(kv).is_signed_in());
    }
}
