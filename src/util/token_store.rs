//! Persisted bearer token and user profile.
//!
//! SYSTEM CONTEXT
//! ==============
//! The token store mirrors the in-memory session across reloads. It owns
//! exactly two keys, `token` and `user`, and always writes or clears them
//! together.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use super::storage::{KeyValueStore, StorageError};
use crate::net::types::User;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// The durable form of an active session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredAuthRecord {
    pub token: String,
    pub user: User,
}

/// Token/user persistence over any [`KeyValueStore`].
#[derive(Clone, Debug, Default)]
pub struct TokenStore<K> {
    store: K,
}

impl<K: KeyValueStore> TokenStore<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Full record, or `None` if either key is missing or the user JSON is
    /// malformed.
    pub fn read(&self) -> Option<StoredAuthRecord> {
        let token = self.token()?;
        let raw_user = self.store.get(USER_KEY)?;
        match serde_json::from_str::<User>(&raw_user) {
            Ok(user) => Some(StoredAuthRecord { token, user }),
            Err(e) => {
                log::warn!("token store: ignoring malformed user record: {e}");
                None
            }
        }
    }

    /// Raw bearer token, if a non-empty one is stored.
    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Persist both keys. On failure the previous contents are restored.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`StorageError`] if either key cannot be written.
    pub fn write(&self, token: &str, user: &User) -> Result<(), StorageError> {
        let raw_user = serde_json::to_string(user).map_err(|_| StorageError::WriteRejected {
            key: USER_KEY.to_owned(),
        })?;
        let previous_token = self.store.get(TOKEN_KEY);
        let previous_user = self.store.get(USER_KEY);

        let result = self
            .store
            .set(TOKEN_KEY, token)
            .and_then(|()| self.store.set(USER_KEY, &raw_user));
        if let Err(e) = result {
            self.restore(TOKEN_KEY, previous_token.as_deref());
            self.restore(USER_KEY, previous_user.as_deref());
            return Err(e);
        }
        Ok(())
    }

    pub fn clear(&self) {
        self.store.remove(TOKEN_KEY);
        self.store.remove(USER_KEY);
    }

    /// True when something is stored but not a usable full record.
    pub fn has_partial_record(&self) -> bool {
        let anything = self.store.get(TOKEN_KEY).is_some() || self.store.get(USER_KEY).is_some();
        anything && self.read().is_none()
    }

    fn restore(&self, key: &str, previous: Option<&str>) {
        match previous {
            Some(value) => {
                let _ = self.store.set(key, value);
            }
            None => self.store.remove(key),
        }
    }
}
