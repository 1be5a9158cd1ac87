use std::env;
use std::fmt;

use tracing::warn;

use crate::store::{KeyValueStore, StoreError};
use crate::utils::trim_line;

pub const API_KEY_ENV: &str = "APUSH_GEMINI_API_KEY";

pub const API_KEY_STORAGE_KEY: &str = "gemini_api_key";
pub const FALLBACK_STORAGE_KEY: &str = "gemini_fallback_enabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    SettingsFile,
}

impl KeySource {
    pub fn description(&self) -> &'static str {
        match self {
            KeySource::Environment => "environment variable",
            KeySource::SettingsFile => "local settings file",
        }
    }
}

/// Gemini credential and fallback policy, backed by durable storage.
///
/// Every mutation is written through to the store before returning. Readers
/// that hand the key to a request take a copy via [`Settings::api_key`].
pub struct Settings<S> {
    store: S,
    api_key: String,
    source: Option<KeySource>,
    fallback_enabled: bool,
}

impl<S> fmt::Debug for Settings<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("has_key", &!self.api_key.is_empty())
            .field("source", &self.source)
            .field("fallback_enabled", &self.fallback_enabled)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> Settings<S> {
    /// Loads settings from `store`, letting `APUSH_GEMINI_API_KEY` override the
    /// stored key.
    pub fn load(store: S) -> Result<Self, StoreError> {
        Self::from_sources(store, env::var(API_KEY_ENV).ok())
    }

    pub fn from_sources(store: S, env_key: Option<String>) -> Result<Self, StoreError> {
        let fallback_enabled = match store.get(FALLBACK_STORAGE_KEY)? {
            None => true,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "unrecognised fallback flag in settings, keeping fallback on");
                true
            }),
        };

        if let Some(key) = env_key.as_deref().and_then(trim_line) {
            return Ok(Self {
                api_key: key.to_string(),
                source: Some(KeySource::Environment),
                store,
                fallback_enabled,
            });
        }

        let stored = store
            .get(API_KEY_STORAGE_KEY)?
            .as_deref()
            .and_then(trim_line)
            .map(str::to_string);

        Ok(Self {
            source: stored.as_ref().map(|_| KeySource::SettingsFile),
            api_key: stored.unwrap_or_default(),
            store,
            fallback_enabled,
        })
    }

    /// Stores the trimmed candidate. Blank or missing input is a no-op that
    /// returns `false`.
    ///
    /// A key from `APUSH_GEMINI_API_KEY` stays active; the stored key takes
    /// over once the variable is unset.
    pub fn set_key(&mut self, candidate: Option<&str>) -> Result<bool, StoreError> {
        let Some(trimmed) = candidate.and_then(trim_line) else {
            return Ok(false);
        };

        self.store.set(API_KEY_STORAGE_KEY, trimmed)?;
        if self.source != Some(KeySource::Environment) {
            self.api_key = trimmed.to_string();
            self.source = Some(KeySource::SettingsFile);
        }
        Ok(true)
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn api_key(&self) -> Option<String> {
        if self.has_key() {
            Some(self.api_key.clone())
        } else {
            None
        }
    }

    pub fn key_source(&self) -> Option<KeySource> {
        self.source
    }

    /// Removes the stored key. A key supplied through the environment stays
    /// active for this process.
    pub fn clear_key(&mut self) -> Result<bool, StoreError> {
        let removed = self.store.remove(API_KEY_STORAGE_KEY)?;
        if self.source == Some(KeySource::SettingsFile) {
            self.api_key.clear();
            self.source = None;
        }
        Ok(removed)
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback_enabled
    }

    /// Changes the policy for this process only.
    pub fn override_fallback(&mut self, enabled: bool) {
        self.fallback_enabled = enabled;
    }

    pub fn set_fallback_enabled(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.store
            .set(FALLBACK_STORAGE_KEY, if enabled { "true" } else { "false" })?;
        self.fallback_enabled = enabled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use tempfile::tempdir;

    fn empty_settings() -> Settings<MemoryStore> {
        Settings::from_sources(MemoryStore::new(), None).unwrap()
    }

    #[test]
    fn blank_candidates_are_rejected() {
        let mut settings = empty_settings();
        assert!(!settings.set_key(Some("")).unwrap());
        assert!(!settings.set_key(Some("   ")).unwrap());
        assert!(!settings.set_key(None).unwrap());
        assert!(!settings.has_key());
    }

    #[test]
    fn blank_candidate_keeps_existing_key() {
        let mut settings = empty_settings();
        assert!(settings.set_key(Some("first")).unwrap());
        assert!(!settings.set_key(Some("  ")).unwrap());
        assert!(!settings.set_key(None).unwrap());
        assert!(settings.has_key());
        assert_eq!(settings.api_key().as_deref(), Some("first"));
    }

    #[test]
    fn key_is_trimmed_and_persisted() {
        let mut settings = empty_settings();
        assert!(settings.set_key(Some(" abc ")).unwrap());
        assert!(settings.has_key());
        assert_eq!(settings.api_key().as_deref(), Some("abc"));
        assert_eq!(
            settings.store.get(API_KEY_STORAGE_KEY).unwrap().as_deref(),
            Some("abc")
        );
        assert_eq!(settings.key_source(), Some(KeySource::SettingsFile));
    }

    #[test]
    fn key_survives_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::from_sources(FileStore::at(&path), None).unwrap();
        settings.set_key(Some("saved-key")).unwrap();
        settings.set_fallback_enabled(false).unwrap();

        let reloaded = Settings::from_sources(FileStore::at(&path), None).unwrap();
        assert_eq!(reloaded.api_key().as_deref(), Some("saved-key"));
        assert!(!reloaded.fallback_enabled());
    }

    #[test]
    fn fallback_defaults_on() {
        assert!(empty_settings().fallback_enabled());

        let store = MemoryStore::with_entry(FALLBACK_STORAGE_KEY, "garbage");
        let settings = Settings::from_sources(store, None).unwrap();
        assert!(settings.fallback_enabled());
    }

    #[test]
    fn environment_overrides_stored_key() {
        let store = MemoryStore::with_entry(API_KEY_STORAGE_KEY, "stored");
        let settings = Settings::from_sources(store, Some(" from-env ".to_string())).unwrap();
        assert_eq!(settings.api_key().as_deref(), Some("from-env"));
        assert_eq!(settings.key_source(), Some(KeySource::Environment));
    }

    #[test]
    fn set_key_keeps_environment_key_active() {
        let store = MemoryStore::with_entry(API_KEY_STORAGE_KEY, "stored");
        let mut settings = Settings::from_sources(store, Some("from-env".to_string())).unwrap();
        assert!(settings.set_key(Some("new-stored")).unwrap());

        assert_eq!(settings.api_key().as_deref(), Some("from-env"));
        assert_eq!(settings.key_source(), Some(KeySource::Environment));
        assert_eq!(
            settings.store.get(API_KEY_STORAGE_KEY).unwrap().as_deref(),
            Some("new-stored")
        );
    }

    #[test]
    fn blank_environment_value_is_ignored() {
        let store = MemoryStore::with_entry(API_KEY_STORAGE_KEY, "stored");
        let settings = Settings::from_sources(store, Some("  ".to_string())).unwrap();
        assert_eq!(settings.api_key().as_deref(), Some("stored"));
    }

    #[test]
    fn clear_key_removes_stored_key() {
        let mut settings = empty_settings();
        settings.set_key(Some("abc")).unwrap();
        assert!(settings.clear_key().unwrap());
        assert!(!settings.has_key());
        assert!(!settings.clear_key().unwrap());
    }
}
