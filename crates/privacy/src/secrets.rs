use std::fmt;

use parking_lot::RwLock;
use secrecy::{ExposeSecret, Secret};
use tracing::debug;

use crate::errors::{PrivacyError, PrivacyResult};
use crate::text::mask_credentials;

pub const REDACTED: &str = "[REDACTED]";

struct SecretEntry {
    placeholder: String,
    value: Secret<String>,
}

/// Placeholder → secret value registry scoped to one engine instance.
///
/// Entries keep registration order; substitution walks them in that order.
#[derive(Default)]
pub struct SecretStore {
    entries: RwLock<Vec<SecretEntry>>,
}

impl SecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the value behind `placeholder`.
    pub fn register(
        &self,
        placeholder: impl Into<String>,
        value: impl Into<String>,
    ) -> PrivacyResult<()> {
        let placeholder = placeholder.into();
        if placeholder.is_empty() {
            return Err(PrivacyError::EmptyPlaceholder);
        }
        let value = Secret::new(value.into());
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|e| e.placeholder == placeholder) {
            Some(existing) => existing.value = value,
            None => entries.push(SecretEntry {
                placeholder: placeholder.clone(),
                value,
            }),
        }
        debug!(placeholder = %placeholder, "secret registered");
        Ok(())
    }

    pub fn contains(&self, placeholder: &str) -> bool {
        self.entries
            .read()
            .iter()
            .any(|e| e.placeholder == placeholder)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Replace every registered placeholder found in `text`.
    pub fn substitute(&self, text: &str) -> Substitution {
        let entries = self.entries.read();
        let mut current = text.to_string();
        let mut used = Vec::new();
        for entry in entries.iter() {
            if current.contains(&entry.placeholder) {
                current = current.replace(&entry.placeholder, entry.value.expose_secret());
                used.push(entry.placeholder.clone());
            }
        }
        Substitution {
            text: Secret::new(current),
            placeholders: used,
        }
    }

    /// Scrub registered secret values and credential-looking pairs from
    /// free-form diagnostic text.
    pub fn redact(&self, text: &str) -> String {
        mask_credentials(&self.scrub_values(text))
    }

    /// Replace registered secret values only.
    ///
    /// Selector strings go through here: their structure must survive, so
    /// credential-looking keywords inside them are left alone.
    pub fn scrub_values(&self, text: &str) -> String {
        let entries = self.entries.read();
        let mut values: Vec<&str> = entries
            .iter()
            .map(|e| e.value.expose_secret().as_str())
            .filter(|v| !v.is_empty())
            .collect();
        // longest first so a value that prefixes another cannot leave a tail
        values.sort_by_key(|v| std::cmp::Reverse(v.len()));
        let mut scrubbed = text.to_string();
        for value in values {
            if scrubbed.contains(value) {
                scrubbed = scrubbed.replace(value, REDACTED);
            }
        }
        scrubbed
    }
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretStore")
            .field("entries", &self.len())
            .finish()
    }
}

/// Text ready for delivery, with secrets already in place.
pub struct Substitution {
    text: Secret<String>,
    placeholders: Vec<String>,
}

impl Substitution {
    pub fn expose(&self) -> &str {
        self.text.expose_secret()
    }

    pub fn substituted(&self) -> bool {
        !self.placeholders.is_empty()
    }

    /// Placeholders that were replaced, never the values.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    pub fn len(&self) -> usize {
        self.text.expose_secret().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.expose_secret().is_empty()
    }
}

impl fmt::Debug for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substitution")
            .field("len", &self.len())
            .field("placeholders", &self.placeholders)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn substitutes_registered_placeholder() {
        let store = SecretStore::new();
        store.register("{{PASSWORD}}", "hunter2").unwrap();
        let out = store.substitute("{{PASSWORD}}");
        assert_eq!(out.expose(), "hunter2");
        assert!(out.substituted());
        assert_eq!(out.placeholders().to_vec(), vec!["{{PASSWORD}}".to_string()]);
    }

    #[test]
    fn replaces_every_occurrence_and_leaves_plain_text() {
        let store = SecretStore::new();
        store.register("{{PIN}}", "1234").unwrap();
        let out = store.substitute("pin={{PIN}} again {{PIN}}");
        assert_eq!(out.expose(), "pin=1234 again 1234");

        let plain = store.substitute("nothing to see");
        assert!(!plain.substituted());
        assert_eq!(plain.expose(), "nothing to see");
    }

    #[test]
    fn re_register_replaces_value_in_place() {
        let store = SecretStore::new();
        store.register("{{A}}", "one").unwrap();
        store.register("{{B}}", "two").unwrap();
        store.register("{{A}}", "uno").unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.substitute("{{A}}{{B}}").expose(), "unotwo");
    }

    #[test]
    fn empty_placeholder_is_rejected() {
        let store = SecretStore::new();
        assert!(store.register("", "x").is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn debug_output_never_shows_values() {
        let store = SecretStore::new();
        store.register("{{TOKEN}}", "s3cr3t-value").unwrap();
        let out = store.substitute("{{TOKEN}}");
        assert!(!format!("{:?}", store).contains("s3cr3t-value"));
        assert!(!format!("{:?}", out).contains("s3cr3t-value"));
    }

    #[test]
    fn redact_scrubs_values_longest_first() {
        let store = SecretStore::new();
        store.register("{{SHORT}}", "abc").unwrap();
        store.register("{{LONG}}", "abcdef").unwrap();
        let out = store.redact("fill failed for value abcdef and abc");
        assert_eq!(out, "fill failed for value [REDACTED] and [REDACTED]");
    }

    #[test]
    fn scrub_values_keeps_selector_structure() {
        let store = SecretStore::new();
        store.register("{{PASSWORD}}", "hunter2").unwrap();
        let selector = r#"role=textbox[name="Password:"]"#;
        assert_eq!(store.scrub_values(selector), selector);
        assert_eq!(
            store.scrub_values(r#"input[value='hunter2']"#),
            "input[value='[REDACTED]']"
        );
        assert_ne!(store.redact("password: hunter3"), "password: hunter3");
    }
}
