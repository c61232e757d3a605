//! Persisted client settings.
//!
//! The settings document is owned by the desktop lineage of the client: an
//! XML `clientSettings` root holding zero or more `mutedUser` elements with
//! a decimal user id as text. The parse is deliberately lenient — unknown
//! child elements are ignored and a foreign root (or malformed document)
//! yields the empty settings object instead of an error, so a damaged file
//! never takes the client down.

use crate::model::UserId;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors for settings file I/O and serialization.
///
/// Parsing has no error type on purpose: a bad document degrades to the
/// empty settings object (see [`ClientSettings::from_xml`]).
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file exists but could not be read.
    #[error("failed to read settings file at {path:?}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Settings file could not be written.
    #[error("failed to write settings file at {path:?}: {source}")]
    Write {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serializing the settings document failed.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] std::io::Error),
}

/// Muted-user settings consumed by the presenter.
///
/// Order of the muted list is preserved across serialize/parse round trips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSettings {
    /// Users whose comments are dropped before display, in the order they
    /// were muted.
    pub muted_users: Vec<UserId>,
}

impl ClientSettings {
    /// Whether the given user is muted.
    pub fn is_muted(&self, user: UserId) -> bool {
        self.muted_users.contains(&user)
    }

    /// Add a user to the muted list; muting twice is a no-op.
    pub fn mute(&mut self, user: UserId) {
        if !self.is_muted(user) {
            self.muted_users.push(user);
        }
    }

    /// Parse a settings document.
    ///
    /// Returns the empty settings object when the root element is not
    /// `clientSettings` or when the document is malformed. Unrecognized
    /// child elements and non-numeric `mutedUser` contents are skipped.
    pub fn from_xml(xml: &str) -> Self {
        let mut settings = ClientSettings::default();
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut depth = 0usize;
        let mut in_root = false;
        let mut in_muted_user = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    depth += 1;
                    match (depth, start.name().as_ref()) {
                        (1, b"clientSettings") => in_root = true,
                        (2, b"mutedUser") if in_root => in_muted_user = true,
                        _ => {}
                    }
                }
                Ok(Event::Text(text)) if in_muted_user => match text.unescape() {
                    Ok(value) => match value.trim().parse::<u64>() {
                        Ok(raw) => settings.muted_users.push(UserId::new(raw)),
                        Err(_) => {
                            warn!(value = %value, "skipping non-numeric mutedUser entry");
                        }
                    },
                    Err(err) => {
                        warn!(%err, "skipping unreadable mutedUser entry");
                    }
                },
                Ok(Event::End(_)) => {
                    if depth == 2 {
                        in_muted_user = false;
                    } else if depth == 1 {
                        in_root = false;
                    }
                    depth = depth.saturating_sub(1);
                }
                Ok(Event::Eof) => break,
                Err(err) => {
                    warn!(%err, "malformed settings document, using defaults");
                    return ClientSettings::default();
                }
                Ok(_) => {}
            }
        }

        settings
    }

    /// Serialize to the `clientSettings` document format.
    pub fn to_xml(&self) -> Result<String, SettingsError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Start(BytesStart::new("clientSettings")))?;
        for user in &self.muted_users {
            writer.write_event(Event::Start(BytesStart::new("mutedUser")))?;
            writer.write_event(Event::Text(BytesText::new(&user.to_string())))?;
            writer.write_event(Event::End(BytesEnd::new("mutedUser")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("clientSettings")))?;

        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    /// Load settings from a file.
    ///
    /// A missing file is not an error: first launch starts with the empty
    /// settings object.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(ClientSettings::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_xml(&contents))
    }

    /// Write settings to a file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let document = self.to_xml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, document).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn muted(raw: &[u64]) -> Vec<UserId> {
        raw.iter().copied().map(UserId::new).collect()
    }

    #[test]
    fn parses_muted_users_in_document_order() {
        let xml = "<clientSettings>\
                   <mutedUser>3</mutedUser>\
                   <mutedUser>17</mutedUser>\
                   <mutedUser>42</mutedUser>\
                   </clientSettings>";
        let settings = ClientSettings::from_xml(xml);
        assert_eq!(settings.muted_users, muted(&[3, 17, 42]));
    }

    #[test]
    fn foreign_root_yields_empty_settings() {
        let settings = ClientSettings::from_xml("<serverSettings><mutedUser>3</mutedUser></serverSettings>");
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn unknown_children_are_ignored() {
        let xml = "<clientSettings>\
                   <theme>dark</theme>\
                   <mutedUser>5</mutedUser>\
                   <futureKnob enabled=\"true\">7</futureKnob>\
                   </clientSettings>";
        let settings = ClientSettings::from_xml(xml);
        assert_eq!(settings.muted_users, muted(&[5]));
    }

    #[test]
    fn malformed_document_yields_empty_settings() {
        let settings = ClientSettings::from_xml("<clientSettings><mutedUser>3</mutedUs");
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn non_numeric_entry_is_skipped() {
        let xml = "<clientSettings>\
                   <mutedUser>three</mutedUser>\
                   <mutedUser>9</mutedUser>\
                   </clientSettings>";
        let settings = ClientSettings::from_xml(xml);
        assert_eq!(settings.muted_users, muted(&[9]));
    }

    #[test]
    fn round_trip_preserves_order() {
        let original = ClientSettings {
            muted_users: muted(&[3, 17, 42]),
        };
        let xml = original.to_xml().unwrap();
        let reparsed = ClientSettings::from_xml(&xml);
        assert_eq!(reparsed, original);
    }

    #[test]
    fn empty_settings_round_trip() {
        let xml = ClientSettings::default().to_xml().unwrap();
        let reparsed = ClientSettings::from_xml(&xml);
        assert_eq!(reparsed, ClientSettings::default());
    }

    #[test]
    fn mute_is_idempotent() {
        let mut settings = ClientSettings::default();
        settings.mute(UserId::new(8));
        settings.mute(UserId::new(8));
        assert_eq!(settings.muted_users, muted(&[8]));
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let path = std::env::temp_dir().join("streamchat_settings_missing_12345.xml");
        let _ = std::fs::remove_file(&path);
        let settings = ClientSettings::load(&path).unwrap();
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = std::env::temp_dir().join("streamchat_settings_round_trip.xml");
        let original = ClientSettings {
            muted_users: muted(&[1, 2, 3]),
        };
        original.save(&path).unwrap();
        let loaded = ClientSettings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, original);
    }
}
