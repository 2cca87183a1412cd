//! Locale preference
//!
//! The chosen language is read once at startup and written back whenever the
//! user changes it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Languages the bot serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "si")]
    Sinhala,
    #[serde(rename = "en")]
    English,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::Sinhala => "si",
            Locale::English => "en",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Locale::Sinhala => "සිංහල",
            Locale::English => "English",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported locale: {0} (expected si or en)")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "si" => Ok(Locale::Sinhala),
            "en" => Ok(Locale::English),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum LocaleStoreError {
    #[error("Locale file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Locale file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence for the user's language choice
pub trait LocalePreferenceStore: Send + Sync {
    /// `None` when no preference has been saved yet
    fn load(&self) -> Result<Option<Locale>, LocaleStoreError>;

    fn save(&self, locale: Locale) -> Result<(), LocaleStoreError>;

    /// Saved locale, or the default when missing or unreadable
    fn load_or_default(&self) -> Locale {
        match self.load() {
            Ok(locale) => locale.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load locale preference, using default");
                Locale::default()
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LocaleFile {
    language: Locale,
}

/// Stores the preference as `{"language": "si"}` in a JSON file
#[derive(Debug, Clone)]
pub struct FileLocaleStore {
    path: PathBuf,
}

impl FileLocaleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalePreferenceStore for FileLocaleStore {
    fn load(&self) -> Result<Option<Locale>, LocaleStoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: LocaleFile = serde_json::from_str(&contents)?;
        Ok(Some(file.language))
    }

    fn save(&self, locale: Locale) -> Result<(), LocaleStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&LocaleFile { language: locale })?;
        std::fs::write(&self.path, contents)?;
        tracing::info!(locale = %locale, path = %self.path.display(), "Saved locale preference");
        Ok(())
    }
}
