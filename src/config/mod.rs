use std::path::PathBuf;

use anyhow::{anyhow, ensure, Context, Result};

use crate::speech::{find_voice, DEFAULT_VOICE};

pub const STORE_ENV: &str = "PRONUNCIATION_STORE";
pub const VOICE_ENV: &str = "PRONUNCIATION_TTS_VOICE";
pub const LANGUAGE_ENV: &str = "PRONUNCIATION_LANGUAGE";
pub const MAX_UPLOAD_ENV: &str = "PRONUNCIATION_MAX_UPLOAD_BYTES";

pub const DEFAULT_STORE: &str = "recordings.json";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub default_voice: String,
    pub default_language: String,
    pub max_upload_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE),
            default_voice: DEFAULT_VOICE.to_string(),
            default_language: DEFAULT_LANGUAGE.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Resolves settings from the process environment, then applies the store override.
    pub fn from_env(store_override: Option<PathBuf>) -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok(), store_override)
    }

    /// Resolves settings from an arbitrary lookup; blank values count as unset.
    pub fn resolve<F>(lookup: F, store_override: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let store_path = store_override
            .or_else(|| get(STORE_ENV).map(PathBuf::from))
            .unwrap_or(defaults.store_path);
        ensure!(
            !store_path.is_dir(),
            "recording store path {:?} is a directory",
            store_path
        );

        let default_voice = match get(VOICE_ENV) {
            Some(voice) => find_voice(&voice)
                .with_context(|| format!("invalid {VOICE_ENV}"))?
                .id
                .to_string(),
            None => defaults.default_voice,
        };

        let default_language = get(LANGUAGE_ENV).unwrap_or(defaults.default_language);

        let max_upload_bytes = match get(MAX_UPLOAD_ENV) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|err| anyhow!("invalid {MAX_UPLOAD_ENV} '{raw}': {err}"))?,
            None => defaults.max_upload_bytes,
        };
        ensure!(max_upload_bytes > 0, "{MAX_UPLOAD_ENV} must be positive");

        Ok(Self {
            store_path,
            default_voice,
            default_language,
            max_upload_bytes,
        })
    }
}
