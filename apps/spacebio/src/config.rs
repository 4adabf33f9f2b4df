//! # Configuration
//!
//! Optional `spacebio.toml` with three sections:
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! public_url = "http://localhost:8080"
//!
//! [actions]
//! export_ms = 1500
//! share_ms = 800
//! download_ms = 2000
//! citation_ms = 1000
//! timeout_ms = 10000
//!
//! [catalog]
//! path = "publications.json"
//! ```
//!
//! Every key is optional. A missing file means defaults.

use serde::Deserialize;
use spacebio_core::{
    ActionDelays, ActionKind, Catalog, SpaceBioError,
    primitives::{
        ACTION_TIMEOUT_MS, CITATION_DELAY_MS, DOWNLOAD_DELAY_MS, EXPORT_DELAY_MS,
        MAX_CATALOG_FILE_SIZE, SHARE_DELAY_MS,
    },
};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "spacebio.toml";

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base of the links handed out by the share action.
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            public_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Simulated action latencies, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActionConfig {
    pub export_ms: u64,
    pub share_ms: u64,
    pub download_ms: u64,
    pub citation_ms: u64,
    pub timeout_ms: u64,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            export_ms: EXPORT_DELAY_MS,
            share_ms: SHARE_DELAY_MS,
            download_ms: DOWNLOAD_DELAY_MS,
            citation_ms: CITATION_DELAY_MS,
            timeout_ms: ACTION_TIMEOUT_MS,
        }
    }
}

impl ActionConfig {
    #[must_use]
    pub fn delays(&self) -> ActionDelays {
        ActionDelays {
            export: Duration::from_millis(self.export_ms),
            share: Duration::from_millis(self.share_ms),
            download: Duration::from_millis(self.download_ms),
            citation: Duration::from_millis(self.citation_ms),
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Every delay must finish inside the timeout, or that action can never
    /// succeed.
    pub fn validate(&self) -> Result<(), SpaceBioError> {
        let delays = self.delays();
        for kind in ActionKind::ALL {
            let delay = delays.for_kind(kind);
            if delay >= self.timeout() {
                return Err(SpaceBioError::InvalidConfig(format!(
                    "[actions] {} delay of {} ms must be below timeout_ms = {}",
                    kind,
                    delay.as_millis(),
                    self.timeout_ms
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// JSON catalog replacing the builtin dataset.
    pub path: Option<PathBuf>,
}

// =============================================================================
// APP CONFIG
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub actions: ActionConfig,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, SpaceBioError> {
        let config: Self =
            toml::from_str(text).map_err(|e| SpaceBioError::InvalidConfig(e.to_string()))?;
        config.actions.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, or `spacebio.toml` if present.
    ///
    /// An explicit path must exist; the implicit one may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, SpaceBioError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.is_file() {
            tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|e| {
            SpaceBioError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

// =============================================================================
// CATALOG LOADING
// =============================================================================

/// Load the catalog: the JSON file at `path`, or the builtin dataset.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, SpaceBioError> {
    let Some(path) = path else {
        return Ok(Catalog::builtin());
    };

    let metadata = std::fs::metadata(path).map_err(|e| {
        SpaceBioError::IoError(format!("Cannot read catalog '{}': {}", path.display(), e))
    })?;
    if !metadata.is_file() {
        return Err(SpaceBioError::IoError(format!(
            "Catalog path '{}' is not a regular file",
            path.display()
        )));
    }
    if metadata.len() > MAX_CATALOG_FILE_SIZE {
        return Err(SpaceBioError::InvalidCatalog(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_CATALOG_FILE_SIZE
        )));
    }

    let bytes = std::fs::read(path).map_err(|e| {
        SpaceBioError::IoError(format!("Cannot read catalog '{}': {}", path.display(), e))
    })?;
    let catalog = Catalog::from_json(&bytes)?;
    tracing::info!(path = %path.display(), records = catalog.len(), "Loaded catalog");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml_str("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.actions.delays(), ActionDelays::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml_str(
            "[server]\nport = 9000\n\n[actions]\ncitation_ms = 5\n",
        )
        .expect("parse");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.actions.delays().citation, Duration::from_millis(5));
        assert_eq!(config.actions.delays().download, Duration::from_millis(DOWNLOAD_DELAY_MS));
        assert_eq!(config.actions.timeout(), Duration::from_millis(ACTION_TIMEOUT_MS));
    }

    #[test]
    fn delays_must_fit_within_timeout() {
        let err = AppConfig::from_toml_str("[actions]\ntimeout_ms = 0\n").expect_err("zero");
        assert!(matches!(err, SpaceBioError::InvalidConfig(_)));

        let err = AppConfig::from_toml_str("[actions]\ndownload_ms = 30000\n")
            .expect_err("download too slow");
        assert!(err.to_string().contains("download"));

        let config = AppConfig::from_toml_str(
            "[actions]\nexport_ms = 5\nshare_ms = 5\ndownload_ms = 5\ncitation_ms = 5\ntimeout_ms = 50\n",
        )
        .expect("fits");
        assert_eq!(config.actions.timeout(), Duration::from_millis(50));
    }

    #[test]
    fn load_rejects_unusable_timeout() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"[actions]\ntimeout_ms = 100\n").expect("write");
        assert!(matches!(
            AppConfig::load(Some(file.path())),
            Err(SpaceBioError::InvalidConfig(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AppConfig::from_toml_str("[server]\nprot = 1\n").expect_err("typo");
        assert!(matches!(err, SpaceBioError::InvalidConfig(_)));
    }

    #[test]
    fn explicit_missing_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            AppConfig::load(Some(&missing)),
            Err(SpaceBioError::IoError(_))
        ));
    }

    #[test]
    fn catalog_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(
            br#"[{"id": 7, "title": "Tardigrades", "type": "Research Papers",
                 "authors": "Lab C", "date": "2022-02-02", "missions": ["deep-space"]}]"#,
        )
        .expect("write");

        let catalog = load_catalog(Some(file.path())).expect("load");
        assert_eq!(catalog.len(), 1);
        assert_eq!(load_catalog(None).expect("builtin").len(), 3);
    }

    #[test]
    fn catalog_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"not json").expect("write");
        assert!(load_catalog(Some(file.path())).is_err());
    }
}
