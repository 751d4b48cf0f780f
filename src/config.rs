//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/costtree/costtree.toml`
//! 3. Explicit config file (`--config <FILE>`)
//! 4. Environment variables: `COSTTREE_*` prefix
//! 5. Command line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

pub const DEFAULT_COMPANIES_SOURCE: &str =
    "https://5f27781bf5d27e001612e057.mockapi.io/webprovise/companies";
pub const DEFAULT_TRAVELS_SOURCE: &str =
    "https://5f27781bf5d27e001612e057.mockapi.io/webprovise/travels";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Unified configuration for costtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Location of the company payload (URL or file path)
    pub companies_source: String,
    /// Location of the travel payload (URL or file path)
    pub travels_source: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// Pretty-print the JSON report
    pub pretty: bool,
    /// Aggregate root subtrees in parallel
    pub parallel: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            companies_source: DEFAULT_COMPANIES_SOURCE.to_string(),
            travels_source: DEFAULT_TRAVELS_SOURCE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            pretty: false,
            parallel: false,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub companies_source: Option<String>,
    pub travels_source: Option<String>,
    pub timeout_secs: Option<u64>,
    pub pretty: Option<bool>,
    pub parallel: Option<bool>,
}

/// Get the XDG config directory for costtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "costtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("costtree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Expand `~` and `$VAR` in a source location; URLs pass through unchanged.
fn expand_location(location: &str) -> String {
    if crate::infrastructure::is_remote(location) {
        return location.to_string();
    }
    shellexpand::full(location)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| location.to_string())
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins if Some.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            companies_source: overlay
                .companies_source
                .clone()
                .unwrap_or_else(|| self.companies_source.clone()),
            travels_source: overlay
                .travels_source
                .clone()
                .unwrap_or_else(|| self.travels_source.clone()),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            pretty: overlay.pretty.unwrap_or(self.pretty),
            parallel: overlay.parallel.unwrap_or(self.parallel),
        }
    }

    fn expand_paths(&mut self) {
        self.companies_source = expand_location(&self.companies_source);
        self.travels_source = expand_location(&self.travels_source);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), explicit)
    }

    /// Load settings from the given global and explicit files, then the environment.
    ///
    /// A missing global file is skipped; a missing explicit file is an error.
    pub fn load_layers(
        global: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit config file
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply COSTTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("COSTTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("companies_source") {
            settings.companies_source = val;
        }
        if let Ok(val) = config.get_string("travels_source") {
            settings.travels_source = val;
        }
        match config.get::<u64>("timeout_secs") {
            Ok(val) => settings.timeout_secs = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }
        match config.get_bool("pretty") {
            Ok(val) => settings.pretty = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }
        match config.get_bool("parallel") {
            Ok(val) => settings.parallel = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }

        Ok(settings)
    }

    /// Reject settings that cannot work at all.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.companies_source.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "companies_source must not be empty".to_string(),
            });
        }
        if self.travels_source.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "travels_source must not be empty".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ApplicationError::Config {
                message: "timeout_secs must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Apply command line overrides (highest precedence).
    pub fn with_overrides(
        mut self,
        companies: Option<String>,
        travels: Option<String>,
        pretty: bool,
    ) -> Self {
        if let Some(c) = companies {
            self.companies_source = expand_location(&c);
        }
        if let Some(t) = travels {
            self.travels_source = expand_location(&t);
        }
        if pretty {
            self.pretty = true;
        }
        self
    }

    /// Render as TOML for display.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
