//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. Built-in defaults
//! 2. User config: `~/.config/phado/config.toml` (XDG) or platform config dir
//! 3. Project config: `.phado.toml`
//! 4. Explicit file passed with `--config`
//! 5. Environment variables: `PHADO_*`, nested with `__`
//!    (e.g. `PHADO_LINEAGE__FOUNDER_ID=START`)
//!
//! # Example
//!
//! ```toml
//! [lineage]
//! family_name = "Tộc Đặng Non Nước"
//! founder_id = "START"
//! clan_surname = "Đặng"
//!
//! [propagation]
//! max_passes = 20
//!
//! [validation]
//! placeholder_names = ["A", "B", "C", "Y", "Vợ"]
//! implausible_below = 1
//!
//! [export]
//! dataset_tree_depth = 5
//! tree_depth = 14
//! ```

use std::ops::Deref;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lineage: LineageConfig,
    #[serde(default)]
    pub propagation: PropagationConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// The family line being tracked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageConfig {
    /// Display name of the family, written into export metadata.
    pub family_name: String,
    /// Identifier of the founder anchoring generation numbering.
    pub founder_id: String,
    /// Surname fragment identifying clan members.
    ///
    /// Maternal generation inheritance and orphan detection only apply to
    /// individuals whose surname contains this text.
    pub clan_surname: String,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            family_name: "Tộc Đặng Non Nước".to_string(),
            founder_id: DEFAULT_FOUNDER_ID.to_string(),
            clan_surname: "Đặng".to_string(),
        }
    }
}

/// Generation propagation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Upper bound on full passes before giving up on a fixed point.
    pub max_passes: usize,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Anomaly detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Check child/father generation consistency.
    pub check_generation_mismatch: bool,
    /// Check for clan members without any family link.
    pub check_orphans: bool,
    /// Check for empty or placeholder given names.
    pub check_names: bool,
    /// Given names that are placeholders rather than real names.
    pub placeholder_names: Vec<String>,
    /// Generations below this value get a root-cause trace.
    pub implausible_below: i32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_generation_mismatch: true,
            check_orphans: true,
            check_names: true,
            placeholder_names: ["A", "B", "C", "Y", "Vợ"]
                .into_iter()
                .map(String::from)
                .collect(),
            implausible_below: 1,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Depth bound of the tree embedded in the full dataset.
    pub dataset_tree_depth: usize,
    /// Depth bound of the standalone tree file.
    pub tree_depth: usize,
    /// Orphans listed in the text report before truncating.
    pub orphan_report_limit: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dataset_tree_depth: 5,
            tree_depth: 14,
            orphan_report_limit: 30,
        }
    }
}

/// Default founder identifier used by FamilyScript exports.
pub const DEFAULT_FOUNDER_ID: &str = "START";

/// Default propagation pass cap.
pub const DEFAULT_MAX_PASSES: usize = 20;

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = ".phado.toml";

impl Config {
    /// Load config with layered resolution (defaults → user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Load config, layering an explicit file above the project config.
    pub fn load_with(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()))
            // Layer 1: User config
            .merge(Toml::file(Self::user_config_path()))
            // Layer 2: Project config
            .merge(Toml::file(PROJECT_CONFIG_FILE));

        // Layer 3: Explicit config file
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 4: Environment variables (highest priority)
        figment
            .merge(Env::prefixed("PHADO_").split("__"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// User config path: ~/.config/phado/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("phado").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("phado").join("config.toml"))
            .unwrap_or_default()
    }
}
