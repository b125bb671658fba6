//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/termgraph/termgraph.toml`
//! 3. Local config: `./.termgraph.toml`, then an explicit `--config` file
//! 4. Environment variables: `TERMGRAPH_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::ROOT_LABEL;

pub const LOCAL_CONFIG_FILE: &str = ".termgraph.toml";

/// Unified configuration for termgraph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory receiving tree.json and distances.json
    pub output_dir: PathBuf,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Skip repeated ontology ids instead of failing
    pub skip_duplicates: bool,
    /// Compile forest and distance matrix concurrently
    pub parallel: bool,
    /// Display name of the synthetic forest root
    pub root_label: String,
    /// Term names dropped before assembly (e.g. known alias records)
    pub exclude: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("termgraph-out"),
            pretty: true,
            skip_duplicates: true,
            parallel: true,
            root_label: ROOT_LABEL.to_string(),
            exclude: Vec::new(),
        }
    }
}

/// Raw settings for intermediate parsing (every field optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub output_dir: Option<PathBuf>,
    pub pretty: Option<bool>,
    pub skip_duplicates: Option<bool>,
    pub parallel: Option<bool>,
    pub root_label: Option<String>,
    pub exclude: Option<Vec<String>>,
}

/// Get the XDG config directory for termgraph.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "termgraph").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("termgraph.toml"))
}

/// Get the path to the local config file in a working directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
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

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Merge term lists with union semantics and negation support.
///
/// - Items from overlay are added to base
/// - Items prefixed with `!` remove the corresponding item from the result
/// - Duplicates are de-duplicated
///
/// # Examples
/// ```ignore
/// merge_terms(&["a", "b"], &["c"])       // → ["a", "b", "c"]
/// merge_terms(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
/// ```
pub fn merge_terms(base: &[String], overlay: &[String]) -> Vec<String> {
    let mut result: HashSet<String> = base.iter().cloned().collect();

    for pattern in overlay {
        if let Some(negated) = pattern.strip_prefix('!') {
            result.remove(negated);
        } else {
            result.insert(pattern.clone());
        }
    }

    // Sorted for deterministic output
    let mut vec: Vec<String> = result.into_iter().collect();
    vec.sort();
    vec
}

impl Settings {
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.output_dir.to_string_lossy().as_ref());
        self.output_dir = PathBuf::from(expanded);
    }

    /// Merge overlay config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - `exclude`: union merge with negation support
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            exclude: overlay
                .exclude
                .as_ref()
                .map(|o| merge_terms(&self.exclude, o))
                .unwrap_or_else(|| self.exclude.clone()),
            ..self.apply_scalars(overlay)
        }
    }

    /// Apply global config onto defaults; `exclude` is replaced, not merged.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            exclude: global
                .exclude
                .clone()
                .unwrap_or_else(|| self.exclude.clone()),
            ..self.apply_scalars(global)
        }
    }

    fn apply_scalars(&self, raw: &RawSettings) -> Self {
        Self {
            output_dir: raw
                .output_dir
                .clone()
                .unwrap_or_else(|| self.output_dir.clone()),
            pretty: raw.pretty.unwrap_or(self.pretty),
            skip_duplicates: raw.skip_duplicates.unwrap_or(self.skip_duplicates),
            parallel: raw.parallel.unwrap_or(self.parallel),
            root_label: raw
                .root_label
                .clone()
                .unwrap_or_else(|| self.root_label.clone()),
            exclude: self.exclude.clone(),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `work_dir` - Directory searched for `.termgraph.toml`
    /// * `extra` - Explicit config file, applied after the local one
    ///
    /// # Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local / explicit file: `exclude` UNIONS with negation support
    /// - Any → Env vars: REPLACE
    pub fn load(work_dir: Option<&Path>, extra: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), work_dir, extra)
    }

    /// [`Settings::load`] with an explicit global config file; `None` skips
    /// the global layer.
    pub fn load_from(
        global: Option<&Path>,
        work_dir: Option<&Path>,
        extra: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                let raw = load_raw_settings(global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = work_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = extra {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply TERMGRAPH_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TERMGRAPH")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("exclude")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("output_dir") {
            settings.output_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_bool("pretty") {
            settings.pretty = val;
        }
        if let Ok(val) = config.get_bool("skip_duplicates") {
            settings.skip_duplicates = val;
        }
        if let Ok(val) = config.get_bool("parallel") {
            settings.parallel = val;
        }
        if let Ok(val) = config.get_string("root_label") {
            settings.root_label = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("exclude") {
            settings.exclude = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# termgraph configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/termgraph/termgraph.toml
#   Local:  ./.termgraph.toml, then --config <file>
#   Env:    TERMGRAPH_* environment variables
#
# Local files UNION `exclude` with the global list; "!term" removes an
# inherited entry.

# output_dir = "termgraph-out"
# pretty = true
# skip_duplicates = true
# parallel = true
# root_label = "root"
# exclude = ["Deprecated"]
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
