//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::app::coordinator::MiningStrategy;
use crate::app::selection::SelectionMode;
use crate::mine::producer::ProducerOptions;
use crate::synth::SynthesisConfig;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".pomine/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub mining: Mining,
    #[serde(default)]
    pub producer: Producer,
    #[serde(default)]
    pub export: Export,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "Defaults::default_mode")]
    pub mode: String,
    #[serde(default = "Defaults::default_strategy")]
    pub strategy: String,
    #[serde(default = "Defaults::default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Defaults {
    fn default_mode() -> String {
        "threshold-overrides".into()
    }

    fn default_strategy() -> String {
        "incremental".into()
    }

    fn default_debounce_ms() -> u64 {
        300
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            mode: Self::default_mode(),
            strategy: Self::default_strategy(),
            debounce_ms: Self::default_debounce_ms(),
        }
    }
}

/// Region synthesis switches. Unset fields inherit from lower layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mining {
    #[serde(default)]
    skip_connectivity_check: Option<bool>,
    #[serde(default)]
    one_bound_regions: Option<bool>,
    #[serde(default)]
    no_arc_weights: Option<bool>,
}

impl Mining {
    pub fn skip_connectivity_check(&self) -> bool {
        self.skip_connectivity_check.unwrap_or(true)
    }

    pub fn one_bound_regions(&self) -> bool {
        self.one_bound_regions.unwrap_or(true)
    }

    pub fn no_arc_weights(&self) -> bool {
        self.no_arc_weights.unwrap_or(false)
    }
}

impl Default for Mining {
    fn default() -> Self {
        Self {
            skip_connectivity_check: Some(true),
            one_bound_regions: Some(true),
            no_arc_weights: Some(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Producer {
    #[serde(default = "Producer::default_look_ahead")]
    pub look_ahead: usize,
    #[serde(default)]
    pub distinguish_same_labels: bool,
    #[serde(default)]
    pub discard_prefixes: bool,
}

impl Producer {
    fn default_look_ahead() -> usize {
        1
    }
}

impl Default for Producer {
    fn default() -> Self {
        Self {
            look_ahead: Self::default_look_ahead(),
            distinguish_same_labels: false,
            discard_prefixes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    #[serde(default = "Export::default_directory")]
    pub directory: String,
    #[serde(default)]
    pub auto_export: bool,
    #[serde(default)]
    pub copy_to_clipboard: bool,
}

impl Export {
    fn default_directory() -> String {
        "exports".into()
    }
}

impl Default for Export {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
            auto_export: false,
            copy_to_clipboard: false,
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    mode: Option<String>,
    strategy: Option<String>,
    export_dir: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            mode: env::var("POMINE_MODE").ok(),
            strategy: env::var("POMINE_STRATEGY").ok(),
            export_dir: env::var("POMINE_EXPORT_DIR").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(mode: &str, strategy: &str) -> Self {
        Self {
            mode: Some(mode.to_owned()),
            strategy: Some(strategy.to_owned()),
            export_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            mining: merge_mining(self.mining, other.mining),
            producer: merge_producer(self.producer, other.producer),
            export: merge_export(self.export, other.export),
        }
    }

    /// Parsed selection mode from the `defaults` section.
    pub fn selection_mode(&self) -> Result<SelectionMode> {
        self.defaults
            .mode
            .parse()
            .with_context(|| format!("invalid defaults.mode '{}'", self.defaults.mode))
    }

    /// Parsed mining strategy from the `defaults` section.
    pub fn mining_strategy(&self) -> Result<MiningStrategy> {
        self.defaults
            .strategy
            .parse()
            .with_context(|| format!("invalid defaults.strategy '{}'", self.defaults.strategy))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.defaults.debounce_ms)
    }

    pub fn synthesis_config(&self) -> SynthesisConfig {
        SynthesisConfig {
            skip_connectivity_check: self.mining.skip_connectivity_check(),
            one_bound_regions: self.mining.one_bound_regions(),
            no_arc_weights: self.mining.no_arc_weights(),
        }
    }

    pub fn producer_options(&self) -> ProducerOptions {
        ProducerOptions {
            look_ahead: self.producer.look_ahead,
            distinguish_same_labels: self.producer.distinguish_same_labels,
            discard_prefixes: self.producer.discard_prefixes,
        }
    }
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        mode: if overlay.mode != Defaults::default_mode() {
            overlay.mode
        } else {
            base.mode
        },
        strategy: if overlay.strategy != Defaults::default_strategy() {
            overlay.strategy
        } else {
            base.strategy
        },
        debounce_ms: if overlay.debounce_ms != Defaults::default_debounce_ms() {
            overlay.debounce_ms
        } else {
            base.debounce_ms
        },
    }
}

fn merge_mining(mut base: Mining, overlay: Mining) -> Mining {
    if let Some(value) = overlay.skip_connectivity_check {
        base.skip_connectivity_check = Some(value);
    }
    if let Some(value) = overlay.one_bound_regions {
        base.one_bound_regions = Some(value);
    }
    if let Some(value) = overlay.no_arc_weights {
        base.no_arc_weights = Some(value);
    }
    base
}

fn merge_producer(base: Producer, overlay: Producer) -> Producer {
    Producer {
        look_ahead: if overlay.look_ahead != Producer::default_look_ahead() {
            overlay.look_ahead
        } else {
            base.look_ahead
        },
        distinguish_same_labels: overlay.distinguish_same_labels || base.distinguish_same_labels,
        discard_prefixes: overlay.discard_prefixes || base.discard_prefixes,
    }
}

fn merge_export(base: Export, overlay: Export) -> Export {
    Export {
        directory: if overlay.directory != Export::default_directory() {
            overlay.directory
        } else {
            base.directory
        },
        auto_export: overlay.auto_export || base.auto_export,
        copy_to_clipboard: overlay.copy_to_clipboard || base.copy_to_clipboard,
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("pomine/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(mode) = env.mode {
        config.defaults.mode = mode;
    }
    if let Some(strategy) = env.strategy {
        config.defaults.strategy = strategy;
    }
    if let Some(export_dir) = env.export_dir {
        config.export.directory = export_dir;
    }
    config
}
