//! Configuration management utilities.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::model::Segment;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".launchcp/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub launch: Launch,
    #[serde(default)]
    pub segments: Segments,
    #[serde(default)]
    pub workspace: WorkspaceProjects,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launch {
    #[serde(default = "Launch::default_file")]
    pub file: String,
    #[serde(default = "Launch::default_project_attribute")]
    pub project_attribute: String,
    #[serde(default = "Launch::default_log_level")]
    pub log_level: String,
}

impl Launch {
    fn default_file() -> String {
        "launch.json".to_owned()
    }

    fn default_project_attribute() -> String {
        "launchcp.project_name".into()
    }

    fn default_log_level() -> String {
        "warn".into()
    }
}

impl Default for Launch {
    fn default() -> Self {
        Self {
            file: Self::default_file(),
            project_attribute: Self::default_project_attribute(),
            log_level: Self::default_log_level(),
        }
    }
}

/// Per-segment attribute name overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Segments {
    #[serde(default)]
    pub user: SegmentAttributes,
    #[serde(default)]
    pub bootstrap: SegmentAttributes,
}

impl Segments {
    /// Resolve the attribute names used for `segment`.
    pub fn attributes(&self, segment: Segment) -> AttributeNames {
        let overrides = match segment {
            Segment::User => &self.user,
            Segment::Bootstrap => &self.bootstrap,
        };
        let name = |value: &Option<String>, suffix: &str| {
            value
                .clone()
                .unwrap_or_else(|| format!("launchcp.{segment}.{suffix}"))
        };
        AttributeNames {
            defaults: name(&overrides.defaults, "default_classpath"),
            custom: name(&overrides.custom, "custom_classpath"),
            excluded: name(&overrides.excluded, "unchecked"),
            use_default: name(&overrides.use_default, "use_default_classpath"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SegmentAttributes {
    #[serde(default)]
    defaults: Option<String>,
    #[serde(default)]
    custom: Option<String>,
    #[serde(default)]
    excluded: Option<String>,
    #[serde(default)]
    use_default: Option<String>,
}

/// Attribute names one classpath segment reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNames {
    /// Resolver input: the default classpath descriptors.
    pub defaults: String,
    /// Custom entry mementos added by the user.
    pub custom: String,
    /// Identifiers of unchecked entries.
    pub excluded: String,
    /// Whether the segment tracks the default classpath.
    pub use_default: String,
}

impl AttributeNames {
    pub fn for_segment(segment: Segment) -> Self {
        Segments::default().attributes(segment)
    }
}

/// Projects known to the workspace, mapped to their open state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorkspaceProjects {
    #[serde(default)]
    pub projects: BTreeMap<String, bool>,
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    launch_file: Option<String>,
    log_level: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            launch_file: env::var("LAUNCHCP_LAUNCH_FILE").ok(),
            log_level: env::var("LAUNCHCP_LOG").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(launch_file: &str, log_level: &str) -> Self {
        Self {
            launch_file: Some(launch_file.to_owned()),
            log_level: Some(log_level.to_owned()),
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
            tracing::debug!(path = %global_path.display(), "loading user config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            launch: merge_launch(self.launch, other.launch),
            segments: Segments {
                user: merge_segment(self.segments.user, other.segments.user),
                bootstrap: merge_segment(self.segments.bootstrap, other.segments.bootstrap),
            },
            workspace: merge_workspace(self.workspace, other.workspace),
        }
    }
}

fn merge_launch(base: Launch, overlay: Launch) -> Launch {
    Launch {
        file: choose(base.file, overlay.file, Launch::default_file),
        project_attribute: choose(
            base.project_attribute,
            overlay.project_attribute,
            Launch::default_project_attribute,
        ),
        log_level: choose(base.log_level, overlay.log_level, Launch::default_log_level),
    }
}

fn choose(base: String, overlay: String, default_fn: fn() -> String) -> String {
    if overlay != default_fn() {
        overlay
    } else {
        base
    }
}

fn merge_segment(mut base: SegmentAttributes, overlay: SegmentAttributes) -> SegmentAttributes {
    if let Some(value) = overlay.defaults {
        base.defaults = Some(value);
    }
    if let Some(value) = overlay.custom {
        base.custom = Some(value);
    }
    if let Some(value) = overlay.excluded {
        base.excluded = Some(value);
    }
    if let Some(value) = overlay.use_default {
        base.use_default = Some(value);
    }
    base
}

fn merge_workspace(mut base: WorkspaceProjects, overlay: WorkspaceProjects) -> WorkspaceProjects {
    base.projects.extend(overlay.projects);
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("launchcp/config.toml"))
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
    if let Some(file) = env.launch_file {
        config.launch.file = file;
    }
    if let Some(level) = env.log_level {
        config.launch.log_level = level;
    }
    config
}
