//! Run configuration
//!
//! Two layers:
//! - [`ConfigFile`]: optional `scaffold-update.yaml` holding generator and
//!   marker settings that rarely change between runs
//! - [`UpdateConfig`]: the immutable value one update run is driven by,
//!   assembled by the CLI from the file, flags, and environment
//!
//! The library never reads environment variables or the current directory
//! itself; everything arrives through [`UpdateConfig`].

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{self, Result, UpdateError};
use crate::manifest::{DEFAULT_MANIFEST, DEFAULT_MARKER};
use crate::scaffold::{CommandGenerator, ScaffoldGenerator, TemplateDirGenerator, VersionId};

/// Config file looked up in the project root
pub const CONFIG_FILE_NAME: &str = "scaffold-update.yaml";

/// How scaffold output for a version is produced
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorConfig {
    /// Pre-rendered trees in `<path>/<version>/`
    TemplateDir { path: PathBuf },
    /// External program; `{version}` and `{output}` in `args` are substituted
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl GeneratorConfig {
    /// Build the generator collaborator
    pub fn build(&self) -> Box<dyn ScaffoldGenerator> {
        match self {
            GeneratorConfig::TemplateDir { path } => Box::new(TemplateDirGenerator::new(path)),
            GeneratorConfig::Command { program, args } => {
                Box::new(CommandGenerator::new(program.clone(), args.clone()))
            }
        }
    }

    /// Resolve a relative template directory against `base`
    fn resolved_against(self, base: &Path) -> Self {
        match self {
            GeneratorConfig::TemplateDir { path } if path.is_relative() => {
                GeneratorConfig::TemplateDir {
                    path: base.join(path),
                }
            }
            other => other,
        }
    }
}

/// Contents of `scaffold-update.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub generator: Option<GeneratorConfig>,

    /// Marker dependency name
    #[serde(default)]
    pub marker: Option<String>,

    /// Manifest file name
    #[serde(default)]
    pub manifest: Option<String>,
}

impl ConfigFile {
    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

/// Locate the config file for a project
///
/// The project-level file wins over the user-level one in
/// `<config dir>/scaffold-update/config.yaml`.
pub fn find_config_file(project_root: &Path) -> Option<PathBuf> {
    let local = project_root.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("scaffold-update").join("config.yaml"))
        .filter(|path| path.is_file())
}

/// Load a config file
///
/// Relative template directories are resolved against the file's directory.
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| error::config::read_failed(path.display().to_string(), e.to_string()))?;

    let mut config = ConfigFile::from_yaml(&content).map_err(|e| match e {
        UpdateError::ConfigParseFailed { reason, .. } => {
            error::config::parse_failed(path.display().to_string(), reason)
        }
        other => other,
    })?;

    if let Some(base) = path.parent() {
        config.generator = config.generator.map(|g| g.resolved_against(base));
    }

    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Immutable configuration for one update run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateConfig {
    project_root: PathBuf,
    from: Option<VersionId>,
    to: VersionId,
    marker: String,
    manifest: String,
    generator: Option<GeneratorConfig>,
    dry_run: bool,
}

impl UpdateConfig {
    /// Start a configuration with defaults for everything but the essentials
    pub fn builder(project_root: impl Into<PathBuf>, to: VersionId) -> UpdateConfigBuilder {
        UpdateConfigBuilder {
            config: UpdateConfig {
                project_root: project_root.into(),
                from: None,
                to,
                marker: DEFAULT_MARKER.to_string(),
                manifest: DEFAULT_MANIFEST.to_string(),
                generator: None,
                dry_run: false,
            },
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Explicit start version, `None` to detect it from the manifest
    pub fn from(&self) -> Option<&VersionId> {
        self.from.as_ref()
    }

    pub fn to(&self) -> &VersionId {
        &self.to
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn manifest(&self) -> &str {
        &self.manifest
    }

    pub fn generator(&self) -> Option<&GeneratorConfig> {
        self.generator.as_ref()
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Builder for [`UpdateConfig`]
#[derive(Debug, Clone)]
pub struct UpdateConfigBuilder {
    config: UpdateConfig,
}

impl UpdateConfigBuilder {
    pub fn from(mut self, from: Option<VersionId>) -> Self {
        self.config.from = from;
        self
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.config.marker = marker.into();
        self
    }

    pub fn manifest(mut self, manifest: impl Into<String>) -> Self {
        self.config.manifest = manifest.into();
        self
    }

    pub fn generator(mut self, generator: GeneratorConfig) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Apply settings from a config file; values already set by flags win
    ///
    /// Call before the flag setters so flags override the file.
    pub fn apply_file(mut self, file: &ConfigFile) -> Self {
        if let Some(generator) = &file.generator {
            self.config.generator = Some(generator.clone());
        }
        if let Some(marker) = &file.marker {
            self.config.marker = marker.clone();
        }
        if let Some(manifest) = &file.manifest {
            self.config.manifest = manifest.clone();
        }
        self
    }

    pub fn build(self) -> UpdateConfig {
        self.config
    }
}
