//! Project manifest inspection
//!
//! Decides whether a project was built from the scaffold family (it lists
//! the marker dependency) and which scaffold version it was last updated to.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{self, Result};
use crate::scaffold::VersionId;

/// Default marker dependency
pub const DEFAULT_MARKER: &str = "ember-cli";

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = "package.json";

/// Reads the project manifest on behalf of the update engine
pub trait ManifestInspector {
    /// Dependency name identifying a scaffolded project
    fn marker(&self) -> &str;

    /// Manifest file name, for messages
    fn manifest_name(&self) -> &str;

    /// Whether the project at `root` declares the marker dependency
    fn is_scaffolded_project(&self, root: &Path) -> Result<bool>;

    /// Version of the marker dependency declared by the project, if any
    fn scaffold_version(&self, root: &Path) -> Result<Option<VersionId>>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
}

impl PackageManifest {
    fn requirement(&self, name: &str) -> Option<&serde_json::Value> {
        self.dev_dependencies
            .get(name)
            .or_else(|| self.dependencies.get(name))
    }
}

/// Inspector for npm-style `package.json` manifests
#[derive(Debug, Clone)]
pub struct PackageJsonInspector {
    marker: String,
    manifest_file: String,
}

impl PackageJsonInspector {
    pub fn new(marker: impl Into<String>, manifest_file: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            manifest_file: manifest_file.into(),
        }
    }

    /// Load the manifest, `None` when the file does not exist
    fn load(&self, root: &Path) -> Result<Option<PackageManifest>> {
        let path = root.join(&self.manifest_file);
        if !path.is_file() {
            debug!(path = %path.display(), "no manifest");
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            error::config::manifest_read_failed(path.display().to_string(), e.to_string())
        })?;
        let manifest = serde_json::from_str(&content).map_err(|e| {
            error::config::manifest_read_failed(path.display().to_string(), e.to_string())
        })?;
        Ok(Some(manifest))
    }
}

impl Default for PackageJsonInspector {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER, DEFAULT_MANIFEST)
    }
}

impl ManifestInspector for PackageJsonInspector {
    fn marker(&self) -> &str {
        &self.marker
    }

    fn manifest_name(&self) -> &str {
        &self.manifest_file
    }

    fn is_scaffolded_project(&self, root: &Path) -> Result<bool> {
        Ok(self
            .load(root)?
            .is_some_and(|m| m.requirement(&self.marker).is_some()))
    }

    fn scaffold_version(&self, root: &Path) -> Result<Option<VersionId>> {
        let Some(manifest) = self.load(root)? else {
            return Ok(None);
        };
        let Some(requirement) = manifest.requirement(&self.marker).and_then(|v| v.as_str()) else {
            return Ok(None);
        };

        match strip_requirement(requirement) {
            Some(version) => VersionId::parse(version).map(Some),
            None => Ok(None),
        }
    }
}

/// Reduce a version requirement like `^2.11.1` or `~v3.0.0` to a bare version
///
/// Ranges, tags, and URLs yield `None`.
pub fn strip_requirement(requirement: &str) -> Option<&str> {
    let version = requirement
        .trim()
        .trim_start_matches(['^', '~', '='])
        .trim_start_matches('v');

    let plausible = version.chars().next().is_some_and(|c| c.is_ascii_digit())
        && !version.contains(|c: char| c.is_whitespace() || matches!(c, '/' | ':' | '|' | '<' | '>' | '*'));

    plausible.then_some(version)
}
