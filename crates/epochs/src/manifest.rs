use std::fs;
use std::path::{Path, PathBuf};

use foundation::{Age, AssetId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::resolver::{ResolutionPolicy, TimelineResolver};
use crate::slider::SliderRange;
use crate::table::{EpochEntry, EpochTable, TableError};

pub const EPOCH_MANIFEST_VERSION: &str = "1.0";

/// On-disk description of a timeline: its epochs, slider and policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpochManifest {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Prefix joined onto relative asset paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub policy: ResolutionPolicy,
    #[serde(default)]
    pub slider: SliderRange,
    pub epochs: Vec<ManifestEpoch>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestEpoch {
    pub age: i32,
    pub asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug)]
pub enum ManifestError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Serialize(serde_json::Error),
    UnsupportedVersion(String),
    Table(TableError),
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestError::Io { path, source } => {
                write!(f, "failed to read manifest {}: {source}", path.display())
            }
            ManifestError::Parse(e) => write!(f, "failed to parse manifest: {e}"),
            ManifestError::Serialize(e) => write!(f, "failed to serialize manifest: {e}"),
            ManifestError::UnsupportedVersion(v) => write!(
                f,
                "unsupported manifest version {v} (expected {EPOCH_MANIFEST_VERSION})"
            ),
            ManifestError::Table(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManifestError::Io { source, .. } => Some(source),
            ManifestError::Parse(e) | ManifestError::Serialize(e) => Some(e),
            ManifestError::Table(e) => Some(e),
            ManifestError::UnsupportedVersion(_) => None,
        }
    }
}

impl EpochManifest {
    pub fn new(epochs: Vec<ManifestEpoch>) -> Self {
        Self {
            version: EPOCH_MANIFEST_VERSION.to_string(),
            name: None,
            base_url: None,
            policy: ResolutionPolicy::default(),
            slider: SliderRange::default(),
            epochs,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ManifestError> {
        let manifest: EpochManifest = serde_json::from_str(json).map_err(ManifestError::Parse)?;
        if manifest.version != EPOCH_MANIFEST_VERSION {
            return Err(ManifestError::UnsupportedVersion(manifest.version));
        }
        Ok(manifest)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let manifest = Self::from_json_str(&json)?;
        debug!(
            path = %path.display(),
            epochs = manifest.epochs.len(),
            policy = %manifest.policy,
            "loaded epoch manifest"
        );
        Ok(manifest)
    }

    pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(ManifestError::Serialize)
    }

    /// Full asset id for a manifest path, honoring `base_url`.
    pub fn asset_id(&self, asset: &str) -> AssetId {
        match self.base_url.as_deref() {
            Some(base) if !base.is_empty() && !is_absolute(asset) => {
                AssetId::new(format!("{}/{}", base.trim_end_matches('/'), asset))
            }
            _ => AssetId::new(asset),
        }
    }

    pub fn table(&self) -> Result<EpochTable, ManifestError> {
        EpochTable::new(self.epochs.iter().map(|e| {
            let entry = EpochEntry::new(Age(e.age), self.asset_id(&e.asset));
            match &e.name {
                Some(name) => entry.with_name(name.clone()),
                None => entry,
            }
        }))
        .map_err(ManifestError::Table)
    }

    pub fn resolver(&self) -> Result<TimelineResolver, ManifestError> {
        Ok(TimelineResolver::new(self.table()?, self.policy))
    }
}

fn is_absolute(asset: &str) -> bool {
    asset.starts_with('/') || asset.contains("://")
}
