use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use foundation::AssetId;
use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use transition::{AssetLoader, LoadError};

/// Decoded texture as far as the headless viewer cares: its identity and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub asset: AssetId,
    pub bytes: usize,
    /// Image container detected from the file header.
    pub format: ImageFormat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Unknown,
}

impl ImageFormat {
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            ImageFormat::Jpeg
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            ImageFormat::Png
        } else {
            ImageFormat::Unknown
        }
    }
}

/// Reads textures from a directory, optionally delaying selected assets to
/// mimic slow downloads.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
    default_latency: Duration,
    latency: BTreeMap<String, Duration>,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            default_latency: Duration::ZERO,
            latency: BTreeMap::new(),
        }
    }

    pub fn with_default_latency(mut self, latency: Duration) -> Self {
        self.default_latency = latency;
        self
    }

    /// Delay loads whose id contains `pattern`.
    pub fn with_latency(mut self, pattern: impl Into<String>, latency: Duration) -> Self {
        self.latency.insert(pattern.into(), latency);
        self
    }

    fn latency_for(&self, asset: &AssetId) -> Duration {
        self.latency
            .iter()
            .filter(|(pattern, _)| asset.as_str().contains(pattern.as_str()))
            .map(|(_, d)| *d)
            .max()
            .unwrap_or(self.default_latency)
    }
}

impl AssetLoader for FsLoader {
    type Handle = Rc<Texture>;

    fn load(&self, asset: &AssetId) -> LocalBoxFuture<'static, Result<Self::Handle, LoadError>> {
        let asset = asset.clone();
        let latency = self.latency_for(&asset);
        let path = if asset.as_str().contains("://") {
            None
        } else {
            Some(self.root.join(asset.as_str().trim_start_matches('/')))
        };

        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let Some(path) = path else {
                return Err(LoadError::Io {
                    asset,
                    message: "remote assets are not available offline".to_string(),
                });
            };

            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(LoadError::NotFound { asset });
                }
                Err(e) => {
                    return Err(LoadError::Io {
                        asset,
                        message: e.to_string(),
                    });
                }
            };

            if bytes.is_empty() {
                return Err(LoadError::Decode {
                    asset,
                    message: "empty image".to_string(),
                });
            }

            Ok(Rc::new(Texture {
                format: ImageFormat::sniff(&bytes),
                bytes: bytes.len(),
                asset,
            }))
        }
        .boxed_local()
    }
}
