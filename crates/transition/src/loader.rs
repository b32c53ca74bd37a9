use foundation::AssetId;
use futures_util::future::LocalBoxFuture;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    NotFound { asset: AssetId },
    Io { asset: AssetId, message: String },
    Decode { asset: AssetId, message: String },
    /// The loader went away before answering.
    Unavailable { asset: AssetId },
}

impl LoadError {
    pub fn asset(&self) -> &AssetId {
        match self {
            LoadError::NotFound { asset }
            | LoadError::Io { asset, .. }
            | LoadError::Decode { asset, .. }
            | LoadError::Unavailable { asset } => asset,
        }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::NotFound { asset } => write!(f, "asset not found: {asset}"),
            LoadError::Io { asset, message } => write!(f, "failed to read {asset}: {message}"),
            LoadError::Decode { asset, message } => {
                write!(f, "failed to decode {asset}: {message}")
            }
            LoadError::Unavailable { asset } => write!(f, "loader unavailable for {asset}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Asynchronous source of decoded assets.
///
/// Loads are fire-and-forget: there is no cancellation, and completions may
/// arrive in any order. Futures run on the caller's single-threaded loop, so
/// they need not be `Send`.
pub trait AssetLoader {
    /// Opaque decoded asset handed to the render target.
    type Handle: 'static;

    fn load(&self, asset: &AssetId) -> LocalBoxFuture<'static, Result<Self::Handle, LoadError>>;
}
