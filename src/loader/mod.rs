// Asset loading: byte sources, FBX extraction and the background load queue

pub mod document;
pub mod fbx;
pub mod queue;
pub mod source;

use std::future::Future;
use std::path::Path;

use crate::error::LoadError;
use crate::model::LoadedModel;

pub use queue::{AsyncLoadQueue, LoadCompletion, LoadQueue, LoadRequest};
pub use source::AssetSource;

/// Turns an asset path into a model. Implementations run on the tokio
/// runtime, off the event-loop thread.
pub trait AssetLoader: Send + Sync + 'static {
    fn load(&self, path: &str) -> impl Future<Output = Result<LoadedModel, LoadError>> + Send;
}

#[derive(Debug, Clone)]
pub struct FbxLoader {
    source: AssetSource,
}

impl FbxLoader {
    pub fn new(source: AssetSource) -> Self {
        Self { source }
    }
}

impl AssetLoader for FbxLoader {
    async fn load(&self, path: &str) -> Result<LoadedModel, LoadError> {
        let bytes = self.source.read_bytes(path).await?;
        log::debug!("{path}: {} bytes", bytes.len());

        let name = model_name(path);
        tokio::task::spawn_blocking(move || fbx::parse_fbx(&name, &bytes))
            .await
            .map_err(|e| LoadError::Worker(e.to_string()))?
    }
}

fn model_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
