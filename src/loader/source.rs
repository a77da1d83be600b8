use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// Where asset paths are resolved: a directory on disk, or an HTTP base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Local(PathBuf),
    Remote(String),
}

/// A single asset location after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    File(PathBuf),
    Url(String),
}

impl AssetSource {
    pub fn resolve(&self, path: &str) -> AssetLocation {
        if is_url(path) {
            return AssetLocation::Url(path.to_string());
        }

        match self {
            AssetSource::Local(root) => {
                let p = Path::new(path);
                if p.is_absolute() {
                    AssetLocation::File(p.to_path_buf())
                } else {
                    AssetLocation::File(root.join(p))
                }
            }
            AssetSource::Remote(base) => {
                let normalized = path.replace('\\', "/");
                let mut relative = normalized.as_str();
                while let Some(rest) = relative.strip_prefix("../") {
                    relative = rest;
                }
                let relative = relative.trim_start_matches("./").trim_start_matches('/');
                let url = format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    relative.replace(' ', "%20")
                );
                AssetLocation::Url(url)
            }
        }
    }

    pub async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        match self.resolve(path) {
            AssetLocation::File(file) => load_from_file(&file).await,
            AssetLocation::Url(url) => download(&url).await,
        }
    }
}

fn is_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

pub async fn load_from_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub async fn download(url: &str) -> Result<Vec<u8>, LoadError> {
    let response = reqwest::get(url).await.map_err(|source| LoadError::Network {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let bytes = response.bytes().await.map_err(|source| LoadError::Network {
        url: url.to_string(),
        source,
    })?;
    Ok(bytes.to_vec())
}
