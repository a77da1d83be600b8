use std::{collections::BTreeMap, fmt, io, path::PathBuf, sync::Arc};

/// Application-level error: a stable key, a few named arguments and the
/// chain of underlying causes.
#[derive(Debug, Clone)]
pub struct VisError {
    pub key: &'static str,
    pub args: BTreeMap<&'static str, String>,
    pub causes: Vec<VisCause>,
}

#[derive(Debug, Clone)]
pub enum VisCause {
    Std(Arc<dyn std::error::Error + Send + Sync>),
}

impl VisError {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            args: BTreeMap::new(),
            causes: Vec::new(),
        }
    }

    pub fn with_arg(mut self, k: &'static str, v: impl ToString) -> Self {
        self.args.insert(k, v.to_string());
        self
    }

    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(VisCause::Std(Arc::new(cause)));
        self
    }
}

impl fmt::Display for VisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.key)?;
        let mut first = true;
        for (k, v) in &self.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")?;
        for cause in &self.causes {
            let VisCause::Std(e) = cause;
            write!(f, ": {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for VisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes.first().map(|c| match c {
            VisCause::Std(e) => e.as_ref() as &(dyn std::error::Error + 'static),
        })
    }
}

impl From<wgpu::CreateSurfaceError> for VisError {
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        VisError::new("wgpu::CreateSurfaceError").push_std(err)
    }
}

impl From<wgpu::RequestAdapterError> for VisError {
    fn from(err: wgpu::RequestAdapterError) -> Self {
        VisError::new("wgpu::RequestAdapterError").push_std(err)
    }
}

impl From<wgpu::RequestDeviceError> for VisError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        VisError::new("wgpu::RequestDeviceError").push_std(err)
    }
}

impl From<winit::error::EventLoopError> for VisError {
    fn from(err: winit::error::EventLoopError) -> Self {
        VisError::new("winit::error::EventLoopError").push_std(err)
    }
}

impl From<winit::error::OsError> for VisError {
    fn from(err: winit::error::OsError) -> Self {
        VisError::new("winit::error::OsError").push_std(err)
    }
}

/// Why an asset could not be turned into a model.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed FBX: {0}")]
    Parse(String),
    #[error("unsupported FBX version {0}")]
    Unsupported(String),
    #[error("loader task failed: {0}")]
    Worker(String),
}

/// The one failure the animation controller reports: the asset at `path`
/// did not load. The previously resident model stays on screen.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to load {path}: {cause}")]
pub struct LoadFailed {
    pub path: String,
    #[source]
    pub cause: Arc<LoadError>,
}

impl LoadFailed {
    pub fn new(path: impl Into<String>, cause: LoadError) -> Self {
        Self {
            path: path.into(),
            cause: Arc::new(cause),
        }
    }
}
