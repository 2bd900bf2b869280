use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while bringing the engine up. All of these
/// are fatal: the asset set and shader sources are fixed at build time, so a
/// failure here means the installation is broken, not that the engine should
/// retry or degrade. Nothing render-time produces an `EngineError`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load asset {path:?}")]
    AssetLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("malformed mesh data at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("face references missing data at line {line}: {message}")]
    MissingFaceData { line: usize, message: String },

    #[error("failed to compile shader {path:?}: {log}")]
    ShaderCompile { path: PathBuf, log: String },

    #[error("failed to link shader program: {log}")]
    ShaderLink { log: String },
}

impl EngineError {
    pub fn asset_load(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        EngineError::AssetLoad {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
