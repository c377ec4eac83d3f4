use confetti_platform::ShaderError;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("renderer is not initialized")]
    NotInitialized,

    #[error("shader initialization failed: {0}")]
    Initialization(#[from] ShaderError),

    #[error("failed to load shader {name}: {source}")]
    ShaderSource {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("graphics device error: {0}")]
    Device(#[source] BoxError),

    #[error("draw contract violated: {0}")]
    ContractViolation(&'static str),
}

pub type Result<T> = std::result::Result<T, RenderError>;
