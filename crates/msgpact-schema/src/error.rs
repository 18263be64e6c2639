/// Errors that can occur while building schema nodes.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A leaf schema could not be compiled.
    #[error("failed to compile leaf schema: {0}")]
    CompileFailed(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
