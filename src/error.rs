use thiserror::Error;

/// Fatal failures of the schema engine. Absent graph entries and name
/// collisions are not errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The upstream analysis produced a raw name with no terminal segment.
    #[error("cannot derive a definition name from type `{raw_name}`")]
    MalformedIdentifier { raw_name: String },
}

/// Problems loading the project dump / type graph.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("at JSON path {path} → {message}")]
    Decode { path: String, message: String },
    #[error("JSON pointer `{pointer}` does not select anything")]
    PointerNotFound { pointer: String },
    #[error("type `{raw_name}` is described more than once")]
    DuplicateType { raw_name: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown swagger scheme `{0}`")]
    UnknownScheme(String),
    #[error("swaggerTagsPathOffset must be a positive integer, got `{0}`")]
    InvalidTagsOffset(String),
}

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("failed to read JSON patch: {0}")]
    Read(#[source] std::io::Error),
    #[error("invalid JSON patch: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to apply JSON patch: {0}")]
    Apply(#[from] json_patch::PatchError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error("could not write swagger output: {0}")]
    Serialize(#[source] serde_json::Error),
}
