use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ModelError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, ModelError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(located)
}

pub fn from_value_with_path<T: DeserializeOwned>(value: Value) -> Result<T, ModelError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(located)
}

/// Parse `src`, optionally narrow it to the node at `json_pointer`, then decode.
pub fn from_str_at_pointer<T: DeserializeOwned>(src: &str, json_pointer: Option<&str>) -> Result<T, ModelError> {
    let Some(pointer) = json_pointer else {
        return from_str_with_path(src);
    };
    let mut document = serde_json::from_str::<Value>(src)?;
    let node = document
        .pointer_mut(pointer)
        .map(Value::take)
        .ok_or_else(|| ModelError::PointerNotFound { pointer: pointer.to_owned() })?;
    from_value_with_path(node)
}

fn located<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> ModelError {
    ModelError::Decode { path: err.path().to_string(), message: err.into_inner().to_string() }
}
