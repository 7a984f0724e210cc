//! Post-render RFC 6902 JSON Patch applied to the finished swagger document.
use std::path::Path;

use serde_json::Value;

use crate::error::PatchError;

#[derive(Debug, Clone)]
pub struct JsonPatch {
    operations: json_patch::Patch,
}

impl JsonPatch {
    /// Parse a JSON Patch array, e.g. `[{"op": "remove", "path": "/host"}]`.
    pub fn from_json_str(src: &str) -> Result<Self, PatchError> {
        let operations = serde_json::from_str::<json_patch::Patch>(src).map_err(PatchError::Parse)?;
        Ok(Self { operations })
    }

    pub fn from_file(path: &Path) -> Result<Self, PatchError> {
        let src = std::fs::read_to_string(path).map_err(PatchError::Read)?;
        Self::from_json_str(&src)
    }

    pub fn len(&self) -> usize {
        self.operations.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.0.is_empty()
    }

    /// Patched copy of `document`; the input is left untouched on failure.
    pub fn apply(&self, document: &Value) -> Result<Value, PatchError> {
        let mut patched = document.clone();
        json_patch::patch(&mut patched, &self.operations.0)?;
        Ok(patched)
    }
}
