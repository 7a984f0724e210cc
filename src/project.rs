//! Analyzed API surface: resources, their methods and the type graph.
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::ModelError;
use crate::model::{TypeGraph, TypeIdentifier};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub base_path: String,
    /// Resource path (no leading `/`) → methods served there.
    #[serde(default)]
    pub resources: BTreeMap<String, Vec<ResourceMethod>>,
    #[serde(default)]
    pub types: TypeGraph,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMethod {
    pub method: HttpMethod,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub request_media_types: BTreeSet<String>,
    #[serde(default)]
    pub response_media_types: BTreeSet<String>,
    #[serde(default)]
    pub parameters: Vec<MethodParameter>,
    #[serde(default)]
    pub request_body: Option<TypeIdentifier>,
    #[serde(default)]
    pub request_body_description: Option<String>,
    /// Status code → response.
    #[serde(default)]
    pub responses: BTreeMap<u16, Response>,
    #[serde(default)]
    pub deprecated: bool,
}

/// Ordering follows declaration order, which is also the output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Head,
    Options,
    Patch,
}

impl HttpMethod {
    pub fn as_lowercase(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
            HttpMethod::Patch => "patch",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodParameter {
    pub name: String,
    #[serde(rename = "in")]
    pub kind: ParameterType,
    #[serde(rename = "type")]
    pub type_id: TypeIdentifier,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Path,
    Header,
    Query,
    Form,
    Cookie,
    Matrix,
    Bean,
}

impl ParameterType {
    /// Swagger `in` value; `None` for kinds swagger 2.0 cannot express.
    pub fn swagger_location(self) -> Option<&'static str> {
        match self {
            ParameterType::Query => Some("query"),
            ParameterType::Path => Some("path"),
            ParameterType::Header => Some("header"),
            ParameterType::Form => Some("formData"),
            ParameterType::Cookie | ParameterType::Matrix | ParameterType::Bean => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub headers: BTreeSet<String>,
    #[serde(default)]
    pub body: Option<TypeIdentifier>,
}

impl Project {
    pub fn from_json_str(src: &str, json_pointer: Option<&str>) -> Result<Self, ModelError> {
        crate::path_de::from_str_at_pointer(src, json_pointer)
    }

    pub fn load(path: &Path, json_pointer: Option<&str>) -> anyhow::Result<Self> {
        use anyhow::Context;
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(&source, json_pointer)
            .with_context(|| format!("failed to load project from {}", path.display()))
    }

    #[cfg(test)]
    pub fn methods(&self, resource: &str) -> &[ResourceMethod] {
        self.resources.get(resource).map(Vec::as_slice).unwrap_or_default()
    }
}
