//! Type graph handed over by the analysis stage.
//!
//! Raw type names are JVM-descriptor style (`Lcom/acme/User;`, `J`, ...).
//! Nothing here is mutated once loaded; the schema engine only reads it.
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Raw names starting with this marker denote dynamic (generic JSON) types.
pub const DYNAMIC_TYPE_PREFIX: &str = "$";

// ————————————————————————————————————————————————————————————————————————————
// IDENTIFIERS
// ————————————————————————————————————————————————————————————————————————————

/// Opaque key naming a type. Equality and hashing only look at the raw name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "IdentifierRepr", into = "IdentifierRepr")]
pub struct TypeIdentifier {
    raw_name: String,
    dynamic: bool,
}

/// Wire form: either a bare raw name or `{"rawName": .., "dynamic": ..}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum IdentifierRepr {
    Name(String),
    #[serde(rename_all = "camelCase")]
    Full {
        raw_name: String,
        #[serde(default)]
        dynamic: bool,
    },
}

impl From<IdentifierRepr> for TypeIdentifier {
    fn from(repr: IdentifierRepr) -> Self {
        match repr {
            IdentifierRepr::Name(raw_name) => Self::new(raw_name),
            IdentifierRepr::Full { raw_name, dynamic } => Self { raw_name, dynamic },
        }
    }
}

impl From<TypeIdentifier> for IdentifierRepr {
    fn from(id: TypeIdentifier) -> Self {
        if id.dynamic {
            IdentifierRepr::Full { raw_name: id.raw_name, dynamic: true }
        } else {
            IdentifierRepr::Name(id.raw_name)
        }
    }
}

impl TypeIdentifier {
    pub fn new(raw_name: impl Into<String>) -> Self {
        Self { raw_name: raw_name.into(), dynamic: false }
    }

    /// A dynamic identifier; the raw name gets the dynamic marker if it lacks one.
    pub fn dynamic(name: impl Into<String>) -> Self {
        let name = name.into();
        let raw_name = if name.starts_with(DYNAMIC_TYPE_PREFIX) {
            name
        } else {
            format!("{DYNAMIC_TYPE_PREFIX}{name}")
        };
        Self { raw_name, dynamic: true }
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic || self.raw_name.starts_with(DYNAMIC_TYPE_PREFIX)
    }

    /// Terminal path segment of the raw name with the trailing `;` dropped.
    ///
    /// `None` when nothing is left, e.g. for `""` or `"com/acme/;"`.
    pub fn short_name(&self) -> Option<&str> {
        let tail = match self.raw_name.rfind('/') {
            Some(slash) => &self.raw_name[slash + 1..],
            None => self.raw_name.as_str(),
        };
        let tail = tail.strip_suffix(';').unwrap_or(tail);
        (!tail.is_empty()).then_some(tail)
    }
}

impl PartialEq for TypeIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.raw_name == other.raw_name
    }
}

impl Eq for TypeIdentifier {}

impl Hash for TypeIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw_name.hash(state);
    }
}

impl std::fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw_name)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// REPRESENTATIONS
// ————————————————————————————————————————————————————————————————————————————

/// Shape bound to a type identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeRepresentation {
    /// Object with named properties, in declaration order.
    Concrete {
        identifier: TypeIdentifier,
        #[serde(default)]
        properties: IndexMap<String, TypeIdentifier>,
    },
    /// Array of `element`.
    Collection {
        identifier: TypeIdentifier,
        element: TypeIdentifier,
    },
    Enum {
        identifier: TypeIdentifier,
        #[serde(default)]
        values: BTreeSet<String>,
    },
}

impl TypeRepresentation {
    pub fn identifier(&self) -> &TypeIdentifier {
        match self {
            TypeRepresentation::Concrete { identifier, .. }
            | TypeRepresentation::Collection { identifier, .. }
            | TypeRepresentation::Enum { identifier, .. } => identifier,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// GRAPH
// ————————————————————————————————————————————————————————————————————————————

/// Identifier → representation, keyed by raw name, in load order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<TypeRepresentation>", into = "Vec<TypeRepresentation>")]
pub struct TypeGraph {
    types: IndexMap<String, TypeRepresentation>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, representation: TypeRepresentation) -> Result<(), ModelError> {
        let raw_name = representation.identifier().raw_name().to_owned();
        if self.types.contains_key(&raw_name) {
            return Err(ModelError::DuplicateType { raw_name });
        }
        self.types.insert(raw_name, representation);
        Ok(())
    }

    /// Builder-style `insert` for fixtures.
    #[cfg(test)]
    pub fn with(mut self, representation: TypeRepresentation) -> Result<Self, ModelError> {
        self.insert(representation)?;
        Ok(self)
    }

    pub fn get(&self, identifier: &TypeIdentifier) -> Option<&TypeRepresentation> {
        self.types.get(identifier.raw_name())
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &TypeIdentifier> {
        self.types.values().map(TypeRepresentation::identifier)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TryFrom<Vec<TypeRepresentation>> for TypeGraph {
    type Error = ModelError;

    fn try_from(representations: Vec<TypeRepresentation>) -> Result<Self, Self::Error> {
        let mut graph = TypeGraph::new();
        for representation in representations {
            graph.insert(representation)?;
        }
        Ok(graph)
    }
}

impl From<TypeGraph> for Vec<TypeRepresentation> {
    fn from(graph: TypeGraph) -> Self {
        graph.types.into_values().collect()
    }
}
