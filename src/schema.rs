//! Schema definition engine.
//!
//! Turns type identifiers into swagger schema fragments. Object types are
//! registered once per render pass in a definitions table and referenced
//! through `$ref` afterwards; every other shape is emitted inline.
//!
//! Naming:
//! - the candidate name is the terminal segment of the raw name
//!   (`"JsonObject"` for dynamic types);
//! - a name owned by the same raw type is reused as is;
//! - a name owned by another raw type is probed further:
//!   `Foo` → `Foo_2` → `Foo_3` → ...
//!
//! Cycles: a definition is reserved *before* its properties are built, so a
//! property pointing back at an object under construction finds the
//! reserved name and gets a reference instead of recursing again.
use std::collections::BTreeMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::{debug, trace};

use crate::classify::{classify, SchemaKind};
use crate::error::SchemaError;
use crate::model::{TypeGraph, TypeIdentifier, TypeRepresentation};

pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Definition name shared by all dynamic (generic JSON) types.
const DYNAMIC_DEFINITION_NAME: &str = "JsonObject";

static NUMBERED_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<prefix>.*_)(?P<index>\d+)$").expect("static regex"));

#[derive(Debug, Clone)]
struct Definition {
    /// Raw name of the type that claimed this definition name.
    owner: String,
    schema: Value,
}

/// One render pass worth of schema state. Build a new one per pass.
pub struct SchemaBuilder<'g> {
    graph: &'g TypeGraph,
    definitions: BTreeMap<String, Definition>,
}

impl<'g> SchemaBuilder<'g> {
    pub fn new(graph: &'g TypeGraph) -> Self {
        Self { graph, definitions: BTreeMap::new() }
    }

    /// Schema fragment for `identifier`; may register definitions as a side effect.
    pub fn build(&mut self, identifier: &TypeIdentifier) -> Result<Value, SchemaError> {
        let kind = classify(identifier.raw_name());
        if kind.is_primitive() {
            return Ok(primitive(kind));
        }
        let graph = self.graph;
        match graph.get(identifier) {
            None => Ok(primitive(SchemaKind::Object)),
            Some(representation) => self.build_representation(representation),
        }
    }

    fn build_representation(&mut self, representation: &TypeRepresentation) -> Result<Value, SchemaError> {
        match representation {
            TypeRepresentation::Concrete { identifier, properties } => {
                self.register_object(identifier, properties)
            }
            TypeRepresentation::Collection { element, .. } => {
                let items = self.build(element)?;
                Ok(json!({ "type": SchemaKind::Array.as_str(), "items": items }))
            }
            TypeRepresentation::Enum { values, .. } => {
                let mut o = json!({ "type": SchemaKind::String.as_str() });
                if !values.is_empty() {
                    // BTreeSet iterates in sorted order
                    o["enum"] = Value::Array(values.iter().cloned().map(Value::from).collect());
                }
                Ok(o)
            }
        }
    }

    /// Registers an object definition and returns a reference to it.
    ///
    /// The placeholder MUST be in the table before any property is built;
    /// that is what stops self-referencing graphs from recursing forever.
    fn register_object(
        &mut self,
        identifier: &TypeIdentifier,
        properties: &IndexMap<String, TypeIdentifier>,
    ) -> Result<Value, SchemaError> {
        let name = self.definition_name(identifier)?;
        if self.definitions.contains_key(&name) {
            return Ok(reference(&name));
        }

        debug!(definition = %name, owner = identifier.raw_name(), "reserving definition");
        self.definitions.insert(
            name.clone(),
            Definition { owner: identifier.raw_name().to_owned(), schema: Value::Object(Map::new()) },
        );

        let mut sorted = properties.iter().collect::<Vec<_>>();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let mut props = Map::new();
        for (property, ty) in sorted {
            props.insert(property.clone(), self.build(ty)?);
        }

        if let Some(definition) = self.definitions.get_mut(&name) {
            definition.schema = json!({ "properties": props });
        }
        debug!(definition = %name, "finalized definition");
        Ok(reference(&name))
    }

    /// Probe `candidate`, `candidate_2`, `candidate_3`, ... until a name is
    /// free or already owned by this identifier.
    fn definition_name(&self, identifier: &TypeIdentifier) -> Result<String, SchemaError> {
        let mut candidate = candidate_name(identifier)?;
        loop {
            match self.definitions.get(&candidate) {
                Some(existing) if existing.owner != identifier.raw_name() => {
                    let next = next_candidate(&candidate);
                    trace!(
                        taken = %candidate,
                        owner = %existing.owner,
                        requested_by = identifier.raw_name(),
                        next = %next,
                        "definition name collision"
                    );
                    candidate = next;
                }
                _ => return Ok(candidate),
            }
        }
    }

    /// The finished definitions table, sorted by definition name.
    pub fn definitions(&self) -> Map<String, Value> {
        self.definitions
            .iter()
            .map(|(name, definition)| (name.clone(), definition.schema.clone()))
            .collect()
    }

    /// Ends the pass and hands over the table.
    pub fn into_definitions(self) -> Map<String, Value> {
        self.definitions
            .into_iter()
            .map(|(name, definition)| (name, definition.schema))
            .collect()
    }

    /// Raw type name that owns definition `name`, if any.
    #[cfg(test)]
    pub fn definition_owner(&self, name: &str) -> Option<&str> {
        self.definitions.get(name).map(|d| d.owner.as_str())
    }

    #[cfg(test)]
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }
}

fn primitive(kind: SchemaKind) -> Value {
    json!({ "type": kind.as_str() })
}

pub fn reference(definition: &str) -> Value {
    json!({ "$ref": format!("{DEFINITIONS_PREFIX}{definition}") })
}

fn candidate_name(identifier: &TypeIdentifier) -> Result<String, SchemaError> {
    if identifier.is_dynamic() {
        return Ok(DYNAMIC_DEFINITION_NAME.to_owned());
    }
    identifier
        .short_name()
        .map(str::to_owned)
        .ok_or_else(|| SchemaError::MalformedIdentifier { raw_name: identifier.raw_name().to_owned() })
}

/// `Foo` → `Foo_2`, `Foo_7` → `Foo_8`.
fn next_candidate(name: &str) -> String {
    if let Some(caps) = NUMBERED_SUFFIX.captures(name) {
        if let Ok(index) = caps["index"].parse::<u64>() {
            if let Some(next) = index.checked_add(1) {
                return format!("{}{next}", &caps["prefix"]);
            }
        }
    }
    format!("{name}_2")
}
