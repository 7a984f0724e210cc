//! Render an analyzed web-API model into a swagger 2.0 document.
//!
//! The interesting part is [`schema::SchemaBuilder`]: it walks a possibly
//! cyclic graph of type descriptions and produces `$ref`/inline schema
//! fragments plus a deduplicated, collision-free definitions table.
//!
//! ```no_run
//! use swagger_render::{document, options::SwaggerOptions, project::Project};
//!
//! let project = Project::from_json_str(&std::fs::read_to_string("dump.json")?, None)?;
//! let swagger = document::render(&project, &SwaggerOptions::default())?;
//! println!("{}", String::from_utf8(document::to_pretty_bytes(&swagger)?)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod classify;
pub mod cli;
pub mod document;
pub mod error;
pub mod model;
pub mod options;
pub mod patch;
pub mod path_de;
pub mod project;
pub mod schema;

pub use error::{ConfigError, ModelError, PatchError, RenderError, SchemaError};
pub use model::{TypeGraph, TypeIdentifier, TypeRepresentation};
pub use schema::SchemaBuilder;
