//! Swagger 2.0 document assembly around the schema engine.
use std::collections::BTreeSet;

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::error::RenderError;
use crate::model::TypeGraph;
use crate::options::SwaggerOptions;
use crate::project::{MethodParameter, ParameterType, Project, ResourceMethod};
use crate::schema::SchemaBuilder;

pub const SWAGGER_VERSION: &str = "2.0";

/// Parameter groups in output order. Other kinds are not rendered.
const PARAMETER_ORDER: [ParameterType; 4] =
    [ParameterType::Path, ParameterType::Header, ParameterType::Query, ParameterType::Form];

/// Render `project` into a swagger document. Every call is an independent pass.
pub fn render(project: &Project, options: &SwaggerOptions) -> Result<Value, RenderError> {
    let document = DocumentAssembler::new(project, options).assemble()?;
    match &options.patch {
        None => Ok(document),
        Some(patch) => {
            debug!(project = %project.name, "applying patch");
            Ok(patch.apply(&document)?)
        }
    }
}

/// Fragment of every graph type (in graph order) plus the resulting definitions.
pub fn render_definitions(graph: &TypeGraph) -> Result<Value, RenderError> {
    let mut schemas = SchemaBuilder::new(graph);
    let mut fragments = Map::new();
    for identifier in graph.identifiers() {
        fragments.insert(identifier.raw_name().to_owned(), schemas.build(identifier)?);
    }
    Ok(json!({ "schemas": fragments, "definitions": schemas.into_definitions() }))
}

pub fn to_pretty_bytes(document: &Value) -> Result<Vec<u8>, RenderError> {
    serde_json::to_vec_pretty(document).map_err(RenderError::Serialize)
}

struct DocumentAssembler<'p> {
    project: &'p Project,
    options: &'p SwaggerOptions,
    schemas: SchemaBuilder<'p>,
    sections: BTreeSet<String>,
}

impl<'p> DocumentAssembler<'p> {
    fn new(project: &'p Project, options: &'p SwaggerOptions) -> Self {
        Self { project, options, schemas: SchemaBuilder::new(&project.types), sections: BTreeSet::new() }
    }

    fn assemble(mut self) -> Result<Value, RenderError> {
        let mut doc = self.header();
        doc.insert("paths".into(), Value::Object(self.paths()?));

        let sections = std::mem::take(&mut self.sections);
        let definitions = self.schemas.into_definitions();
        info!(
            project = %self.project.name,
            definitions = definitions.len(),
            paths = self.project.resources.len(),
            "rendered swagger document"
        );
        doc.insert("definitions".into(), Value::Object(definitions));

        if !sections.is_empty() {
            doc.insert("x-restlet".into(), json!({ "sections": sections }));
        }
        Ok(Value::Object(doc))
    }

    fn header(&self) -> Map<String, Value> {
        let project = self.project;
        let options = self.options;
        let base_path = if options.has_domain() {
            format!("/{}", project.base_path)
        } else {
            format!("/{}/{}", project.name, project.base_path)
        };

        let mut doc = Map::new();
        doc.insert("swagger".into(), Value::from(SWAGGER_VERSION));
        doc.insert("info".into(), json!({ "version": project.version, "title": project.name }));
        doc.insert("host".into(), Value::from(options.domain.clone()));
        doc.insert("basePath".into(), Value::from(base_path));
        doc.insert(
            "schemes".into(),
            Value::Array(options.schemes.iter().map(|s| Value::from(s.as_str())).collect()),
        );
        if options.render_tags {
            let tags = project
                .resources
                .keys()
                .filter_map(|path| extract_tag(path, options.tags_path_offset))
                .collect::<BTreeSet<_>>();
            doc.insert(
                "tags".into(),
                Value::Array(tags.into_iter().map(|name| json!({ "name": name })).collect()),
            );
        }
        doc
    }

    fn paths(&mut self) -> Result<Map<String, Value>, RenderError> {
        let project = self.project;
        let mut paths = Map::new();
        // BTreeMap keys: already sorted
        for (resource, methods) in &project.resources {
            let mut endpoint = Map::new();
            let mut sorted = methods.iter().collect::<Vec<_>>();
            sorted.sort_by_key(|m| m.method);
            for method in sorted {
                endpoint.insert(method.method.as_lowercase().into(), self.method(method, resource)?);
            }
            if let Some(section) = section_of(resource) {
                endpoint.insert("x-restlet".into(), json!({ "section": section }));
                self.sections.insert(section);
            }
            paths.insert(format!("/{resource}"), Value::Object(endpoint));
        }
        Ok(paths)
    }

    fn method(&mut self, method: &ResourceMethod, resource: &str) -> Result<Value, RenderError> {
        let mut o = Map::new();
        if let Some(description) = &method.description {
            o.insert("description".into(), Value::from(description.clone()));
        }
        o.insert("consumes".into(), json!(method.request_media_types));
        o.insert("produces".into(), json!(method.response_media_types));
        o.insert("parameters".into(), Value::Array(self.parameters(method)?));
        o.insert("responses".into(), Value::Object(self.responses(method)?));
        if method.deprecated {
            o.insert("deprecated".into(), Value::Bool(true));
        }
        if self.options.render_tags {
            if let Some(tag) = extract_tag(resource, self.options.tags_path_offset) {
                o.insert("tags".into(), json!([tag]));
            }
        }
        Ok(Value::Object(o))
    }

    fn parameters(&mut self, method: &ResourceMethod) -> Result<Vec<Value>, RenderError> {
        let mut out = Vec::new();
        for kind in PARAMETER_ORDER {
            let mut group = method.parameters.iter().filter(|p| p.kind == kind).collect::<Vec<_>>();
            group.sort_by(|a, b| a.name.cmp(&b.name));
            for parameter in group {
                if let Some(value) = self.parameter(parameter)? {
                    out.push(value);
                }
            }
        }

        if let Some(body) = &method.request_body {
            let mut o = json!({
                "name": "body",
                "in": "body",
                "required": true,
                "schema": self.schemas.build(body)?,
            });
            if let Some(description) = non_blank(method.request_body_description.as_deref()) {
                o["description"] = Value::from(description);
            }
            out.push(o);
        }
        Ok(out)
    }

    /// The type's schema fragment extended with the parameter fields.
    fn parameter(&mut self, parameter: &MethodParameter) -> Result<Option<Value>, RenderError> {
        let Some(location) = parameter.kind.swagger_location() else {
            return Ok(None);
        };
        let mut o = self.schemas.build(&parameter.type_id)?;
        o["name"] = Value::from(parameter.name.clone());
        o["in"] = Value::from(location);
        o["required"] = Value::Bool(parameter.default_value.is_none());
        if let Some(description) = non_blank(parameter.description.as_deref()) {
            o["description"] = Value::from(description);
        }
        if let Some(default) = non_blank(parameter.default_value.as_deref()) {
            o["default"] = Value::from(default);
        }
        Ok(Some(o))
    }

    fn responses(&mut self, method: &ResourceMethod) -> Result<Map<String, Value>, RenderError> {
        let mut out = Map::new();
        for (status, response) in &method.responses {
            let headers = response
                .headers
                .iter()
                .map(|h| (h.clone(), json!({ "type": "string" })))
                .collect::<Map<_, _>>();
            let mut o = json!({
                "description": reason_phrase(*status),
                "headers": headers,
            });
            if let Some(body) = &response.body {
                o["schema"] = self.schemas.build(body)?;
            }
            out.insert(status.to_string(), o);
        }
        Ok(out)
    }
}

/// Path segment at `offset`, unless it is a template segment.
fn extract_tag(path: &str, offset: usize) -> Option<String> {
    let mut parts = path.split('/').collect::<Vec<_>>();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
        .get(offset)
        .filter(|part| !part.is_empty() && !part.contains('{'))
        .map(|part| part.to_string())
}

/// `"users/{id}"` → `"Users"`, `"itemtype/x"` → `"Item Type"`.
fn section_of(path: &str) -> Option<String> {
    let head = path.split('/').next().unwrap_or_default();
    let mut chars = head.chars();
    let first = chars.next()?;
    let section = format!("{}{}", first.to_uppercase(), chars.as_str());
    Some(section.replacen("type", " Type", 1))
}

fn reason_phrase(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Scheme, SwaggerOptions};
    use crate::patch::JsonPatch;

    fn shop() -> Project {
        Project::from_json_str(
            r#"{
            "name": "shop",
            "version": "1.0",
            "basePath": "api",
            "resources": {
                "users/{id}": [
                    {"method": "PUT", "requestMediaTypes": ["application/json"],
                     "requestBody": "Lcom/acme/User;", "requestBodyDescription": "the user",
                     "parameters": [{"name": "id", "in": "path", "type": "J"}],
                     "responses": {"204": {}}},
                    {"method": "GET", "description": "fetch one", "deprecated": true,
                     "responseMediaTypes": ["application/xml", "application/json"],
                     "parameters": [
                        {"name": "verbose", "in": "query", "type": "Z", "defaultValue": "false"},
                        {"name": "id", "in": "path", "type": "J", "description": "  "},
                        {"name": "X-Trace", "in": "header", "type": "Ljava/lang/String;", "description": "trace id"},
                        {"name": "session", "in": "cookie", "type": "Ljava/lang/String;"}
                     ],
                     "responses": {
                        "404": {},
                        "200": {"headers": ["Location", "ETag"], "body": "Lcom/acme/User;"}
                     }}
                ],
                "usertypes": [
                    {"method": "GET", "responses": {"200": {"body": "Ljava/util/List<Lcom/acme/User;>;"}}}
                ]
            },
            "types": [
                {"kind": "concrete", "identifier": "Lcom/acme/User;",
                 "properties": {"name": "Ljava/lang/String;", "role": "Lcom/acme/Role;", "friends": "Ljava/util/List<Lcom/acme/User;>;"}},
                {"kind": "collection", "identifier": "Ljava/util/List<Lcom/acme/User;>;", "element": "Lcom/acme/User;"},
                {"kind": "enum", "identifier": "Lcom/acme/Role;", "values": ["USER", "ADMIN"]}
            ]
        }"#,
            None,
        )
        .unwrap()
    }

    #[test]
    fn header_without_domain_prefixes_project_name() {
        let doc = render(&shop(), &SwaggerOptions::default()).unwrap();
        assert_eq!(doc["swagger"], "2.0");
        assert_eq!(doc["info"], json!({"version": "1.0", "title": "shop"}));
        assert_eq!(doc["host"], "");
        assert_eq!(doc["basePath"], "/shop/api");
        assert_eq!(doc["schemes"], json!(["http"]));
        assert!(doc.get("tags").is_none());
    }

    #[test]
    fn header_with_domain() {
        let options = SwaggerOptions {
            domain: "api.acme.io".into(),
            schemes: [Scheme::Https, Scheme::Http].into_iter().collect(),
            ..SwaggerOptions::default()
        };
        let doc = render(&shop(), &options).unwrap();
        assert_eq!(doc["host"], "api.acme.io");
        assert_eq!(doc["basePath"], "/api");
        assert_eq!(doc["schemes"], json!(["http", "https"]));
    }

    #[test]
    fn methods_render_sorted_with_grouped_parameters() {
        let doc = render(&shop(), &SwaggerOptions::default()).unwrap();
        let endpoint = doc["paths"]["/users/{id}"].as_object().unwrap();
        let keys = endpoint.keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys, vec!["get", "put", "x-restlet"]);

        let get = &endpoint["get"];
        assert_eq!(get["description"], "fetch one");
        assert_eq!(get["deprecated"], true);
        assert_eq!(get["consumes"], json!([]));
        assert_eq!(get["produces"], json!(["application/json", "application/xml"]));
        assert_eq!(
            get["parameters"],
            json!([
                {"type": "integer", "name": "id", "in": "path", "required": true},
                {"type": "string", "name": "X-Trace", "in": "header", "required": true, "description": "trace id"},
                {"type": "boolean", "name": "verbose", "in": "query", "required": false, "default": "false"}
            ])
        );

        let put = &endpoint["put"];
        assert!(put.get("deprecated").is_none());
        assert_eq!(
            put["parameters"][1],
            json!({"name": "body", "in": "body", "required": true,
                   "schema": {"$ref": "#/definitions/User"}, "description": "the user"})
        );
    }

    #[test]
    fn responses_carry_reason_headers_and_schema() {
        let doc = render(&shop(), &SwaggerOptions::default()).unwrap();
        let responses = doc["paths"]["/users/{id}"]["get"]["responses"].as_object().unwrap();
        assert_eq!(responses.keys().cloned().collect::<Vec<_>>(), vec!["200", "404"]);
        assert_eq!(
            responses["200"],
            json!({
                "description": "OK",
                "headers": {"ETag": {"type": "string"}, "Location": {"type": "string"}},
                "schema": {"$ref": "#/definitions/User"}
            })
        );
        assert_eq!(responses["404"], json!({"description": "Not Found", "headers": {}}));
        assert_eq!(reason_phrase(799), "");
    }

    #[test]
    fn definitions_are_shared_across_the_pass() {
        let doc = render(&shop(), &SwaggerOptions::default()).unwrap();
        assert_eq!(
            doc["definitions"],
            json!({
                "User": {"properties": {
                    "friends": {"type": "array", "items": {"$ref": "#/definitions/User"}},
                    "name": {"type": "string"},
                    "role": {"type": "string", "enum": ["ADMIN", "USER"]}
                }}
            })
        );
        assert_eq!(
            doc["paths"]["/usertypes"]["get"]["responses"]["200"]["schema"],
            json!({"type": "array", "items": {"$ref": "#/definitions/User"}})
        );
    }

    #[test]
    fn sections_are_collected() {
        let doc = render(&shop(), &SwaggerOptions::default()).unwrap();
        assert_eq!(doc["paths"]["/users/{id}"]["x-restlet"], json!({"section": "Users"}));
        assert_eq!(doc["paths"]["/usertypes"]["x-restlet"], json!({"section": "User Types"}));
        assert_eq!(doc["x-restlet"], json!({"sections": ["User Types", "Users"]}));
    }

    #[test]
    fn tags_follow_the_path_offset() {
        let options = SwaggerOptions { render_tags: true, ..SwaggerOptions::default() };
        let doc = render(&shop(), &options).unwrap();
        assert_eq!(doc["tags"], json!([{"name": "users"}, {"name": "usertypes"}]));
        assert_eq!(doc["paths"]["/users/{id}"]["get"]["tags"], json!(["users"]));

        // offset 1 lands on the template segment for users/{id}
        let options = SwaggerOptions { render_tags: true, tags_path_offset: 1, ..SwaggerOptions::default() };
        let doc = render(&shop(), &options).unwrap();
        assert_eq!(doc["tags"], json!([]));
        assert!(doc["paths"]["/users/{id}"]["get"].get("tags").is_none());
    }

    #[test]
    fn extract_tag_edge_cases() {
        assert_eq!(extract_tag("users/", 0).as_deref(), Some("users"));
        assert_eq!(extract_tag("users/", 1), None);
        assert_eq!(extract_tag("a/b/c", 2).as_deref(), Some("c"));
        assert_eq!(extract_tag("{id}/x", 0), None);
        assert_eq!(extract_tag("", 0), None);
    }

    #[test]
    fn section_edge_cases() {
        assert_eq!(section_of("orders").as_deref(), Some("Orders"));
        assert_eq!(section_of("").as_deref(), None);
        assert_eq!(section_of("/leading").as_deref(), None);
        assert_eq!(section_of("typetype/x").as_deref(), Some("Type Type"));
    }

    #[test]
    fn patch_runs_last() {
        let options = SwaggerOptions {
            patch: Some(
                JsonPatch::from_json_str(
                    r#"[{"op": "replace", "path": "/info/title", "value": "Shop API"},
                        {"op": "remove", "path": "/x-restlet"}]"#,
                )
                .unwrap(),
            ),
            ..SwaggerOptions::default()
        };
        let doc = render(&shop(), &options).unwrap();
        assert_eq!(doc["info"]["title"], "Shop API");
        assert!(doc.get("x-restlet").is_none());
        assert!(doc["definitions"].get("User").is_some());
    }

    #[test]
    fn configured_patch_file_replaces_the_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patch.json");
        std::fs::write(&path, r#"[{"op": "replace", "path": "/info/title", "value": "Shop API"}]"#).unwrap();
        let config: std::collections::HashMap<_, _> = [(crate::options::JSON_PATCH.to_owned(), path.to_string_lossy().into_owned())]
            .into_iter()
            .collect();
        let mut options = SwaggerOptions::default();
        options.configure(&config).unwrap();

        let unpatched = render(&shop(), &SwaggerOptions::default()).unwrap();
        let mut doc = render(&shop(), &options).unwrap();
        assert!(doc.is_object());
        assert_eq!(doc["info"]["title"], "Shop API");
        doc["info"]["title"] = unpatched["info"]["title"].clone();
        assert_eq!(doc, unpatched);
    }

    #[test]
    fn failing_patch_aborts_the_render() {
        let options = SwaggerOptions {
            patch: Some(JsonPatch::from_json_str(r#"[{"op": "remove", "path": "/nothing/here"}]"#).unwrap()),
            ..SwaggerOptions::default()
        };
        let err = render(&shop(), &options).unwrap_err();
        assert!(matches!(err, RenderError::Patch(_)));
    }

    #[test]
    fn void_response_bodies_render_as_objects() {
        let mut project = shop();
        project.resources.insert(
            "ping".to_owned(),
            serde_json::from_value(json!([
                {"method": "POST", "responses": {"200": {"body": "V"}, "202": {"body": "Ljava/lang/Void;"}}}
            ]))
            .unwrap(),
        );
        let doc = render(&project, &SwaggerOptions::default()).unwrap();
        let responses = &doc["paths"]["/ping"]["post"]["responses"];
        assert_eq!(responses["200"]["schema"], json!({"type": "object"}));
        assert_eq!(responses["202"]["schema"], json!({"type": "object"}));
    }

    #[test]
    fn malformed_types_abort_the_render() {
        let mut project = shop();
        project.types = serde_json::from_value(json!([
            {"kind": "concrete", "identifier": "Lcom/acme/User;", "properties": {"broken": "Lcom/acme/;"}},
            {"kind": "concrete", "identifier": "Lcom/acme/;"}
        ]))
        .unwrap();
        let err = render(&project, &SwaggerOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::Schema(_)));
    }

    #[test]
    fn definitions_report_covers_the_whole_graph() {
        let report = render_definitions(&shop().types).unwrap();
        assert_eq!(
            report["schemas"],
            json!({
                "Lcom/acme/User;": {"$ref": "#/definitions/User"},
                "Ljava/util/List<Lcom/acme/User;>;": {"type": "array", "items": {"$ref": "#/definitions/User"}},
                "Lcom/acme/Role;": {"type": "string", "enum": ["ADMIN", "USER"]}
            })
        );
        assert_eq!(report["definitions"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn pretty_bytes_round_trip() {
        let doc = render(&shop(), &SwaggerOptions::default()).unwrap();
        let bytes = to_pretty_bytes(&doc).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("{\n  \"swagger\": \"2.0\""));
    }
}
