//! Render options and their string-keyed configuration.
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, error};

use crate::error::ConfigError;
use crate::patch::JsonPatch;

pub const DOMAIN: &str = "domain";
pub const SWAGGER_SCHEMES: &str = "swaggerSchemes";
pub const RENDER_SWAGGER_TAGS: &str = "renderSwaggerTags";
pub const SWAGGER_TAGS_PATH_OFFSET: &str = "swaggerTagsPathOffset";
pub const JSON_PATCH: &str = "jsonPatch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scheme {
    Http,
    Https,
    Ws,
    Wss,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Ws => "ws",
            Scheme::Wss => "wss",
        }
    }
}

impl FromStr for Scheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            "ws" => Ok(Scheme::Ws),
            "wss" => Ok(Scheme::Wss),
            _ => Err(ConfigError::UnknownScheme(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SwaggerOptions {
    pub domain: String,
    pub schemes: BTreeSet<Scheme>,
    pub render_tags: bool,
    pub tags_path_offset: usize,
    /// Applied to the finished document.
    pub patch: Option<JsonPatch>,
}

impl Default for SwaggerOptions {
    fn default() -> Self {
        Self {
            domain: String::new(),
            schemes: BTreeSet::from([Scheme::Http]),
            render_tags: false,
            tags_path_offset: 0,
            patch: None,
        }
    }
}

impl SwaggerOptions {
    /// Apply backend configuration keys on top of the current values.
    ///
    /// Unknown keys are ignored. A patch file that cannot be read or is not
    /// a JSON Patch array is logged and skipped; rendering still proceeds.
    pub fn configure(&mut self, config: &HashMap<String, String>) -> Result<(), ConfigError> {
        if let Some(offset) = config.get(SWAGGER_TAGS_PATH_OFFSET) {
            self.tags_path_offset = offset
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidTagsOffset(offset.clone()))?;
        }
        if let Some(domain) = config.get(DOMAIN) {
            self.domain = domain.clone();
        }
        if let Some(schemes) = config.get(SWAGGER_SCHEMES) {
            self.schemes = schemes.split(',').map(Scheme::from_str).collect::<Result<_, _>>()?;
        }
        if let Some(render_tags) = config.get(RENDER_SWAGGER_TAGS) {
            self.render_tags = render_tags.trim().eq_ignore_ascii_case("true");
        }
        if let Some(patch_file) = config.get(JSON_PATCH) {
            self.patch = read_patch(Path::new(patch_file));
        }
        debug!(options = ?self, "configured swagger options");
        Ok(())
    }

    pub fn has_domain(&self) -> bool {
        !self.domain.trim().is_empty()
    }
}

fn read_patch(path: &Path) -> Option<JsonPatch> {
    match JsonPatch::from_file(path) {
        Ok(patch) => Some(patch),
        Err(err) => {
            error!(path = %path.display(), error = %err, "could not read patch, it won't be applied");
            None
        }
    }
}
