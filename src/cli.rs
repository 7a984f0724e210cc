//! CLI: project dump → (swagger document | definitions report)
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use tracing::info;

use crate::document;
use crate::error::ConfigError;
use crate::options::{self, SwaggerOptions};
use crate::project::Project;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// render analyzed JAX-RS style API dumps into swagger 2.0 documents
#[derive(Parser, Debug)]
#[command(name = "swagger-render", version)]
pub struct CommandLineInterface {
    /// log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// render the full swagger document
    Render(RenderOut),
    /// build every type of the graph and print fragments plus definitions
    Definitions(DefinitionsOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select the project node in each document (e.g. /analysis/project)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct RenderOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output file for a single input, output directory otherwise (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// host the API is served from; also drops the project name from basePath
    #[arg(long)]
    domain: Option<String>,

    /// comma separated list of http, https, ws, wss
    #[arg(long)]
    schemes: Option<String>,

    /// emit tags derived from resource paths
    #[arg(long, default_value_t = false)]
    render_tags: bool,

    /// index of the path segment used as tag
    #[arg(long)]
    tags_path_offset: Option<usize>,

    /// RFC 6902 JSON Patch file applied to the finished document
    #[arg(long)]
    patch: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct DefinitionsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output file for a single input, output directory otherwise (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Render every input in parallel; each input is its own pass.
    fn render_each<F>(&self, render: F) -> anyhow::Result<Vec<(PathBuf, Vec<u8>)>>
    where
        F: Fn(&Project) -> Result<serde_json::Value, crate::error::RenderError> + Sync,
    {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        source_paths
            .par_iter()
            .map(|source_path| -> anyhow::Result<(PathBuf, Vec<u8>)> {
                let project = Project::load(source_path, self.json_pointer.as_deref())?;
                let output = render(&project)
                    .with_context(|| format!("failed to render {}", source_path.display()))?;
                let bytes = document::to_pretty_bytes(&output)?;
                info!(input = %source_path.display(), bytes = bytes.len(), "rendered");
                Ok((source_path.clone(), bytes))
            })
            .collect()
    }
}

impl RenderOut {
    /// Flags are fed through the same keys as backend configuration.
    fn options(&self) -> Result<SwaggerOptions, ConfigError> {
        let mut config = HashMap::new();
        if let Some(domain) = &self.domain {
            config.insert(options::DOMAIN.to_owned(), domain.clone());
        }
        if let Some(schemes) = &self.schemes {
            config.insert(options::SWAGGER_SCHEMES.to_owned(), schemes.clone());
        }
        if self.render_tags {
            config.insert(options::RENDER_SWAGGER_TAGS.to_owned(), "true".to_owned());
        }
        if let Some(offset) = self.tags_path_offset {
            config.insert(options::SWAGGER_TAGS_PATH_OFFSET.to_owned(), offset.to_string());
        }
        if let Some(patch) = &self.patch {
            config.insert(options::JSON_PATCH.to_owned(), patch.to_string_lossy().into_owned());
        }
        let mut options = SwaggerOptions::default();
        options.configure(&config)?;
        Ok(options)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Render(target) => {
                let options = target.options()?;
                let outputs = target
                    .input_settings
                    .render_each(|project| document::render(project, &options))?;
                write_outputs(outputs, target.out.as_deref(), "swagger.json")
            }
            Command::Definitions(target) => {
                let outputs = target
                    .input_settings
                    .render_each(|project| Ok(document::render_definitions(&project.types)?))?;
                write_outputs(outputs, target.out.as_deref(), "definitions.json")
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_outputs(outputs: Vec<(PathBuf, Vec<u8>)>, out: Option<&Path>, suffix: &str) -> anyhow::Result<()> {
    let Some(out) = out else {
        let mut stdout = std::io::stdout().lock();
        for (_, bytes) in outputs {
            stdout.write_all(&bytes)?;
            stdout.write_all(b"\n")?;
        }
        return Ok(());
    };

    if outputs.len() == 1 {
        let (_, bytes) = &outputs[0];
        return write_file(out, bytes);
    }

    let mut seen = HashSet::new();
    for (source_path, bytes) in &outputs {
        let stem = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_owned());
        if !seen.insert(stem.clone()) {
            bail!("two inputs share the file stem `{stem}`; render them separately");
        }
        write_file(&out.join(format!("{stem}.{suffix}")), bytes)?;
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("{} {}", "wrote".green().bold(), path.display());
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
