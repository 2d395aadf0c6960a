//! The application: the set of stacks and their synthesis to disk.
//!
//! Synthesis writes a cloud assembly directory holding one template per
//! stack and a `manifest.json` describing them.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cfn::Template;
use crate::error::{Error, Result};
use crate::stack::Stack;
use crate::stacks::{self, StackSettings};

/// Manifest schema version.
pub const MANIFEST_VERSION: &str = "1.0";

/// File name of the assembly manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Serialization format of synthesized templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    #[default]
    Json,
    Yaml,
}

impl TemplateFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TemplateFormat::Json => "json",
            TemplateFormat::Yaml => "yaml",
        }
    }

    /// Render a template in this format.
    pub fn render(&self, template: &Template) -> Result<String> {
        match self {
            TemplateFormat::Json => template.to_json(),
            TemplateFormat::Yaml => template.to_yaml(),
        }
    }
}

impl FromStr for TemplateFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(TemplateFormat::Json),
            "yaml" | "yml" => Ok(TemplateFormat::Yaml),
            other => Err(format!("unknown template format '{other}'")),
        }
    }
}

/// Manifest entry for one stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackArtifact {
    pub template_file: String,
    pub description: Option<String>,
    pub resources: usize,
    pub parameters: usize,
    pub outputs: usize,
}

/// Assembly manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub artifacts: IndexMap<String, StackArtifact>,
}

/// A written cloud assembly.
#[derive(Debug, Clone)]
pub struct CloudAssembly {
    pub directory: PathBuf,
    pub manifest: Manifest,
}

impl CloudAssembly {
    /// Path of a stack's template inside the assembly.
    pub fn template_path(&self, stack: &str) -> Option<PathBuf> {
        self.manifest
            .artifacts
            .get(stack)
            .map(|a| self.directory.join(&a.template_file))
    }
}

/// The set of stacks that make up the deployment.
#[derive(Debug, Default)]
pub struct App {
    stacks: Vec<Stack>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every known stack from `settings`.
    pub fn from_settings(settings: &StackSettings) -> Result<Self> {
        Ok(Self {
            stacks: stacks::build_all(settings)?,
        })
    }

    pub fn add_stack(&mut self, stack: Stack) {
        self.stacks.push(stack);
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn stack(&self, name: &str) -> Result<&Stack> {
        self.stacks
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| Error::StackNotFound(name.to_string()))
    }

    /// Stacks named in `names`, or all stacks when `names` is empty.
    pub fn select(&self, names: &[String]) -> Result<Vec<&Stack>> {
        if names.is_empty() {
            return Ok(self.stacks.iter().collect());
        }
        names.iter().map(|n| self.stack(n)).collect()
    }

    /// Validate the selected stacks and write their templates and the manifest.
    ///
    /// Nothing is written unless every selected stack validates.
    pub fn synth(
        &self,
        directory: &Path,
        format: TemplateFormat,
        names: &[String],
    ) -> Result<CloudAssembly> {
        let selected = self.select(names)?;
        let templates = selected
            .iter()
            .map(|s| s.synth().map(|template| (*s, template)))
            .collect::<Result<Vec<_>>>()?;

        fs::create_dir_all(directory).map_err(|e| Error::io(directory, e))?;

        let mut artifacts = IndexMap::new();
        for (stack, template) in templates {
            let file_name = format!("{}.template.{}", stack.name(), format.extension());
            let path = directory.join(&file_name);
            fs::write(&path, format.render(&template)?).map_err(|e| Error::io(&path, e))?;
            info!(stack = %stack.name(), path = %path.display(), "wrote template");

            artifacts.insert(
                stack.name().to_string(),
                StackArtifact {
                    template_file: file_name,
                    description: template.description.clone(),
                    resources: template.resources.len(),
                    parameters: template.parameters.len(),
                    outputs: template.outputs.len(),
                },
            );
        }

        let manifest = Manifest {
            version: MANIFEST_VERSION.to_string(),
            artifacts,
        };
        let manifest_path = directory.join(MANIFEST_FILE);
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
            .map_err(|e| Error::io(&manifest_path, e))?;
        info!(path = %manifest_path.display(), "wrote manifest");

        Ok(CloudAssembly {
            directory: directory.to_path_buf(),
            manifest,
        })
    }
}
