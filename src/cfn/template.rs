//! Synthesized CloudFormation templates.

use indexmap::IndexMap;
use serde::Serialize;

use super::resource::{Resource, ResourceType};
use super::value::Expr;
use crate::error::Result;

/// Template format version emitted in every template.
pub const FORMAT_VERSION: &str = "2010-09-09";

/// A template parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    /// Parameter type
    #[serde(rename = "Type")]
    pub parameter_type: String,
    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A stack output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    /// Description shown to operators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Output value
    pub value: Expr,
}

/// Two-level mapping: top-level key -> attribute -> value.
pub type Mapping = IndexMap<String, IndexMap<String, String>>;

/// A resource as it appears in the template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateResource {
    #[serde(rename = "Type")]
    pub resource_type: ResourceType,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Expr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl From<&Resource> for TemplateResource {
    fn from(resource: &Resource) -> Self {
        Self {
            resource_type: resource.resource_type(),
            properties: resource.properties().clone(),
            depends_on: resource.depends_on().to_vec(),
        }
    }
}

/// A complete CloudFormation template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub mappings: IndexMap<String, Mapping>,
    pub resources: IndexMap<String, TemplateResource>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, Output>,
}

impl Template {
    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Render as a JSON value, handy for structural assertions.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Look up a resource by logical id.
    pub fn resource(&self, logical_id: &str) -> Option<&TemplateResource> {
        self.resources.get(logical_id)
    }

    /// Logical ids of all resources of a type, in declaration order.
    pub fn resources_of_type(&self, resource_type: ResourceType) -> Vec<&str> {
        self.resources
            .iter()
            .filter(|(_, r)| r.resource_type == resource_type)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}
