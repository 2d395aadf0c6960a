//! CloudFormation model: property values, resources and templates.

pub mod resource;
pub mod template;
pub mod value;

pub use resource::{logical_id, Resource, ResourceType};
pub use template::{Mapping, Output, Parameter, Template, TemplateResource, FORMAT_VERSION};
pub use value::Expr;
