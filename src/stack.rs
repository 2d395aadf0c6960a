//! Stacks: one deployable unit of declared resources.
//!
//! A [`Stack`] owns its resources, template parameters, mappings and
//! outputs. Constructs in [`crate::ec2`] and [`crate::iam`] declare into it;
//! nothing else mutates it. Every declaration and removal is written to a
//! journal with a sequence number so that build-time ordering (for example
//! "the default association was removed before the custom one was
//! declared") can be checked after the fact.
//!
//! ```rust,ignore
//! let mut stack = Stack::new("Demo");
//! let igw = stack.add(Resource::new("Igw", ResourceType::InternetGateway))?;
//! let template = stack.synth()?;
//! ```

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::cfn::{Mapping, Output, Parameter, Resource, ResourceType, Template, TemplateResource};
use crate::cfn::FORMAT_VERSION;
use crate::error::{Error, Result};
use crate::graph::{DependencyGraph, DependencyNode, DependencyType, ResourceDependency};

/// What happened to a logical id during the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalAction {
    /// Resource was added to the stack
    Declared,
    /// Resource was taken out of the stack
    Removed,
}

/// One build step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Monotonic step number
    pub sequence: u64,
    /// Affected logical id
    pub logical_id: String,
    /// What happened
    pub action: JournalAction,
}

/// A stack of declared resources.
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    description: Option<String>,
    resources: IndexMap<String, Resource>,
    parameters: IndexMap<String, Parameter>,
    mappings: IndexMap<String, Mapping>,
    outputs: IndexMap<String, Output>,
    journal: Vec<JournalEntry>,
}

impl Stack {
    /// Create an empty stack.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            resources: IndexMap::new(),
            parameters: IndexMap::new(),
            mappings: IndexMap::new(),
            outputs: IndexMap::new(),
            journal: Vec::new(),
        }
    }

    /// Set the template description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    // ========================================================================
    // Resources
    // ========================================================================

    /// Declare a resource. Returns its logical id.
    pub fn add(&mut self, resource: Resource) -> Result<String> {
        let id = resource.logical_id().to_string();
        self.ensure_available(&[&id])?;

        debug!(stack = %self.name, logical_id = %id, resource_type = %resource.resource_type(), "declared resource");
        self.resources.insert(id.clone(), resource);
        self.record(&id, JournalAction::Declared);
        Ok(id)
    }

    /// Fail with `DuplicateResource` if any of `ids` is already taken by a
    /// resource or parameter. Constructs that add several resources call this
    /// first so a clash leaves the stack untouched.
    pub fn ensure_available(&self, ids: &[&str]) -> Result<()> {
        match ids
            .iter()
            .find(|id| self.resources.contains_key(**id) || self.parameters.contains_key(**id))
        {
            Some(id) => Err(Error::DuplicateResource {
                stack: self.name.clone(),
                logical_id: id.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Take a resource out of the stack.
    ///
    /// Idempotent: removing an absent id returns `None` and records nothing.
    pub fn remove(&mut self, logical_id: &str) -> Option<Resource> {
        let removed = self.resources.shift_remove(logical_id)?;
        debug!(stack = %self.name, logical_id = %logical_id, "removed resource");
        self.record(logical_id, JournalAction::Removed);
        Some(removed)
    }

    fn record(&mut self, logical_id: &str, action: JournalAction) {
        let sequence = self.journal.len() as u64;
        self.journal.push(JournalEntry {
            sequence,
            logical_id: logical_id.to_string(),
            action,
        });
    }

    pub fn contains(&self, logical_id: &str) -> bool {
        self.resources.contains_key(logical_id)
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    /// Mutable access to a declared resource.
    pub fn resource_mut(&mut self, logical_id: &str) -> Result<&mut Resource> {
        let stack = &self.name;
        self.resources
            .get_mut(logical_id)
            .ok_or_else(|| Error::resource_not_found(stack.clone(), logical_id))
    }

    /// All resources in declaration order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Resources of one type, in declaration order.
    pub fn resources_of_type(&self, resource_type: ResourceType) -> Vec<&Resource> {
        self.resources
            .values()
            .filter(|r| r.resource_type() == resource_type)
            .collect()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Declare that `dependent` must not be created before `prerequisite`.
    pub fn add_dependency(&mut self, dependent: &str, prerequisite: &str) -> Result<()> {
        if !self.contains(prerequisite) {
            return Err(Error::resource_not_found(self.name.clone(), prerequisite));
        }
        let resource = self.resource_mut(dependent)?;
        if resource.add_depends_on(prerequisite) {
            debug!(dependent = %dependent, prerequisite = %prerequisite, "added dependency");
        }
        Ok(())
    }

    // ========================================================================
    // Parameters, mappings and outputs
    // ========================================================================

    /// Declare a template parameter. Re-declaring an identical parameter is a no-op.
    pub fn add_parameter(&mut self, logical_id: &str, parameter: Parameter) -> Result<()> {
        match self.parameters.get(logical_id) {
            Some(existing) if *existing == parameter => Ok(()),
            Some(_) => Err(Error::DuplicateResource {
                stack: self.name.clone(),
                logical_id: logical_id.to_string(),
            }),
            None if self.resources.contains_key(logical_id) => Err(Error::DuplicateResource {
                stack: self.name.clone(),
                logical_id: logical_id.to_string(),
            }),
            None => {
                self.parameters.insert(logical_id.to_string(), parameter);
                Ok(())
            }
        }
    }

    pub fn parameter(&self, logical_id: &str) -> Option<&Parameter> {
        self.parameters.get(logical_id)
    }

    /// Declare a mapping, replacing any previous mapping of the same name.
    pub fn add_mapping(&mut self, name: &str, mapping: Mapping) {
        self.mappings.insert(name.to_string(), mapping);
    }

    pub fn mapping(&self, name: &str) -> Option<&Mapping> {
        self.mappings.get(name)
    }

    /// Declare a stack output.
    pub fn add_output(&mut self, name: &str, output: Output) -> Result<()> {
        if self.outputs.contains_key(name) {
            return Err(Error::DuplicateResource {
                stack: self.name.clone(),
                logical_id: name.to_string(),
            });
        }
        self.outputs.insert(name.to_string(), output);
        Ok(())
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }

    pub fn outputs(&self) -> &IndexMap<String, Output> {
        &self.outputs
    }

    // ========================================================================
    // Journal
    // ========================================================================

    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    /// Sequence number of the last declaration of a logical id.
    pub fn declared_at(&self, logical_id: &str) -> Option<u64> {
        self.last_step(logical_id, JournalAction::Declared)
    }

    /// Sequence number of the last removal of a logical id.
    pub fn removed_at(&self, logical_id: &str) -> Option<u64> {
        self.last_step(logical_id, JournalAction::Removed)
    }

    fn last_step(&self, logical_id: &str, action: JournalAction) -> Option<u64> {
        self.journal
            .iter()
            .rev()
            .find(|e| e.logical_id == logical_id && e.action == action)
            .map(|e| e.sequence)
    }

    // ========================================================================
    // Graph, validation and synthesis
    // ========================================================================

    /// Build the dependency graph from references and explicit edges.
    pub fn dependency_graph(&self) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();
        for resource in self.resources.values() {
            graph.add_node(DependencyNode::new(
                resource.logical_id(),
                resource.resource_type().as_str(),
            ));
        }

        for resource in self.resources.values() {
            let id = resource.logical_id();
            for target in resource.references() {
                if self.parameters.contains_key(&target) {
                    continue;
                }
                graph.add_dependency(ResourceDependency::new(
                    &target,
                    id,
                    DependencyType::Reference,
                ))?;
            }
            for prerequisite in resource.depends_on() {
                graph.add_dependency(
                    ResourceDependency::new(prerequisite, id, DependencyType::Explicit)
                        .with_description("DependsOn"),
                )?;
            }
        }

        Ok(graph)
    }

    /// Direct prerequisites of a resource, from references and explicit edges alike.
    pub fn dependencies_of(&self, logical_id: &str) -> Result<Vec<String>> {
        if !self.contains(logical_id) {
            return Err(Error::resource_not_found(self.name.clone(), logical_id));
        }
        Ok(self.dependency_graph()?.direct_prerequisites(logical_id))
    }

    /// Check the stack is deployable as declared.
    pub fn validate(&self) -> Result<DependencyGraph> {
        let graph = self.dependency_graph()?;

        let cycles = graph.get_cycles();
        if !cycles.is_empty() {
            let rendered: Vec<String> = cycles.iter().map(|c| c.join(" -> ")).collect();
            return Err(Error::DependencyCycle(rendered.join("; ")));
        }

        self.check_associations()?;

        for (name, output) in &self.outputs {
            let mut refs = Vec::new();
            output.value.collect_references(&mut refs);
            if let Some(missing) = refs.into_iter().find(|r| !self.contains(r)) {
                return Err(Error::DanglingReference {
                    from: name.clone(),
                    to: missing,
                });
            }
        }

        Ok(graph)
    }

    fn check_associations(&self) -> Result<()> {
        let mut by_subnet: IndexMap<&str, Vec<String>> = IndexMap::new();
        for assoc in self.resources_of_type(ResourceType::SubnetRouteTableAssociation) {
            if let Some(subnet) = assoc.property("SubnetId").and_then(|v| v.target()) {
                by_subnet
                    .entry(subnet)
                    .or_default()
                    .push(assoc.logical_id().to_string());
            }
        }

        match by_subnet.into_iter().find(|(_, assocs)| assocs.len() > 1) {
            Some((subnet, associations)) => Err(Error::ConflictingAssociation {
                subnet: subnet.to_string(),
                associations,
            }),
            None => Ok(()),
        }
    }

    /// Validate and render the CloudFormation template.
    pub fn synth(&self) -> Result<Template> {
        let graph = self.validate()?;

        let template = Template {
            format_version: FORMAT_VERSION.to_string(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
            mappings: self.mappings.clone(),
            resources: self
                .resources
                .iter()
                .map(|(id, r)| (id.clone(), TemplateResource::from(r)))
                .collect(),
            outputs: self.outputs.clone(),
        };

        info!(
            stack = %self.name,
            resources = graph.node_count(),
            edges = graph.edge_count(),
            outputs = self.outputs.len(),
            "synthesized stack"
        );
        Ok(template)
    }
}
