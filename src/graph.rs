//! Resource Dependency Tracking
//!
//! This module tracks the dependencies between the resources of one stack.
//! Edges come from two sources and are kept in one graph:
//!
//! - **Reference** edges, derived from `Ref`/`Fn::GetAtt` values in properties
//! - **Explicit** edges, declared with `Stack::add_dependency`
//!
//! The graph gives the creation order the provisioning engine will follow,
//! the teardown order, impact queries and cycle detection.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A node in the dependency graph representing a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyNode {
    /// Logical id
    pub id: String,
    /// CloudFormation type name
    pub resource_type: String,
    /// Declaration sequence number
    pub sequence: u64,
}

impl DependencyNode {
    /// Create a new dependency node
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            sequence: 0,
        }
    }
}

/// How a dependency edge came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyType {
    /// Property value references the prerequisite
    Reference,
    /// Declared ordering edge
    Explicit,
}

/// A dependency between two resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDependency {
    /// Prerequisite resource id (created first)
    pub from_id: String,
    /// Dependent resource id
    pub to_id: String,
    /// Type of dependency
    pub dependency_type: DependencyType,
    /// Optional description
    pub description: Option<String>,
}

impl ResourceDependency {
    /// Create a new resource dependency
    pub fn new(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        dep_type: DependencyType,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            dependency_type: dep_type,
            description: None,
        }
    }

    /// Add a description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

/// The dependency graph of a stack
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<DependencyNode, ResourceDependency>,
    node_indices: HashMap<String, NodeIndex>,
    sequence_counter: u64,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, mut node: DependencyNode) -> NodeIndex {
        node.sequence = self.sequence_counter;
        self.sequence_counter += 1;

        if let Some(&idx) = self.node_indices.get(&node.id) {
            if let Some(existing) = self.graph.node_weight_mut(idx) {
                *existing = node;
            }
            return idx;
        }

        let node_id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_indices.insert(node_id, idx);
        idx
    }

    /// Add a dependency edge, prerequisite first
    pub fn add_dependency(&mut self, dependency: ResourceDependency) -> Result<()> {
        let from_idx = self.index_of(&dependency.to_id, &dependency.from_id)?;
        let to_idx = self.index_of(&dependency.from_id, &dependency.to_id)?;

        let duplicate = self
            .graph
            .edges_connecting(from_idx, to_idx)
            .any(|e| e.weight().dependency_type == dependency.dependency_type);
        if !duplicate {
            self.graph.add_edge(from_idx, to_idx, dependency);
        }
        Ok(())
    }

    fn index_of(&self, context: &str, id: &str) -> Result<NodeIndex> {
        self.node_indices
            .get(id)
            .copied()
            .ok_or_else(|| Error::DanglingReference {
                from: context.to_string(),
                to: id.to_string(),
            })
    }

    /// Check for dependency cycles, including a resource depending on itself
    pub fn has_cycles(&self) -> bool {
        !self.get_cycles().is_empty()
    }

    /// Get all cycles in the graph
    pub fn get_cycles(&self) -> Vec<Vec<String>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1
                    || scc
                        .first()
                        .is_some_and(|&idx| self.graph.find_edge(idx, idx).is_some())
            })
            .map(|scc| {
                scc.into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).map(|n| n.id.clone()))
                    .collect()
            })
            .collect()
    }

    /// Creation order: every resource after all of its prerequisites
    pub fn creation_order(&self) -> Result<Vec<String>> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .filter_map(|idx| self.graph.node_weight(idx).map(|n| n.id.clone()))
                .collect()),
            Err(cycle) => {
                let id = self
                    .graph
                    .node_weight(cycle.node_id())
                    .map(|n| n.id.clone())
                    .unwrap_or_default();
                Err(Error::DependencyCycle(format!(
                    "cannot order resources, cycle through '{}'",
                    id
                )))
            }
        }
    }

    /// Teardown order: the reverse of creation order
    pub fn teardown_order(&self) -> Result<Vec<String>> {
        let mut order = self.creation_order()?;
        order.reverse();
        Ok(order)
    }

    /// Get all resources that depend on a given resource (direct and transitive)
    pub fn get_dependents(&self, id: &str) -> Vec<String> {
        self.walk(id, Direction::Outgoing)
    }

    /// Get all resources a given resource depends on (direct and transitive)
    pub fn get_dependencies(&self, id: &str) -> Vec<String> {
        self.walk(id, Direction::Incoming)
    }

    fn walk(&self, id: &str, direction: Direction) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        let mut queue = VecDeque::new();

        if let Some(&start_idx) = self.node_indices.get(id) {
            queue.push_back(start_idx);

            while let Some(current) = queue.pop_front() {
                for neighbor in self.graph.neighbors_directed(current, direction) {
                    if let Some(node) = self.graph.node_weight(neighbor) {
                        if seen.insert(node.id.clone()) {
                            found.push(node.id.clone());
                            queue.push_back(neighbor);
                        }
                    }
                }
            }
        }

        found
    }

    /// Get the incoming edges of a resource
    pub fn get_direct_dependencies(&self, id: &str) -> Vec<ResourceDependency> {
        let mut deps = Vec::new();

        if let Some(&idx) = self.node_indices.get(id) {
            for edge in self.graph.edges_directed(idx, Direction::Incoming) {
                deps.push(edge.weight().clone());
            }
        }

        deps.sort_by_key(|d| self.get_node(&d.from_id).map(|n| n.sequence));
        deps
    }

    /// Direct prerequisites of a resource, regardless of how the edge arose
    pub fn direct_prerequisites(&self, id: &str) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for dep in self.get_direct_dependencies(id) {
            if !ids.contains(&dep.from_id) {
                ids.push(dep.from_id);
            }
        }
        ids
    }

    /// Whether `dependent` waits for `prerequisite`, directly or transitively
    pub fn depends_on(&self, dependent: &str, prerequisite: &str) -> bool {
        self.get_dependencies(dependent)
            .iter()
            .any(|id| id == prerequisite)
    }

    /// Get a node by ID
    pub fn get_node(&self, id: &str) -> Option<&DependencyNode> {
        self.node_indices
            .get(id)
            .and_then(|idx| self.graph.node_weight(*idx))
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Generate a DOT format representation for visualization
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph dependencies {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box];\n\n");

        for idx in self.graph.node_indices() {
            if let Some(node) = self.graph.node_weight(idx) {
                let label = format!("{}\\n{}", node.id, node.resource_type);
                output.push_str(&format!("  \"{}\" [label=\"{}\"];\n", node.id, label));
            }
        }

        output.push('\n');

        for edge in self.graph.edge_references() {
            let source = self
                .graph
                .node_weight(edge.source())
                .map(|n| n.id.as_str())
                .unwrap_or("?");
            let target = self
                .graph
                .node_weight(edge.target())
                .map(|n| n.id.as_str())
                .unwrap_or("?");

            let (style, color) = match edge.weight().dependency_type {
                DependencyType::Reference => ("solid", "gray"),
                DependencyType::Explicit => ("bold", "red"),
            };

            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [style={}, color={}];\n",
                source, target, style, color
            ));
        }

        output.push_str("}\n");
        output
    }

    /// Get resource ids grouped by type
    pub fn nodes_by_type(&self) -> HashMap<String, Vec<String>> {
        let mut by_type: HashMap<String, Vec<String>> = HashMap::new();

        for idx in self.graph.node_indices() {
            if let Some(node) = self.graph.node_weight(idx) {
                by_type
                    .entry(node.resource_type.clone())
                    .or_default()
                    .push(node.id.clone());
            }
        }

        by_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.add_node(DependencyNode::new("Vpc", "AWS::EC2::VPC"));
        graph.add_node(DependencyNode::new("Subnet", "AWS::EC2::Subnet"));
        graph.add_node(DependencyNode::new("Instance", "AWS::EC2::Instance"));
        graph
            .add_dependency(ResourceDependency::new(
                "Vpc",
                "Subnet",
                DependencyType::Reference,
            ))
            .unwrap();
        graph
            .add_dependency(ResourceDependency::new(
                "Subnet",
                "Instance",
                DependencyType::Reference,
            ))
            .unwrap();
        graph
    }

    #[test]
    fn test_dependency_graph_creation() {
        let graph = DependencyGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_add_nodes_have_no_implicit_edges() {
        let mut graph = DependencyGraph::new();
        graph.add_node(DependencyNode::new("A", "AWS::EC2::VPC"));
        graph.add_node(DependencyNode::new("B", "AWS::EC2::VPC"));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut graph = chain();
        graph
            .add_dependency(ResourceDependency::new(
                "Vpc",
                "Subnet",
                DependencyType::Reference,
            ))
            .unwrap();
        assert_eq!(graph.edge_count(), 2);

        graph
            .add_dependency(ResourceDependency::new(
                "Vpc",
                "Subnet",
                DependencyType::Explicit,
            ))
            .unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.direct_prerequisites("Subnet"), vec!["Vpc"]);
    }

    #[test]
    fn test_unknown_node_is_dangling() {
        let mut graph = chain();
        let err = graph
            .add_dependency(ResourceDependency::new(
                "Missing",
                "Instance",
                DependencyType::Explicit,
            ))
            .unwrap_err();
        assert!(matches!(err, Error::DanglingReference { ref to, .. } if to == "Missing"));
    }

    #[test]
    fn test_transitive_queries() {
        let graph = chain();
        let deps = graph.get_dependencies("Instance");
        assert!(deps.contains(&"Vpc".to_string()));
        assert!(deps.contains(&"Subnet".to_string()));
        assert!(graph.depends_on("Instance", "Vpc"));
        assert!(!graph.depends_on("Vpc", "Instance"));

        let dependents = graph.get_dependents("Vpc");
        assert_eq!(dependents.len(), 2);
    }

    #[test]
    fn test_creation_and_teardown_order() {
        let graph = chain();
        let order = graph.creation_order().unwrap();
        assert_eq!(order, vec!["Vpc", "Subnet", "Instance"]);
        let teardown = graph.teardown_order().unwrap();
        assert_eq!(teardown, vec!["Instance", "Subnet", "Vpc"]);
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = chain();
        graph
            .add_dependency(ResourceDependency::new(
                "Instance",
                "Vpc",
                DependencyType::Explicit,
            ))
            .unwrap();
        assert!(graph.has_cycles());
        assert!(matches!(
            graph.creation_order(),
            Err(Error::DependencyCycle(_))
        ));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_node(DependencyNode::new("Sg", "AWS::EC2::SecurityGroup"));
        graph
            .add_dependency(ResourceDependency::new(
                "Sg",
                "Sg",
                DependencyType::Reference,
            ))
            .unwrap();
        assert_eq!(graph.get_cycles(), vec![vec!["Sg".to_string()]]);
    }

    #[test]
    fn test_to_dot() {
        let dot = chain().to_dot();
        assert!(dot.contains("digraph"));
        assert!(dot.contains("\"Vpc\" -> \"Subnet\""));
    }

    #[test]
    fn test_nodes_by_type() {
        let by_type = chain().nodes_by_type();
        assert_eq!(by_type.get("AWS::EC2::VPC").unwrap().len(), 1);
    }
}
