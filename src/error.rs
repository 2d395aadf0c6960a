//! Error types for Cloudwire.
//!
//! This module defines the error types raised while declaring resources,
//! building the dependency graph of a stack and writing synthesized
//! templates to disk.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Cloudwire operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Cloudwire.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Declaration Errors
    // ========================================================================
    /// A logical id was declared twice in the same stack.
    #[error("Resource '{logical_id}' is already declared in stack '{stack}'")]
    DuplicateResource {
        /// Stack name
        stack: String,
        /// Offending logical id
        logical_id: String,
    },

    /// A resource was looked up but is not part of the stack.
    #[error("Resource '{logical_id}' not found in stack '{stack}'")]
    ResourceNotFound {
        /// Stack name
        stack: String,
        /// Missing logical id
        logical_id: String,
    },

    /// A resource references a logical id that is neither a resource nor a parameter.
    #[error("Resource '{from}' references unknown logical id '{to}'")]
    DanglingReference {
        /// Referencing resource
        from: String,
        /// Unresolved target
        to: String,
    },

    /// A subnet would end up with more than one route-table association.
    #[error("Subnet '{subnet}' has conflicting route table associations: {}", associations.join(", "))]
    ConflictingAssociation {
        /// Subnet logical id
        subnet: String,
        /// Association logical ids
        associations: Vec<String>,
    },

    /// A subnet was used with a network it does not belong to.
    #[error("Subnet '{subnet}' does not belong to network '{network}'")]
    ForeignSubnet {
        /// Subnet logical id
        subnet: String,
        /// Network logical id
        network: String,
    },

    /// A subnet has no route table to add routes to.
    #[error("Subnet '{0}' has no route table attached")]
    MissingRouteTable(String),

    /// A machine image could not be resolved.
    #[error("Machine image for '{0}' has no region mapping")]
    MissingImage(String),

    /// Requested availability zone index is beyond the network's AZ count.
    #[error("Availability zone index {index} exceeds max_azs {max_azs} of network '{network}'")]
    InvalidAvailabilityZone {
        /// Network logical id
        network: String,
        /// Requested index
        index: usize,
        /// Configured AZ count
        max_azs: usize,
    },

    // ========================================================================
    // Graph Errors
    // ========================================================================
    /// A dependency cycle was detected.
    #[error("Dependency cycle detected: {0}")]
    DependencyCycle(String),

    // ========================================================================
    // Addressing Errors
    // ========================================================================
    /// A CIDR string failed to parse.
    #[error("Invalid CIDR '{value}': {message}")]
    InvalidCidr {
        /// Raw value
        value: String,
        /// Parser message
        message: String,
    },

    /// A subnet CIDR does not fit inside its network.
    #[error("Subnet '{subnet}' CIDR {cidr} is outside network CIDR {network}")]
    CidrOutsideNetwork {
        /// Subnet logical id
        subnet: String,
        /// Subnet CIDR
        cidr: String,
        /// Network CIDR
        network: String,
    },

    /// Two address ranges overlap where they must be disjoint.
    #[error("CIDR {first} overlaps {second}")]
    OverlappingCidr {
        /// First range
        first: String,
        /// Second range
        second: String,
    },

    /// A stack does not admit traffic from its peer network.
    #[error("Stack '{stack}' has no security group rule admitting all traffic from {cidr}")]
    MissingPeerRule {
        /// Stack name
        stack: String,
        /// Peer CIDR
        cidr: String,
    },

    // ========================================================================
    // Synthesis Errors
    // ========================================================================
    /// Stack not found by name.
    #[error("Stack '{0}' not found")]
    StackNotFound(String),

    /// A stack has no network resource to inspect.
    #[error("Stack '{0}' declares no VPC")]
    MissingNetwork(String),

    /// Error reading or writing a file.
    #[error("IO error on '{path}': {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Creates a new IO error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new resource-not-found error.
    pub fn resource_not_found(stack: impl Into<String>, logical_id: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            stack: stack.into(),
            logical_id: logical_id.into(),
        }
    }

    /// Returns true if the error describes a broken dependency graph.
    pub fn is_ordering_violation(&self) -> bool {
        matches!(
            self,
            Error::DependencyCycle(_)
                | Error::DanglingReference { .. }
                | Error::ConflictingAssociation { .. }
        )
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Io { .. } => 2,
            _ => 1,
        }
    }
}
