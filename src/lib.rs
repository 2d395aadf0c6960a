//! # Cloudwire - Typed AWS Network Stacks
//!
//! Cloudwire declares AWS network topologies as typed Rust values and
//! synthesizes them into CloudFormation templates. Two stacks ship with the
//! crate: a private VPC wired to a Transit Gateway, and a simulated
//! on-premises network whose software routers forward traffic toward AWS.
//!
//! ## Core Concepts
//!
//! - **Stacks**: Ordered collections of resources, parameters, mappings and outputs
//! - **Constructs**: Typed handles (VPC, subnet, gateway, endpoint, instance) that
//!   declare one or more resources into a stack
//! - **Expressions**: CloudFormation intrinsics (`Ref`, `Fn::GetAtt`, ...) that
//!   carry the references between resources
//! - **Dependency graph**: Reference and explicit edges used for ordering and
//!   cycle detection
//! - **Cloud assembly**: Rendered templates plus a manifest on disk
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           CLI Interface                              │
//! │                    (clap-based command parsing)                      │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       App / Cloud assembly                           │
//! │                (stack selection, synthesis to disk)                  │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!          ┌─────────────────────────┼─────────────────────────┐
//!          ▼                         ▼                         ▼
//! ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────────┐
//! │  Stack builders │   │   EC2 / IAM         │   │   Address plan      │
//! │  (private VPC,  │   │   constructs        │   │   (CIDR overlap and │
//! │   on-premises)  │   │                     │   │    peer rules)      │
//! └─────────────────┘   └─────────────────────┘   └─────────────────────┘
//!          │                         │                         │
//!          └─────────────────────────┼─────────────────────────┘
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  Stack + dependency graph (petgraph)                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use cloudwire::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let app = App::from_settings(&StackSettings::default())?;
//!     let assembly = app.synth(std::path::Path::new("cloudwire.out"), TemplateFormat::Json, &[])?;
//!     println!("{} templates written", assembly.manifest.artifacts.len());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types.
    //!
    //! - **Stacks**: [`Stack`], [`App`], and the built-in stack builders
    //! - **Constructs**: EC2 and IAM handles
    //! - **Templates**: expressions, resources and rendered templates
    //! - **Errors**: Error handling types

    // Error handling
    pub use crate::error::{Error, Result};

    // Stacks and synthesis
    pub use crate::app::{App, CloudAssembly, Manifest, TemplateFormat};
    pub use crate::graph::DependencyGraph;
    pub use crate::stack::Stack;
    pub use crate::stacks::StackSettings;

    // Template model
    pub use crate::cfn::{logical_id, Expr, Output, Parameter, Resource, ResourceType, Template};

    // Constructs
    pub use crate::ec2::{
        GatewayEndpoint, GatewayService, Instance, InstanceProps, InterfaceEndpoint,
        InterfaceEndpointProps, InterfaceService, InternetGateway, MachineImage,
        NetworkInterface, NetworkInterfaceProps, Peer, Port, RouteTable, RouteTarget,
        SecurityGroup, SecurityGroupProps, Subnet, SubnetProps, TransitGateway,
        TransitGatewayAttachment, TransitGatewayProps, Vpc, VpcProps,
    };
    pub use crate::iam::{PolicyStatement, Role};
    pub use crate::route_server::{RouteServer, RouteServerProps};
}

// ============================================================================
// Core Modules
// ============================================================================

/// Error types and result aliases.
///
/// Every fallible declaration, graph and synthesis operation returns
/// [`Error`](error::Error).
pub mod error;

/// CIDR parsing and containment helpers.
pub mod cidr;

/// CloudFormation template model: expressions, resources and templates.
pub mod cfn;

/// Resource dependency graph with ordering and cycle detection.
pub mod graph;

/// The stack container and its declaration journal.
pub mod stack;

// ============================================================================
// Constructs
// ============================================================================

/// EC2 networking and compute constructs.
pub mod ec2;

/// IAM roles and policies.
pub mod iam;

/// Software router: instance plus a second network interface.
pub mod route_server;

// ============================================================================
// Stacks and Synthesis
// ============================================================================

/// Built-in stack definitions.
pub mod stacks;

/// Cross-stack address plan checks.
pub mod address_plan;

/// Application container and cloud assembly output.
pub mod app;

// ============================================================================
// Configuration and CLI
// ============================================================================

/// Configuration loading and management.
///
/// Supports loading from TOML, YAML and JSON files with environment overrides.
pub mod config;

/// Command-line interface.
pub mod cli;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
