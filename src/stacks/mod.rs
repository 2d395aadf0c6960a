//! The two deployable stacks.
//!
//! - [`private_vpc`]: private VPC whose only way out is a Transit Gateway
//! - [`onprem`]: simulated on-premises network fronted by software routers
//!
//! The address spaces of the two stacks are literal constants shared here;
//! [`crate::address_plan`] checks they stay consistent.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::stack::Stack;

pub mod onprem;
pub mod private_vpc;

/// Address space of the AWS side.
pub const AWS_NETWORK_CIDR: &str = "10.16.0.0/16";

/// Address space of the simulated on-premises side.
pub const ONPREM_NETWORK_CIDR: &str = "192.168.8.0/21";

pub const PRIVATE_VPC_STACK: &str = "PrivateVpcWithTgwStack";
pub const ONPREM_STACK: &str = "SimulatedOnpremiseNetworkStack";

/// Every stack name, in deployment order.
pub const STACK_NAMES: &[&str] = &[PRIVATE_VPC_STACK, ONPREM_STACK];

/// Region the router AMI is published in by default.
pub const DEFAULT_ROUTER_REGION: &str = "us-east-1";
pub const DEFAULT_ROUTER_AMI: &str = "ami-0ac80df6eff0e70b5";

/// Router bootstrap script shipped with the binary.
pub const DEFAULT_ROUTER_USER_DATA: &str = include_str!("../../assets/onprem-user-data.sh");

/// Inputs the stack builders take from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StackSettings {
    /// Region -> AMI id of the route server image
    pub router_images: BTreeMap<String, String>,
    /// Route server startup script
    pub router_user_data: String,
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            router_images: BTreeMap::from([(
                DEFAULT_ROUTER_REGION.to_string(),
                DEFAULT_ROUTER_AMI.to_string(),
            )]),
            router_user_data: DEFAULT_ROUTER_USER_DATA.to_string(),
        }
    }
}

/// Build one stack by name.
pub fn build(name: &str, settings: &StackSettings) -> Result<Stack> {
    match name {
        PRIVATE_VPC_STACK => private_vpc::build(),
        ONPREM_STACK => onprem::build(settings),
        other => Err(Error::StackNotFound(other.to_string())),
    }
}

/// Build every stack, in deployment order.
pub fn build_all(settings: &StackSettings) -> Result<Vec<Stack>> {
    STACK_NAMES.iter().map(|name| build(name, settings)).collect()
}
