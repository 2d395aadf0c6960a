//! Standalone network interfaces and their instance attachments.

use super::instance::Instance;
use super::security_group::SecurityGroup;
use super::subnet::Subnet;
use crate::cfn::{logical_id, Expr, Resource, ResourceType};
use crate::error::Result;
use crate::stack::Stack;

/// Network interface configuration
#[derive(Debug, Clone)]
pub struct NetworkInterfaceProps<'a> {
    pub subnet: &'a Subnet,
    pub security_groups: Vec<&'a SecurityGroup>,
    pub source_dest_check: bool,
    /// `Name` tag
    pub name: Option<String>,
}

/// A declared network interface.
#[derive(Debug, Clone)]
pub struct NetworkInterface {
    logical_id: String,
}

impl NetworkInterface {
    pub fn new(stack: &mut Stack, id: &str, props: NetworkInterfaceProps<'_>) -> Result<Self> {
        let mut resource = Resource::new(logical_id(&[id]), ResourceType::NetworkInterface)
            .with("SubnetId", props.subnet.subnet_id())
            .with(
                "GroupSet",
                props
                    .security_groups
                    .iter()
                    .map(|g| g.group_id())
                    .collect::<Vec<_>>(),
            )
            .with("SourceDestCheck", props.source_dest_check);
        if let Some(name) = &props.name {
            resource = resource.with("Tags", Expr::tags(&[("Name", name.as_str())]));
        }
        let logical_id = stack.add(resource)?;
        Ok(Self { logical_id })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// `Ref` to the interface id.
    pub fn network_interface_id(&self) -> Expr {
        Expr::reference(&self.logical_id)
    }

    /// Attach the interface to `instance` at `device_index`.
    pub fn attach(
        &self,
        stack: &mut Stack,
        id: &str,
        instance: &Instance,
        device_index: u32,
    ) -> Result<String> {
        stack.add(
            Resource::new(logical_id(&[id]), ResourceType::NetworkInterfaceAttachment)
                .with("DeviceIndex", device_index.to_string())
                .with("InstanceId", instance.instance_id())
                .with("NetworkInterfaceId", self.network_interface_id()),
        )
    }
}
