//! Software router appliance for the simulated on-premises network.
//!
//! A route server is an instance booted in the public subnet with a second
//! network interface in a private subnet. Both have source/destination
//! checking disabled so the instance can forward traffic it does not own.
//! Routes in the private subnet point at the interface, not the instance.

use crate::cfn::logical_id;
use crate::ec2::{
    Instance, InstanceProps, MachineImage, NetworkInterface, NetworkInterfaceProps,
    SecurityGroup, Subnet, Vpc, DEFAULT_INSTANCE_TYPE,
};
use crate::error::{Error, Result};
use crate::iam::Role;
use crate::stack::Stack;

/// Device index of the private interface on the router instance.
pub const PRIVATE_DEVICE_INDEX: u32 = 1;

/// Route server configuration
#[derive(Debug, Clone)]
pub struct RouteServerProps<'a> {
    /// `Name` tag of the instance, also suffixed onto the interface name
    pub instance_name: String,
    pub vpc: &'a Vpc,
    pub role: &'a Role,
    pub security_group: &'a SecurityGroup,
    pub public_subnet: &'a Subnet,
    pub private_eni_subnet: &'a Subnet,
    pub image: MachineImage,
    /// Startup script configuring forwarding
    pub user_data: String,
}

/// Handles to the router instance and its private interface.
#[derive(Debug, Clone)]
pub struct RouteServer {
    instance: Instance,
    private_eni: NetworkInterface,
    attachment_id: String,
}

impl RouteServer {
    pub fn new(stack: &mut Stack, id: &str, props: RouteServerProps<'_>) -> Result<Self> {
        for subnet in [props.public_subnet, props.private_eni_subnet] {
            if !props.vpc.owns_subnet(subnet.logical_id()) {
                return Err(Error::ForeignSubnet {
                    subnet: subnet.logical_id().to_string(),
                    network: props.vpc.logical_id().to_string(),
                });
            }
        }

        let instance = Instance::new(
            stack,
            &logical_id(&[id, "ROUTER"]),
            InstanceProps {
                name: Some(props.instance_name.clone()),
                subnet: props.public_subnet,
                security_group: props.security_group,
                role: props.role,
                image: props.image,
                instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
                user_data: Some(props.user_data),
                source_dest_check: Some(false),
            },
        )?;

        let private_eni = NetworkInterface::new(
            stack,
            &logical_id(&[id, "ENI_PRIVATE"]),
            NetworkInterfaceProps {
                subnet: props.private_eni_subnet,
                security_groups: vec![props.security_group],
                source_dest_check: false,
                name: Some(format!("ENI_PRIVATE{}", props.instance_name)),
            },
        )?;

        let attachment_id = private_eni.attach(
            stack,
            &logical_id(&[id, "ENIAttachmentRouter"]),
            &instance,
            PRIVATE_DEVICE_INDEX,
        )?;

        Ok(Self {
            instance,
            private_eni,
            attachment_id,
        })
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// The forwarding interface routes should target.
    pub fn private_eni(&self) -> &NetworkInterface {
        &self.private_eni
    }

    pub fn attachment_id(&self) -> &str {
        &self.attachment_id
    }
}
