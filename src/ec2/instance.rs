//! EC2 instances and machine image resolution.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::security_group::SecurityGroup;
use super::subnet::Subnet;
use crate::cfn::{logical_id, Expr, Mapping, Parameter, Resource, ResourceType};
use crate::error::{Error, Result};
use crate::iam::Role;
use crate::stack::Stack;

pub const DEFAULT_INSTANCE_TYPE: &str = "t2.micro";

/// Public SSM parameter holding the latest Amazon Linux 2 AMI.
pub const AMAZON_LINUX_2_SSM_PATH: &str =
    "/aws/service/ami-amazon-linux-latest/amzn2-ami-hvm-x86_64-gp2";

/// Template parameter resolving [`AMAZON_LINUX_2_SSM_PATH`].
pub const AMAZON_LINUX_2_PARAMETER: &str = "LatestAmazonLinux2ImageId";

const DEFAULT_USER_DATA: &str = "#!/bin/bash";

/// Where an instance's AMI comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum MachineImage {
    /// Latest Amazon Linux 2, looked up at deploy time
    LatestAmazonLinux2,
    /// Fixed AMI per region
    GenericLinux(BTreeMap<String, String>),
}

impl MachineImage {
    /// Declare whatever the image needs and return the `ImageId` value.
    fn image_id(&self, stack: &mut Stack, instance_id: &str) -> Result<Expr> {
        match self {
            MachineImage::LatestAmazonLinux2 => {
                stack.add_parameter(
                    AMAZON_LINUX_2_PARAMETER,
                    Parameter {
                        parameter_type: "AWS::SSM::Parameter::Value<AWS::EC2::Image::Id>"
                            .to_string(),
                        default: Some(AMAZON_LINUX_2_SSM_PATH.to_string()),
                        description: None,
                    },
                )?;
                Ok(Expr::reference(AMAZON_LINUX_2_PARAMETER))
            }
            MachineImage::GenericLinux(images) => {
                if images.is_empty() {
                    return Err(Error::MissingImage(instance_id.to_string()));
                }
                let map_name = format!("{instance_id}AmiMap");
                let mapping: Mapping = images
                    .iter()
                    .map(|(region, ami)| {
                        let mut entry = IndexMap::new();
                        entry.insert("ami".to_string(), ami.clone());
                        (region.clone(), entry)
                    })
                    .collect();
                stack.add_mapping(&map_name, mapping);
                Ok(Expr::FindInMap(map_name, Box::new(Expr::region()), "ami".to_string()))
            }
        }
    }
}

/// Instance configuration
#[derive(Debug, Clone)]
pub struct InstanceProps<'a> {
    /// `Name` tag, defaults to the construct path
    pub name: Option<String>,
    pub subnet: &'a Subnet,
    pub security_group: &'a SecurityGroup,
    pub role: &'a Role,
    pub image: MachineImage,
    pub instance_type: String,
    /// Startup script, defaults to an empty bash script
    pub user_data: Option<String>,
    /// Explicit source/destination check, left to the service default when absent
    pub source_dest_check: Option<bool>,
}

impl<'a> InstanceProps<'a> {
    pub fn new(
        subnet: &'a Subnet,
        security_group: &'a SecurityGroup,
        role: &'a Role,
        image: MachineImage,
    ) -> Self {
        Self {
            name: None,
            subnet,
            security_group,
            role,
            image,
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
            user_data: None,
            source_dest_check: None,
        }
    }
}

/// A declared instance.
#[derive(Debug, Clone)]
pub struct Instance {
    logical_id: String,
    subnet_id: String,
}

impl Instance {
    /// Declare an instance and its instance profile.
    pub fn new(stack: &mut Stack, id: &str, props: InstanceProps<'_>) -> Result<Self> {
        let instance_id = logical_id(&[id]);
        let profile_id = logical_id(&[id, "InstanceProfile"]);
        stack.ensure_available(&[&instance_id, &profile_id])?;
        let image_id = props.image.image_id(stack, &instance_id)?;

        let profile = stack.add(
            Resource::new(&profile_id, ResourceType::InstanceProfile)
                .with("Roles", vec![props.role.role_ref()]),
        )?;

        let name = props
            .name
            .unwrap_or_else(|| format!("{}/{}", stack.name(), id));
        let user_data = props
            .user_data
            .unwrap_or_else(|| DEFAULT_USER_DATA.to_string());

        let logical_id = stack.add(
            Resource::new(&instance_id, ResourceType::Instance)
                .with("AvailabilityZone", props.subnet.availability_zone().clone())
                .with("IamInstanceProfile", Expr::reference(&profile))
                .with("ImageId", image_id)
                .with("InstanceType", props.instance_type)
                .with("SecurityGroupIds", vec![props.security_group.group_id()])
                .with_opt("SourceDestCheck", props.source_dest_check)
                .with("SubnetId", props.subnet.subnet_id())
                .with("Tags", Expr::tags(&[("Name", name.as_str())]))
                .with("UserData", Expr::Base64(Box::new(Expr::str(user_data)))),
        )?;

        if stack.contains(props.role.policy_id()) {
            stack.add_dependency(&logical_id, props.role.policy_id())?;
        }
        stack.add_dependency(&logical_id, props.role.logical_id())?;

        Ok(Self {
            logical_id,
            subnet_id: props.subnet.logical_id().to_string(),
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Logical id of the subnet the instance boots in.
    pub fn subnet_logical_id(&self) -> &str {
        &self.subnet_id
    }

    /// `Ref` to the instance id.
    pub fn instance_id(&self) -> Expr {
        Expr::reference(&self.logical_id)
    }

    pub fn public_ip(&self) -> Expr {
        Expr::get_att(&self.logical_id, "PublicIp")
    }

    pub fn private_ip(&self) -> Expr {
        Expr::get_att(&self.logical_id, "PrivateIp")
    }

    /// Wait for every resource in `prerequisites` before creating the instance.
    pub fn depend_on(&self, stack: &mut Stack, prerequisites: &[&str]) -> Result<()> {
        for prerequisite in prerequisites {
            stack.add_dependency(&self.logical_id, prerequisite)?;
        }
        Ok(())
    }
}
