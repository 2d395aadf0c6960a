//! VPC endpoints for AWS services.
//!
//! Interface endpoints place ENIs in the given subnets and answer on the
//! service's regional DNS name. Gateway endpoints add prefix-list routes to
//! the route tables of the given subnets.

use super::security_group::SecurityGroup;
use super::subnet::Subnet;
use super::vpc::Vpc;
use crate::cfn::{logical_id, Expr, Resource, ResourceType};
use crate::error::{Error, Result};
use crate::stack::Stack;

/// Services reached through interface endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceService {
    Ssm,
    Ec2Messages,
    SsmMessages,
}

impl InterfaceService {
    pub fn short_name(&self) -> &'static str {
        match self {
            InterfaceService::Ssm => "ssm",
            InterfaceService::Ec2Messages => "ec2messages",
            InterfaceService::SsmMessages => "ssmmessages",
        }
    }

    /// HTTPS port the endpoint answers on.
    pub fn port(&self) -> u16 {
        443
    }
}

/// Services reached through gateway endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayService {
    S3,
}

impl GatewayService {
    pub fn short_name(&self) -> &'static str {
        match self {
            GatewayService::S3 => "s3",
        }
    }
}

/// `com.amazonaws.<region>.<service>`, resolved at deploy time.
pub fn service_name(short_name: &str) -> Expr {
    Expr::Join(
        String::new(),
        vec![
            Expr::str("com.amazonaws."),
            Expr::region(),
            Expr::str(format!(".{short_name}")),
        ],
    )
}

fn check_membership(vpc: &Vpc, subnets: &[&Subnet]) -> Result<()> {
    match subnets.iter().find(|s| !vpc.owns_subnet(s.logical_id())) {
        Some(foreign) => Err(Error::ForeignSubnet {
            subnet: foreign.logical_id().to_string(),
            network: vpc.logical_id().to_string(),
        }),
        None => Ok(()),
    }
}

/// Interface endpoint configuration
#[derive(Debug, Clone)]
pub struct InterfaceEndpointProps<'a> {
    pub service: InterfaceService,
    pub private_dns_enabled: bool,
    pub subnets: Vec<&'a Subnet>,
    pub security_groups: Vec<&'a SecurityGroup>,
}

/// A declared interface endpoint.
#[derive(Debug, Clone)]
pub struct InterfaceEndpoint {
    logical_id: String,
    service: InterfaceService,
}

impl InterfaceEndpoint {
    pub fn new(
        stack: &mut Stack,
        id: &str,
        vpc: &Vpc,
        props: InterfaceEndpointProps<'_>,
    ) -> Result<Self> {
        check_membership(vpc, &props.subnets)?;

        let logical_id = stack.add(
            Resource::new(logical_id(&[id]), ResourceType::VpcEndpoint)
                .with("ServiceName", service_name(props.service.short_name()))
                .with("VpcId", vpc.vpc_id())
                .with("PrivateDnsEnabled", props.private_dns_enabled)
                .with(
                    "SecurityGroupIds",
                    props
                        .security_groups
                        .iter()
                        .map(|g| g.group_id())
                        .collect::<Vec<_>>(),
                )
                .with(
                    "SubnetIds",
                    props
                        .subnets
                        .iter()
                        .map(|s| s.subnet_id())
                        .collect::<Vec<_>>(),
                )
                .with("VpcEndpointType", "Interface"),
        )?;
        Ok(Self {
            logical_id,
            service: props.service,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn service(&self) -> InterfaceService {
        self.service
    }
}

/// A declared gateway endpoint.
#[derive(Debug, Clone)]
pub struct GatewayEndpoint {
    logical_id: String,
}

impl GatewayEndpoint {
    /// Route `service` from the route tables of `subnets`.
    pub fn new(
        stack: &mut Stack,
        id: &str,
        vpc: &Vpc,
        service: GatewayService,
        subnets: &[&Subnet],
    ) -> Result<Self> {
        check_membership(vpc, subnets)?;

        let mut route_tables: Vec<Expr> = Vec::new();
        for subnet in subnets {
            let table = subnet.route_table_id()?;
            if !route_tables.contains(&table) {
                route_tables.push(table);
            }
        }

        let logical_id = stack.add(
            Resource::new(logical_id(&[id]), ResourceType::VpcEndpoint)
                .with("ServiceName", service_name(service.short_name()))
                .with("VpcId", vpc.vpc_id())
                .with("RouteTableIds", route_tables)
                .with("VpcEndpointType", "Gateway"),
        )?;
        Ok(Self { logical_id })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }
}
