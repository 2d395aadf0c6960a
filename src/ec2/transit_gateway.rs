//! Transit Gateway and VPC attachments.

use super::subnet::Subnet;
use super::vpc::Vpc;
use crate::cfn::{logical_id, Expr, Resource, ResourceType};
use crate::error::{Error, Result};
use crate::stack::Stack;

/// Transit Gateway configuration
#[derive(Debug, Clone)]
pub struct TransitGatewayProps {
    /// Private ASN on the Amazon side of BGP sessions
    pub amazon_side_asn: i64,
    pub description: String,
    /// Associate attachments with the default route table automatically
    pub default_route_table_association: bool,
    /// Propagate attachment routes to the default route table automatically
    pub default_route_table_propagation: bool,
    pub dns_support: bool,
    pub vpn_ecmp_support: bool,
}

impl Default for TransitGatewayProps {
    fn default() -> Self {
        Self {
            amazon_side_asn: 64512,
            description: String::new(),
            default_route_table_association: true,
            default_route_table_propagation: true,
            dns_support: true,
            vpn_ecmp_support: true,
        }
    }
}

fn flag(enabled: bool) -> &'static str {
    if enabled {
        "enable"
    } else {
        "disable"
    }
}

/// A declared Transit Gateway.
#[derive(Debug, Clone)]
pub struct TransitGateway {
    logical_id: String,
}

impl TransitGateway {
    pub fn new(stack: &mut Stack, id: &str, props: TransitGatewayProps) -> Result<Self> {
        let logical_id = stack.add(
            Resource::new(logical_id(&[id]), ResourceType::TransitGateway)
                .with("AmazonSideAsn", props.amazon_side_asn)
                .with(
                    "DefaultRouteTableAssociation",
                    flag(props.default_route_table_association),
                )
                .with(
                    "DefaultRouteTablePropagation",
                    flag(props.default_route_table_propagation),
                )
                .with("Description", props.description)
                .with("DnsSupport", flag(props.dns_support))
                .with("VpnEcmpSupport", flag(props.vpn_ecmp_support)),
        )?;
        Ok(Self { logical_id })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// `Ref` to the Transit Gateway id.
    pub fn transit_gateway_id(&self) -> Expr {
        Expr::reference(&self.logical_id)
    }
}

/// Attachment of a VPC to a Transit Gateway.
#[derive(Debug, Clone)]
pub struct TransitGatewayAttachment {
    logical_id: String,
}

impl TransitGatewayAttachment {
    /// Attach `vpc` through `subnets`. Every subnet must belong to `vpc`.
    pub fn new(
        stack: &mut Stack,
        id: &str,
        gateway: &TransitGateway,
        vpc: &Vpc,
        subnets: &[&Subnet],
    ) -> Result<Self> {
        if let Some(foreign) = subnets.iter().find(|s| !vpc.owns_subnet(s.logical_id())) {
            return Err(Error::ForeignSubnet {
                subnet: foreign.logical_id().to_string(),
                network: vpc.logical_id().to_string(),
            });
        }

        let logical_id = stack.add(
            Resource::new(logical_id(&[id]), ResourceType::TransitGatewayAttachment)
                .with(
                    "SubnetIds",
                    subnets.iter().map(|s| s.subnet_id()).collect::<Vec<_>>(),
                )
                .with("TransitGatewayId", gateway.transit_gateway_id())
                .with("VpcId", vpc.vpc_id()),
        )?;
        Ok(Self { logical_id })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }
}
