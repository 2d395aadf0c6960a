//! Subnets and their route-table wiring.
//!
//! Declaring a subnet also declares the default wiring a VPC subnet gets:
//! a route table owned by the subnet and the association binding the two.
//! Replacing that wiring with a shared, hand-built route table is a
//! two-phase operation on the [`Subnet`] handle:
//!
//! 1. [`Subnet::detach_default_routing`] removes the owned association and
//!    route table from the stack (idempotent)
//! 2. [`Subnet::associate_route_table`] declares the new association
//!
//! Step 2 refuses to run while any association is still bound, so a
//! subnet can never carry two associations.

use ipnet::Ipv4Net;
use tracing::warn;

use super::gateway::InternetGateway;
use super::route::{Route, RouteTable, RouteTarget};
use super::vpc::Vpc;
use crate::cfn::{logical_id, Expr, Resource, ResourceType};
use crate::cidr::{self, ANY_IPV4};
use crate::error::{Error, Result};
use crate::stack::Stack;

/// Whether instances in the subnet reach the internet directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetKind {
    Public,
    Private,
}

impl SubnetKind {
    fn as_str(&self) -> &'static str {
        match self {
            SubnetKind::Public => "Public",
            SubnetKind::Private => "Private",
        }
    }
}

/// Subnet configuration
#[derive(Debug, Clone)]
pub struct SubnetProps {
    /// CIDR block, inside the VPC range
    pub cidr: String,
    /// Availability zone index in the region
    pub availability_zone: usize,
    /// Assign public IPs to instances launched here
    pub map_public_ip_on_launch: bool,
}

/// The route table a subnet currently routes by.
#[derive(Debug, Clone)]
struct Binding {
    route_table: String,
    association: String,
    /// Route table was generated alongside the subnet
    owned: bool,
}

/// A declared subnet.
#[derive(Debug, Clone)]
pub struct Subnet {
    logical_id: String,
    vpc_id: String,
    kind: SubnetKind,
    cidr: Ipv4Net,
    availability_zone: Expr,
    binding: Option<Binding>,
}

impl Subnet {
    /// Declare a public subnet with its default route table.
    pub fn public(stack: &mut Stack, vpc: &mut Vpc, id: &str, props: SubnetProps) -> Result<Self> {
        Self::declare(stack, vpc, id, SubnetKind::Public, props)
    }

    /// Declare a private subnet with its default route table.
    pub fn private(stack: &mut Stack, vpc: &mut Vpc, id: &str, props: SubnetProps) -> Result<Self> {
        Self::declare(stack, vpc, id, SubnetKind::Private, props)
    }

    fn declare(
        stack: &mut Stack,
        vpc: &mut Vpc,
        id: &str,
        kind: SubnetKind,
        props: SubnetProps,
    ) -> Result<Self> {
        let subnet_id = logical_id(&[id]);
        let route_table_id = logical_id(&[id, "RouteTable"]);
        let association_id = logical_id(&[id, "RouteTableAssociation"]);
        stack.ensure_available(&[&subnet_id, &route_table_id, &association_id])?;

        let range = cidr::parse(&props.cidr)?;
        let availability_zone = vpc.availability_zone(props.availability_zone)?;
        vpc.reserve(&subnet_id, range)?;

        let name_tag = format!("{}/{}", stack.name(), id);
        stack.add(
            Resource::new(&subnet_id, ResourceType::Subnet)
                .with("VpcId", vpc.vpc_id())
                .with("AvailabilityZone", availability_zone.clone())
                .with("CidrBlock", props.cidr.as_str())
                .with("MapPublicIpOnLaunch", props.map_public_ip_on_launch)
                .with(
                    "Tags",
                    Expr::tags(&[
                        ("Name", name_tag.as_str()),
                        ("cloudwire:subnet-type", kind.as_str()),
                    ]),
                ),
        )?;

        let route_table = stack.add(
            Resource::new(&route_table_id, ResourceType::RouteTable)
                .with("VpcId", vpc.vpc_id())
                .with("Tags", Expr::tags(&[("Name", name_tag.as_str())])),
        )?;
        let association = stack.add(
            Resource::new(&association_id, ResourceType::SubnetRouteTableAssociation)
            .with("RouteTableId", Expr::reference(&route_table))
            .with("SubnetId", Expr::reference(&subnet_id)),
        )?;

        Ok(Self {
            logical_id: subnet_id,
            vpc_id: vpc.logical_id().to_string(),
            kind,
            cidr: range,
            availability_zone,
            binding: Some(Binding {
                route_table,
                association,
                owned: true,
            }),
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Logical id of the VPC this subnet was carved from.
    pub fn vpc_logical_id(&self) -> &str {
        &self.vpc_id
    }

    pub fn kind(&self) -> SubnetKind {
        self.kind
    }

    pub fn cidr(&self) -> Ipv4Net {
        self.cidr
    }

    pub fn availability_zone(&self) -> &Expr {
        &self.availability_zone
    }

    /// `Ref` to the subnet id.
    pub fn subnet_id(&self) -> Expr {
        Expr::reference(&self.logical_id)
    }

    /// Logical id of the route table currently associated.
    pub fn route_table(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.route_table.as_str())
    }

    /// Logical id of the current association.
    pub fn association(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.association.as_str())
    }

    /// `Ref` to the current route table.
    pub fn route_table_id(&self) -> Result<Expr> {
        self.route_table()
            .map(Expr::reference)
            .ok_or_else(|| Error::MissingRouteTable(self.logical_id.clone()))
    }

    /// Remove the generated association and route table.
    ///
    /// The association goes first so the route table is never left
    /// referenced. Returns false when there was nothing to remove.
    pub fn detach_default_routing(&mut self, stack: &mut Stack) -> bool {
        match self.binding.take() {
            Some(binding) if binding.owned => {
                stack.remove(&binding.association);
                stack.remove(&binding.route_table);
                true
            }
            other => {
                self.binding = other;
                warn!(subnet = %self.logical_id, "no default routing to detach");
                false
            }
        }
    }

    /// Bind the subnet to a hand-built route table.
    pub fn associate_route_table(
        &mut self,
        stack: &mut Stack,
        id: &str,
        table: &RouteTable,
    ) -> Result<String> {
        let association_id = logical_id(&[id]);
        if let Some(existing) = &self.binding {
            return Err(Error::ConflictingAssociation {
                subnet: self.logical_id.clone(),
                associations: vec![existing.association.clone(), association_id],
            });
        }

        let association = stack.add(
            Resource::new(association_id, ResourceType::SubnetRouteTableAssociation)
                .with("RouteTableId", table.route_table_id())
                .with("SubnetId", self.subnet_id()),
        )?;
        self.binding = Some(Binding {
            route_table: table.logical_id().to_string(),
            association: association.clone(),
            owned: false,
        });
        Ok(association)
    }

    /// Add a route to the subnet's current route table.
    ///
    /// The route's logical id is `id` prefixed with the subnet's.
    pub fn add_route(
        &self,
        stack: &mut Stack,
        id: &str,
        destination: &str,
        target: RouteTarget,
    ) -> Result<Route> {
        let table = self
            .route_table()
            .map(RouteTable::from_logical_id)
            .ok_or_else(|| Error::MissingRouteTable(self.logical_id.clone()))?;
        table.add_route(
            stack,
            &logical_id(&[self.logical_id.as_str(), id]),
            destination,
            target,
        )
    }

    /// Send `0.0.0.0/0` to an Internet Gateway, after the gateway is attached.
    pub fn add_default_internet_route(
        &self,
        stack: &mut Stack,
        gateway: &InternetGateway,
    ) -> Result<Route> {
        let route = self.add_route(
            stack,
            "DefaultRoute",
            ANY_IPV4,
            RouteTarget::InternetGateway(gateway.gateway_id()),
        )?;
        stack.add_dependency(route.logical_id(), gateway.attachment_id())?;
        Ok(route)
    }
}
