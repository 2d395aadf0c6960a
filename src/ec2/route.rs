//! Route tables and routes.

use ipnet::Ipv4Net;

use super::vpc::Vpc;
use crate::cfn::{Expr, Resource, ResourceType};
use crate::cidr;
use crate::error::Result;
use crate::stack::Stack;

/// Where a route forwards matching traffic.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteTarget {
    /// A Transit Gateway id
    TransitGateway(Expr),
    /// An Internet Gateway id
    InternetGateway(Expr),
    /// A network interface id
    NetworkInterface(Expr),
}

impl RouteTarget {
    fn property_name(&self) -> &'static str {
        match self {
            RouteTarget::TransitGateway(_) => "TransitGatewayId",
            RouteTarget::InternetGateway(_) => "GatewayId",
            RouteTarget::NetworkInterface(_) => "NetworkInterfaceId",
        }
    }

    fn value(&self) -> &Expr {
        match self {
            RouteTarget::TransitGateway(v)
            | RouteTarget::InternetGateway(v)
            | RouteTarget::NetworkInterface(v) => v,
        }
    }
}

/// A declared route.
#[derive(Debug, Clone)]
pub struct Route {
    logical_id: String,
    destination: Ipv4Net,
}

impl Route {
    /// Declare a route in the route table `route_table_id`.
    pub fn declare(
        stack: &mut Stack,
        id: &str,
        route_table_id: Expr,
        destination: &str,
        target: RouteTarget,
    ) -> Result<Self> {
        let destination_net = cidr::parse(destination)?;
        let logical_id = stack.add(
            Resource::new(id, ResourceType::Route)
                .with("RouteTableId", route_table_id)
                .with("DestinationCidrBlock", destination)
                .with(target.property_name(), target.value().clone()),
        )?;

        Ok(Self {
            logical_id,
            destination: destination_net,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn destination(&self) -> Ipv4Net {
        self.destination
    }
}

/// A hand-built route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    logical_id: String,
}

impl RouteTable {
    /// Declare a route table in `vpc`, optionally tagged with a `Name`.
    pub fn new(stack: &mut Stack, id: &str, vpc: &Vpc, name: Option<&str>) -> Result<Self> {
        let mut resource = Resource::new(crate::cfn::logical_id(&[id]), ResourceType::RouteTable)
            .with("VpcId", vpc.vpc_id());
        if let Some(name) = name {
            resource = resource.with("Tags", Expr::tags(&[("Name", name)]));
        }
        let logical_id = stack.add(resource)?;
        Ok(Self { logical_id })
    }

    pub(crate) fn from_logical_id(logical_id: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
        }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// `Ref` to the route table id.
    pub fn route_table_id(&self) -> Expr {
        Expr::reference(&self.logical_id)
    }

    /// Add a route to this table.
    pub fn add_route(
        &self,
        stack: &mut Stack,
        id: &str,
        destination: &str,
        target: RouteTarget,
    ) -> Result<Route> {
        Route::declare(
            stack,
            &crate::cfn::logical_id(&[id]),
            self.route_table_id(),
            destination,
            target,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec2::vpc::VpcProps;

    #[test]
    fn test_route_target_properties() {
        let mut stack = Stack::new("Test");
        let vpc = Vpc::new(&mut stack, "Net", VpcProps::default()).unwrap();
        let table = RouteTable::new(&mut stack, "CustomRT", &vpc, Some("rt")).unwrap();
        let route = table
            .add_route(
                &mut stack,
                "ToEni",
                "10.16.0.0/16",
                RouteTarget::NetworkInterface(Expr::reference("Eni")),
            )
            .unwrap();

        let res = stack.resource(route.logical_id()).unwrap();
        assert_eq!(res.property("NetworkInterfaceId"), Some(&Expr::reference("Eni")));
        assert_eq!(res.property("RouteTableId"), Some(&Expr::reference("CustomRT")));
        assert_eq!(route.destination().to_string(), "10.16.0.0/16");
    }

    #[test]
    fn test_route_rejects_bad_destination() {
        let mut stack = Stack::new("Test");
        let err = Route::declare(
            &mut stack,
            "Bad",
            Expr::reference("Rt"),
            "10.16.0.1/16",
            RouteTarget::TransitGateway(Expr::reference("Tgw")),
        );
        assert!(err.is_err());
        assert!(!stack.contains("Bad"));
    }
}
