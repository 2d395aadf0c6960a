//! Private VPC routed through a Transit Gateway.
//!
//! Two private subnets in separate AZs share one hand-built route table
//! whose default route points at the Transit Gateway. Instances are
//! reachable only through Systems Manager interface endpoints.

use tracing::debug;

use super::{AWS_NETWORK_CIDR, ONPREM_NETWORK_CIDR, PRIVATE_VPC_STACK};
use crate::cidr::ANY_IPV4;
use crate::ec2::{
    Instance, InstanceProps, InterfaceEndpoint, InterfaceEndpointProps, InterfaceService,
    MachineImage, Peer, Port, RouteTable, RouteTarget, SecurityGroup, SecurityGroupProps, Subnet,
    SubnetProps, TransitGateway, TransitGatewayAttachment, TransitGatewayProps, Vpc, VpcProps,
};
use crate::error::Result;
use crate::iam;
use crate::stack::Stack;

pub const SUBNET_A_CIDR: &str = "10.16.32.0/20";
pub const SUBNET_B_CIDR: &str = "10.16.96.0/20";

/// Build the private VPC stack.
pub fn build() -> Result<Stack> {
    let mut stack = Stack::new(PRIVATE_VPC_STACK)
        .with_description("Private VPC with a Transit Gateway attachment and SSM-managed instances");

    let mut vpc = Vpc::new(
        &mut stack,
        "A4L-AWS",
        VpcProps {
            cidr: AWS_NETWORK_CIDR.to_string(),
            enable_dns_support: true,
            enable_dns_hostnames: true,
            max_azs: 2,
        },
    )?;

    let mut subnet_a = Subnet::private(
        &mut stack,
        &mut vpc,
        "SubnetPrivateA",
        SubnetProps {
            cidr: SUBNET_A_CIDR.to_string(),
            availability_zone: 0,
            map_public_ip_on_launch: false,
        },
    )?;
    subnet_a.detach_default_routing(&mut stack);

    let mut subnet_b = Subnet::private(
        &mut stack,
        &mut vpc,
        "SubnetPrivateB",
        SubnetProps {
            cidr: SUBNET_B_CIDR.to_string(),
            availability_zone: 1,
            map_public_ip_on_launch: false,
        },
    )?;
    subnet_b.detach_default_routing(&mut stack);

    let custom_rt = RouteTable::new(&mut stack, "CustomRT", &vpc, Some("A4L-AWS-RT"))?;

    let tgw = TransitGateway::new(
        &mut stack,
        "TGW",
        TransitGatewayProps {
            amazon_side_asn: 64512,
            description: "A4LTGW".to_string(),
            ..TransitGatewayProps::default()
        },
    )?;
    let tgw_vpc =
        TransitGatewayAttachment::new(&mut stack, "TGWVPC", &tgw, &vpc, &[&subnet_a, &subnet_b])?;

    let default_route = custom_rt.add_route(
        &mut stack,
        "TGWDefaultRoute",
        ANY_IPV4,
        RouteTarget::TransitGateway(tgw.transit_gateway_id()),
    )?;
    stack.add_dependency(default_route.logical_id(), tgw_vpc.logical_id())?;

    subnet_a.associate_route_table(&mut stack, "RTAssociationPrivateA", &custom_rt)?;
    subnet_b.associate_route_table(&mut stack, "RTAssociationPrivateB", &custom_rt)?;

    let instance_sg = SecurityGroup::new(
        &mut stack,
        "InstanceSG",
        &vpc,
        SecurityGroupProps {
            description: "Default A4L AWS SG".to_string(),
            group_name: Some("InstanceSG".to_string()),
            allow_all_outbound: true,
        },
    )?;
    instance_sg.add_ingress_rule(&mut stack, Peer::AnyIpv4, Port::Tcp(22), "Allow SSH IPv4 IN")?;
    instance_sg.add_ingress_rule(
        &mut stack,
        Peer::Ipv4(ONPREM_NETWORK_CIDR.to_string()),
        Port::AllTraffic,
        "Allow ALL from ONPREM Networks",
    )?;
    instance_sg.allow_internal_traffic(&mut stack, "InstanceSGSelfReferenceRule")?;

    let mut endpoints = Vec::new();
    for (id, service) in [
        ("ssminterfaceendpoint", InterfaceService::Ssm),
        ("ssmec2messagesinterfaceendpoint", InterfaceService::Ec2Messages),
        ("ssmmessagesinterfaceendpoint", InterfaceService::SsmMessages),
    ] {
        let endpoint = InterfaceEndpoint::new(
            &mut stack,
            id,
            &vpc,
            InterfaceEndpointProps {
                service,
                private_dns_enabled: true,
                subnets: vec![&subnet_a, &subnet_b],
                security_groups: vec![&instance_sg],
            },
        )?;
        endpoints.push(endpoint.logical_id().to_string());
    }
    let endpoint_ids: Vec<&str> = endpoints.iter().map(String::as_str).collect();

    let role = iam::ssm_managed_instance_role(&mut stack, "EC2Role")?;

    for id in ["EC2A", "EC2B"] {
        let instance = Instance::new(
            &mut stack,
            id,
            InstanceProps {
                name: Some(id.to_string()),
                ..InstanceProps::new(
                    &subnet_a,
                    &instance_sg,
                    &role,
                    MachineImage::LatestAmazonLinux2,
                )
            },
        )?;
        instance.depend_on(&mut stack, &endpoint_ids)?;
    }

    debug!(stack = %stack.name(), resources = stack.resource_count(), "built stack");
    Ok(stack)
}
