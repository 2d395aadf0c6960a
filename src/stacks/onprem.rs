//! Simulated on-premises network.
//!
//! One public subnet reaches the internet through an Internet Gateway. Two
//! private subnets each send AWS-bound traffic to the private interface of
//! their own route server, which forwards it out of the public subnet.

use tracing::debug;

use super::{StackSettings, AWS_NETWORK_CIDR, ONPREM_NETWORK_CIDR, ONPREM_STACK};
use crate::cfn::Output;
use crate::ec2::{
    GatewayEndpoint, GatewayService, Instance, InstanceProps, InterfaceEndpoint,
    InterfaceEndpointProps, InterfaceService, InternetGateway, MachineImage, Peer, Port,
    RouteTarget, SecurityGroup, SecurityGroupProps, Subnet, SubnetProps, Vpc, VpcProps,
};
use crate::error::Result;
use crate::iam;
use crate::route_server::{RouteServer, RouteServerProps};
use crate::stack::Stack;

pub const PUBLIC_SUBNET_CIDR: &str = "192.168.12.0/24";
pub const PRIVATE_SUBNET_1_CIDR: &str = "192.168.10.0/24";
pub const PRIVATE_SUBNET_2_CIDR: &str = "192.168.11.0/24";

/// Build the simulated on-premises stack.
pub fn build(settings: &StackSettings) -> Result<Stack> {
    let mut stack = Stack::new(ONPREM_STACK)
        .with_description("Simulated on-premises network with software route servers");

    let mut vpc = Vpc::new(
        &mut stack,
        "ONPREM",
        VpcProps {
            cidr: ONPREM_NETWORK_CIDR.to_string(),
            enable_dns_support: true,
            enable_dns_hostnames: true,
            max_azs: 1,
        },
    )?;

    let subnet_props = |cidr: &str, public: bool| SubnetProps {
        cidr: cidr.to_string(),
        availability_zone: 0,
        map_public_ip_on_launch: public,
    };
    let subnet_pub = Subnet::public(
        &mut stack,
        &mut vpc,
        "ONPREM-PUBLIC",
        subnet_props(PUBLIC_SUBNET_CIDR, true),
    )?;
    let subnet_private1 = Subnet::private(
        &mut stack,
        &mut vpc,
        "ONPREM-PRIVATE-1",
        subnet_props(PRIVATE_SUBNET_1_CIDR, false),
    )?;
    let subnet_private2 = Subnet::private(
        &mut stack,
        &mut vpc,
        "ONPREM-PRIVATE-2",
        subnet_props(PRIVATE_SUBNET_2_CIDR, false),
    )?;

    let instance_sg = SecurityGroup::new(
        &mut stack,
        "InstanceSG",
        &vpc,
        SecurityGroupProps {
            description: "InstanceGS".to_string(),
            group_name: Some("InstanceSG".to_string()),
            allow_all_outbound: true,
        },
    )?;
    instance_sg.add_ingress_rule(
        &mut stack,
        Peer::Ipv4(AWS_NETWORK_CIDR.to_string()),
        Port::AllTraffic,
        "Allow All from AWS Environment",
    )?;
    instance_sg.allow_internal_traffic(&mut stack, "InstanceSGSelfReferenceRule")?;

    GatewayEndpoint::new(
        &mut stack,
        "S3Endpoint",
        &vpc,
        GatewayService::S3,
        &[&subnet_pub, &subnet_private1, &subnet_private2],
    )?;
    // An interface endpoint takes one subnet per AZ, so the public subnet serves them all.
    let mut endpoints = Vec::new();
    for (id, service) in [
        ("SSMEndpoint", InterfaceService::Ssm),
        ("EC2_MESSAGES_Endpoint", InterfaceService::Ec2Messages),
        ("SSM_MESSAGES_Endpoint", InterfaceService::SsmMessages),
    ] {
        let endpoint = InterfaceEndpoint::new(
            &mut stack,
            id,
            &vpc,
            InterfaceEndpointProps {
                service,
                private_dns_enabled: true,
                subnets: vec![&subnet_pub],
                security_groups: vec![&instance_sg],
            },
        )?;
        endpoints.push(endpoint.logical_id().to_string());
    }
    let endpoint_ids: Vec<&str> = endpoints.iter().map(String::as_str).collect();

    let igw = InternetGateway::new(&mut stack, "IGW", "VPCGW", &vpc)?;
    subnet_pub.add_default_internet_route(&mut stack, &igw)?;

    let role = iam::ssm_managed_instance_role(&mut stack, "EC2Role")?;

    let mut routers = Vec::new();
    for (index, private_subnet) in [&subnet_private1, &subnet_private2].into_iter().enumerate() {
        let n = index + 1;
        let router = RouteServer::new(
            &mut stack,
            &format!("ROUTER-{n}"),
            RouteServerProps {
                instance_name: format!("ONPREM-ROUTER{n}"),
                vpc: &vpc,
                role: &role,
                security_group: &instance_sg,
                public_subnet: &subnet_pub,
                private_eni_subnet: private_subnet,
                image: MachineImage::GenericLinux(settings.router_images.clone()),
                user_data: settings.router_user_data.clone(),
            },
        )?;
        private_subnet.add_route(
            &mut stack,
            &format!("Route{n}AWSIPv4"),
            AWS_NETWORK_CIDR,
            RouteTarget::NetworkInterface(router.private_eni().network_interface_id()),
        )?;
        routers.push(router);
    }

    for (id, subnet) in [
        ("ONPREMSERVER1", &subnet_private1),
        ("ONPREMSERVER2", &subnet_private2),
    ] {
        let server = Instance::new(
            &mut stack,
            id,
            InstanceProps {
                name: Some(id.to_string()),
                ..InstanceProps::new(subnet, &instance_sg, &role, MachineImage::LatestAmazonLinux2)
            },
        )?;
        server.depend_on(&mut stack, &endpoint_ids)?;
    }

    for (index, router) in routers.iter().enumerate() {
        let n = index + 1;
        stack.add_output(
            &format!("Router{n}Public"),
            Output {
                description: Some(format!("Public IP of Router{n}")),
                value: router.instance().public_ip(),
            },
        )?;
    }
    for (index, router) in routers.iter().enumerate() {
        let n = index + 1;
        stack.add_output(
            &format!("Router{n}Private"),
            Output {
                description: Some(format!("Private IP of Router{n}")),
                value: router.instance().private_ip(),
            },
        )?;
    }

    debug!(stack = %stack.name(), resources = stack.resource_count(), "built stack");
    Ok(stack)
}
