//! Integration tests for the simulated on-premises stack
//!
//! These tests cover:
//! - Public internet routing through the Internet Gateway
//! - Route servers and their private network interfaces
//! - AWS-bound routes in the private subnets
//! - Router image and bootstrap settings
//! - Stack outputs

use std::collections::BTreeMap;

use cloudwire::cfn::{Expr, ResourceType};
use cloudwire::stack::Stack;
use cloudwire::stacks::{onprem, StackSettings, ONPREM_STACK};
use cloudwire::error::Error;
use pretty_assertions::assert_eq;

fn stack() -> Stack {
    onprem::build(&StackSettings::default()).expect("on-premises stack builds")
}

// ============================================================================
// Network Layout Tests
// ============================================================================

#[test]
fn test_vpc_and_subnets() {
    let stack = stack();
    assert_eq!(stack.name(), ONPREM_STACK);
    assert_eq!(
        stack.resource("ONPREM").unwrap().property("CidrBlock"),
        Some(&Expr::str("192.168.8.0/21"))
    );

    for (subnet, cidr, public) in [
        ("ONPREMPUBLIC", "192.168.12.0/24", true),
        ("ONPREMPRIVATE1", "192.168.10.0/24", false),
        ("ONPREMPRIVATE2", "192.168.11.0/24", false),
    ] {
        let res = stack.resource(subnet).unwrap();
        assert_eq!(res.property("CidrBlock"), Some(&Expr::str(cidr)));
        assert_eq!(res.property("MapPublicIpOnLaunch"), Some(&Expr::Bool(public)));
        assert!(stack.contains(&format!("{subnet}RouteTable")));
    }
}

#[test]
fn test_internet_route_waits_for_gateway_attachment() {
    let stack = stack();
    let route = stack.resource("ONPREMPUBLICDefaultRoute").unwrap();
    assert_eq!(route.property("DestinationCidrBlock"), Some(&Expr::str("0.0.0.0/0")));
    assert_eq!(route.property("GatewayId"), Some(&Expr::reference("IGW")));
    assert_eq!(
        route.property("RouteTableId"),
        Some(&Expr::reference("ONPREMPUBLICRouteTable"))
    );
    assert_eq!(route.depends_on(), &["VPCGW".to_string()]);

    let order = stack.validate().unwrap().creation_order().unwrap();
    let position = |id: &str| order.iter().position(|x| x == id).unwrap();
    assert!(position("VPCGW") < position("ONPREMPUBLICDefaultRoute"));
}

#[test]
fn test_s3_gateway_endpoint_covers_all_route_tables() {
    let stack = stack();
    let endpoint = stack.resource("S3Endpoint").unwrap();
    assert_eq!(endpoint.property("VpcEndpointType"), Some(&Expr::str("Gateway")));
    assert_eq!(
        endpoint.property("RouteTableIds"),
        Some(&Expr::List(vec![
            Expr::reference("ONPREMPUBLICRouteTable"),
            Expr::reference("ONPREMPRIVATE1RouteTable"),
            Expr::reference("ONPREMPRIVATE2RouteTable"),
        ]))
    );
}

// ============================================================================
// Route Server Tests
// ============================================================================

#[test]
fn test_routers_boot_in_public_subnet_without_source_dest_check() {
    let stack = stack();
    for n in 1..=2 {
        let router = stack.resource(&format!("ROUTER{n}ROUTER")).unwrap();
        assert_eq!(router.resource_type(), ResourceType::Instance);
        assert_eq!(router.property("SubnetId"), Some(&Expr::reference("ONPREMPUBLIC")));
        assert_eq!(router.property("SourceDestCheck"), Some(&Expr::Bool(false)));

        let eni = stack.resource(&format!("ROUTER{n}ENIPRIVATE")).unwrap();
        assert_eq!(eni.property("SourceDestCheck"), Some(&Expr::Bool(false)));
        assert_eq!(
            eni.property("SubnetId"),
            Some(&Expr::reference(format!("ONPREMPRIVATE{n}")))
        );
    }
}

#[test]
fn test_private_interface_attached_at_device_index_one() {
    let stack = stack();
    let attachment = stack.resource("ROUTER1ENIAttachmentRouter").unwrap();
    assert_eq!(attachment.property("DeviceIndex"), Some(&Expr::str("1")));
    assert_eq!(
        attachment.property("InstanceId"),
        Some(&Expr::reference("ROUTER1ROUTER"))
    );
    assert_eq!(
        attachment.property("NetworkInterfaceId"),
        Some(&Expr::reference("ROUTER1ENIPRIVATE"))
    );
}

#[test]
fn test_each_private_subnet_routes_aws_to_its_router() {
    let stack = stack();
    for n in 1..=2 {
        let table = format!("ONPREMPRIVATE{n}RouteTable");
        let routes: Vec<_> = stack
            .resources_of_type(ResourceType::Route)
            .into_iter()
            .filter(|r| r.property("RouteTableId") == Some(&Expr::reference(&table)))
            .collect();

        assert_eq!(routes.len(), 1, "one route in {table}");
        let route = routes[0];
        assert_eq!(route.logical_id(), format!("ONPREMPRIVATE{n}Route{n}AWSIPv4"));
        assert_eq!(
            route.property("DestinationCidrBlock"),
            Some(&Expr::str("10.16.0.0/16"))
        );
        assert_eq!(
            route.property("NetworkInterfaceId"),
            Some(&Expr::reference(format!("ROUTER{n}ENIPRIVATE")))
        );
    }
}

#[test]
fn test_router_image_from_settings() {
    let settings = StackSettings {
        router_images: BTreeMap::from([
            ("eu-west-1".to_string(), "ami-11111111".to_string()),
            ("us-east-1".to_string(), "ami-22222222".to_string()),
        ]),
        router_user_data: "#!/bin/bash\necho router".to_string(),
    };
    let stack = onprem::build(&settings).unwrap();

    let mapping = stack.mapping("ROUTER1ROUTERAmiMap").unwrap();
    assert_eq!(mapping["eu-west-1"]["ami"], "ami-11111111");
    assert_eq!(mapping["us-east-1"]["ami"], "ami-22222222");

    let router = stack.resource("ROUTER1ROUTER").unwrap();
    assert_eq!(
        router.property("ImageId"),
        Some(&Expr::FindInMap(
            "ROUTER1ROUTERAmiMap".to_string(),
            Box::new(Expr::region()),
            "ami".to_string()
        ))
    );
    assert_eq!(
        router.property("UserData"),
        Some(&Expr::Base64(Box::new(Expr::str("#!/bin/bash\necho router"))))
    );
}

#[test]
fn test_router_without_images_fails() {
    let settings = StackSettings {
        router_images: BTreeMap::new(),
        ..StackSettings::default()
    };
    assert!(matches!(
        onprem::build(&settings),
        Err(Error::MissingImage(id)) if id == "ROUTER1ROUTER"
    ));
}

// ============================================================================
// Server and Output Tests
// ============================================================================

#[test]
fn test_servers_wait_for_endpoints() {
    let stack = stack();
    for server in ["ONPREMSERVER1", "ONPREMSERVER2"] {
        let deps = stack.dependencies_of(server).unwrap();
        for endpoint in ["SSMEndpoint", "EC2MESSAGESEndpoint", "SSMMESSAGESEndpoint"] {
            assert!(deps.iter().any(|d| d == endpoint), "{server} -> {endpoint}");
        }
    }
}

#[test]
fn test_outputs() {
    let stack = stack();
    let names: Vec<&str> = stack.outputs().keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["Router1Public", "Router2Public", "Router1Private", "Router2Private"]
    );
    assert_eq!(
        stack.output("Router1Public").unwrap().value,
        Expr::get_att("ROUTER1ROUTER", "PublicIp")
    );
    assert_eq!(
        stack.output("Router2Private").unwrap().value,
        Expr::get_att("ROUTER2ROUTER", "PrivateIp")
    );
}

#[test]
fn test_synth_validates() {
    let template = stack().synth().unwrap();
    assert_eq!(template.outputs.len(), 4);
    assert_eq!(
        template.resources_of_type(ResourceType::NetworkInterface),
        vec!["ROUTER1ENIPRIVATE", "ROUTER2ENIPRIVATE"]
    );
}
