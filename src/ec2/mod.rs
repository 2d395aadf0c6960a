//! EC2 networking and compute declarations.
//!
//! Each type here is a thin, typed handle over one or more CloudFormation
//! resources declared into a [`Stack`](crate::stack::Stack). Constructors
//! take the stack by `&mut` and return the handle; handles hand out `Ref`
//! and `Fn::GetAtt` expressions for other declarations to use, which is how
//! implicit dependency edges arise.
//!
//! | Handle | Resources |
//! |--------|-----------|
//! | [`Vpc`] | `AWS::EC2::VPC` |
//! | [`Subnet`] | `AWS::EC2::Subnet`, default `RouteTable` + association |
//! | [`RouteTable`], [`Route`] | `AWS::EC2::RouteTable`, `AWS::EC2::Route` |
//! | [`InternetGateway`] | `AWS::EC2::InternetGateway`, `AWS::EC2::VPCGatewayAttachment` |
//! | [`TransitGateway`] | `AWS::EC2::TransitGateway` |
//! | [`TransitGatewayAttachment`] | `AWS::EC2::TransitGatewayAttachment` |
//! | [`SecurityGroup`] | `AWS::EC2::SecurityGroup`, `AWS::EC2::SecurityGroupIngress` |
//! | [`InterfaceEndpoint`], [`GatewayEndpoint`] | `AWS::EC2::VPCEndpoint` |
//! | [`Instance`] | `AWS::EC2::Instance`, `AWS::IAM::InstanceProfile` |
//! | [`NetworkInterface`] | `AWS::EC2::NetworkInterface`, `AWS::EC2::NetworkInterfaceAttachment` |

pub mod endpoint;
pub mod gateway;
pub mod instance;
pub mod network_interface;
pub mod route;
pub mod security_group;
pub mod subnet;
pub mod transit_gateway;
pub mod vpc;

pub use endpoint::{
    GatewayEndpoint, GatewayService, InterfaceEndpoint, InterfaceEndpointProps, InterfaceService,
};
pub use gateway::InternetGateway;
pub use instance::{Instance, InstanceProps, MachineImage, DEFAULT_INSTANCE_TYPE};
pub use network_interface::{NetworkInterface, NetworkInterfaceProps};
pub use route::{Route, RouteTable, RouteTarget};
pub use security_group::{Peer, Port, SecurityGroup, SecurityGroupProps};
pub use subnet::{Subnet, SubnetKind, SubnetProps};
pub use transit_gateway::{TransitGateway, TransitGatewayAttachment, TransitGatewayProps};
pub use vpc::{Vpc, VpcProps};
