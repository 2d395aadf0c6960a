//! Security groups and ingress rules.

use super::vpc::Vpc;
use crate::cfn::{logical_id, Expr, Resource, ResourceType};
use crate::cidr::{self, ANY_IPV4};
use crate::error::Result;
use crate::stack::Stack;

/// Traffic source of an ingress rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Peer {
    /// `0.0.0.0/0`
    AnyIpv4,
    /// An IPv4 CIDR block
    Ipv4(String),
    /// Members of a security group, given as its group id
    SecurityGroup(Expr),
}

/// Protocol and port selector of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    Tcp(u16),
    AllTraffic,
}

impl Port {
    fn apply(&self, rule: &mut Vec<(&'static str, Expr)>) {
        match self {
            Port::Tcp(port) => {
                rule.push(("FromPort", Expr::Int(i64::from(*port))));
                rule.push(("IpProtocol", Expr::str("tcp")));
                rule.push(("ToPort", Expr::Int(i64::from(*port))));
            }
            Port::AllTraffic => rule.push(("IpProtocol", Expr::str("-1"))),
        }
    }
}

/// Security group configuration
#[derive(Debug, Clone)]
pub struct SecurityGroupProps {
    pub description: String,
    /// Explicit group name, generated by CloudFormation when absent
    pub group_name: Option<String>,
    pub allow_all_outbound: bool,
}

impl Default for SecurityGroupProps {
    fn default() -> Self {
        Self {
            description: String::new(),
            group_name: None,
            allow_all_outbound: true,
        }
    }
}

/// A declared security group.
#[derive(Debug, Clone)]
pub struct SecurityGroup {
    logical_id: String,
}

impl SecurityGroup {
    pub fn new(stack: &mut Stack, id: &str, vpc: &Vpc, props: SecurityGroupProps) -> Result<Self> {
        let mut resource = Resource::new(logical_id(&[id]), ResourceType::SecurityGroup)
            .with("GroupDescription", props.description)
            .with_opt("GroupName", props.group_name);
        if props.allow_all_outbound {
            resource = resource.with(
                "SecurityGroupEgress",
                vec![Expr::map([
                    ("CidrIp", Expr::str(ANY_IPV4)),
                    ("Description", Expr::str("Allow all outbound traffic by default")),
                    ("IpProtocol", Expr::str("-1")),
                ])],
            );
        }
        let logical_id = stack.add(resource.with("VpcId", vpc.vpc_id()))?;
        Ok(Self { logical_id })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// `Fn::GetAtt` of the group id.
    pub fn group_id(&self) -> Expr {
        Expr::get_att(&self.logical_id, "GroupId")
    }

    /// Add an inline ingress rule.
    pub fn add_ingress_rule(
        &self,
        stack: &mut Stack,
        peer: Peer,
        port: Port,
        description: &str,
    ) -> Result<()> {
        let mut rule: Vec<(&'static str, Expr)> = Vec::new();
        match peer {
            Peer::AnyIpv4 => rule.push(("CidrIp", Expr::str(ANY_IPV4))),
            Peer::Ipv4(cidr) => {
                cidr::parse(&cidr)?;
                rule.push(("CidrIp", Expr::str(cidr)));
            }
            Peer::SecurityGroup(group) => rule.push(("SourceSecurityGroupId", group)),
        }
        rule.push(("Description", Expr::str(description)));
        port.apply(&mut rule);

        stack
            .resource_mut(&self.logical_id)?
            .push_to_list("SecurityGroupIngress", Expr::map(rule));
        Ok(())
    }

    /// Allow all traffic between members of this group.
    ///
    /// Declared as a standalone ingress resource since an inline rule
    /// cannot reference its own group.
    pub fn allow_internal_traffic(&self, stack: &mut Stack, id: &str) -> Result<String> {
        stack.add(
            Resource::new(logical_id(&[id]), ResourceType::SecurityGroupIngress)
                .with("IpProtocol", "-1")
                .with("GroupId", self.group_id())
                .with("SourceSecurityGroupId", self.group_id()),
        )
    }

    /// Whether an inline rule admits traffic from exactly `cidr`.
    pub fn admits_cidr(&self, stack: &Stack, cidr: &str) -> bool {
        stack
            .resource(&self.logical_id)
            .and_then(|r| r.property("SecurityGroupIngress"))
            .and_then(Expr::as_list)
            .is_some_and(|rules| {
                rules
                    .iter()
                    .any(|rule| rule.get("CidrIp").and_then(Expr::as_str) == Some(cidr))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec2::vpc::VpcProps;
    use crate::error::Error;
    use serde_json::json;

    fn group(stack: &mut Stack) -> SecurityGroup {
        let vpc = Vpc::new(stack, "Net", VpcProps::default()).unwrap();
        SecurityGroup::new(
            stack,
            "InstanceSG",
            &vpc,
            SecurityGroupProps {
                description: "Default A4L AWS SG".to_string(),
                group_name: Some("InstanceSG".to_string()),
                ..SecurityGroupProps::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_inline_rules_render() {
        let mut stack = Stack::new("Test");
        let sg = group(&mut stack);
        sg.add_ingress_rule(&mut stack, Peer::AnyIpv4, Port::Tcp(22), "Allow SSH IPv4 IN")
            .unwrap();
        sg.add_ingress_rule(
            &mut stack,
            Peer::Ipv4("192.168.8.0/21".to_string()),
            Port::AllTraffic,
            "Allow ALL from ONPREM Networks",
        )
        .unwrap();

        let rules = stack
            .resource("InstanceSG")
            .unwrap()
            .property("SecurityGroupIngress")
            .unwrap()
            .to_json();
        assert_eq!(
            rules,
            json!([
                {"CidrIp": "0.0.0.0/0", "Description": "Allow SSH IPv4 IN",
                 "FromPort": 22, "IpProtocol": "tcp", "ToPort": 22},
                {"CidrIp": "192.168.8.0/21", "Description": "Allow ALL from ONPREM Networks",
                 "IpProtocol": "-1"}
            ])
        );
        assert!(sg.admits_cidr(&stack, "192.168.8.0/21"));
        assert!(!sg.admits_cidr(&stack, "10.16.0.0/16"));
    }

    #[test]
    fn test_invalid_peer_cidr() {
        let mut stack = Stack::new("Test");
        let sg = group(&mut stack);
        let err = sg
            .add_ingress_rule(
                &mut stack,
                Peer::Ipv4("192.168.8.0/33".to_string()),
                Port::AllTraffic,
                "bad",
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCidr { .. }));
    }

    #[test]
    fn test_self_reference_rule() {
        let mut stack = Stack::new("Test");
        let sg = group(&mut stack);
        let id = sg
            .allow_internal_traffic(&mut stack, "InstanceSGSelfReferenceRule")
            .unwrap();

        let rule = stack.resource(&id).unwrap();
        assert_eq!(rule.property("IpProtocol"), Some(&Expr::str("-1")));
        assert_eq!(rule.property("GroupId"), Some(&sg.group_id()));
        assert_eq!(rule.property("SourceSecurityGroupId"), Some(&sg.group_id()));
        assert_eq!(stack.dependencies_of(&id).unwrap(), vec!["InstanceSG"]);
    }
}
