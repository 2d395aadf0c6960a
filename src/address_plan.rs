//! Cross-stack address plan check.
//!
//! The stacks agree on each other's address space only through literal
//! constants. This check inspects the built stacks and verifies that their
//! VPC ranges are disjoint and that each stack admits all traffic from
//! every peer range in a security group rule.

use ipnet::Ipv4Net;
use serde::Serialize;
use tracing::debug;

use crate::cfn::{Expr, ResourceType};
use crate::cidr;
use crate::error::{Error, Result};
use crate::stack::Stack;

/// The address space of one stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Network {
    pub stack: String,
    pub cidr: Ipv4Net,
}

/// A verified address plan.
#[derive(Debug, Clone, Serialize)]
pub struct AddressPlan {
    pub networks: Vec<Network>,
}

/// Primary range of the first VPC declared in `stack`.
pub fn network_cidr(stack: &Stack) -> Result<Ipv4Net> {
    let vpc = stack
        .resources_of_type(ResourceType::Vpc)
        .into_iter()
        .next()
        .ok_or_else(|| Error::MissingNetwork(stack.name().to_string()))?;
    let block = vpc
        .property("CidrBlock")
        .and_then(Expr::as_str)
        .ok_or_else(|| Error::MissingNetwork(stack.name().to_string()))?;
    cidr::parse(block)
}

/// Whether some security group in `stack` admits all protocols from a range covering `peer`.
pub fn admits_all_from(stack: &Stack, peer: &Ipv4Net) -> bool {
    stack
        .resources_of_type(ResourceType::SecurityGroup)
        .into_iter()
        .filter_map(|sg| sg.property("SecurityGroupIngress").and_then(Expr::as_list))
        .flatten()
        .any(|rule| {
            let all_traffic = rule.get("IpProtocol").and_then(Expr::as_str) == Some("-1");
            let covers = rule
                .get("CidrIp")
                .and_then(Expr::as_str)
                .and_then(|c| cidr::parse(c).ok())
                .is_some_and(|c| cidr::contains(&c, peer));
            all_traffic && covers
        })
}

/// Verify the address plan across `stacks`.
pub fn verify(stacks: &[Stack]) -> Result<AddressPlan> {
    let networks = stacks
        .iter()
        .map(|s| {
            network_cidr(s).map(|cidr| Network {
                stack: s.name().to_string(),
                cidr,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    for (i, a) in networks.iter().enumerate() {
        for b in &networks[i + 1..] {
            if cidr::overlaps(&a.cidr, &b.cidr) {
                return Err(Error::OverlappingCidr {
                    first: a.cidr.to_string(),
                    second: b.cidr.to_string(),
                });
            }
        }
    }

    for (stack, own) in stacks.iter().zip(&networks) {
        for peer in networks.iter().filter(|n| n.stack != own.stack) {
            if !admits_all_from(stack, &peer.cidr) {
                return Err(Error::MissingPeerRule {
                    stack: stack.name().to_string(),
                    cidr: peer.cidr.to_string(),
                });
            }
            debug!(stack = %stack.name(), peer = %peer.cidr, "peer range admitted");
        }
    }

    Ok(AddressPlan { networks })
}
