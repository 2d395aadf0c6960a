//! Address plan tests
//!
//! Property-based checks of the CIDR helpers plus the cross-stack
//! verification over the stacks that ship with the crate.

use cloudwire::address_plan::{self, admits_all_from, network_cidr};
use cloudwire::cidr;
use cloudwire::error::Error;
use cloudwire::stacks::{self, StackSettings, AWS_NETWORK_CIDR, ONPREM_NETWORK_CIDR};
use ipnet::Ipv4Net;
use proptest::prelude::*;
use std::net::Ipv4Addr;

// ============================================================================
// Strategies for generating test data
// ============================================================================

/// Strategy for generating normalized IPv4 networks
fn ipv4_net() -> impl Strategy<Value = Ipv4Net> {
    (any::<u32>(), 8u8..=30).prop_map(|(addr, prefix)| {
        Ipv4Net::new(Ipv4Addr::from(addr), prefix).unwrap().trunc()
    })
}

proptest! {
    #[test]
    fn prop_parse_accepts_own_rendering(net in ipv4_net()) {
        prop_assert_eq!(cidr::parse(&net.to_string()).unwrap(), net);
    }

    #[test]
    fn prop_network_contains_its_subnets(net in ipv4_net(), extra in 1u8..=2) {
        let prefix = net.prefix_len() + extra;
        for subnet in net.subnets(prefix).unwrap() {
            prop_assert!(cidr::contains(&net, &subnet));
            prop_assert!(cidr::overlaps(&net, &subnet));
        }
    }

    #[test]
    fn prop_overlap_is_symmetric(a in ipv4_net(), b in ipv4_net()) {
        prop_assert_eq!(cidr::overlaps(&a, &b), cidr::overlaps(&b, &a));
    }

    #[test]
    fn prop_sibling_halves_disjoint(net in ipv4_net()) {
        let halves: Vec<Ipv4Net> = net.subnets(net.prefix_len() + 1).unwrap().collect();
        prop_assert_eq!(halves.len(), 2);
        prop_assert!(!cidr::overlaps(&halves[0], &halves[1]));
    }
}

// ============================================================================
// Shipped Stack Tests
// ============================================================================

#[test]
fn test_shipped_stacks_verify() {
    let stacks = stacks::build_all(&StackSettings::default()).unwrap();
    let plan = address_plan::verify(&stacks).unwrap();

    let rendered: Vec<String> = plan.networks.iter().map(|n| n.cidr.to_string()).collect();
    assert_eq!(rendered, vec![AWS_NETWORK_CIDR, ONPREM_NETWORK_CIDR]);
}

#[test]
fn test_each_stack_admits_its_peer() {
    let stacks = stacks::build_all(&StackSettings::default()).unwrap();
    let aws = network_cidr(&stacks[0]).unwrap();
    let onprem = network_cidr(&stacks[1]).unwrap();

    assert!(admits_all_from(&stacks[0], &onprem));
    assert!(admits_all_from(&stacks[1], &aws));
    assert!(!admits_all_from(
        &stacks[1],
        &cidr::parse("172.16.0.0/12").unwrap()
    ));
}

#[test]
fn test_verify_requires_network() {
    let stacks = [cloudwire::stack::Stack::new("Empty")];
    assert!(matches!(
        address_plan::verify(&stacks),
        Err(Error::MissingNetwork(name)) if name == "Empty"
    ));
}
