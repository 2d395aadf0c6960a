//! IPv4 CIDR helpers used by subnet placement and the cross-stack address plan.

use ipnet::Ipv4Net;

use crate::error::{Error, Result};

/// Destination of a default route and source of an "anywhere" rule.
pub const ANY_IPV4: &str = "0.0.0.0/0";

/// Parse a CIDR block, rejecting host bits past the prefix.
pub fn parse(value: &str) -> Result<Ipv4Net> {
    let net: Ipv4Net = value.parse().map_err(|e: ipnet::AddrParseError| Error::InvalidCidr {
        value: value.to_string(),
        message: e.to_string(),
    })?;

    if net.trunc() != net {
        return Err(Error::InvalidCidr {
            value: value.to_string(),
            message: format!("host bits set, expected {}", net.trunc()),
        });
    }

    Ok(net)
}

/// Whether `inner` lies entirely inside `outer`.
pub fn contains(outer: &Ipv4Net, inner: &Ipv4Net) -> bool {
    outer.contains(inner)
}

/// Whether two ranges share at least one address.
pub fn overlaps(a: &Ipv4Net, b: &Ipv4Net) -> bool {
    a.contains(&b.network()) || b.contains(&a.network())
}
