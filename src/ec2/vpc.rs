//! VPC declaration and address bookkeeping.

use ipnet::Ipv4Net;

use crate::cfn::{Expr, Resource, ResourceType};
use crate::cidr;
use crate::error::{Error, Result};
use crate::stack::Stack;

/// VPC configuration
#[derive(Debug, Clone)]
pub struct VpcProps {
    /// Primary CIDR block
    pub cidr: String,
    /// Enable Amazon-provided DNS resolution
    pub enable_dns_support: bool,
    /// Assign DNS hostnames to instances
    pub enable_dns_hostnames: bool,
    /// Number of availability zones subnets may be placed in
    pub max_azs: usize,
}

impl Default for VpcProps {
    fn default() -> Self {
        Self {
            cidr: "10.0.0.0/16".to_string(),
            enable_dns_support: true,
            enable_dns_hostnames: true,
            max_azs: 3,
        }
    }
}

/// A declared VPC.
///
/// The handle keeps track of the subnets carved out of the VPC so that
/// placement errors surface at declaration time.
#[derive(Debug, Clone)]
pub struct Vpc {
    logical_id: String,
    cidr: Ipv4Net,
    max_azs: usize,
    subnets: Vec<(String, Ipv4Net)>,
}

impl Vpc {
    /// Declare a VPC without any automatic subnets, gateways or NAT.
    pub fn new(stack: &mut Stack, id: &str, props: VpcProps) -> Result<Self> {
        let cidr = cidr::parse(&props.cidr)?;
        let name_tag = format!("{}/{}", stack.name(), id);
        let logical_id = stack.add(
            Resource::new(crate::cfn::logical_id(&[id]), ResourceType::Vpc)
                .with("CidrBlock", props.cidr.as_str())
                .with("EnableDnsHostnames", props.enable_dns_hostnames)
                .with("EnableDnsSupport", props.enable_dns_support)
                .with("InstanceTenancy", "default")
                .with("Tags", Expr::tags(&[("Name", name_tag.as_str())])),
        )?;

        Ok(Self {
            logical_id,
            cidr,
            max_azs: props.max_azs,
            subnets: Vec::new(),
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn cidr(&self) -> Ipv4Net {
        self.cidr
    }

    pub fn max_azs(&self) -> usize {
        self.max_azs
    }

    /// `Ref` to the VPC id.
    pub fn vpc_id(&self) -> Expr {
        Expr::reference(&self.logical_id)
    }

    /// Availability zone `index` of the region, bounded by `max_azs`.
    pub fn availability_zone(&self, index: usize) -> Result<Expr> {
        if index >= self.max_azs {
            return Err(Error::InvalidAvailabilityZone {
                network: self.logical_id.clone(),
                index,
                max_azs: self.max_azs,
            });
        }
        Ok(Expr::availability_zone(index))
    }

    /// Whether a subnet was carved out of this VPC.
    pub fn owns_subnet(&self, subnet_id: &str) -> bool {
        self.subnets.iter().any(|(id, _)| id == subnet_id)
    }

    /// Claim a subnet range, rejecting ranges outside the VPC or overlapping a sibling.
    pub(crate) fn reserve(&mut self, subnet_id: &str, range: Ipv4Net) -> Result<()> {
        if !cidr::contains(&self.cidr, &range) {
            return Err(Error::CidrOutsideNetwork {
                subnet: subnet_id.to_string(),
                cidr: range.to_string(),
                network: self.cidr.to_string(),
            });
        }
        if let Some((_, taken)) = self.subnets.iter().find(|(_, r)| cidr::overlaps(r, &range)) {
            return Err(Error::OverlappingCidr {
                first: taken.to_string(),
                second: range.to_string(),
            });
        }
        self.subnets.push((subnet_id.to_string(), range));
        Ok(())
    }
}
