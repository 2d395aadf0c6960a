//! Resource declarations.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::value::Expr;

/// CloudFormation resource types declared by the stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Vpc,
    Subnet,
    RouteTable,
    Route,
    SubnetRouteTableAssociation,
    TransitGateway,
    TransitGatewayAttachment,
    InternetGateway,
    VpcGatewayAttachment,
    SecurityGroup,
    SecurityGroupIngress,
    VpcEndpoint,
    Instance,
    NetworkInterface,
    NetworkInterfaceAttachment,
    Role,
    Policy,
    InstanceProfile,
}

impl ResourceType {
    /// The CloudFormation type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Vpc => "AWS::EC2::VPC",
            ResourceType::Subnet => "AWS::EC2::Subnet",
            ResourceType::RouteTable => "AWS::EC2::RouteTable",
            ResourceType::Route => "AWS::EC2::Route",
            ResourceType::SubnetRouteTableAssociation => "AWS::EC2::SubnetRouteTableAssociation",
            ResourceType::TransitGateway => "AWS::EC2::TransitGateway",
            ResourceType::TransitGatewayAttachment => "AWS::EC2::TransitGatewayAttachment",
            ResourceType::InternetGateway => "AWS::EC2::InternetGateway",
            ResourceType::VpcGatewayAttachment => "AWS::EC2::VPCGatewayAttachment",
            ResourceType::SecurityGroup => "AWS::EC2::SecurityGroup",
            ResourceType::SecurityGroupIngress => "AWS::EC2::SecurityGroupIngress",
            ResourceType::VpcEndpoint => "AWS::EC2::VPCEndpoint",
            ResourceType::Instance => "AWS::EC2::Instance",
            ResourceType::NetworkInterface => "AWS::EC2::NetworkInterface",
            ResourceType::NetworkInterfaceAttachment => "AWS::EC2::NetworkInterfaceAttachment",
            ResourceType::Role => "AWS::IAM::Role",
            ResourceType::Policy => "AWS::IAM::Policy",
            ResourceType::InstanceProfile => "AWS::IAM::InstanceProfile",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single declared resource.
///
/// `depends_on` only holds explicit ordering edges. Edges implied by
/// references inside `properties` are derived when the stack builds its
/// dependency graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    logical_id: String,
    resource_type: ResourceType,
    properties: IndexMap<String, Expr>,
    depends_on: Vec<String>,
}

impl Resource {
    /// Create a resource with no properties.
    pub fn new(logical_id: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            logical_id: logical_id.into(),
            resource_type,
            properties: IndexMap::new(),
            depends_on: Vec::new(),
        }
    }

    /// Set a property (builder style).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Expr>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Set a property only when a value is present.
    pub fn with_opt(self, key: impl Into<String>, value: Option<impl Into<Expr>>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn properties(&self) -> &IndexMap<String, Expr> {
        &self.properties
    }

    /// Get a property by name.
    pub fn property(&self, key: &str) -> Option<&Expr> {
        self.properties.get(key)
    }

    /// Set or replace a property.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Expr>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Append to a list property, creating the list on first use.
    pub fn push_to_list(&mut self, key: &str, value: Expr) {
        let entry = self
            .properties
            .entry(key.to_string())
            .or_insert_with(|| Expr::List(Vec::new()));
        match entry {
            Expr::List(items) => items.push(value),
            other => *other = Expr::List(vec![other.clone(), value]),
        }
    }

    /// Explicit ordering edges, as logical ids this resource waits for.
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    /// Add an explicit ordering edge. Returns false if it was already present.
    pub(crate) fn add_depends_on(&mut self, logical_id: &str) -> bool {
        if self.depends_on.iter().any(|d| d == logical_id) {
            return false;
        }
        self.depends_on.push(logical_id.to_string());
        true
    }

    /// Logical ids referenced by property values.
    pub fn references(&self) -> Vec<String> {
        let mut out = Vec::new();
        for value in self.properties.values() {
            value.collect_references(&mut out);
        }
        out
    }
}

/// Turn a construct path into a CloudFormation logical id.
///
/// Logical ids must be alphanumeric, so separators such as `-` and `_` are
/// dropped and path segments are concatenated.
pub fn logical_id(path: &[&str]) -> String {
    path.iter()
        .flat_map(|segment| segment.chars())
        .filter(char::is_ascii_alphanumeric)
        .collect()
}
