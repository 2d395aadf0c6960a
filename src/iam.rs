//! IAM roles and inline policies for instances.
//!
//! A [`Role`] is declared with a trust policy for one service principal.
//! Statements added with [`Role::add_to_policy`] are collected in a single
//! `<role>DefaultPolicy` resource attached to the role.

use crate::cfn::{logical_id, Expr, Resource, ResourceType};
use crate::error::Result;
use crate::stack::Stack;

/// Policy language version used by every document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Service principal of EC2 instances.
pub const EC2_SERVICE_PRINCIPAL: &str = "ec2.amazonaws.com";

/// Actions an instance needs to be managed through Systems Manager.
pub const SSM_MANAGED_INSTANCE_ACTIONS: &[&str] = &[
    "ssm:DescribeAssociation",
    "ssm:GetDeployablePatchSnapshotForInstance",
    "ssm:GetDocument",
    "ssm:DescribeDocument",
    "ssm:GetManifest",
    "ssm:GetParameter",
    "ssm:GetParameters",
    "ssm:ListAssociations",
    "ssm:ListInstanceAssociations",
    "ssm:PutInventory",
    "ssm:PutComplianceItems",
    "ssm:PutConfigurePackageResult",
    "ssm:UpdateAssociationStatus",
    "ssm:UpdateInstanceAssociationStatus",
    "ssm:UpdateInstanceInformation",
    "ssmmessages:CreateControlChannel",
    "ssmmessages:CreateDataChannel",
    "ssmmessages:OpenControlChannel",
    "ssmmessages:OpenDataChannel",
    "ec2messages:AcknowledgeMessage",
    "ec2messages:DeleteMessage",
    "ec2messages:FailMessage",
    "ec2messages:GetEndpoint",
    "ec2messages:GetMessages",
    "ec2messages:SendReply",
    "s3:*",
    "sns:*",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

/// One statement of a policy document.
#[derive(Debug, Clone)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

impl PolicyStatement {
    /// Allow `actions` on every resource.
    pub fn allow_all_resources(actions: &[&str]) -> Self {
        Self {
            effect: Effect::Allow,
            actions: actions.iter().map(|a| a.to_string()).collect(),
            resources: vec!["*".to_string()],
        }
    }

    fn to_expr(&self) -> Expr {
        let one_or_many = |items: &[String]| match items {
            [single] => Expr::str(single.as_str()),
            many => Expr::List(many.iter().map(|s| Expr::str(s.as_str())).collect()),
        };
        Expr::map([
            ("Action", one_or_many(&self.actions)),
            ("Effect", Expr::str(self.effect.as_str())),
            ("Resource", one_or_many(&self.resources)),
        ])
    }
}

/// A declared IAM role.
#[derive(Debug, Clone)]
pub struct Role {
    logical_id: String,
    policy_id: String,
}

impl Role {
    /// Declare a role assumable by `service_principal`.
    pub fn new(stack: &mut Stack, id: &str, service_principal: &str) -> Result<Self> {
        let trust = Expr::map([
            (
                "Statement",
                Expr::List(vec![Expr::map([
                    ("Action", Expr::str("sts:AssumeRole")),
                    ("Effect", Expr::str("Allow")),
                    (
                        "Principal",
                        Expr::map([("Service", Expr::str(service_principal))]),
                    ),
                ])]),
            ),
            ("Version", Expr::str(POLICY_VERSION)),
        ]);
        let logical_id = stack.add(
            Resource::new(logical_id(&[id]), ResourceType::Role)
                .with("AssumeRolePolicyDocument", trust),
        )?;
        let policy_id = logical_id.clone() + "DefaultPolicy";
        Ok(Self {
            logical_id,
            policy_id,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Logical id of the default policy, declared on first statement.
    pub fn policy_id(&self) -> &str {
        &self.policy_id
    }

    /// `Ref` to the role name.
    pub fn role_ref(&self) -> Expr {
        Expr::reference(&self.logical_id)
    }

    /// Add a statement to the role's default policy.
    pub fn add_to_policy(&self, stack: &mut Stack, statement: PolicyStatement) -> Result<()> {
        if !stack.contains(&self.policy_id) {
            stack.add(
                Resource::new(&self.policy_id, ResourceType::Policy)
                    .with(
                        "PolicyDocument",
                        Expr::map([
                            ("Statement", Expr::List(Vec::new())),
                            ("Version", Expr::str(POLICY_VERSION)),
                        ]),
                    )
                    .with("PolicyName", self.policy_id.as_str())
                    .with("Roles", vec![self.role_ref()]),
            )?;
        }

        let policy = stack.resource_mut(&self.policy_id)?;
        let mut document = policy
            .property("PolicyDocument")
            .cloned()
            .unwrap_or_else(|| Expr::map([("Version", Expr::str(POLICY_VERSION))]));
        match document.get_mut("Statement") {
            Some(Expr::List(statements)) => statements.push(statement.to_expr()),
            _ => {
                if let Expr::Map(entries) = &mut document {
                    entries.insert(
                        "Statement".to_string(),
                        Expr::List(vec![statement.to_expr()]),
                    );
                }
            }
        }
        policy.set_property("PolicyDocument", document);
        Ok(())
    }
}

/// Role used by every instance of a stack for Systems Manager access.
pub fn ssm_managed_instance_role(stack: &mut Stack, id: &str) -> Result<Role> {
    let role = Role::new(stack, id, EC2_SERVICE_PRINCIPAL)?;
    role.add_to_policy(
        stack,
        PolicyStatement::allow_all_resources(SSM_MANAGED_INSTANCE_ACTIONS),
    )?;
    Ok(role)
}
