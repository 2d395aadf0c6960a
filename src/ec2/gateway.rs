//! Internet Gateway and its VPC attachment.

use super::vpc::Vpc;
use crate::cfn::{Expr, Resource, ResourceType};
use crate::error::Result;
use crate::stack::Stack;

/// A declared Internet Gateway together with its VPC attachment.
#[derive(Debug, Clone)]
pub struct InternetGateway {
    logical_id: String,
    attachment_id: String,
}

impl InternetGateway {
    /// Declare the gateway (`id`) and attach it to `vpc` (`attachment_id`).
    pub fn new(stack: &mut Stack, id: &str, attachment_id: &str, vpc: &Vpc) -> Result<Self> {
        let logical_id = stack.add(Resource::new(
            crate::cfn::logical_id(&[id]),
            ResourceType::InternetGateway,
        ))?;
        let attachment_id = stack.add(
            Resource::new(
                crate::cfn::logical_id(&[attachment_id]),
                ResourceType::VpcGatewayAttachment,
            )
            .with("VpcId", vpc.vpc_id())
            .with("InternetGatewayId", Expr::reference(&logical_id)),
        )?;

        Ok(Self {
            logical_id,
            attachment_id,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Logical id of the VPC attachment routes must wait for.
    pub fn attachment_id(&self) -> &str {
        &self.attachment_id
    }

    /// `Ref` to the gateway id.
    pub fn gateway_id(&self) -> Expr {
        Expr::reference(&self.logical_id)
    }
}
