use async_trait::async_trait;
use hirecore::{
    ConditionSpec, ExecutorMetadata, NodeContext, NodeError, NodeExecutor, NodeKind, NodeOutput,
};

/// `condition`: picks the `"true"` or `"false"` outgoing edge
pub struct ConditionExecutor;

#[async_trait]
impl NodeExecutor for ConditionExecutor {
    fn node_type(&self) -> &str {
        NodeKind::CONDITION
    }

    fn metadata(&self) -> ExecutorMetadata {
        ExecutorMetadata::new(
            "Branches on a payload field (defaults to match_score > 80)",
            "logic",
        )
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let default_spec;
        let spec = match &ctx.node.kind {
            NodeKind::Condition(spec) => spec,
            _ => {
                default_spec = ConditionSpec::default();
                &default_spec
            }
        };

        let taken = spec.evaluate(&ctx.payload);
        tracing::debug!(
            node_id = %ctx.node.id,
            field = %spec.field,
            operator = ?spec.operator,
            taken,
            "Condition evaluated"
        );

        Ok(NodeOutput::branch(taken))
    }
}
