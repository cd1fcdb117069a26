use async_trait::async_trait;
use hirecore::{ExecutorMetadata, NodeContext, NodeError, NodeExecutor, NodeKind, NodeOutput};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Structured view of a resume produced by a `ResumeAnalyzer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub skills: Vec<String>,
    pub experience_years: Option<u32>,
    pub education: Vec<String>,
    pub contact: ContactInfo,
    /// 0 to 100
    pub match_score: u8,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        resume: &str,
        job_requirements: Option<&str>,
    ) -> Result<ResumeAnalysis, NodeError>;
}

/// `analyzeResume`: adds `resume_analysis` and `match_score` to the payload
///
/// Analysis failures never abort the run. The payload gets
/// `resume_analysis: null`, `match_score: 0` and an `analysis_error`, and the
/// failure is reported as a run warning.
pub struct AnalyzeResumeExecutor {
    analyzer: Arc<dyn ResumeAnalyzer>,
}

impl AnalyzeResumeExecutor {
    pub fn new(analyzer: Arc<dyn ResumeAnalyzer>) -> Self {
        Self { analyzer }
    }
}

#[async_trait]
impl NodeExecutor for AnalyzeResumeExecutor {
    fn node_type(&self) -> &str {
        NodeKind::ANALYZE_RESUME
    }

    fn metadata(&self) -> ExecutorMetadata {
        ExecutorMetadata::new(
            "Extracts skills, experience and contact details and scores the resume",
            "analysis",
        )
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let configured = match &ctx.node.kind {
            NodeKind::AnalyzeResume(config) => config.job_requirements.as_deref(),
            _ => None,
        };
        let job_requirements = configured.or_else(|| ctx.payload.get_str("job_requirements"));

        let resume = ctx
            .payload
            .get_str("resume_content")
            .or_else(|| ctx.payload.get_str("resume"))
            .filter(|text| !text.trim().is_empty());

        let result = match resume {
            Some(text) => self.analyzer.analyze(text, job_requirements).await,
            None => Err(NodeError::MissingInput("resume_content".to_string())),
        };

        let analysis = result.and_then(|analysis| {
            serde_json::to_value(&analysis)
                .map(|value| (analysis.match_score, value))
                .map_err(|e| NodeError::ExecutionFailed(e.to_string()))
        });

        match analysis {
            Ok((score, value)) => {
                ctx.events.info(format!("Resume scored {}", score));
                Ok(NodeOutput::data(
                    ctx.payload
                        .with("resume_analysis", value)
                        .with("match_score", score),
                ))
            }
            Err(e) => {
                let message = e.to_string();
                ctx.events.warn(format!("Resume analysis failed: {}", message));
                Ok(NodeOutput::data(
                    ctx.payload
                        .with("resume_analysis", Value::Null)
                        .with("match_score", 0)
                        .with("analysis_error", message.clone()),
                )
                .with_warning(format!("Resume analysis failed: {}", message)))
            }
        }
    }
}
