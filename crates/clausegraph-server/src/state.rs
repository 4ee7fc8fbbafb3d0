use std::sync::Arc;

use clausegraph_reasoning::ContractPipeline;

#[derive(Clone)]
pub struct AppState {
    /// Full pipeline; carries the AI reviewer when one is configured.
    pub pipeline: Arc<ContractPipeline>,
    /// Same stages without the reviewer, for requests that opt out.
    pub symbolic: Arc<ContractPipeline>,
}

impl AppState {
    pub fn new(pipeline: ContractPipeline) -> Self {
        let symbolic = pipeline.clone().without_analyzer();
        Self {
            pipeline: Arc::new(pipeline),
            symbolic: Arc::new(symbolic),
        }
    }

    pub fn pipeline_for(&self, ai_review: bool) -> &ContractPipeline {
        if ai_review {
            &self.pipeline
        } else {
            &self.symbolic
        }
    }
}
