use serde::{Deserialize, Serialize};

use crate::node::{Edge, Node};

/// Output of fact extraction: new fact nodes plus the `derived_from` edges
/// tying each one back to its source clause.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedFacts {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl ExtractedFacts {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
