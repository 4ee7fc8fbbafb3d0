use serde::{Deserialize, Serialize};

use crate::node::{Edge, Node};

/// Flat projection of an assembled graph. This is the only shape in which a
/// graph leaves the core: reports, the HTTP API and the learned-model review
/// all consume it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphProjection {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}
