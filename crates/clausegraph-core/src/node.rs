use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ClauseGraphError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Clause,
    Obligation,
    Right,
    Condition,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Clause => "clause",
            NodeKind::Obligation => "obligation",
            NodeKind::Right => "right",
            NodeKind::Condition => "condition",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseNode {
    pub id: String,
    /// Section label as written in the document ("4.2", "Article IV").
    #[serde(default)]
    pub number: Option<String>,
    pub title: String,
    pub body: String,
    pub level: u32,
    pub parent_id: Option<String>,
    /// First line of the clause's scannable text, 1-based.
    pub line: Option<u32>,
}

impl ClauseNode {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        level: u32,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            number: None,
            title: title.into(),
            body: body.into(),
            level: level.max(1),
            parent_id,
            line: None,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Body if it has content, otherwise the title.
    pub fn scan_text(&self) -> &str {
        let body = self.body.trim();
        if body.is_empty() {
            self.title.trim()
        } else {
            body
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObligationNode {
    pub id: String,
    /// Empty when the obligated party could not be identified.
    #[serde(default)]
    pub party: String,
    pub action: String,
    pub target_party: Option<String>,
    pub temporal: Option<String>,
    pub line: Option<u32>,
}

impl ObligationNode {
    pub fn new(id: impl Into<String>, party: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            party: party.into(),
            action: action.into(),
            target_party: None,
            temporal: None,
            line: None,
        }
    }

    pub fn with_target_party(mut self, target: impl Into<String>) -> Self {
        self.target_party = Some(target.into());
        self
    }

    pub fn with_temporal(mut self, temporal: impl Into<String>) -> Self {
        self.temporal = Some(temporal.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightNode {
    pub id: String,
    #[serde(default)]
    pub party: String,
    pub entitlement: String,
    pub scope: Option<String>,
    pub line: Option<u32>,
}

impl RightNode {
    pub fn new(
        id: impl Into<String>,
        party: impl Into<String>,
        entitlement: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            party: party.into(),
            entitlement: entitlement.into(),
            scope: None,
            line: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionNode {
    pub id: String,
    pub trigger: String,
    pub consequence: String,
    /// Raw clause numbers as written; not validated against the graph.
    #[serde(default)]
    pub referenced_clauses: Vec<String>,
    pub line: Option<u32>,
}

impl ConditionNode {
    pub fn new(
        id: impl Into<String>,
        trigger: impl Into<String>,
        consequence: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            trigger: trigger.into(),
            consequence: consequence.into(),
            referenced_clauses: Vec::new(),
            line: None,
        }
    }

    pub fn with_references(mut self, refs: Vec<String>) -> Self {
        self.referenced_clauses = refs;
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

/// Closed node taxonomy. Serializes flat, with the kind under `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Clause(ClauseNode),
    Obligation(ObligationNode),
    Right(RightNode),
    Condition(ConditionNode),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Clause(n) => &n.id,
            Node::Obligation(n) => &n.id,
            Node::Right(n) => &n.id,
            Node::Condition(n) => &n.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Clause(_) => NodeKind::Clause,
            Node::Obligation(_) => NodeKind::Obligation,
            Node::Right(_) => NodeKind::Right,
            Node::Condition(_) => NodeKind::Condition,
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            Node::Clause(n) => n.line,
            Node::Obligation(n) => n.line,
            Node::Right(n) => n.line,
            Node::Condition(n) => n.line,
        }
    }

    pub fn as_clause(&self) -> Option<&ClauseNode> {
        match self {
            Node::Clause(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_obligation(&self) -> Option<&ObligationNode> {
        match self {
            Node::Obligation(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_right(&self) -> Option<&RightNode> {
        match self {
            Node::Right(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_condition(&self) -> Option<&ConditionNode> {
        match self {
            Node::Condition(n) => Some(n),
            _ => None,
        }
    }

    /// Flat key/value projection: `{id, type, <kind fields>, line}`.
    pub fn to_projection(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            // Internally tagged struct variants always serialize to an object.
            _ => serde_json::Map::new(),
        }
    }
}

impl From<ClauseNode> for Node {
    fn from(n: ClauseNode) -> Self {
        Node::Clause(n)
    }
}

impl From<ObligationNode> for Node {
    fn from(n: ObligationNode) -> Self {
        Node::Obligation(n)
    }
}

impl From<RightNode> for Node {
    fn from(n: RightNode) -> Self {
        Node::Right(n)
    }
}

impl From<ConditionNode> for Node {
    fn from(n: ConditionNode) -> Self {
        Node::Condition(n)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    References,
    DerivedFrom,
    DependsOn,
    ConflictsWith,
}

impl EdgeType {
    pub const ALL: [EdgeType; 4] = [
        EdgeType::References,
        EdgeType::DerivedFrom,
        EdgeType::DependsOn,
        EdgeType::ConflictsWith,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::References => "references",
            EdgeType::DerivedFrom => "derived_from",
            EdgeType::DependsOn => "depends_on",
            EdgeType::ConflictsWith => "conflicts_with",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeType {
    type Err = ClauseGraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "references" => Ok(EdgeType::References),
            "derived_from" => Ok(EdgeType::DerivedFrom),
            "depends_on" => Ok(EdgeType::DependsOn),
            "conflicts_with" => Ok(EdgeType::ConflictsWith),
            other => Err(ClauseGraphError::InvalidEdgeType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, edge_type: EdgeType) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            edge_type,
        }
    }

    /// Build an edge from a textual type label, rejecting labels outside the
    /// fixed edge vocabulary.
    pub fn parse(from: impl Into<String>, to: impl Into<String>, label: &str) -> Result<Self> {
        let edge_type = label.parse()?;
        Ok(Self::new(from, to, edge_type))
    }
}
