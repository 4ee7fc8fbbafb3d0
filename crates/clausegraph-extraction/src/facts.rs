use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use clausegraph_core::extraction::ExtractedFacts;
use clausegraph_core::node::{
    ClauseNode, ConditionNode, Edge, EdgeType, Node, ObligationNode, RightNode,
};

use crate::parties::detect_target_party;

static OBLIGATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)(?:the\s+)?(\w+)\s+(?:shall|must|agrees?\s+to|is\s+required\s+to)\s+(.+?)(?:\.\s|$)",
    )
    .expect("valid obligation regex")
});

static RIGHT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)(?:the\s+)?(\w+)\s+(?:may|is\s+entitled\s+to|has\s+the\s+right\s+to)\s+(.+?)(?:\.\s|$)",
    )
    .expect("valid right regex")
});

static CONDITION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\b(?:if|provided\s+that|subject\s+to|upon)\s+(.+?),\s*(.+?)(?:\.\s|$)")
        .expect("valid condition regex")
});

static TEMPORAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:within|before|after|no\s+later\s+than)\s+\d+\s+\w+")
        .expect("valid temporal regex")
});

static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:clause|section|article)\s+(\d+(?:\.\d+)*)").expect("valid reference regex")
});

/// Characters of a matched fragment used to locate its source line.
const PROVENANCE_PREFIX_CHARS: usize = 30;

static STANDARD_RULES: LazyLock<Vec<FactRule>> = LazyLock::new(|| {
    vec![
        FactRule {
            category: FactCategory::Obligation,
            pattern: OBLIGATION_PATTERN.clone(),
            anchor: Anchor::Second,
            build: build_obligation,
        },
        FactRule {
            category: FactCategory::Right,
            pattern: RIGHT_PATTERN.clone(),
            anchor: Anchor::Second,
            build: build_right,
        },
        FactRule {
            category: FactCategory::Condition,
            pattern: CONDITION_PATTERN.clone(),
            anchor: Anchor::First,
            build: build_condition,
        },
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactCategory {
    Obligation,
    Right,
    Condition,
}

impl FactCategory {
    pub fn id_prefix(&self) -> &'static str {
        match self {
            FactCategory::Obligation => "obl",
            FactCategory::Right => "right",
            FactCategory::Condition => "cond",
        }
    }
}

/// Which captured phrase is searched for when resolving the source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    First,
    Second,
}

/// The two phrases captured by a rule: party and action for obligations,
/// party and entitlement for rights, trigger and consequence for conditions.
#[derive(Debug, Clone, Copy)]
pub struct FactMatch<'t> {
    pub first: &'t str,
    pub second: &'t str,
}

impl<'t> FactMatch<'t> {
    fn anchor(&self, anchor: Anchor) -> &'t str {
        match anchor {
            Anchor::First => self.first,
            Anchor::Second => self.second,
        }
    }
}

/// One extraction rule: a phrase pattern with two capture groups and the
/// constructor that turns a match into a node.
#[derive(Clone)]
pub struct FactRule {
    pub category: FactCategory,
    pub pattern: Regex,
    pub anchor: Anchor,
    pub build: fn(id: String, matched: &FactMatch<'_>, line: Option<u32>) -> Node,
}

impl std::fmt::Debug for FactRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactRule")
            .field("category", &self.category)
            .field("pattern", &self.pattern.as_str())
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}

/// Ordered rule table applied clause by clause.
///
/// Rules run in table order within each clause, so a clause's obligations
/// precede its rights and conditions. Ids are `<prefix>_<n>` with one
/// counter per category starting at 1.
#[derive(Debug, Clone)]
pub struct FactExtractor {
    rules: Vec<FactRule>,
}

impl Default for FactExtractor {
    fn default() -> Self {
        Self {
            rules: STANDARD_RULES.clone(),
        }
    }
}

impl FactExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// An extractor with no rules at all, for callers assembling their own table.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: FactRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[FactRule] {
        &self.rules
    }

    pub fn extract(&self, clauses: &[ClauseNode]) -> ExtractedFacts {
        let mut facts = ExtractedFacts::default();
        let mut counters: HashMap<FactCategory, usize> = HashMap::new();

        for clause in clauses {
            let text = clause.scan_text();

            for rule in &self.rules {
                for caps in rule.pattern.captures_iter(text) {
                    let (Some(first), Some(second)) = (caps.get(1), caps.get(2)) else {
                        continue;
                    };
                    let matched = FactMatch {
                        first: first.as_str(),
                        second: second.as_str(),
                    };

                    let counter = counters.entry(rule.category).or_insert(0);
                    *counter += 1;
                    let id = format!("{}_{}", rule.category.id_prefix(), counter);
                    let line = locate_line(clause, matched.anchor(rule.anchor));

                    facts
                        .edges
                        .push(Edge::new(clause.id.clone(), id.clone(), EdgeType::DerivedFrom));
                    facts.nodes.push((rule.build)(id, &matched, line));
                }
            }
        }

        tracing::debug!(
            clauses = clauses.len(),
            obligations = counters.get(&FactCategory::Obligation).copied().unwrap_or(0),
            rights = counters.get(&FactCategory::Right).copied().unwrap_or(0),
            conditions = counters.get(&FactCategory::Condition).copied().unwrap_or(0),
            "Extracted facts"
        );

        facts
    }
}

/// Run the standard rule table over `clauses`.
pub fn extract_facts(clauses: &[ClauseNode]) -> ExtractedFacts {
    FactExtractor::default().extract(clauses)
}

/// Best-effort source line for a fragment matched inside `clause`.
fn locate_line(clause: &ClauseNode, fragment: &str) -> Option<u32> {
    let start = clause.line?;
    let needle: String = fragment
        .chars()
        .take(PROVENANCE_PREFIX_CHARS)
        .collect::<String>()
        .to_lowercase();

    let offset = clause
        .scan_text()
        .lines()
        .position(|line| line.to_lowercase().contains(&needle));

    Some(offset.map_or(start, |o| start + o as u32))
}

fn build_obligation(id: String, matched: &FactMatch<'_>, line: Option<u32>) -> Node {
    let action = matched.second.trim();
    let mut node = ObligationNode::new(id, matched.first.trim(), action);
    if let Some(temporal) = TEMPORAL_PATTERN.find(action) {
        node = node.with_temporal(temporal.as_str());
    }
    if let Some(target) = detect_target_party(action) {
        node = node.with_target_party(target);
    }
    node.line = line;
    node.into()
}

fn build_right(id: String, matched: &FactMatch<'_>, line: Option<u32>) -> Node {
    let mut node = RightNode::new(id, matched.first.trim(), matched.second.trim());
    node.line = line;
    node.into()
}

fn build_condition(id: String, matched: &FactMatch<'_>, line: Option<u32>) -> Node {
    let refs = clause_references(&format!("{} {}", matched.first, matched.second));
    let mut node = ConditionNode::new(id, matched.first.trim(), matched.second.trim())
        .with_references(refs);
    node.line = line;
    node.into()
}

/// Clause numbers cited as "clause|section|article <n>", verbatim.
pub fn clause_references(text: &str) -> Vec<String> {
    REFERENCE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(id: &str, body: &str, line: Option<u32>) -> ClauseNode {
        let clause = ClauseNode::new(id, "Title", body, 1, None);
        match line {
            Some(l) => clause.with_line(l),
            None => clause,
        }
    }

    #[test]
    fn test_extracts_obligation_with_derived_fields() {
        let clauses = vec![clause(
            "clause_1",
            "The Seller shall deliver the goods to the Buyer within 30 days. Payment follows.",
            None,
        )];
        let facts = extract_facts(&clauses);

        assert_eq!(facts.nodes.len(), 1);
        let obligation = facts.nodes[0].as_obligation().expect("obligation");
        assert_eq!(obligation.id, "obl_1");
        assert_eq!(obligation.party, "Seller");
        assert_eq!(obligation.action, "deliver the goods to the Buyer within 30 days");
        assert_eq!(obligation.target_party.as_deref(), Some("Buyer"));
        assert_eq!(obligation.temporal.as_deref(), Some("within 30 days"));
        assert_eq!(obligation.line, None);

        assert_eq!(facts.edges, vec![Edge::new("clause_1", "obl_1", EdgeType::DerivedFrom)]);
    }

    #[test]
    fn test_extracts_rights_and_conditions() {
        let clauses = vec![clause(
            "clause_1",
            "The Buyer may inspect the goods at any time.\nIf delivery is late under Section 4.2, the Buyer is entitled to a refund.",
            None,
        )];
        let facts = extract_facts(&clauses);

        let rights: Vec<&RightNode> = facts.nodes.iter().filter_map(Node::as_right).collect();
        assert_eq!(rights.len(), 2);
        assert_eq!(rights[0].id, "right_1");
        assert_eq!(rights[0].entitlement, "inspect the goods at any time");
        // End-of-line matches keep the closing period.
        assert_eq!(rights[1].entitlement, "a refund.");

        let conditions: Vec<&ConditionNode> =
            facts.nodes.iter().filter_map(Node::as_condition).collect();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].trigger, "delivery is late under Section 4.2");
        assert_eq!(conditions[0].consequence, "the Buyer is entitled to a refund.");
        assert_eq!(conditions[0].referenced_clauses, vec!["4.2"]);

        assert_eq!(facts.edges.len(), facts.nodes.len());
        assert!(facts.edges.iter().all(|e| e.edge_type == EdgeType::DerivedFrom));
    }

    #[test]
    fn test_condition_keyword_needs_word_boundary() {
        let clauses = vec![
            clause("clause_1", "Thereupon the goods ship, the invoice issues.", None),
            clause("clause_2", "Upon delivery, the invoice issues.", None),
        ];
        let facts = extract_facts(&clauses);

        let conditions: Vec<&ConditionNode> =
            facts.nodes.iter().filter_map(Node::as_condition).collect();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].trigger, "delivery");
        assert_eq!(facts.edges[0].from, "clause_2");
    }

    #[test]
    fn test_counters_are_per_kind_and_span_clauses() {
        let clauses = vec![
            clause("clause_1", "The Seller shall ship.", None),
            clause("clause_2", "The Buyer shall pay. The Buyer may audit.", None),
        ];
        let facts = extract_facts(&clauses);
        let ids: Vec<&str> = facts.nodes.iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["obl_1", "obl_2", "right_1"]);
        assert_eq!(facts.edges[1].from, "clause_2");
    }

    #[test]
    fn test_title_used_when_body_empty() {
        let clauses = vec![ClauseNode::new("clause_1", "Tenant must pay rent", "", 1, None)];
        let facts = extract_facts(&clauses);
        let obligation = facts.nodes[0].as_obligation().unwrap();
        assert_eq!(obligation.party, "Tenant");
        assert_eq!(obligation.action, "pay rent");
    }

    #[test]
    fn test_provenance_line_offsets() {
        let body = "Preamble text here.\nThe Seller shall deliver the goods.\nThe Buyer may inspect them.";
        let clauses = vec![clause("clause_1", body, Some(10))];
        let facts = extract_facts(&clauses);

        assert_eq!(facts.nodes[0].line(), Some(11));
        assert_eq!(facts.nodes[1].line(), Some(12));
    }

    #[test]
    fn test_provenance_falls_back_to_clause_line() {
        // A dot-all rule lets the fragment span lines, so no single line contains it.
        let extractor = FactExtractor::empty().with_rule(FactRule {
            category: FactCategory::Obligation,
            pattern: Regex::new(r"(?s)(\w+)\s+undertakes\s+(to.+)").unwrap(),
            anchor: Anchor::Second,
            build: |id, m, line| {
                let mut node = ObligationNode::new(id, m.first, m.second);
                node.line = line;
                node.into()
            },
        });
        let body = "Preamble.\nThe Supplier undertakes to\nkeep spare parts in stock";
        let facts = extractor.extract(&[clause("clause_1", body, Some(3))]);
        assert_eq!(facts.nodes[0].line(), Some(3));
    }

    #[test]
    fn test_custom_rule_extends_table() {
        let termination = Regex::new(r"(?i)(\w+)\s+can\s+cancel\s+(.+?)(?:\.\s|$)").unwrap();
        let extractor = FactExtractor::empty().with_rule(FactRule {
            category: FactCategory::Right,
            pattern: termination,
            anchor: Anchor::Second,
            build: |id, m, line| {
                let mut node = RightNode::new(id, m.first, m.second).with_scope("termination");
                node.line = line;
                node.into()
            },
        });

        let facts = extractor.extract(&[clause("clause_1", "Licensee can cancel the license", None)]);
        let right = facts.nodes[0].as_right().unwrap();
        assert_eq!(right.party, "Licensee");
        assert_eq!(right.scope.as_deref(), Some("termination"));
    }

    #[test]
    fn test_clause_references_verbatim() {
        assert_eq!(
            clause_references("see Clause 3 and section 12.1, not article 7"),
            vec!["3", "12.1", "7"]
        );
    }
}
