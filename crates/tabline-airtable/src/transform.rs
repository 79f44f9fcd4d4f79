//! Output shapes: flat record list or node/link graph

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::Record;

/// How a task shapes its records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Records as returned, in source order
    #[default]
    List,
    /// `{nodes, links}` derived from [`LinkRule`]s
    Graph,
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List => f.write_str("list"),
            Self::Graph => f.write_str("graph"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// record -> referenced record
    Forward,
    /// referenced record -> record
    Reverse,
}

/// A field whose values are ids of other records in the same table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRule {
    pub field: String,
    #[serde(rename = "type")]
    pub link_type: String,
    pub direction: Direction,
}

impl LinkRule {
    pub fn forward(field: &str, link_type: &str) -> Self {
        Self {
            field: field.to_string(),
            link_type: link_type.to_string(),
            direction: Direction::Forward,
        }
    }

    pub fn reverse(field: &str, link_type: &str) -> Self {
        Self {
            field: field.to_string(),
            link_type: link_type.to_string(),
            direction: Direction::Reverse,
        }
    }

    /// Workflow-table rules: "Next Steps" points forward, "Dependencies" back
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::forward("Next Steps", "next_step"),
            Self::reverse("Dependencies", "dependency"),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub link_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    /// Record fields plus `id`
    pub nodes: Vec<Map<String, Value>>,
    pub links: Vec<Link>,
}

/// What gets written for one task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Output {
    List(Vec<Record>),
    Graph(Graph),
}

impl Output {
    /// Records (list) or nodes (graph)
    pub fn len(&self) -> usize {
        match self {
            Self::List(records) => records.len(),
            Self::Graph(graph) => graph.nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shape records according to `policy`. Pure; no I/O.
pub fn transform(records: Vec<Record>, policy: Policy, rules: &[LinkRule]) -> Output {
    match policy {
        Policy::List => Output::List(records),
        Policy::Graph => Output::Graph(build_graph(&records, rules)),
    }
}

/// Build nodes and links.
///
/// Each node is the record's field map with `id` set to the record id.
/// For every node, rule and id-like value in the rule's field (a string or
/// an array of strings), a link is emitted when the value names a known
/// node. References to unknown ids are dropped.
pub fn build_graph(records: &[Record], rules: &[LinkRule]) -> Graph {
    let known: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();

    let nodes = records
        .iter()
        .map(|r| {
            let mut node = r.fields.clone();
            node.insert("id".to_string(), Value::String(r.id.clone()));
            node
        })
        .collect();

    let mut links = Vec::new();
    for record in records {
        for rule in rules {
            for referenced in referenced_ids(record.fields.get(&rule.field)) {
                if !known.contains(referenced) {
                    log::debug!(
                        "{}: dropping {} link to unknown id {referenced}",
                        record.id,
                        rule.link_type
                    );
                    continue;
                }
                let (source, target) = match rule.direction {
                    Direction::Forward => (record.id.as_str(), referenced),
                    Direction::Reverse => (referenced, record.id.as_str()),
                };
                links.push(Link {
                    source: source.to_string(),
                    target: target.to_string(),
                    link_type: rule.link_type.clone(),
                });
            }
        }
    }

    Graph { nodes, links }
}

fn referenced_ids(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::String(id)) => vec![id.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}
