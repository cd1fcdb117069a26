//! Static checks over a workflow graph.
//!
//! The runner never requires a clean report; these checks exist so authoring
//! tools and the CLI can flag graphs that would misbehave before they run.

use crate::Workflow;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    fn error(&mut self, message: String) {
        self.issues.push(Issue {
            severity: Severity::Error,
            message,
        });
    }

    fn warn(&mut self, message: String) {
        self.issues.push(Issue {
            severity: Severity::Warning,
            message,
        });
    }
}

impl Workflow {
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();

        for node in self.nodes() {
            if index.contains_key(node.id.as_str()) {
                report.error(format!("Duplicate node id '{}'", node.id));
                continue;
            }
            index.insert(node.id.as_str(), graph.add_node(node.id.as_str()));
        }

        let starts: Vec<&str> = self
            .nodes()
            .iter()
            .filter(|n| n.is_start())
            .map(|n| n.id.as_str())
            .collect();
        match starts.as_slice() {
            [] => report.error("No newCandidate start node".to_string()),
            [_] => {}
            [first, ..] => report.warn(format!(
                "{} newCandidate nodes found; runs start at '{}'",
                starts.len(),
                first
            )),
        }

        let mut seen_handles: HashSet<(&str, Option<&str>)> = HashSet::new();
        for edge in self.edges() {
            let from = index.get(edge.source.as_str());
            let to = index.get(edge.target.as_str());
            match (from, to) {
                (Some(from), Some(to)) => {
                    graph.add_edge(*from, *to, ());
                }
                _ => {
                    report.error(format!(
                        "Edge '{}' connects unknown nodes ({} -> {})",
                        edge.id, edge.source, edge.target
                    ));
                    continue;
                }
            }

            let key = (edge.source.as_str(), edge.source_handle.as_deref());
            if !seen_handles.insert(key) {
                report.warn(format!(
                    "Node '{}' has more than one outgoing edge for handle {:?}; only the first is followed",
                    edge.source,
                    edge.source_handle.as_deref().unwrap_or("none")
                ));
            }
        }

        if is_cyclic_directed(&graph) {
            report.error("Workflow graph contains a cycle".to_string());
        }

        tracing::debug!(
            workflow_id = %self.id,
            errors = report.errors().count(),
            warnings = report.warnings().count(),
            "Validated workflow"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use crate::{Node, Workflow};
    use serde_json::json;

    fn node(id: &str, node_type: &str) -> Node {
        Node::new(id, node_type, json!({})).unwrap()
    }

    #[test]
    fn clean_linear_workflow() {
        let mut wf = Workflow::new("wf");
        wf.add_node(node("1", "newCandidate"));
        wf.add_node(node("2", "analyzeResume"));
        wf.connect("1", "2");

        let report = wf.validate();
        assert!(report.is_ok());
        assert!(report.issues.is_empty());
    }

    #[test]
    fn reports_cycle_and_dangling_edge() {
        let mut wf = Workflow::new("wf");
        wf.add_node(node("1", "newCandidate"));
        wf.add_node(node("2", "sendCommunication"));
        wf.connect("1", "2");
        wf.connect("2", "1");
        wf.connect("2", "9");

        let report = wf.validate();
        assert!(!report.is_ok());
        let messages: Vec<_> = report.errors().map(|i| i.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("cycle")));
        assert!(messages.iter().any(|m| m.contains("unknown nodes")));
    }

    #[test]
    fn missing_start_is_error_and_duplicate_handle_is_warning() {
        let mut wf = Workflow::new("wf");
        wf.add_node(node("1", "manualTrigger"));
        wf.add_node(node("2", "sendCommunication"));
        wf.add_node(node("3", "sendCommunication"));
        wf.connect("1", "2");
        wf.connect("1", "3");

        let report = wf.validate();
        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn duplicate_ids_are_errors_and_extra_starts_are_warnings() {
        let mut wf = Workflow::new("wf");
        wf.add_node(node("1", "newCandidate"));
        wf.add_node(node("2", "newCandidate"));
        wf.add_node(node("2", "sendCommunication"));
        wf.connect("1", "2");

        let report = wf.validate();
        let errors: Vec<_> = report.errors().map(|i| i.message.as_str()).collect();
        let warnings: Vec<_> = report.warnings().map(|i| i.message.as_str()).collect();

        assert_eq!(errors, vec!["Duplicate node id '2'"]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("runs start at '1'"));
    }
}
