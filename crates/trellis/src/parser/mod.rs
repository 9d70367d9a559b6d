//! Tolerant text parser for the PlantUML-like diagram notation
//!
//! Turns free-form diagram source into a self-consistent, diagram-local graph
//! of typed nodes and directed/bidirectional edges. The parser is maximally
//! tolerant: the only hard failure is blank input, and any line that matches
//! neither the declaration grammar nor the relationship form is ignored.
//!
//! Node and edge handles in the output are [`LocalId`]s, freshly assigned per
//! call; they only tie edges to nodes within the same parse result and carry
//! no persistence meaning. The identity synchronizer maps them to stable
//! identifiers afterwards.

mod grammar;

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::core::{ComponentType, DiagramError, Metadata, RelationshipDirection};

/// Parser-local node handle, valid only within one [`ParsedGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LocalId(pub(crate) u32);

impl LocalId {
    /// Position of the node in [`ParsedGraph::nodes`].
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A node extracted from diagram text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedNode {
    pub local_id: LocalId,
    /// Display name exactly as first declared
    pub name: String,
    pub component_type: ComponentType,
    pub metadata: Metadata,
}

/// An edge extracted from diagram text, endpoints given as [`LocalId`]s.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedEdge {
    pub source: LocalId,
    pub target: LocalId,
    pub label: Option<String>,
    pub direction: RelationshipDirection,
    pub metadata: Metadata,
}

/// The diagram-local graph produced by one parser call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedGraph {
    pub nodes: Vec<ParsedNode>,
    pub edges: Vec<ParsedEdge>,
}

impl ParsedGraph {
    /// Look up a node by its local handle.
    pub fn node(&self, id: LocalId) -> Option<&ParsedNode> {
        self.nodes.get(id.index())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Tolerant parser for the PlantUML-like notation.
///
/// Pure and stateless: identical input always produces identical output,
/// including ordering.
///
/// # Example
/// ```rust
/// use trellis::parser::PlantUmlParser;
///
/// let parser = PlantUmlParser::new();
/// let graph = parser
///     .parse("[Frontend] as FE\n[Backend] as BE\nFE --> BE : HTTP")
///     .unwrap();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// ```
pub struct PlantUmlParser;

impl PlantUmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse diagram source into a diagram-local graph.
    ///
    /// Fails only when the input is empty or whitespace. Declarations are
    /// collected in a first pass (exact display name, first occurrence wins;
    /// `as` aliases go into a parse-local table), relationships in a second
    /// pass so they may appear before their endpoints. Relationships whose
    /// endpoints do not resolve to a declared node are silently dropped.
    pub fn parse(&self, content: &str) -> Result<ParsedGraph, DiagramError> {
        if content.trim().is_empty() {
            return Err(DiagramError::parse("empty diagram source"));
        }

        let mut graph = ParsedGraph::default();
        let mut index_by_name: HashMap<String, LocalId> = HashMap::new();
        let mut aliases: HashMap<String, String> = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || is_comment(line) {
                continue;
            }

            let mut declarations = grammar::bracketed_declarations(line);
            if declarations.is_empty() {
                if let Some(declaration) = grammar::match_keyword_rule(line) {
                    declarations.push(declaration);
                }
            }

            for declaration in declarations {
                if let Some(alias) = &declaration.alias {
                    aliases.insert(alias.clone(), declaration.name.clone());
                }
                if index_by_name.contains_key(&declaration.name) {
                    trace!(name = %declaration.name, "duplicate declaration ignored");
                    continue;
                }
                let local_id = LocalId(graph.nodes.len() as u32);
                index_by_name.insert(declaration.name.clone(), local_id);
                graph.nodes.push(ParsedNode {
                    local_id,
                    name: declaration.name,
                    component_type: declaration.component_type,
                    metadata: Metadata::new(),
                });
            }
        }

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || is_comment(line) {
                continue;
            }
            let Some(arrow) = grammar::find_arrow(line) else {
                continue;
            };

            let source_token = clean_endpoint(&line[..arrow.start]);
            let (target_raw, label) = split_label(&line[arrow.end..]);
            let target_token = clean_endpoint(target_raw);
            if source_token.is_empty() || target_token.is_empty() {
                continue;
            }

            let source_name = aliases.get(&source_token).cloned().unwrap_or(source_token);
            let target_name = aliases.get(&target_token).cloned().unwrap_or(target_token);

            let (Some(&source), Some(&target)) = (
                index_by_name.get(&source_name),
                index_by_name.get(&target_name),
            ) else {
                debug!(
                    source = %source_name,
                    target = %target_name,
                    "relationship endpoint not declared, dropping edge"
                );
                continue;
            };

            graph.edges.push(ParsedEdge {
                source,
                target,
                label,
                direction: if arrow.bidirectional {
                    RelationshipDirection::Bidirectional
                } else {
                    RelationshipDirection::Unidirectional
                },
                metadata: Metadata::new(),
            });
        }

        debug!(
            node_count = graph.node_count(),
            edge_count = graph.edge_count(),
            "parse completed"
        );
        Ok(graph)
    }
}

impl Default for PlantUmlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn is_comment(line: &str) -> bool {
    line.starts_with('\'')
}

/// Split an optional ` : label` suffix off the text after the arrow.
fn split_label(s: &str) -> (&str, Option<String>) {
    match s.find(':') {
        Some(pos) => {
            let label = s[pos + 1..].trim();
            let label = if label.is_empty() {
                None
            } else {
                Some(label.to_string())
            };
            (&s[..pos], label)
        }
        None => (s, None),
    }
}

/// Trim an endpoint token and strip surrounding quotes or brackets.
fn clean_endpoint(s: &str) -> String {
    let mut token = s.trim();
    if let Some(stripped) = token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
    {
        token = stripped.trim();
    }
    if let Some(stripped) = token
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
    {
        token = stripped.trim();
    }
    token.to_string()
}
