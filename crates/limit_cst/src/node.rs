//! CST nodes and their read surface.

use crate::kind::NodeKind;
use limit_core::text::TextRange;
use limit_scanner::Token;
use std::fmt;

/// One entry of a node's ordered contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Node(Box<Node>),
    /// A token without trivia; its trivia lives in sibling trivia nodes.
    Token(Token),
}

impl Element {
    pub fn range(&self) -> TextRange {
        match self {
            Element::Node(node) => node.span,
            Element::Token(token) => token.range(),
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Element::Node(node) => Some(node),
            Element::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Element::Token(token) => Some(token),
            Element::Node(_) => None,
        }
    }
}

/// Extra data carried by recovery nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NodeDetail {
    #[default]
    None,
    /// Skipped input. The skipped tokens are the node's elements.
    Error {
        expected: Option<String>,
        actual: Option<String>,
    },
    /// A required element that was never found; always zero-width.
    Missing { expected: String },
    /// A construct that failed part way; `target` is what it was meant to be.
    Incomplete { target: NodeKind },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// `[pos, end)`, recomputed from the elements when the node is closed.
    pub span: TextRange,
    elements: Vec<Element>,
    pub is_valid: bool,
    pub error_message: Option<String>,
    pub description: Option<String>,
    pub detail: NodeDetail,
}

impl Node {
    pub fn new(kind: NodeKind, pos: u32) -> Self {
        Self {
            kind,
            span: TextRange::empty(pos),
            elements: Vec::new(),
            is_valid: true,
            error_message: None,
            description: None,
            detail: NodeDetail::None,
        }
    }

    pub fn error(message: impl Into<String>, pos: u32) -> Self {
        let mut node = Self::new(NodeKind::Error, pos);
        node.mark_invalid(message);
        node.detail = NodeDetail::Error {
            expected: None,
            actual: None,
        };
        node
    }

    pub fn missing(expected: impl Into<String>, pos: u32) -> Self {
        let expected = expected.into();
        let mut node = Self::new(NodeKind::Missing, pos);
        node.mark_invalid(format!("Missing {}", expected));
        node.detail = NodeDetail::Missing { expected };
        node
    }

    /// Wrap a single trivia token.
    pub fn trivia(token: Token) -> Self {
        let kind = if token.kind.is_comment() {
            NodeKind::Comment
        } else {
            NodeKind::Whitespace
        };
        let mut node = Self::new(kind, token.pos);
        node.span = token.range();
        node.elements.push(Element::Token(token));
        node
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn mark_invalid(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.error_message = Some(message.into());
    }

    /// Turn a partially built node into an `Incomplete` node for its kind.
    pub fn into_incomplete(mut self, message: impl Into<String>) -> Self {
        let target = self.kind;
        self.kind = NodeKind::Incomplete;
        self.detail = NodeDetail::Incomplete { target };
        self.mark_invalid(message);
        self
    }

    // ========================================================================
    // Element management
    // ========================================================================

    pub fn push_node(&mut self, node: Node) {
        self.elements.push(Element::Node(Box::new(node)));
    }

    pub fn push_token(&mut self, token: Token) {
        self.elements.push(Element::Token(token));
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub(crate) fn elements_len(&self) -> usize {
        self.elements.len()
    }

    pub(crate) fn truncate_elements(&mut self, len: usize) {
        self.elements.truncate(len);
    }

    pub(crate) fn drain_elements_from(&mut self, start: usize) -> Vec<Element> {
        let start = start.min(self.elements.len());
        self.elements.drain(start..).collect()
    }

    pub(crate) fn extend_elements(&mut self, elements: Vec<Element>) {
        self.elements.extend(elements);
    }

    /// Recompute the span from the elements. An empty node keeps its start.
    pub fn finish(&mut self) {
        if let (Some(first), Some(last)) = (self.elements.first(), self.elements.last()) {
            self.span = TextRange::new(first.range().pos, last.range().end);
        } else {
            self.span = TextRange::empty(self.span.pos);
        }
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.elements.iter().filter_map(Element::as_node)
    }

    /// Direct child nodes that are not trivia.
    pub fn significant_children(&self) -> impl Iterator<Item = &Node> {
        self.child_nodes().filter(|n| !n.is_trivia())
    }

    /// Direct tokens in order, including the tokens of direct trivia nodes.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        for element in &self.elements {
            match element {
                Element::Token(token) => out.push(token),
                Element::Node(node) if node.is_trivia() => out.extend(node.elements.iter().filter_map(Element::as_token)),
                Element::Node(_) => {}
            }
        }
        out
    }

    /// Every token below this node, trivia included, in source order.
    pub fn all_tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out, true);
        out
    }

    /// Every non-trivia token below this node, in source order.
    pub fn significant_tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out, false);
        out
    }

    fn collect_tokens<'n>(&'n self, out: &mut Vec<&'n Token>, with_trivia: bool) {
        for element in &self.elements {
            match element {
                Element::Token(token) => {
                    if with_trivia || !token.is_trivia() {
                        out.push(token);
                    }
                }
                Element::Node(node) => {
                    if with_trivia || !node.is_trivia() {
                        node.collect_tokens(out, with_trivia);
                    }
                }
            }
        }
    }

    pub fn find_child(&self, kind: NodeKind) -> Option<&Node> {
        self.child_nodes().find(|n| n.kind == kind)
    }

    pub fn find_children(&self, kind: NodeKind) -> Vec<&Node> {
        self.child_nodes().filter(|n| n.kind == kind).collect()
    }

    /// All nodes of `kind` below this one, depth first, in source order.
    pub fn find_descendants(&self, kind: NodeKind) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect_descendants(kind, &mut out);
        out
    }

    fn collect_descendants<'n>(&'n self, kind: NodeKind, out: &mut Vec<&'n Node>) {
        for child in self.child_nodes() {
            if child.kind == kind {
                out.push(child);
            }
            child.collect_descendants(kind, out);
        }
    }

    /// The exact source text covered by this node.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for token in self.all_tokens() {
            out.push_str(&token.text);
        }
        out
    }

    /// Significant token texts, concatenated.
    pub fn text_without_trivia(&self) -> String {
        let mut out = String::new();
        for token in self.significant_tokens() {
            out.push_str(&token.text);
        }
        out
    }

    /// Whether this node or anything below it is invalid.
    pub fn has_errors(&self) -> bool {
        !self.is_valid || self.kind.is_recovery() || self.child_nodes().any(Node::has_errors)
    }

    /// Error messages of this node and its descendants, in tree order.
    pub fn error_messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_errors(&mut out);
        out
    }

    fn collect_errors(&self, out: &mut Vec<String>) {
        if let Some(ref message) = self.error_message {
            if !self.is_valid {
                out.push(message.clone());
            }
        }
        for child in self.child_nodes() {
            child.collect_errors(out);
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.child_nodes().map(Node::node_count).sum::<usize>()
    }

    /// Indented dump: one `+ Node:` line per node, one `| Token:` per token.
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    fn write_tree(&self, out: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        out.push_str(&pad);
        out.push_str("+ Node: ");
        out.push_str(&self.kind.to_string());
        if !self.is_valid {
            out.push_str(&format!(" [ERROR: {}]", self.error_message.as_deref().unwrap_or("")));
        }
        if let Some(ref description) = self.description {
            out.push_str(&format!(" ({})", description));
        }
        out.push('\n');
        for element in &self.elements {
            match element {
                Element::Token(token) => {
                    out.push_str(&pad);
                    out.push_str(&format!("  | Token: '{}'\n", token.text.escape_debug()));
                }
                Element::Node(node) => node.write_tree(out, indent + 1),
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tree_string())
    }
}

/// Rebuild source text from a CST. With `preserve_trivia` the result is the
/// exact original text; without it, significant tokens are joined by a single
/// space wherever the source had trivia between them.
pub fn reconstruct_source(node: &Node, preserve_trivia: bool) -> String {
    if preserve_trivia {
        return node.text();
    }
    let mut out = String::new();
    let mut previous_end: Option<u32> = None;
    for token in node.significant_tokens() {
        if previous_end.is_some_and(|end| token.pos > end) {
            out.push(' ');
        }
        out.push_str(&token.text);
        previous_end = Some(token.end);
    }
    out
}
