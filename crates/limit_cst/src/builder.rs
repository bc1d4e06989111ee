//! Incremental CST construction driven by the parser.
//!
//! The builder keeps a stack of open nodes. The parser opens a node when it
//! starts a construct, feeds tokens as it consumes them, and closes the node
//! when the construct ends. A construct that fails is closed as `Incomplete`
//! so the tokens it already consumed stay in the tree.

use crate::kind::NodeKind;
use crate::node::Node;
use limit_scanner::Token;

/// A position in the builder: the open node at `depth` had `len` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CstMark {
    depth: usize,
    len: usize,
}

pub struct CstBuilder {
    stack: Vec<Node>,
}

impl Default for CstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CstBuilder {
    pub fn new() -> Self {
        Self {
            stack: vec![Node::new(NodeKind::Program, 0)],
        }
    }

    /// Number of open nodes, the root included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn top(&mut self) -> &mut Node {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    pub fn current_kind(&self) -> NodeKind {
        self.stack.last().map_or(NodeKind::Program, |n| n.kind)
    }

    pub fn start_node(&mut self, kind: NodeKind, pos: u32) {
        self.stack.push(Node::new(kind, pos));
    }

    /// Open a node that adopts everything added to the current node since
    /// `mark`. Used when the kind of a construct is only known after its
    /// leading tokens (modifiers, a left operand) were consumed.
    pub fn start_node_at(&mut self, mark: CstMark, kind: NodeKind, pos: u32) {
        let adopted = if mark.depth + 1 == self.stack.len() {
            self.top().drain_elements_from(mark.len)
        } else {
            Vec::new()
        };
        let mut node = Node::new(kind, pos);
        if let Some(first) = adopted.first() {
            node.span = limit_core::TextRange::empty(first.range().pos);
        }
        node.extend_elements(adopted);
        self.stack.push(node);
    }

    /// Open an `Error` node; tokens added until `finish_node` are the
    /// skipped input.
    pub fn start_error(&mut self, message: impl Into<String>, pos: u32) {
        self.stack.push(Node::error(message, pos));
    }

    pub fn finish_node(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(mut node) = self.stack.pop() {
            node.finish();
            self.top().push_node(node);
        }
    }

    /// Close the innermost node as `Incomplete`.
    pub fn abandon_node(&mut self, message: impl Into<String>) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(mut node) = self.stack.pop() {
            node.finish();
            let node = node.into_incomplete(message);
            self.top().push_node(node);
        }
    }

    /// Describe the innermost open node (shown in tree dumps).
    pub fn describe(&mut self, description: impl Into<String>) {
        self.top().description = Some(description.into());
    }

    pub fn mark(&self) -> CstMark {
        CstMark {
            depth: self.stack.len() - 1,
            len: self.stack.last().map_or(0, Node::elements_len),
        }
    }

    /// Wrap everything added since `mark` into a new closed node of `kind`.
    /// Does nothing when nodes opened after the mark are still open.
    pub fn wrap_from(&mut self, mark: CstMark, kind: NodeKind) {
        if mark.depth + 1 != self.stack.len() {
            return;
        }
        let elements = self.top().drain_elements_from(mark.len);
        if elements.is_empty() {
            return;
        }
        let mut node = Node::new(kind, elements[0].range().pos);
        node.extend_elements(elements);
        node.finish();
        self.top().push_node(node);
    }

    /// Drop everything added since `mark`, including nodes opened after it.
    pub fn truncate(&mut self, mark: CstMark) {
        self.stack.truncate(mark.depth + 1);
        self.top().truncate_elements(mark.len);
    }

    /// Add a token, splitting its trivia into `Whitespace`/`Comment` nodes
    /// around a trivia-free copy of the token.
    pub fn token(&mut self, token: &Token) {
        let top = self.top();
        for trivia in &token.leading_trivia {
            top.push_node(Node::trivia(trivia.clone()));
        }
        if !(token.is_eof() && token.text.is_empty()) {
            let mut bare = Token::new(token.kind, token.text.clone(), token.line, token.pos);
            bare.end = token.end;
            top.push_token(bare);
        }
        for trivia in &token.trailing_trivia {
            top.push_node(Node::trivia(trivia.clone()));
        }
    }

    /// Record a required element that was not found.
    pub fn missing(&mut self, expected: impl Into<String>, pos: u32) {
        self.top().push_node(Node::missing(expected, pos));
    }

    pub fn add_node(&mut self, node: Node) {
        self.top().push_node(node);
    }

    /// Close every open node and return the root. An `aborted` tree has its
    /// root marked invalid.
    pub fn finish(mut self, aborted: Option<&str>) -> Node {
        while self.stack.len() > 1 {
            self.abandon_node("Unterminated construct");
        }
        let mut root = match self.stack.pop() {
            Some(root) => root,
            None => Node::new(NodeKind::Program, 0),
        };
        root.finish();
        if let Some(message) = aborted {
            root.mark_invalid(message);
        }
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limit_scanner::TokenKind;

    fn tok(kind: TokenKind, text: &str, pos: u32) -> Token {
        Token::new(kind, text, 1, pos)
    }

    #[test]
    fn test_nested_nodes() {
        let mut b = CstBuilder::new();
        b.start_node(NodeKind::ReturnStatement, 0);
        b.token(&tok(TokenKind::ReturnKeyword, "return", 0).with_trailing_trivia(vec![tok(TokenKind::WhitespaceTrivia, " ", 6)]));
        b.start_node(NodeKind::LiteralExpr, 7);
        b.token(&tok(TokenKind::NumberLiteral, "1", 7));
        b.finish_node();
        b.finish_node();
        let root = b.finish(None);
        assert_eq!(root.text(), "return 1");
        let ret = root.find_child(NodeKind::ReturnStatement).unwrap();
        assert_eq!(ret.significant_children().count(), 1);
        assert_eq!(ret.child_nodes().count(), 2);
    }

    #[test]
    fn test_wrap_and_adopt() {
        let mut b = CstBuilder::new();
        let mark = b.mark();
        b.token(&tok(TokenKind::PubKeyword, "pub", 0));
        b.start_node_at(mark, NodeKind::FunctionDeclaration, 0);
        b.token(&tok(TokenKind::FnKeyword, "fn", 4));
        b.finish_node();
        let inner = b.mark();
        b.token(&tok(TokenKind::Identifier, "a", 7));
        b.token(&tok(TokenKind::PlusToken, "+", 8));
        b.token(&tok(TokenKind::Identifier, "b", 9));
        b.wrap_from(inner, NodeKind::BinaryExpr);
        let root = b.finish(None);
        let func = root.find_child(NodeKind::FunctionDeclaration).unwrap();
        assert_eq!(func.text(), "pubfn");
        assert_eq!(func.span.pos, 0);
        assert_eq!(root.find_child(NodeKind::BinaryExpr).unwrap().text(), "a+b");
    }

    #[test]
    fn test_truncate_drops_open_nodes() {
        let mut b = CstBuilder::new();
        b.token(&tok(TokenKind::Identifier, "x", 0));
        let mark = b.mark();
        b.start_node(NodeKind::CallExpr, 1);
        b.token(&tok(TokenKind::OpenParenToken, "(", 1));
        b.truncate(mark);
        assert_eq!(b.depth(), 1);
        let root = b.finish(None);
        assert_eq!(root.text(), "x");
    }

    #[test]
    fn test_abandon_and_abort() {
        let mut b = CstBuilder::new();
        b.start_node(NodeKind::ClassDeclaration, 0);
        b.token(&tok(TokenKind::ClassKeyword, "class", 0));
        b.missing("identifier", 5);
        b.abandon_node("Expected class name.");
        b.start_node(NodeKind::Block, 6);
        let root = b.finish(Some("Too many errors"));
        assert!(!root.is_valid);
        let incomplete = root.find_children(NodeKind::Incomplete);
        assert_eq!(incomplete.len(), 2);
        assert_eq!(root.text(), "class");
        assert!(root.error_messages().contains(&"Missing identifier".to_string()));
    }
}
