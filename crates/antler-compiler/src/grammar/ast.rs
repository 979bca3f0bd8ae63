//! Arena-allocated grammar syntax tree.
//!
//! Nodes reference each other by [`NodeId`]. Rewriting passes add nodes and
//! rewire child lists; nodes are never freed while the grammar lives.

use rowan::TextRange;

use crate::atn::StateId;

/// Index into `GrammarAst::nodes`.
pub type NodeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assoc {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// `( alt | alt )`. Children are `Alt` nodes.
    Block,
    /// One alternative. Children are elements, possibly none.
    Alt {
        label: Option<String>,
        assoc: Assoc,
    },
    /// Children: exactly one `Block`.
    Optional { greedy: bool },
    Star { greedy: bool },
    Plus { greedy: bool },
    /// `ID` or `'+'`; the token text tells them apart.
    Terminal,
    /// `'a'..'z'`. Children: two literal terminals.
    Range,
    /// `('a'|'b')`. Children: terminals, ranges or char sets.
    Set,
    /// `~x` or `~('a'|'b')`. Children as for `Set`.
    NotSet,
    /// Lexer `[a-z]`; the token text holds the brackets.
    CharSet,
    Wildcard,
    /// Rule reference. `precedence` is set on references to left-recursive rules.
    RuleRef {
        precedence: Option<i32>,
        args: Option<String>,
    },
    Action,
    /// `{...}?`. `precedence` marks the predicates injected by left-recursion rewriting.
    Predicate { precedence: Option<i32> },
}

impl NodeKind {
    pub fn is_ebnf(&self) -> bool {
        matches!(
            self,
            NodeKind::Optional { .. } | NodeKind::Star { .. } | NodeKind::Plus { .. }
        )
    }

    pub fn greedy(&self) -> bool {
        match self {
            NodeKind::Optional { greedy } | NodeKind::Star { greedy } | NodeKind::Plus { greedy } => {
                *greedy
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub range: TextRange,
}

/// `x=e` or `xs+=e`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementLabel {
    pub name: String,
    pub list: bool,
}

#[derive(Debug, Clone)]
pub struct AstNode {
    pub kind: NodeKind,
    pub token: Token,
    pub children: Vec<NodeId>,
    pub label: Option<ElementLabel>,
    /// Set by the ATN builder on every node that matches or decides.
    pub atn_state: Option<StateId>,
}

impl AstNode {
    pub fn text(&self) -> &str {
        &self.token.text
    }

    pub fn range(&self) -> TextRange {
        self.token.range
    }

    pub fn is_literal(&self) -> bool {
        self.kind == NodeKind::Terminal && self.token.text.starts_with('\'')
    }

    pub fn is_token_ref(&self) -> bool {
        self.kind == NodeKind::Terminal && !self.token.text.starts_with('\'')
    }

    pub fn alt_label(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Alt { label, .. } => label.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GrammarAst {
    nodes: Vec<AstNode>,
}

impl GrammarAst {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: NodeKind, text: impl Into<String>, range: TextRange) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(AstNode {
            kind,
            token: Token {
                text: text.into(),
                range,
            },
            children: Vec::new(),
            label: None,
            atn_state: None,
        });
        id
    }

    pub fn add_with_children(
        &mut self,
        kind: NodeKind,
        text: impl Into<String>,
        range: TextRange,
        children: Vec<NodeId>,
    ) -> NodeId {
        let id = self.add(kind, text, range);
        self.nodes[id as usize].children = children;
        id
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id as usize]
    }

    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id as usize].children
    }

    /// Preorder walk of `root` and everything below it.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            for &child in self.children(id).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Deep copy of `root` from another arena into this one.
    pub fn import_subtree(&mut self, other: &GrammarAst, root: NodeId) -> NodeId {
        let src = other.node(root);
        let children: Vec<NodeId> = src
            .children
            .iter()
            .map(|&c| self.import_subtree(other, c))
            .collect();
        let id = self.nodes.len() as NodeId;
        self.nodes.push(AstNode {
            kind: src.kind.clone(),
            token: src.token.clone(),
            children,
            label: src.label.clone(),
            atn_state: None,
        });
        id
    }

    /// Deep copy of `root` within this arena.
    pub fn duplicate(&mut self, root: NodeId) -> NodeId {
        let children: Vec<NodeId> = self
            .children(root)
            .to_vec()
            .into_iter()
            .map(|c| self.duplicate(c))
            .collect();
        let src = self.node(root);
        let copy = AstNode {
            kind: src.kind.clone(),
            token: src.token.clone(),
            children,
            label: src.label.clone(),
            atn_state: None,
        };
        let id = self.nodes.len() as NodeId;
        self.nodes.push(copy);
        id
    }

    /// Clear every ATN stamp, so the ATN can be rebuilt after a rewrite.
    pub fn clear_atn_states(&mut self) {
        for node in &mut self.nodes {
            node.atn_state = None;
        }
    }

    /// Render a subtree in grammar notation, e.g. `(e '*' e<p=3>)`.
    pub fn render(&self, id: NodeId) -> String {
        let node = self.node(id);
        let mut s = String::new();
        if let Some(label) = &node.label {
            s.push_str(&label.name);
            s.push_str(if label.list { "+=" } else { "=" });
        }
        match &node.kind {
            NodeKind::Block => {
                let alts: Vec<String> = node.children.iter().map(|&a| self.render(a)).collect();
                s.push('(');
                s.push_str(&alts.join(" | "));
                s.push(')');
            }
            NodeKind::Alt { label, assoc } => {
                if *assoc == Assoc::Right {
                    s.push_str("<assoc=right> ");
                }
                let elems: Vec<String> = node.children.iter().map(|&e| self.render(e)).collect();
                s.push_str(&elems.join(" "));
                if let Some(label) = label {
                    s.push_str(" #");
                    s.push_str(label);
                }
            }
            NodeKind::Optional { greedy } | NodeKind::Star { greedy } | NodeKind::Plus { greedy } => {
                s.push_str(&self.render(node.children[0]));
                s.push(match node.kind {
                    NodeKind::Optional { .. } => '?',
                    NodeKind::Star { .. } => '*',
                    _ => '+',
                });
                if !greedy {
                    s.push('?');
                }
            }
            NodeKind::Terminal | NodeKind::CharSet | NodeKind::Wildcard => s.push_str(node.text()),
            NodeKind::Range => {
                s.push_str(self.node(node.children[0]).text());
                s.push_str("..");
                s.push_str(self.node(node.children[1]).text());
            }
            NodeKind::Set | NodeKind::NotSet => {
                if node.kind == NodeKind::NotSet {
                    s.push('~');
                }
                let elems: Vec<String> = node.children.iter().map(|&e| self.render(e)).collect();
                if elems.len() == 1 {
                    s.push_str(&elems[0]);
                } else {
                    s.push('(');
                    s.push_str(&elems.join(" | "));
                    s.push(')');
                }
            }
            NodeKind::RuleRef { precedence, args } => {
                s.push_str(node.text());
                if let Some(args) = args {
                    s.push('[');
                    s.push_str(args);
                    s.push(']');
                }
                if let Some(p) = precedence {
                    s.push_str(&format!("<p={p}>"));
                }
            }
            NodeKind::Action => {
                s.push('{');
                s.push_str(node.text());
                s.push('}');
            }
            NodeKind::Predicate { .. } => {
                s.push('{');
                s.push_str(node.text());
                s.push_str("}?");
            }
        }
        s
    }
}
