// Source tree data structures for srcequiv.
// These types represent a parsed source file in a form suitable for structural comparison.

use serde::Serialize;
use std::fmt;

/// How the children of a node kind are aligned during comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOrder {
    /// No children; compared by value.
    Leaf,
    /// Children are compared position by position.
    Ordered,
    /// Children may be permuted without changing meaning.
    Unordered,
}

/// Syntactic construct carried by a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    // Containers
    File,
    Items,
    Members,
    Modifiers,
    WhereClause,

    // Declarations
    Module,
    Struct,
    Enum,
    Union,
    Trait,
    Impl,
    Function,
    Const,
    Static,
    TypeAlias,
    NamedFields,
    TupleFields,
    Field,
    Variants,
    Variant,
    Generics,
    Parameters,
    Parameter,
    ReturnType,

    // Statements
    Block,
    Let,
    Statement,

    // Expressions
    Call,
    MethodCall,
    Arguments,
    Binary,
    Unary,
    FieldAccess,
    Return,
    If,
    While,
    ForLoop,
    Loop,
    Match,
    MatchArm,
    Assign,
    Reference,
    Tuple,
    Array,
    Await,
    Try,

    // Leaves
    Identifier,
    Literal,
    Modifier,
    TypeRef,
    Operator,
    Pattern,
    Use,
    Verbatim,
}

impl NodeKind {
    /// Alignment policy for this kind's children.
    pub const fn child_order(self) -> ChildOrder {
        use NodeKind::*;
        match self {
            Identifier | Literal | Modifier | TypeRef | Operator | Pattern | Use | Verbatim => {
                ChildOrder::Leaf
            }
            File | Items | Members | NamedFields | Modifiers | WhereClause => ChildOrder::Unordered,
            Module | Struct | Enum | Union | Trait | Impl | Function | Const | Static
            | TypeAlias | TupleFields | Field | Variants | Variant | Generics | Parameters
            | Parameter | ReturnType | Block | Let | Statement | Call | MethodCall | Arguments
            | Binary | Unary | FieldAccess | Return | If | While | ForLoop | Loop | Match
            | MatchArm | Assign | Reference | Tuple | Array | Await | Try => ChildOrder::Ordered,
        }
    }

    pub const fn is_leaf(self) -> bool {
        matches!(self.child_order(), ChildOrder::Leaf)
    }

    /// Whether nodes of this kind are named by an `Identifier` child.
    const fn is_named_declaration(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            Module | Struct | Enum | Union | Trait | Function | Const | Static | TypeAlias
                | Field | Variant
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Line/column range of a node in its originating text.
///
/// Lines are 1-based, columns are 0-based and counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceSpan {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourceSpan {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// The text covered by this span, or `None` if it lies outside `text`.
    pub fn slice<'t>(&self, text: &'t str) -> Option<&'t str> {
        let start = byte_offset(text, self.start_line, self.start_column)?;
        let end = byte_offset(text, self.end_line, self.end_column)?;
        text.get(start..end)
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

fn byte_offset(text: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let mut line_start = 0;
    for (index, segment) in text.split('\n').enumerate() {
        if index + 1 == line {
            if column == 0 {
                return Some(line_start);
            }
            // Column equal to the char count addresses the end of the line.
            return match segment.char_indices().nth(column) {
                Some((offset, _)) => Some(line_start + offset),
                None if segment.chars().count() == column => Some(line_start + segment.len()),
                None => None,
            };
        }
        line_start += segment.len() + 1;
    }
    None
}

/// A node in the source tree.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<SourceSpan>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl Node {
    pub fn leaf(kind: NodeKind, value: impl Into<String>, span: Option<SourceSpan>) -> Self {
        debug_assert!(kind.is_leaf(), "{kind} is not a leaf kind");
        Self {
            kind,
            value: Some(value.into()),
            span,
            children: Vec::new(),
        }
    }

    pub fn branch(kind: NodeKind, children: Vec<Node>, span: Option<SourceSpan>) -> Self {
        debug_assert!(!kind.is_leaf(), "{kind} is a leaf kind");
        Self {
            kind,
            value: None,
            span,
            children,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn span(&self) -> Option<SourceSpan> {
        self.span
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Name used to pair up differing siblings and to label paths.
    ///
    /// Declarations are identified by their name; an `impl` by its trait
    /// and self type. Everything else has no identity.
    pub fn identity(&self) -> Option<String> {
        if self.kind.is_named_declaration() {
            return self
                .children
                .iter()
                .find(|child| child.kind == NodeKind::Identifier)
                .and_then(|child| child.value.clone());
        }
        if self.kind == NodeKind::Impl {
            let types: Vec<&str> = self
                .children
                .iter()
                .filter(|child| child.kind == NodeKind::TypeRef)
                .filter_map(|child| child.value())
                .collect();
            if !types.is_empty() {
                return Some(types.join(" for "));
            }
        }
        None
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Node::size).sum::<usize>()
    }

    /// One-line description: kind plus identity or value.
    pub fn label(&self) -> String {
        match (self.identity(), self.value()) {
            (Some(name), _) => format!("{} {}", self.kind, name),
            (None, Some(value)) => format!("{} `{}`", self.kind, value),
            (None, None) => self.kind.to_string(),
        }
    }
}

/// Immutable parsed representation of one source artifact.
#[derive(Debug, Clone)]
pub struct SourceTree {
    name: String,
    text: String,
    root: Node,
}

impl SourceTree {
    pub fn new(name: impl Into<String>, text: impl Into<String>, root: Node) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            root,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Source text of a node belonging to this tree.
    pub fn text_of(&self, node: &Node) -> Option<&str> {
        node.span().and_then(|span| span.slice(&self.text))
    }
}
