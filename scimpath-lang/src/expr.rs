//! The hybrid list/tree expression node: a path segment's `next` link
//! threads a linked list, while a filter attached to a segment is itself the
//! root of an operator tree occupying that same list slot.

use std::fmt;

/// What kind of token a node carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Path,
    LogicalOp,
    RelationalOp,
    Literal,
    /// Appears only transiently on the filter compiler's operator stack;
    /// never survives into a finished tree.
    Paren,
}

/// `and` / `or` / `not`. `not` is unary and right-associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "and" => Some(LogicalOp::And),
            "or" => Some(LogicalOp::Or),
            "not" => Some(LogicalOp::Not),
            _ => None,
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, LogicalOp::Not)
    }
}

/// `eq`/`ne`/`sw`/`ew`/`co`/`gt`/`ge`/`lt`/`le`/`pr`, of which only `pr` is unary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Eq,
    Ne,
    Sw,
    Ew,
    Co,
    Gt,
    Ge,
    Lt,
    Le,
    Pr,
}

impl RelationalOp {
    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "eq" => Some(RelationalOp::Eq),
            "ne" => Some(RelationalOp::Ne),
            "sw" => Some(RelationalOp::Sw),
            "ew" => Some(RelationalOp::Ew),
            "co" => Some(RelationalOp::Co),
            "gt" => Some(RelationalOp::Gt),
            "ge" => Some(RelationalOp::Ge),
            "lt" => Some(RelationalOp::Lt),
            "le" => Some(RelationalOp::Le),
            "pr" => Some(RelationalOp::Pr),
            _ => None,
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, RelationalOp::Pr)
    }
}

/// An operator's precedence in the shunting-yard compiler: relational
/// operators bind tighter than logical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpKind {
    Logical(LogicalOp),
    Relational(RelationalOp),
}

impl OpKind {
    pub(crate) fn precedence(self) -> u8 {
        match self {
            OpKind::Relational(_) => 100,
            OpKind::Logical(_) => 50,
        }
    }

    pub(crate) fn is_unary(self) -> bool {
        match self {
            OpKind::Logical(op) => op.is_unary(),
            OpKind::Relational(op) => op.is_unary(),
        }
    }

    /// `not` is right-associative; every other operator is left-associative.
    pub(crate) fn is_right_associative(self) -> bool {
        matches!(self, OpKind::Logical(LogicalOp::Not))
    }
}

/// A node of the hybrid path-list / filter-tree structure.
///
/// Invariants:
/// - A path node participates in the `next` chain, and may double as the
///   `left` child of a relational operator when the segment carries a
///   filter.
/// - An operator that is also reachable via `next` is, by construction, the
///   root of a filter attached to the preceding segment.
/// - A literal node is always a leaf (`left`/`right` both `None`).
/// - A paren node never appears here, only on the compiler's operator
///   stack.
/// - Binary operators have both `left` and `right` populated; unary
///   operators (`not`, `pr`) have only `left`.
#[derive(Debug, Clone)]
pub struct Expr {
    pub token: String,
    pub tag: Tag,
    pub next: Option<Box<Expr>>,
    pub left: Option<Box<Expr>>,
    pub right: Option<Box<Expr>>,
}

impl Expr {
    pub fn path(token: impl Into<String>) -> Self {
        Expr {
            token: token.into(),
            tag: Tag::Path,
            next: None,
            left: None,
            right: None,
        }
    }

    pub fn literal(token: impl Into<String>) -> Self {
        Expr {
            token: token.into(),
            tag: Tag::Literal,
            next: None,
            left: None,
            right: None,
        }
    }

    /// Constructs a paren marker for the compiler's operator stack; not a
    /// valid node in a finished tree.
    pub(crate) fn paren(token: impl Into<String>) -> Self {
        Expr {
            token: token.into(),
            tag: Tag::Paren,
            next: None,
            left: None,
            right: None,
        }
    }

    /// Constructs a logical or relational operator node. Returns `None` for
    /// any token that is not one of the recognised keywords.
    pub fn operator(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let tag = if LogicalOp::from_token(&token).is_some() {
            Tag::LogicalOp
        } else if RelationalOp::from_token(&token).is_some() {
            Tag::RelationalOp
        } else {
            return None;
        };
        Some(Expr {
            token,
            tag,
            next: None,
            left: None,
            right: None,
        })
    }

    pub fn is_path(&self) -> bool {
        matches!(self.tag, Tag::Path)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.tag, Tag::Literal)
    }

    pub fn is_paren(&self) -> bool {
        matches!(self.tag, Tag::Paren)
    }

    pub fn is_logical_op(&self) -> bool {
        matches!(self.tag, Tag::LogicalOp)
    }

    pub fn is_relational_op(&self) -> bool {
        matches!(self.tag, Tag::RelationalOp)
    }

    pub fn is_operator(&self) -> bool {
        self.is_logical_op() || self.is_relational_op()
    }

    /// An operator node that also sits on a `next` chain is, by
    /// construction, the root of a filter attached to the preceding path
    /// segment.
    pub fn is_filter_root(&self) -> bool {
        self.is_operator() && self.left.is_some()
    }

    pub(crate) fn op_kind(&self) -> Option<OpKind> {
        if let Some(op) = LogicalOp::from_token(&self.token) {
            Some(OpKind::Logical(op))
        } else if let Some(op) = RelationalOp::from_token(&self.token) {
            Some(OpKind::Relational(op))
        } else {
            None
        }
    }

    pub fn is_unary(&self) -> bool {
        self.op_kind().is_some_and(OpKind::is_unary)
    }

    pub fn relational_op(&self) -> Option<RelationalOp> {
        RelationalOp::from_token(&self.token)
    }

    pub fn logical_op(&self) -> Option<LogicalOp> {
        LogicalOp::from_token(&self.token)
    }

    /// Visits this node, then `left`, then `right`, then `next`
    /// (depth-first, list-last). Used only for debugging/tests and to
    /// implement the value-to-filter builder's emission order. `done` fires
    /// when unwinding back through the node whose address equals `marker`.
    ///
    /// Has no termination contract beyond `marker`; cyclic structures must
    /// never be constructed.
    pub fn walk<'a>(&'a self, cb: &mut dyn FnMut(&'a Expr), marker: *const Expr, done: &mut dyn FnMut()) {
        cb(self);
        if let Some(left) = &self.left {
            left.walk(cb, marker, done);
        }
        if let Some(right) = &self.right {
            right.walk(cb, marker, done);
        }
        if let Some(next) = &self.next {
            next.walk(cb, marker, done);
        }
        if std::ptr::eq(self, marker) {
            done();
        }
    }

    /// Renders this node back to source-like text: path segments joined by
    /// `.`, with any attached filter rendered in `[...]`. Filter
    /// sub-expressions are rendered fully parenthesised so that re-parsing
    /// the output always reproduces a structurally equal tree, regardless of
    /// operator precedence.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_path_chain(&mut out);
        out
    }

    fn render_path_chain(&self, out: &mut String) {
        match self.tag {
            Tag::Path => {
                out.push_str(&self.token);
                if let Some(next) = &self.next {
                    if next.is_filter_root() {
                        out.push('[');
                        next.render_filter(out);
                        out.push(']');
                        if let Some(after) = &next.next {
                            out.push('.');
                            after.render_path_chain(out);
                        }
                    } else {
                        out.push('.');
                        next.render_path_chain(out);
                    }
                }
            }
            _ if self.is_filter_root() => {
                out.push('[');
                self.render_filter(out);
                out.push(']');
                if let Some(next) = &self.next {
                    out.push('.');
                    next.render_path_chain(out);
                }
            }
            _ => self.render_filter(out),
        }
    }

    fn render_filter(&self, out: &mut String) {
        match self.tag {
            Tag::Path => self.render_path_chain(out),
            Tag::Literal => out.push_str(&self.token),
            Tag::RelationalOp => {
                if let Some(left) = &self.left {
                    left.render_filter(out);
                }
                out.push(' ');
                out.push_str(&self.token);
                if let Some(right) = &self.right {
                    out.push(' ');
                    right.render_filter(out);
                }
            }
            Tag::LogicalOp if self.is_unary() => {
                out.push_str(&self.token);
                out.push_str(" (");
                if let Some(left) = &self.left {
                    left.render_filter(out);
                }
                out.push(')');
            }
            Tag::LogicalOp => {
                out.push('(');
                if let Some(left) = &self.left {
                    left.render_filter(out);
                }
                out.push_str(") ");
                out.push_str(&self.token);
                out.push_str(" (");
                if let Some(right) = &self.right {
                    right.render_filter(out);
                }
                out.push(')');
            }
            Tag::Paren => {}
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
