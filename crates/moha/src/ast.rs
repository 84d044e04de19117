//! Concrete syntax tree for moha.
//!
//! Nodes are tagged-variant sum types (`Expr`, `Stmt`) plus a single
//! compilation function (`bytecode::compiler`) that dispatches on the tag,
//! keeping node data owned by plain `Vec`/`Box` rather than a class
//! hierarchy with a virtual `compile` method per node kind.

/// A `(line, column)` source position, reused for both parse errors and
/// (optionally) future runtime diagnostics.
pub type Span = crate::error::CodeLoc;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    LShift,
    RShift,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A key in an object literal: either a bare identifier (`{x: 1}`) or a
/// string literal (`{"x": 1}`) — both compile to a constant string key.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKey {
    Ident(String),
    Str(String),
}

impl ObjectKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ident(s) | Self::Str(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal, Span),
    Identifier(String, Span),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    And(Box<Expr>, Box<Expr>, Span),
    Or(Box<Expr>, Box<Expr>, Span),
    In {
        elem: Box<Expr>,
        pool: Box<Expr>,
        span: Span,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    Attr {
        target: Box<Expr>,
        name: String,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    ArrayLiteral(Vec<Expr>, Span),
    ObjectLiteral(Vec<(ObjectKey, Expr)>, Span),
    /// An anonymous function in expression position (`def(params) { body }`
    /// with no name). Unlike a named `def`, it has no self-reference slot
    /// and is not stored into a variable by the compiler.
    Closure {
        params: Vec<String>,
        body: Vec<Stmt>,
        span: Span,
    },
}

impl Expr {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(_, s)
            | Self::Identifier(_, s)
            | Self::Unary { span: s, .. }
            | Self::Binary { span: s, .. }
            | Self::And(_, _, s)
            | Self::Or(_, _, s)
            | Self::In { span: s, .. }
            | Self::Index { span: s, .. }
            | Self::Attr { span: s, .. }
            | Self::Call { span: s, .. }
            | Self::ArrayLiteral(_, s)
            | Self::ObjectLiteral(_, s)
            | Self::Closure { span: s, .. } => *s,
        }
    }
}

/// The left-hand side of an assignment: a bare variable, or a member access
/// (`obj.attr` or `obj[expr]`) which compiles to `MAP_SETITEM`.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Var(String),
    Member { object: Box<Expr>, key: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Guard {
    pub cond: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Assign {
        target: AssignTarget,
        value: Expr,
        span: Span,
    },
    /// `obj.attr` / `arr[i]` deletion. Not reachable from the surface grammar
    /// (there is no `delete` keyword) but kept as a first-class AST node
    /// and compiler target so `MAP_DELITEM` has a constructible source.
    Delete {
        target: AssignTarget,
        span: Span,
    },
    If {
        guards: Vec<Guard>,
        span: Span,
    },
    Do {
        guards: Vec<Guard>,
        span: Span,
    },
    Def {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
        span: Span,
    },
    Return(Expr, Span),
    Abort(Expr, Span),
    Pass(Span),
    /// `import "path";` — binds a variable named after the path's final
    /// segment to the imported module.
    Import {
        path: String,
        span: Span,
    },
    /// `from "path" import a, b;` — binds each named member directly.
    ImportFrom {
        members: Vec<String>,
        path: String,
        span: Span,
    },
    /// `export a, b;` — a no-op at runtime; kept only so the keyword is
    /// valid, unambiguous surface syntax.
    Export {
        names: Vec<String>,
        span: Span,
    },
}
