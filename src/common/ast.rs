use super::span::Spanned;
use std::fmt;

// Binary operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    NotEq,
    And,
    Or,
}

impl BinOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod
        )
    }

    pub fn is_relational(self) -> bool {
        matches!(self, BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::NotEq)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tok = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Lt => "<",
            BinOp::Lte => "<=",
            BinOp::Gt => ">",
            BinOp::Gte => ">=",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        write!(f, "{}", tok)
    }
}

// Unary operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

// Type expressions as written in the source
#[derive(Clone, Debug)]
pub enum TypeExpr {
    Int,
    Double,
    Bool,
    String,
    Void,
    Named(String),
    Array(Box<Spanned<TypeExpr>>),
}

// Expression nodes
#[derive(Clone, Debug)]
pub enum Expr {
    /// Placeholder left behind by parser error recovery
    Error,
    IntLit(i32),
    DoubleLit(f64),
    BoolLit(bool),
    StringLit(String),
    Null,
    This,
    ReadInteger,
    ReadLine,
    Unary {
        op: UnaryOp,
        operand: Box<Spanned<Self>>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Spanned<Self>>,
        rhs: Box<Spanned<Self>>,
    },
    Assign {
        lhs: Box<Spanned<Self>>,
        rhs: Box<Spanned<Self>>,
    },
    /// Field access; a missing base means an unqualified name that may
    /// resolve to a local, a global, or a field of the implicit `this`.
    FieldAccess {
        base: Option<Box<Spanned<Self>>>,
        field: Spanned<String>,
    },
    /// Call; a missing base means an unqualified call that may resolve to a
    /// free function or a method of the implicit `this`.
    Call {
        base: Option<Box<Spanned<Self>>>,
        method: Spanned<String>,
        args: Vec<Spanned<Self>>,
    },
    Index {
        base: Box<Spanned<Self>>,
        index: Box<Spanned<Self>>,
    },
    New {
        class: Spanned<String>,
    },
    NewArray {
        size: Box<Spanned<Self>>,
        elem_ty: Spanned<TypeExpr>,
    },
}

// Statement nodes
#[derive(Clone, Debug)]
pub enum Stmt {
    Block(Block),
    If {
        cond: Spanned<Expr>,
        then_body: Box<Spanned<Self>>,
        else_body: Option<Box<Spanned<Self>>>,
    },
    While {
        cond: Spanned<Expr>,
        body: Box<Spanned<Self>>,
    },
    For {
        init: Option<Spanned<Expr>>,
        cond: Spanned<Expr>,
        step: Option<Spanned<Expr>>,
        body: Box<Spanned<Self>>,
    },
    Break,
    Return(Option<Spanned<Expr>>),
    Print(Vec<Spanned<Expr>>),
    Expr(Spanned<Expr>),
}

/// A brace-delimited block: variable declarations first, then statements.
#[derive(Clone, Debug)]
pub struct Block {
    pub decls: Vec<Spanned<VarDecl>>,
    pub stmts: Vec<Spanned<Stmt>>,
}

#[derive(Clone, Debug)]
pub struct VarDecl {
    pub name: Spanned<String>,
    pub ty: Spanned<TypeExpr>,
}

#[derive(Clone, Debug)]
pub struct FnDecl {
    pub name: Spanned<String>,
    pub return_ty: Spanned<TypeExpr>,
    pub formals: Vec<Spanned<VarDecl>>,
    /// Absent for interface prototypes
    pub body: Option<Block>,
}

// Class members
#[derive(Clone, Debug)]
pub enum Member {
    Field(VarDecl),
    Method(FnDecl),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Field(var) => &var.name.0,
            Member::Method(func) => &func.name.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClassDecl {
    pub name: Spanned<String>,
    pub extends: Option<Spanned<String>>,
    pub implements: Vec<Spanned<String>>,
    pub members: Vec<Spanned<Member>>,
}

#[derive(Clone, Debug)]
pub struct InterfaceDecl {
    pub name: Spanned<String>,
    pub members: Vec<Spanned<FnDecl>>,
}

// Top-level declarations
#[derive(Clone, Debug)]
pub enum Decl {
    Var(VarDecl),
    Fn(FnDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Var(var) => &var.name.0,
            Decl::Fn(func) => &func.name.0,
            Decl::Class(class) => &class.name.0,
            Decl::Interface(iface) => &iface.name.0,
        }
    }
}

// Program
#[derive(Clone, Debug)]
pub struct Program {
    pub decls: Vec<Spanned<Decl>>,
}
