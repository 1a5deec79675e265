//! Typed AST produced by the checker and consumed by the backend.
//!
//! Every expression carries the type the checker computed for it, and name
//! resolution results are embedded where the backend needs them: field
//! accesses carry their word offset, method calls their vtable slot offset,
//! function calls their code label, and `new` its instance size. Lowering
//! never consults the symbol tables again.

use super::ast::BinOp;
use super::span::Spanned;
use super::types::Type;

#[derive(Clone, Debug)]
pub struct TProgram {
    /// Top-level declarations in source order; lowering walks them in order,
    /// which fixes global slot offsets and the output order of functions and
    /// vtables.
    pub decls: Vec<TDecl>,
}

#[derive(Clone, Debug)]
pub enum TDecl {
    Global(TGlobal),
    Class(TClass),
    Function(TFunction),
}

#[derive(Clone, Debug)]
pub struct TGlobal {
    pub name: String,
    pub ty: Type,
}

#[derive(Clone, Debug)]
pub struct TClass {
    pub name: String,
    /// One word for the vtable pointer, then base fields, then own fields
    pub instance_size: i32,
    /// Method code labels in vtable slot order
    pub vtable: Vec<String>,
    pub methods: Vec<TFunction>,
}

#[derive(Clone, Debug)]
pub struct TFunction {
    pub name: String,
    /// `_<name>` for free functions (bare `main` for the entry point),
    /// `_<Class>.<method>` for methods
    pub label: String,
    pub is_method: bool,
    pub return_ty: Type,
    pub params: Vec<TParam>,
    pub body: Option<TBlock>,
}

#[derive(Clone, Debug)]
pub struct TParam {
    pub name: String,
    pub ty: Type,
}

#[derive(Clone, Debug)]
pub struct TBlock {
    pub decls: Vec<TLocal>,
    pub stmts: Vec<Spanned<TStmt>>,
}

#[derive(Clone, Debug)]
pub struct TLocal {
    pub name: String,
    pub ty: Type,
}

#[derive(Clone, Debug)]
pub enum TStmt {
    Block(TBlock),
    If {
        cond: Spanned<TExpr>,
        then_body: Box<Spanned<TStmt>>,
        else_body: Option<Box<Spanned<TStmt>>>,
    },
    While {
        cond: Spanned<TExpr>,
        body: Box<Spanned<TStmt>>,
    },
    For {
        init: Option<Spanned<TExpr>>,
        cond: Spanned<TExpr>,
        step: Option<Spanned<TExpr>>,
        body: Box<Spanned<TStmt>>,
    },
    Break,
    Return(Option<Spanned<TExpr>>),
    Print(Vec<Spanned<TExpr>>),
    Expr(Spanned<TExpr>),
}

#[derive(Clone, Debug)]
pub enum TExpr {
    /// Poisoned subtree; never reaches the backend because emission is gated
    /// on zero diagnostics
    Error,
    IntConst {
        value: i32,
    },
    DoubleConst {
        value: f64,
    },
    BoolConst {
        value: bool,
    },
    StringConst {
        value: String,
    },
    NullConst,
    ReadInteger,
    ReadLine,
    This {
        ty: Type,
    },
    /// Arithmetic; a missing lhs is unary minus (lowered as `0 - rhs`)
    Arith {
        op: BinOp,
        lhs: Option<Box<Spanned<TExpr>>>,
        rhs: Box<Spanned<TExpr>>,
        ty: Type,
    },
    Relational {
        op: BinOp,
        lhs: Box<Spanned<TExpr>>,
        rhs: Box<Spanned<TExpr>>,
    },
    Equality {
        op: BinOp,
        lhs: Box<Spanned<TExpr>>,
        rhs: Box<Spanned<TExpr>>,
        /// String operands compare through the `_StringEqual` builtin
        string_eq: bool,
    },
    Logical {
        op: BinOp,
        lhs: Box<Spanned<TExpr>>,
        rhs: Box<Spanned<TExpr>>,
    },
    /// Logical negation (lowered as `operand == 0`)
    Not {
        operand: Box<Spanned<TExpr>>,
    },
    Assign {
        lhs: Box<Spanned<TExpr>>,
        rhs: Box<Spanned<TExpr>>,
        ty: Type,
    },
    /// A name resolved to a materialized slot: parameter, local, or global
    Var {
        name: String,
        ty: Type,
    },
    /// A name resolved to an instance field; a missing base is the implicit
    /// `this`
    Field {
        base: Option<Box<Spanned<TExpr>>>,
        name: String,
        offset: i32,
        ty: Type,
    },
    Index {
        base: Box<Spanned<TExpr>>,
        index: Box<Spanned<TExpr>>,
        ty: Type,
    },
    FnCall {
        label: String,
        args: Vec<Spanned<TExpr>>,
        ty: Type,
    },
    MethodCall {
        base: Option<Box<Spanned<TExpr>>>,
        method: String,
        vtable_offset: i32,
        args: Vec<Spanned<TExpr>>,
        ty: Type,
    },
    /// The builtin `length()` call on an array receiver
    ArrayLength {
        base: Box<Spanned<TExpr>>,
    },
    New {
        class: String,
        size: i32,
    },
    NewArray {
        size: Box<Spanned<TExpr>>,
        ty: Type,
    },
}

impl TExpr {
    /// The type the checker computed for this expression.
    pub fn ty(&self) -> Type {
        match self {
            TExpr::Error => Type::Error,
            TExpr::IntConst { .. } => Type::Int,
            TExpr::DoubleConst { .. } => Type::Double,
            TExpr::BoolConst { .. } => Type::Bool,
            TExpr::StringConst { .. } => Type::String,
            TExpr::NullConst => Type::Null,
            TExpr::ReadInteger => Type::Int,
            TExpr::ReadLine => Type::String,
            TExpr::This { ty } => ty.clone(),
            TExpr::Arith { ty, .. } => ty.clone(),
            TExpr::Relational { .. } => Type::Bool,
            TExpr::Equality { .. } => Type::Bool,
            TExpr::Logical { .. } => Type::Bool,
            TExpr::Not { .. } => Type::Bool,
            TExpr::Assign { ty, .. } => ty.clone(),
            TExpr::Var { ty, .. } => ty.clone(),
            TExpr::Field { ty, .. } => ty.clone(),
            TExpr::Index { ty, .. } => ty.clone(),
            TExpr::FnCall { ty, .. } => ty.clone(),
            TExpr::MethodCall { ty, .. } => ty.clone(),
            TExpr::ArrayLength { .. } => Type::Int,
            TExpr::New { class, .. } => Type::named(class.clone()),
            TExpr::NewArray { ty, .. } => ty.clone(),
        }
    }
}
