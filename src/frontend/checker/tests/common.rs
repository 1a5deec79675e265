//! Shared fixtures: hand-built AST fragments with dummy spans.

use crate::common::ast::*;
use crate::common::span::{Span, Spanned};

pub fn sp<T>(value: T) -> Spanned<T> {
    (value, Span::new(0, 0))
}

pub fn ident_name(name: &str) -> Spanned<String> {
    sp(name.to_string())
}

pub fn var_decl(name: &str, ty: TypeExpr) -> Spanned<VarDecl> {
    sp(VarDecl {
        name: ident_name(name),
        ty: sp(ty),
    })
}

pub fn block(decls: Vec<Spanned<VarDecl>>, stmts: Vec<Spanned<Stmt>>) -> Block {
    Block { decls, stmts }
}

pub fn fn_decl(
    name: &str,
    return_ty: TypeExpr,
    formals: Vec<Spanned<VarDecl>>,
    body: Block,
) -> FnDecl {
    FnDecl {
        name: ident_name(name),
        return_ty: sp(return_ty),
        formals,
        body: Some(body),
    }
}

pub fn proto(name: &str, return_ty: TypeExpr, formals: Vec<Spanned<VarDecl>>) -> Spanned<FnDecl> {
    sp(FnDecl {
        name: ident_name(name),
        return_ty: sp(return_ty),
        formals,
        body: None,
    })
}

/// `void main() { ...stmts }`
pub fn main_fn(stmts: Vec<Spanned<Stmt>>) -> Spanned<Decl> {
    sp(Decl::Fn(fn_decl(
        "main",
        TypeExpr::Void,
        vec![],
        block(vec![], stmts),
    )))
}

pub fn program(decls: Vec<Spanned<Decl>>) -> Program {
    Program { decls }
}

/// A program with an empty `main` appended, so entry-point checking stays
/// quiet in tests about other rules.
pub fn program_with_main(mut decls: Vec<Spanned<Decl>>) -> Program {
    decls.push(main_fn(vec![]));
    program(decls)
}

pub fn class_decl(
    name: &str,
    extends: Option<&str>,
    implements: Vec<&str>,
    members: Vec<Spanned<Member>>,
) -> Spanned<Decl> {
    sp(Decl::Class(ClassDecl {
        name: ident_name(name),
        extends: extends.map(ident_name),
        implements: implements.into_iter().map(ident_name).collect(),
        members,
    }))
}

pub fn field(name: &str, ty: TypeExpr) -> Spanned<Member> {
    sp(Member::Field(VarDecl {
        name: ident_name(name),
        ty: sp(ty),
    }))
}

pub fn method(
    name: &str,
    return_ty: TypeExpr,
    formals: Vec<Spanned<VarDecl>>,
    body: Block,
) -> Spanned<Member> {
    sp(Member::Method(fn_decl(name, return_ty, formals, body)))
}

pub fn interface_decl(name: &str, members: Vec<Spanned<FnDecl>>) -> Spanned<Decl> {
    sp(Decl::Interface(InterfaceDecl {
        name: ident_name(name),
        members,
    }))
}

// ----------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------

pub fn int(value: i32) -> Spanned<Expr> {
    sp(Expr::IntLit(value))
}

pub fn boolean(value: bool) -> Spanned<Expr> {
    sp(Expr::BoolLit(value))
}

pub fn string(value: &str) -> Spanned<Expr> {
    sp(Expr::StringLit(value.to_string()))
}

/// An unqualified name use.
pub fn ident(name: &str) -> Spanned<Expr> {
    sp(Expr::FieldAccess {
        base: None,
        field: ident_name(name),
    })
}

pub fn field_of(base: Spanned<Expr>, name: &str) -> Spanned<Expr> {
    sp(Expr::FieldAccess {
        base: Some(Box::new(base)),
        field: ident_name(name),
    })
}

pub fn binary(op: BinOp, lhs: Spanned<Expr>, rhs: Spanned<Expr>) -> Spanned<Expr> {
    sp(Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub fn assign(lhs: Spanned<Expr>, rhs: Spanned<Expr>) -> Spanned<Expr> {
    sp(Expr::Assign {
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub fn call(name: &str, args: Vec<Spanned<Expr>>) -> Spanned<Expr> {
    sp(Expr::Call {
        base: None,
        method: ident_name(name),
        args,
    })
}

pub fn method_call(base: Spanned<Expr>, name: &str, args: Vec<Spanned<Expr>>) -> Spanned<Expr> {
    sp(Expr::Call {
        base: Some(Box::new(base)),
        method: ident_name(name),
        args,
    })
}

pub fn index(base: Spanned<Expr>, idx: Spanned<Expr>) -> Spanned<Expr> {
    sp(Expr::Index {
        base: Box::new(base),
        index: Box::new(idx),
    })
}

pub fn new_object(class: &str) -> Spanned<Expr> {
    sp(Expr::New {
        class: ident_name(class),
    })
}

pub fn new_array(size: Spanned<Expr>, elem_ty: TypeExpr) -> Spanned<Expr> {
    sp(Expr::NewArray {
        size: Box::new(size),
        elem_ty: sp(elem_ty),
    })
}

// ----------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------

pub fn expr_stmt(expr: Spanned<Expr>) -> Spanned<Stmt> {
    sp(Stmt::Expr(expr))
}

pub fn return_stmt(expr: Option<Spanned<Expr>>) -> Spanned<Stmt> {
    sp(Stmt::Return(expr))
}

pub fn print_stmt(args: Vec<Spanned<Expr>>) -> Spanned<Stmt> {
    sp(Stmt::Print(args))
}

pub fn while_stmt(cond: Spanned<Expr>, body: Spanned<Stmt>) -> Spanned<Stmt> {
    sp(Stmt::While {
        cond,
        body: Box::new(body),
    })
}

pub fn if_stmt(
    cond: Spanned<Expr>,
    then_body: Spanned<Stmt>,
    else_body: Option<Spanned<Stmt>>,
) -> Spanned<Stmt> {
    sp(Stmt::If {
        cond,
        then_body: Box::new(then_body),
        else_body: else_body.map(Box::new),
    })
}

pub fn block_stmt(decls: Vec<Spanned<VarDecl>>, stmts: Vec<Spanned<Stmt>>) -> Spanned<Stmt> {
    sp(Stmt::Block(block(decls, stmts)))
}
