//! Semantic checking: declaration collection, inheritance and override
//! rules, class layout, and statement/expression typing.
//!
//! Checking runs in passes over the program:
//!
//! 1. collect — program-scope symbol table and the class/interface registry
//! 2. relations — `extends` resolution and cycle stripping, member conflict
//!    and override rules, interface conformance
//! 3. layout — instance sizes, field offsets, vtables (memoized per class)
//! 4. bodies — statement and expression typing, producing the typed AST
//! 5. entry point — a parameterless top-level `main` must exist
//!
//! Errors go to the [`Diagnostics`] sink and poison the offending subtree's
//! type to `error`; checking always runs to completion.

use crate::common::ast::{
    BinOp, Block, ClassDecl, Decl, Expr, FnDecl, InterfaceDecl, Member, Program, Stmt, TypeExpr,
    UnaryOp,
};
use crate::common::span::{Span, Spanned};
use crate::common::tast::{
    TBlock, TClass, TDecl, TExpr, TFunction, TGlobal, TLocal, TParam, TProgram, TStmt,
};
use crate::common::types::Type;
use crate::frontend::checker::context::{
    ClassInfo, ClassRegistry, Diagnostics, FnSig, InterfaceInfo, ScopeChain, Symbol, SymbolTable,
};
use crate::frontend::checker::error::{LookingFor, SemanticError};

/// Check a program, reporting all errors into `diags` and returning the
/// typed AST. The typed AST is only meaningful for lowering when `diags`
/// stayed empty.
pub fn check_program(program: &Program, diags: &mut Diagnostics) -> TProgram {
    check_program_full(program, diags).0
}

/// As [`check_program`], but also exposing the registry for inspection.
pub fn check_program_full(
    program: &Program,
    diags: &mut Diagnostics,
) -> (TProgram, ClassRegistry) {
    let mut checker = Checker {
        diags,
        globals: SymbolTable::new(),
        registry: ClassRegistry::new(),
    };
    let tprogram = checker.run(program);
    (tprogram, checker.registry)
}

/// Convert a syntactic type expression to a semantic type. Validity of
/// `Named` types is judged at use sites, not here.
fn resolve_type(ty: &TypeExpr) -> Type {
    match ty {
        TypeExpr::Int => Type::Int,
        TypeExpr::Double => Type::Double,
        TypeExpr::Bool => Type::Bool,
        TypeExpr::String => Type::String,
        TypeExpr::Void => Type::Void,
        TypeExpr::Named(name) => Type::named(name.clone()),
        TypeExpr::Array(elem) => Type::array(resolve_type(&elem.0)),
    }
}

/// Code label for a function: `_<name>` for free functions, the bare string
/// `main` for the entry point, `_<Class>.<method>` for methods.
fn fn_label(class: Option<&str>, name: &str) -> String {
    match class {
        Some(class) => format!("_{}.{}", class, name),
        None if name == "main" => name.to_string(),
        None => format!("_{}", name),
    }
}

fn fn_sig(func: &FnDecl, class: Option<&str>) -> FnSig {
    FnSig {
        name: func.name.0.clone(),
        return_ty: resolve_type(&func.return_ty.0),
        formals: func.formals.iter().map(|(v, _)| resolve_type(&v.ty.0)).collect(),
        label: fn_label(class, &func.name.0),
        is_method: class.is_some(),
    }
}

/// Per-function-body checking state.
struct FnCtx {
    class: Option<String>,
    return_ty: Type,
    scopes: ScopeChain,
    loop_depth: usize,
}

struct Checker<'d> {
    diags: &'d mut Diagnostics,
    globals: SymbolTable,
    registry: ClassRegistry,
}

impl<'d> Checker<'d> {
    fn run(&mut self, program: &Program) -> TProgram {
        self.collect(program);
        self.check_relations(program);
        for (decl, _) in &program.decls {
            if let Decl::Class(class) = decl {
                self.registry.assign_layout(&class.name.0);
            }
        }
        let decls = self.check_bodies(program);
        self.check_main(program);
        TProgram { decls }
    }

    // ------------------------------------------------------------------
    // Pass 1: symbol collection
    // ------------------------------------------------------------------

    fn declare_global(&mut self, name: &str, symbol: Symbol, span: Span) {
        if let Err(prev_span) = self.globals.declare(name, symbol, span) {
            self.diags.report(SemanticError::DeclConflict {
                name: name.to_string(),
                span,
                prev_span: Some(prev_span),
            });
        }
    }

    fn collect(&mut self, program: &Program) {
        for (decl, _) in &program.decls {
            match decl {
                Decl::Var(var) => {
                    let ty = resolve_type(&var.ty.0);
                    self.declare_global(&var.name.0, Symbol::Var { ty }, var.name.1);
                }
                Decl::Fn(func) => {
                    let sig = fn_sig(func, None);
                    self.declare_global(&func.name.0, Symbol::Fn(sig), func.name.1);
                }
                Decl::Class(class) => {
                    self.declare_global(&class.name.0, Symbol::Class, class.name.1);
                    let info = self.collect_class(class);
                    self.registry.add_class(info);
                }
                Decl::Interface(iface) => {
                    self.declare_global(&iface.name.0, Symbol::Interface, iface.name.1);
                    let info = self.collect_interface(iface);
                    self.registry.add_interface(info);
                }
            }
        }
    }

    fn collect_class(&mut self, class: &ClassDecl) -> ClassInfo {
        let name = class.name.0.clone();
        let mut info = ClassInfo::new(name.clone(), class.name.1);
        info.extends = class.extends.as_ref().map(|(base, _)| base.clone());
        info.implements = class
            .implements
            .iter()
            .map(|(iface, span)| (iface.clone(), *span))
            .collect();

        for (member, _) in &class.members {
            match member {
                Member::Field(var) => {
                    let ty = resolve_type(&var.ty.0);
                    match info.members.declare(&var.name.0, Symbol::Var { ty }, var.name.1) {
                        Ok(()) => info.field_order.push(var.name.0.clone()),
                        Err(prev_span) => self.diags.report(SemanticError::DeclConflict {
                            name: var.name.0.clone(),
                            span: var.name.1,
                            prev_span: Some(prev_span),
                        }),
                    }
                }
                Member::Method(func) => {
                    let sig = fn_sig(func, Some(&name));
                    match info.members.declare(&func.name.0, Symbol::Fn(sig), func.name.1) {
                        Ok(()) => info.method_order.push(func.name.0.clone()),
                        Err(prev_span) => self.diags.report(SemanticError::DeclConflict {
                            name: func.name.0.clone(),
                            span: func.name.1,
                            prev_span: Some(prev_span),
                        }),
                    }
                }
            }
        }
        info
    }

    fn collect_interface(&mut self, iface: &InterfaceDecl) -> InterfaceInfo {
        let mut info = InterfaceInfo::new(iface.name.0.clone(), iface.name.1);
        for (proto, _) in &iface.members {
            let sig = fn_sig(proto, Some(&iface.name.0));
            match info.members.declare(&proto.name.0, Symbol::Fn(sig), proto.name.1) {
                Ok(()) => info.method_order.push(proto.name.0.clone()),
                Err(prev_span) => self.diags.report(SemanticError::DeclConflict {
                    name: proto.name.0.clone(),
                    span: proto.name.1,
                    prev_span: Some(prev_span),
                }),
            }
        }
        info
    }

    // ------------------------------------------------------------------
    // Pass 2: class relations
    // ------------------------------------------------------------------

    fn check_relations(&mut self, program: &Program) {
        for (decl, _) in &program.decls {
            if let Decl::Class(class) = decl {
                self.check_class_relations(class);
            }
        }
    }

    fn check_class_relations(&mut self, class: &ClassDecl) {
        let name = &class.name.0;

        if let Some((base, base_span)) = &class.extends {
            if self.registry.class(base).is_none() {
                self.diags.report(SemanticError::IdentifierNotDeclared {
                    name: base.clone(),
                    looking_for: LookingFor::Class,
                    span: *base_span,
                });
                self.registry.strip_extends(name);
            } else if self.registry.is_derived_from(base, name) {
                // The base chain leads back here; drop the link so the rest
                // of checking sees an acyclic hierarchy
                self.registry.strip_extends(name);
            }
        }

        for (iface, iface_span) in &class.implements {
            if self.registry.interface(iface).is_none() {
                self.diags.report(SemanticError::IdentifierNotDeclared {
                    name: iface.clone(),
                    looking_for: LookingFor::Interface,
                    span: *iface_span,
                });
            }
        }

        let base = self.registry.class(name).and_then(|info| info.extends.clone());
        for (member, _) in &class.members {
            match member {
                Member::Field(var) => {
                    // A field may not redeclare anything visible in an
                    // ancestor class
                    if let Some(base) = &base {
                        if let Some((_, prev_span)) =
                            self.registry.lookup_member_entry(base, &var.name.0)
                        {
                            let prev_span = *prev_span;
                            self.diags.report(SemanticError::DeclConflict {
                                name: var.name.0.clone(),
                                span: var.name.1,
                                prev_span: Some(prev_span),
                            });
                        }
                    }
                }
                Member::Method(func) => {
                    if let Some(base) = &base {
                        match self.registry.lookup_member_entry(base, &func.name.0) {
                            Some((Symbol::Fn(base_sig), _)) => {
                                let sig = fn_sig(func, Some(name));
                                if !sig.matches(base_sig) {
                                    self.diags.report(SemanticError::OverrideMismatch {
                                        method: func.name.0.clone(),
                                        span: func.name.1,
                                    });
                                }
                            }
                            Some((_, prev_span)) => {
                                let prev_span = *prev_span;
                                self.diags.report(SemanticError::DeclConflict {
                                    name: func.name.0.clone(),
                                    span: func.name.1,
                                    prev_span: Some(prev_span),
                                });
                            }
                            None => {}
                        }
                    }
                }
            }
        }

        self.check_interface_conformance(class);
    }

    fn check_interface_conformance(&mut self, class: &ClassDecl) {
        let name = &class.name.0;
        for (iface_name, _) in &class.implements {
            let Some(iface) = self.registry.interface(iface_name) else {
                continue;
            };
            let mut missing = Vec::new();
            let mut mismatched = Vec::new();
            for method in &iface.method_order {
                let Some(Symbol::Fn(proto)) = iface.members.lookup_local(method) else {
                    continue;
                };
                match self.registry.lookup_member(name, method) {
                    Some(Symbol::Fn(sig)) => {
                        // Labels differ between class and interface; match
                        // on name, return type, and formals only
                        if !(sig.name == proto.name
                            && sig.return_ty.is_equivalent_to(&proto.return_ty)
                            && sig.formals.len() == proto.formals.len()
                            && sig
                                .formals
                                .iter()
                                .zip(&proto.formals)
                                .all(|(a, b)| a.is_equivalent_to(b)))
                        {
                            mismatched.push(method.clone());
                        }
                    }
                    _ => missing.push(method.clone()),
                }
            }
            for method in mismatched {
                self.diags.report(SemanticError::OverrideMismatch {
                    method,
                    span: class.name.1,
                });
            }
            for method in missing {
                self.diags.report(SemanticError::UnimplementedInterfaceMethod {
                    class: name.clone(),
                    interface: iface_name.clone(),
                    method,
                    span: class.name.1,
                });
            }
        }
    }

    // ------------------------------------------------------------------
    // Pass 4: bodies
    // ------------------------------------------------------------------

    fn check_bodies(&mut self, program: &Program) -> Vec<TDecl> {
        let mut decls = Vec::new();
        for (decl, _) in &program.decls {
            match decl {
                Decl::Var(var) => decls.push(TDecl::Global(TGlobal {
                    name: var.name.0.clone(),
                    ty: resolve_type(&var.ty.0),
                })),
                Decl::Fn(func) => {
                    let checked = self.check_function(func, None);
                    decls.push(TDecl::Function(checked));
                }
                Decl::Class(class) => {
                    let checked = self.check_class_bodies(class);
                    decls.push(TDecl::Class(checked));
                }
                Decl::Interface(iface) => {
                    // Prototypes have no bodies; only their return types
                    // need checking
                    for (proto, _) in &iface.members {
                        self.check_return_type(proto);
                    }
                }
            }
        }
        decls
    }

    fn check_class_bodies(&mut self, class: &ClassDecl) -> TClass {
        let name = class.name.0.clone();
        let mut methods = Vec::new();
        for (member, _) in &class.members {
            if let Member::Method(func) = member {
                methods.push(self.check_function(func, Some(&name)));
            }
        }
        let (instance_size, vtable) = match self.registry.class(&name) {
            Some(info) => (
                info.instance_size,
                info.vtable.iter().map(|slot| slot.label.clone()).collect(),
            ),
            None => (0, Vec::new()),
        };
        TClass {
            name,
            instance_size,
            vtable,
            methods,
        }
    }

    /// A `Named` return type must resolve to a class.
    fn check_return_type(&mut self, func: &FnDecl) {
        if let TypeExpr::Named(name) = &func.return_ty.0 {
            let is_class = matches!(self.globals.lookup_local(name), Some(Symbol::Class));
            if !is_class {
                self.diags.report(SemanticError::IdentifierNotDeclared {
                    name: name.clone(),
                    looking_for: LookingFor::Class,
                    span: func.return_ty.1,
                });
            }
        }
    }

    fn check_function(&mut self, func: &FnDecl, class: Option<&str>) -> TFunction {
        self.check_return_type(func);

        let mut ctx = FnCtx {
            class: class.map(str::to_string),
            return_ty: resolve_type(&func.return_ty.0),
            scopes: ScopeChain::new(),
            loop_depth: 0,
        };

        // Formals get their own scope enclosing the body block
        ctx.scopes.enter();
        let mut params = Vec::new();
        for (formal, _) in &func.formals {
            let ty = resolve_type(&formal.ty.0);
            if let Err(prev_span) =
                ctx.scopes
                    .declare(&formal.name.0, Symbol::Var { ty: ty.clone() }, formal.name.1)
            {
                self.diags.report(SemanticError::DeclConflict {
                    name: formal.name.0.clone(),
                    span: formal.name.1,
                    prev_span: Some(prev_span),
                });
            }
            params.push(TParam {
                name: formal.name.0.clone(),
                ty,
            });
        }

        let body = func.body.as_ref().map(|block| self.check_block(&mut ctx, block));
        ctx.scopes.exit();

        TFunction {
            name: func.name.0.clone(),
            label: fn_label(class, &func.name.0),
            is_method: class.is_some(),
            return_ty: ctx.return_ty,
            params,
            body,
        }
    }

    fn check_block(&mut self, ctx: &mut FnCtx, block: &Block) -> TBlock {
        ctx.scopes.enter();
        let mut decls = Vec::new();
        for (var, _) in &block.decls {
            let ty = resolve_type(&var.ty.0);
            if let Err(prev_span) =
                ctx.scopes
                    .declare(&var.name.0, Symbol::Var { ty: ty.clone() }, var.name.1)
            {
                self.diags.report(SemanticError::DeclConflict {
                    name: var.name.0.clone(),
                    span: var.name.1,
                    prev_span: Some(prev_span),
                });
            }
            decls.push(TLocal {
                name: var.name.0.clone(),
                ty,
            });
        }
        let stmts = block
            .stmts
            .iter()
            .map(|stmt| self.check_stmt(ctx, stmt))
            .collect();
        ctx.scopes.exit();
        TBlock { decls, stmts }
    }

    fn check_test(&mut self, ctx: &mut FnCtx, cond: &Spanned<Expr>) -> Spanned<TExpr> {
        let checked = self.check_expr(ctx, cond);
        if checked.0.ty() != Type::Bool {
            self.diags
                .report(SemanticError::TestNotBoolean { span: checked.1 });
        }
        checked
    }

    fn check_stmt(&mut self, ctx: &mut FnCtx, stmt: &Spanned<Stmt>) -> Spanned<TStmt> {
        let span = stmt.1;
        let checked = match &stmt.0 {
            Stmt::Block(block) => TStmt::Block(self.check_block(ctx, block)),

            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                let cond = self.check_test(ctx, cond);
                let then_body = Box::new(self.check_stmt(ctx, then_body));
                let else_body = else_body
                    .as_ref()
                    .map(|stmt| Box::new(self.check_stmt(ctx, stmt)));
                TStmt::If {
                    cond,
                    then_body,
                    else_body,
                }
            }

            Stmt::While { cond, body } => {
                let cond = self.check_test(ctx, cond);
                ctx.loop_depth += 1;
                let body = Box::new(self.check_stmt(ctx, body));
                ctx.loop_depth -= 1;
                TStmt::While { cond, body }
            }

            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                let init = init.as_ref().map(|expr| self.check_expr(ctx, expr));
                let cond = self.check_test(ctx, cond);
                let step = step.as_ref().map(|expr| self.check_expr(ctx, expr));
                ctx.loop_depth += 1;
                let body = Box::new(self.check_stmt(ctx, body));
                ctx.loop_depth -= 1;
                TStmt::For {
                    init,
                    cond,
                    step,
                    body,
                }
            }

            Stmt::Break => {
                if ctx.loop_depth == 0 {
                    self.diags.report(SemanticError::BreakOutsideLoop { span });
                }
                TStmt::Break
            }

            Stmt::Return(expr) => {
                let checked = expr.as_ref().map(|expr| self.check_expr(ctx, expr));
                let given = checked.as_ref().map(|e| e.0.ty()).unwrap_or(Type::Void);
                if !self.registry.is_convertible(&given, &ctx.return_ty) {
                    self.diags.report(SemanticError::ReturnMismatch {
                        given,
                        expected: ctx.return_ty.clone(),
                        span,
                    });
                }
                TStmt::Return(checked)
            }

            Stmt::Print(args) => {
                let mut checked = Vec::new();
                for (index, arg) in args.iter().enumerate() {
                    let arg = self.check_expr(ctx, arg);
                    let ty = arg.0.ty();
                    if ty != Type::String && ty != Type::Int && ty != Type::Bool {
                        self.diags.report(SemanticError::PrintArgMismatch {
                            arg_num: index + 1,
                            given: ty,
                            span: arg.1,
                        });
                    }
                    checked.push(arg);
                }
                TStmt::Print(checked)
            }

            Stmt::Expr(expr) => TStmt::Expr(self.check_expr(ctx, expr)),
        };
        (checked, span)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn check_expr(&mut self, ctx: &mut FnCtx, expr: &Spanned<Expr>) -> Spanned<TExpr> {
        let span = expr.1;
        let checked = match &expr.0 {
            Expr::Error => TExpr::Error,
            Expr::IntLit(value) => TExpr::IntConst { value: *value },
            Expr::DoubleLit(value) => TExpr::DoubleConst { value: *value },
            Expr::BoolLit(value) => TExpr::BoolConst { value: *value },
            Expr::StringLit(value) => TExpr::StringConst {
                value: value.clone(),
            },
            Expr::Null => TExpr::NullConst,
            Expr::ReadInteger => TExpr::ReadInteger,
            Expr::ReadLine => TExpr::ReadLine,

            Expr::This => match &ctx.class {
                Some(class) => TExpr::This {
                    ty: Type::named(class.clone()),
                },
                None => {
                    self.diags.report(SemanticError::ThisOutsideClass { span });
                    TExpr::Error
                }
            },

            Expr::Unary { op, operand } => self.check_unary(ctx, *op, operand, span),

            Expr::Binary { op, lhs, rhs } => self.check_binary(ctx, *op, lhs, rhs, span),

            Expr::Assign { lhs, rhs } => {
                let lhs = self.check_expr(ctx, lhs);
                let rhs = self.check_expr(ctx, rhs);
                let (lty, rty) = (lhs.0.ty(), rhs.0.ty());
                if lty.is_error() || rty.is_error() {
                    TExpr::Error
                } else if !self.registry.is_convertible(&rty, &lty) {
                    self.diags.report(SemanticError::IncompatibleOperands {
                        op: "=".to_string(),
                        lhs: lty,
                        rhs: rty,
                        span,
                    });
                    TExpr::Error
                } else {
                    TExpr::Assign {
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                        ty: rty,
                    }
                }
            }

            Expr::FieldAccess { base, field } => self.check_field_access(ctx, base, field),

            Expr::Call { base, method, args } => self.check_call(ctx, base, method, args),

            Expr::Index { base, index } => {
                let base = self.check_expr(ctx, base);
                let base_ty = base.0.ty();
                let elem_ty = if base_ty.is_error() {
                    Type::Error
                } else {
                    match base_ty.element_type() {
                        Some(elem) => elem.clone(),
                        None => {
                            self.diags
                                .report(SemanticError::BracketsOnNonArray { span: base.1 });
                            Type::Error
                        }
                    }
                };
                let index = self.check_expr(ctx, index);
                let index_ty = index.0.ty();
                if index_ty != Type::Int && !index_ty.is_error() {
                    self.diags
                        .report(SemanticError::SubscriptNotInteger { span: index.1 });
                }
                if elem_ty.is_error() {
                    TExpr::Error
                } else {
                    TExpr::Index {
                        base: Box::new(base),
                        index: Box::new(index),
                        ty: elem_ty,
                    }
                }
            }

            Expr::New { class } => match self.registry.class(&class.0) {
                Some(info) => TExpr::New {
                    class: class.0.clone(),
                    size: info.instance_size,
                },
                None => {
                    self.diags.report(SemanticError::IdentifierNotDeclared {
                        name: class.0.clone(),
                        looking_for: LookingFor::Class,
                        span: class.1,
                    });
                    TExpr::Error
                }
            },

            Expr::NewArray { size, elem_ty } => {
                let size = self.check_expr(ctx, size);
                if size.0.ty() != Type::Int {
                    self.diags
                        .report(SemanticError::NewArraySizeNotInteger { span: size.1 });
                }
                let elem = resolve_type(&elem_ty.0);
                if let Type::Named(name) = &elem {
                    if self.registry.class(name).is_none() {
                        self.diags.report(SemanticError::IdentifierNotDeclared {
                            name: name.clone(),
                            looking_for: LookingFor::Type,
                            span: elem_ty.1,
                        });
                        return (TExpr::Error, span);
                    }
                }
                TExpr::NewArray {
                    size: Box::new(size),
                    ty: Type::array(elem),
                }
            }
        };
        (checked, span)
    }

    fn check_unary(
        &mut self,
        ctx: &mut FnCtx,
        op: UnaryOp,
        operand: &Spanned<Expr>,
        span: Span,
    ) -> TExpr {
        let operand = self.check_expr(ctx, operand);
        let ty = operand.0.ty();
        match op {
            UnaryOp::Neg => {
                if ty.is_numeric() {
                    TExpr::Arith {
                        op: BinOp::Sub,
                        lhs: None,
                        rhs: Box::new(operand),
                        ty,
                    }
                } else {
                    if !ty.is_error() {
                        self.diags.report(SemanticError::IncompatibleOperand {
                            op: op.to_string(),
                            ty,
                            span,
                        });
                    }
                    TExpr::Error
                }
            }
            UnaryOp::Not => {
                if ty == Type::Bool {
                    TExpr::Not {
                        operand: Box::new(operand),
                    }
                } else {
                    if !ty.is_error() {
                        self.diags.report(SemanticError::IncompatibleOperand {
                            op: op.to_string(),
                            ty,
                            span,
                        });
                    }
                    TExpr::Error
                }
            }
        }
    }

    fn check_binary(
        &mut self,
        ctx: &mut FnCtx,
        op: BinOp,
        lhs: &Spanned<Expr>,
        rhs: &Spanned<Expr>,
        span: Span,
    ) -> TExpr {
        let lhs = self.check_expr(ctx, lhs);
        let rhs = self.check_expr(ctx, rhs);
        let (lty, rty) = (lhs.0.ty(), rhs.0.ty());

        if op.is_arithmetic() {
            let ty = if lty == Type::Int && rty == Type::Int {
                Type::Int
            } else if lty == Type::Double && rty == Type::Double {
                Type::Double
            } else if lty.is_error() || rty.is_error() {
                return TExpr::Error;
            } else {
                self.diags.report(SemanticError::IncompatibleOperands {
                    op: op.to_string(),
                    lhs: lty,
                    rhs: rty,
                    span,
                });
                return TExpr::Error;
            };
            TExpr::Arith {
                op,
                lhs: Some(Box::new(lhs)),
                rhs: Box::new(rhs),
                ty,
            }
        } else if op.is_relational() {
            let ok = (lty == Type::Int && rty == Type::Int)
                || (lty == Type::Double && rty == Type::Double);
            if ok {
                TExpr::Relational {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            } else {
                if !lty.is_error() && !rty.is_error() {
                    self.diags.report(SemanticError::IncompatibleOperands {
                        op: op.to_string(),
                        lhs: lty,
                        rhs: rty,
                        span,
                    });
                }
                TExpr::Error
            }
        } else if op.is_equality() {
            if lty.is_error() || rty.is_error() {
                return TExpr::Error;
            }
            if self.registry.is_convertible(&lty, &rty) || self.registry.is_convertible(&rty, &lty)
            {
                TExpr::Equality {
                    op,
                    string_eq: lty == Type::String,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            } else {
                self.diags.report(SemanticError::IncompatibleOperands {
                    op: op.to_string(),
                    lhs: lty,
                    rhs: rty,
                    span,
                });
                TExpr::Error
            }
        } else {
            debug_assert!(op.is_logical());
            if lty == Type::Bool && rty == Type::Bool {
                TExpr::Logical {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            } else {
                if !lty.is_error() && !rty.is_error() {
                    self.diags.report(SemanticError::IncompatibleOperands {
                        op: op.to_string(),
                        lhs: lty,
                        rhs: rty,
                        span,
                    });
                }
                TExpr::Error
            }
        }
    }

    /// Unqualified names resolve through the scope chain, then the enclosing
    /// class's chain, then program scope. Qualified accesses resolve in the
    /// base type's class chain only.
    fn check_field_access(
        &mut self,
        ctx: &mut FnCtx,
        base: &Option<Box<Spanned<Expr>>>,
        field: &Spanned<String>,
    ) -> TExpr {
        let name = &field.0;
        match base {
            None => {
                if let Some(Symbol::Var { ty }) = ctx.scopes.lookup(name) {
                    return TExpr::Var {
                        name: name.clone(),
                        ty: ty.clone(),
                    };
                }
                if let Some(class) = ctx.class.clone() {
                    match self.registry.lookup_member(&class, name) {
                        Some(Symbol::Var { ty }) => {
                            let ty = ty.clone();
                            let offset = self
                                .registry
                                .field_offset(&class, name)
                                .expect("field resolved but not laid out");
                            return TExpr::Field {
                                base: None,
                                name: name.clone(),
                                offset,
                                ty,
                            };
                        }
                        Some(_) => {
                            self.diags.report(SemanticError::IdentifierNotDeclared {
                                name: name.clone(),
                                looking_for: LookingFor::Variable,
                                span: field.1,
                            });
                            return TExpr::Error;
                        }
                        None => {}
                    }
                }
                match self.globals.lookup_local(name) {
                    Some(Symbol::Var { ty }) => TExpr::Var {
                        name: name.clone(),
                        ty: ty.clone(),
                    },
                    _ => {
                        self.diags.report(SemanticError::IdentifierNotDeclared {
                            name: name.clone(),
                            looking_for: LookingFor::Variable,
                            span: field.1,
                        });
                        TExpr::Error
                    }
                }
            }

            Some(base) => {
                let base = self.check_expr(ctx, base);
                let base_ty = base.0.ty();
                if base_ty.is_error() {
                    return TExpr::Error;
                }
                let Type::Named(class) = &base_ty else {
                    self.diags.report(SemanticError::FieldNotFoundInBase {
                        field: name.clone(),
                        base_ty,
                        span: field.1,
                    });
                    return TExpr::Error;
                };
                let class = class.clone();
                if self.registry.class(&class).is_some() {
                    // From inside a class, fields of another class are only
                    // visible when that class is an ancestor
                    let accessible = match ctx.class.as_deref() {
                        Some(current) => self.registry.is_derived_from(current, &class),
                        None => true,
                    };
                    if !accessible {
                        self.diags.report(SemanticError::InaccessibleField {
                            field: name.clone(),
                            base_ty: base_ty.clone(),
                            span: field.1,
                        });
                    }
                }
                match self.registry.lookup_member(&class, name) {
                    Some(Symbol::Var { ty }) => {
                        let ty = ty.clone();
                        let offset = self
                            .registry
                            .field_offset(&class, name)
                            .expect("field resolved but not laid out");
                        TExpr::Field {
                            base: Some(Box::new(base)),
                            name: name.clone(),
                            offset,
                            ty,
                        }
                    }
                    _ => {
                        self.diags.report(SemanticError::FieldNotFoundInBase {
                            field: name.clone(),
                            base_ty,
                            span: field.1,
                        });
                        TExpr::Error
                    }
                }
            }
        }
    }

    /// Check a resolved call's actuals against the formal types and build
    /// the checked argument list.
    fn check_args(
        &mut self,
        ctx: &mut FnCtx,
        sig: &FnSig,
        method: &Spanned<String>,
        args: &[Spanned<Expr>],
    ) -> Vec<Spanned<TExpr>> {
        let checked: Vec<Spanned<TExpr>> =
            args.iter().map(|arg| self.check_expr(ctx, arg)).collect();
        if sig.formals.len() != checked.len() {
            self.diags.report(SemanticError::NumArgsMismatch {
                function: method.0.clone(),
                expected: sig.formals.len(),
                given: checked.len(),
                span: method.1,
            });
        } else {
            for (index, (arg, expected)) in checked.iter().zip(&sig.formals).enumerate() {
                let given = arg.0.ty();
                if !self.registry.is_convertible(&given, expected) {
                    self.diags.report(SemanticError::ArgMismatch {
                        arg_num: index + 1,
                        given,
                        expected: expected.clone(),
                        span: arg.1,
                    });
                }
            }
        }
        checked
    }

    fn check_call(
        &mut self,
        ctx: &mut FnCtx,
        base: &Option<Box<Spanned<Expr>>>,
        method: &Spanned<String>,
        args: &[Spanned<Expr>],
    ) -> TExpr {
        let name = &method.0;
        match base {
            None => {
                // Methods of the enclosing class shadow free functions
                let mut resolved = ctx
                    .class
                    .as_deref()
                    .and_then(|class| self.registry.lookup_member(class, name))
                    .cloned();
                if resolved.is_none() {
                    resolved = self.globals.lookup_local(name).cloned();
                }
                let Some(Symbol::Fn(sig)) = resolved else {
                    self.diags.report(SemanticError::IdentifierNotDeclared {
                        name: name.clone(),
                        looking_for: LookingFor::Function,
                        span: method.1,
                    });
                    return TExpr::Error;
                };
                let checked = self.check_args(ctx, &sig, method, args);
                if sig.is_method {
                    let class = ctx.class.clone().expect("method resolved outside a class");
                    let vtable_offset = self
                        .registry
                        .vtable_offset(&class, name)
                        .expect("method resolved but not in vtable");
                    TExpr::MethodCall {
                        base: None,
                        method: name.clone(),
                        vtable_offset,
                        args: checked,
                        ty: sig.return_ty,
                    }
                } else {
                    TExpr::FnCall {
                        label: sig.label,
                        args: checked,
                        ty: sig.return_ty,
                    }
                }
            }

            Some(base) => {
                let base = self.check_expr(ctx, base);
                let base_ty = base.0.ty();
                if base_ty.is_error() {
                    return TExpr::Error;
                }
                match &base_ty {
                    Type::Array(_) if name == "length" => {
                        let length_sig = FnSig {
                            name: "length".to_string(),
                            return_ty: Type::Int,
                            formals: Vec::new(),
                            label: String::new(),
                            is_method: false,
                        };
                        self.check_args(ctx, &length_sig, method, args);
                        TExpr::ArrayLength {
                            base: Box::new(base),
                        }
                    }
                    Type::Named(class) => {
                        let class = class.clone();
                        match self.registry.lookup_member(&class, name) {
                            Some(Symbol::Fn(sig)) => {
                                let sig = sig.clone();
                                let checked = self.check_args(ctx, &sig, method, args);
                                let vtable_offset = self
                                    .registry
                                    .vtable_offset(&class, name)
                                    .expect("method resolved but not in vtable");
                                TExpr::MethodCall {
                                    base: Some(Box::new(base)),
                                    method: name.clone(),
                                    vtable_offset,
                                    args: checked,
                                    ty: sig.return_ty,
                                }
                            }
                            _ => {
                                self.diags.report(SemanticError::FieldNotFoundInBase {
                                    field: name.clone(),
                                    base_ty,
                                    span: method.1,
                                });
                                TExpr::Error
                            }
                        }
                    }
                    _ => {
                        self.diags.report(SemanticError::FieldNotFoundInBase {
                            field: name.clone(),
                            base_ty,
                            span: method.1,
                        });
                        TExpr::Error
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Pass 5: entry point
    // ------------------------------------------------------------------

    fn check_main(&mut self, program: &Program) {
        let has_main = program.decls.iter().any(|(decl, _)| {
            matches!(decl, Decl::Fn(func) if func.name.0 == "main" && func.formals.is_empty())
        });
        if !has_main {
            self.diags.report(SemanticError::NoMainFound);
        }
    }
}
