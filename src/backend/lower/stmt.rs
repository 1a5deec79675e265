//! Statement lowering.

use crate::backend::lower::context::LowerContext;
use crate::backend::lower::expr::{lower_expr, lower_expr_stmt};
use crate::backend::tac::BuiltIn;
use crate::common::span::Spanned;
use crate::common::tast::{TBlock, TStmt};
use crate::common::types::Type;

/// Lower a block: materialize its local slots, then lower its statements.
pub fn lower_block(ctx: &mut LowerContext, block: &TBlock) {
    ctx.enter_scope();
    for local in &block.decls {
        let loc = ctx.builder.local_var(&local.name);
        ctx.bind_var(&local.name, loc);
    }
    for stmt in &block.stmts {
        lower_stmt(ctx, stmt);
    }
    ctx.exit_scope();
}

pub fn lower_stmt(ctx: &mut LowerContext, stmt: &Spanned<TStmt>) {
    match &stmt.0 {
        TStmt::Block(block) => lower_block(ctx, block),

        TStmt::If {
            cond,
            then_body,
            else_body,
        } => {
            let test = lower_expr(ctx, cond);
            let label_after = ctx.builder.new_label();
            match else_body {
                Some(else_body) => {
                    let label_else = ctx.builder.new_label();
                    ctx.builder.gen_ifz(test, &label_else);
                    lower_stmt(ctx, then_body);
                    ctx.builder.gen_goto(&label_after);

                    ctx.builder.gen_label(&label_else);
                    lower_stmt(ctx, else_body);
                }
                None => {
                    ctx.builder.gen_ifz(test, &label_after);
                    lower_stmt(ctx, then_body);
                }
            }
            ctx.builder.gen_label(&label_after);
        }

        TStmt::While { cond, body } => {
            let label_before = ctx.builder.new_label();
            let label_after = ctx.builder.new_label();

            ctx.builder.gen_label(&label_before);
            let test = lower_expr(ctx, cond);
            ctx.builder.gen_ifz(test, &label_after);

            ctx.push_loop(label_after.clone());
            lower_stmt(ctx, body);
            ctx.pop_loop();

            ctx.builder.gen_goto(&label_before);
            ctx.builder.gen_label(&label_after);
        }

        TStmt::For {
            init,
            cond,
            step,
            body,
        } => {
            let label_before = ctx.builder.new_label();
            let label_after = ctx.builder.new_label();

            if let Some(init) = init {
                lower_expr_stmt(ctx, init);
            }

            ctx.builder.gen_label(&label_before);
            let test = lower_expr(ctx, cond);
            ctx.builder.gen_ifz(test, &label_after);

            ctx.push_loop(label_after.clone());
            lower_stmt(ctx, body);
            ctx.pop_loop();

            if let Some(step) = step {
                lower_expr_stmt(ctx, step);
            }
            ctx.builder.gen_goto(&label_before);
            ctx.builder.gen_label(&label_after);
        }

        TStmt::Break => {
            let target = ctx.current_loop_after().to_string();
            ctx.builder.gen_goto(&target);
        }

        TStmt::Return(expr) => {
            let value = expr.as_ref().map(|expr| lower_expr(ctx, expr));
            ctx.builder.gen_return(value);
        }

        TStmt::Print(args) => {
            for arg in args {
                let value = lower_expr(ctx, arg);
                let builtin = match arg.0.ty() {
                    Type::String => BuiltIn::PrintString,
                    Type::Int => BuiltIn::PrintInt,
                    Type::Bool => BuiltIn::PrintBool,
                    other => panic!("unprintable argument type: {}", other),
                };
                ctx.builder.gen_builtin_call(builtin, Some(value), None);
            }
        }

        TStmt::Expr(expr) => lower_expr_stmt(ctx, expr),
    }
}
