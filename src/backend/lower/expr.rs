//! Expression lowering.
//!
//! Lowering is a post-order walk: operands are emitted first and each
//! expression returns the location holding its value. Lvalues lower to a
//! [`Place`] so assignment can dispatch between a direct slot write and a
//! store through a computed address.

use crate::backend::lower::context::LowerContext;
use crate::backend::lower::{ERR_ARR_BAD_SIZE, ERR_ARR_OUT_OF_BOUNDS};
use crate::backend::tac::{BuiltIn, Loc, TacOp};
use crate::common::ast::BinOp;
use crate::common::span::Spanned;
use crate::common::tast::TExpr;
use crate::common::types::{Type, WORD_SIZE};

/// Where an lvalue's storage is: a materialized slot, or a memory cell at a
/// fixed offset from a computed base address.
pub enum Place {
    Value(Loc),
    Indirect { base: Loc, offset: i32 },
}

/// Lower an expression and return the location holding its result.
pub fn lower_expr(ctx: &mut LowerContext, expr: &Spanned<TExpr>) -> Loc {
    lower_expr_opt(ctx, expr).expect("expression has no value")
}

/// Lower an expression for effect only. The dead read-back of an assignment
/// result is suppressed, and calls may be void.
pub fn lower_expr_stmt(ctx: &mut LowerContext, expr: &Spanned<TExpr>) {
    if let TExpr::Assign { lhs, rhs, .. } = &expr.0 {
        let place = lower_place(ctx, lhs);
        let value = lower_expr(ctx, rhs);
        assign_place(ctx, &place, value);
    } else {
        lower_expr_opt(ctx, expr);
    }
}

fn convert_arith_op(op: BinOp) -> TacOp {
    match op {
        BinOp::Add => TacOp::Add,
        BinOp::Sub => TacOp::Sub,
        BinOp::Mul => TacOp::Mul,
        BinOp::Div => TacOp::Div,
        BinOp::Mod => TacOp::Mod,
        _ => panic!("not an arithmetic operator: {}", op),
    }
}

/// Lower an expression; `None` only for calls of void functions.
fn lower_expr_opt(ctx: &mut LowerContext, expr: &Spanned<TExpr>) -> Option<Loc> {
    let result = match &expr.0 {
        // Gating keeps poisoned subtrees out of the backend; emit a
        // placeholder so a partial lowering stays well formed
        TExpr::Error => ctx.builder.gen_load_const(0),

        TExpr::IntConst { value } => ctx.builder.gen_load_const(*value),

        TExpr::DoubleConst { .. } => {
            panic!("double constants are not supported by the code generator")
        }

        TExpr::BoolConst { value } => ctx.builder.gen_load_const(*value as i32),

        TExpr::StringConst { value } => ctx.builder.gen_load_string(value),

        TExpr::NullConst => ctx.builder.gen_load_const(0),

        TExpr::ReadInteger => ctx
            .builder
            .gen_builtin_call(BuiltIn::ReadInteger, None, None)
            .expect("_ReadInteger returns a value"),

        TExpr::ReadLine => ctx
            .builder
            .gen_builtin_call(BuiltIn::ReadLine, None, None)
            .expect("_ReadLine returns a value"),

        TExpr::This { .. } => ctx.builder.this_var(),

        TExpr::Arith { op, lhs, rhs, .. } => {
            let rv = lower_expr(ctx, rhs);
            let lv = match lhs {
                Some(lhs) => lower_expr(ctx, lhs),
                // Unary minus is 0 - operand
                None => ctx.builder.gen_load_const(0),
            };
            ctx.builder.gen_binop(convert_arith_op(*op), lv, rv)
        }

        TExpr::Relational { op, lhs, rhs } => {
            let lv = lower_expr(ctx, lhs);
            let rv = lower_expr(ctx, rhs);
            match op {
                BinOp::Lt => ctx.builder.gen_binop(TacOp::Less, lv, rv),
                // a > b is b < a
                BinOp::Gt => ctx.builder.gen_binop(TacOp::Less, rv, lv),
                BinOp::Lte => {
                    let lt = ctx.builder.gen_binop(TacOp::Less, lv, rv);
                    let eq = ctx.builder.gen_binop(TacOp::Equal, lv, rv);
                    ctx.builder.gen_binop(TacOp::Or, lt, eq)
                }
                BinOp::Gte => {
                    let gt = ctx.builder.gen_binop(TacOp::Less, rv, lv);
                    let eq = ctx.builder.gen_binop(TacOp::Equal, lv, rv);
                    ctx.builder.gen_binop(TacOp::Or, gt, eq)
                }
                _ => panic!("not a relational operator: {}", op),
            }
        }

        TExpr::Equality {
            op,
            lhs,
            rhs,
            string_eq,
        } => {
            let lv = lower_expr(ctx, lhs);
            let rv = lower_expr(ctx, rhs);
            let eq = if *string_eq {
                ctx.builder
                    .gen_builtin_call(BuiltIn::StringEqual, Some(lv), Some(rv))
                    .expect("_StringEqual returns a value")
            } else {
                ctx.builder.gen_binop(TacOp::Equal, lv, rv)
            };
            match op {
                BinOp::Eq => eq,
                BinOp::NotEq => {
                    let zero = ctx.builder.gen_load_const(0);
                    ctx.builder.gen_binop(TacOp::Equal, eq, zero)
                }
                _ => panic!("not an equality operator: {}", op),
            }
        }

        TExpr::Logical { op, lhs, rhs } => {
            let rv = lower_expr(ctx, rhs);
            let lv = lower_expr(ctx, lhs);
            let tac_op = match op {
                BinOp::And => TacOp::And,
                BinOp::Or => TacOp::Or,
                _ => panic!("not a logical operator: {}", op),
            };
            ctx.builder.gen_binop(tac_op, lv, rv)
        }

        TExpr::Not { operand } => {
            let rv = lower_expr(ctx, operand);
            let zero = ctx.builder.gen_load_const(0);
            ctx.builder.gen_binop(TacOp::Equal, zero, rv)
        }

        TExpr::Assign { lhs, rhs, .. } => {
            let place = lower_place(ctx, lhs);
            let value = lower_expr(ctx, rhs);
            assign_place(ctx, &place, value);
            read_place(ctx, &place)
        }

        TExpr::Var { name, .. } => ctx.lookup_var(name),

        TExpr::Field { .. } | TExpr::Index { .. } => {
            let place = lower_place(ctx, expr);
            read_place(ctx, &place)
        }

        TExpr::FnCall { label, args, ty } => {
            let mut params = Vec::new();
            for arg in args {
                // Reversed so the leftmost argument is pushed last
                params.insert(0, lower_expr(ctx, arg));
            }
            for param in &params {
                ctx.builder.gen_push_param(*param);
            }
            let has_return = *ty != Type::Void;
            let result = ctx.builder.gen_lcall(label, has_return);
            ctx.builder.gen_pop_params(params.len() as i32 * WORD_SIZE);
            return result;
        }

        TExpr::MethodCall {
            base,
            vtable_offset,
            args,
            ty,
            ..
        } => {
            let object = match base {
                Some(base) => lower_expr(ctx, base),
                None => ctx.builder.this_var(),
            };
            let vtable = ctx.builder.gen_load(object, 0);
            let addr = ctx.builder.gen_load(vtable, *vtable_offset);

            // The receiver is the leftmost argument, pushed last
            let mut params = vec![object];
            for arg in args {
                params.insert(0, lower_expr(ctx, arg));
            }
            for param in &params {
                ctx.builder.gen_push_param(*param);
            }
            let has_return = *ty != Type::Void;
            let result = ctx.builder.gen_acall(addr, has_return);
            ctx.builder.gen_pop_params(params.len() as i32 * WORD_SIZE);
            return result;
        }

        TExpr::ArrayLength { base } => {
            let array = lower_expr(ctx, base);
            // The length lives in the header word just below the elements
            ctx.builder.gen_load(array, -WORD_SIZE)
        }

        TExpr::New { class, size } => {
            let size = ctx.builder.gen_load_const(*size);
            let addr = ctx
                .builder
                .gen_builtin_call(BuiltIn::Alloc, Some(size), None)
                .expect("_Alloc returns a value");
            let vtable = ctx.builder.gen_load_label(class);
            ctx.builder.gen_store(addr, vtable, 0);
            addr
        }

        TExpr::NewArray { size, .. } => {
            let length = lower_expr(ctx, size);

            // The requested element count must be at least one
            let one = ctx.builder.gen_load_const(1);
            let label_after = ctx.builder.new_label();
            let test = ctx.builder.gen_binop(TacOp::Less, length, one);
            ctx.builder.gen_ifz(test, &label_after);
            let message = ctx.builder.gen_load_string(ERR_ARR_BAD_SIZE);
            ctx.builder
                .gen_builtin_call(BuiltIn::PrintString, Some(message), None);
            ctx.builder.gen_builtin_call(BuiltIn::Halt, None, None);
            ctx.builder.gen_label(&label_after);

            // One extra word for the length header; the returned pointer
            // sits one word past it
            let var_size = ctx.builder.gen_load_const(WORD_SIZE);
            let array_size = ctx.builder.gen_binop(TacOp::Mul, var_size, length);
            let total_size = ctx.builder.gen_binop(TacOp::Add, var_size, array_size);
            let addr = ctx
                .builder
                .gen_builtin_call(BuiltIn::Alloc, Some(total_size), None)
                .expect("_Alloc returns a value");
            ctx.builder.gen_store(addr, length, 0);
            ctx.builder.gen_binop(TacOp::Add, addr, var_size)
        }
    };
    Some(result)
}

/// Lower an lvalue to its place. For array accesses this emits the bounds
/// check and address computation; reads and writes then go through offset
/// zero of the computed address.
pub fn lower_place(ctx: &mut LowerContext, expr: &Spanned<TExpr>) -> Place {
    match &expr.0 {
        TExpr::Var { name, .. } => Place::Value(ctx.lookup_var(name)),

        TExpr::Field { base, offset, .. } => {
            let base = match base {
                Some(base) => lower_expr(ctx, base),
                None => ctx.builder.this_var(),
            };
            Place::Indirect {
                base,
                offset: *offset,
            }
        }

        TExpr::Index { base, index, .. } => {
            let array = lower_expr(ctx, base);
            let index = lower_expr(ctx, index);
            let length = ctx.builder.gen_load(array, -WORD_SIZE);

            // Runtime check: -1 < index < length
            let label_halt = ctx.builder.new_label();
            let label_after = ctx.builder.new_label();
            let neg_one = ctx.builder.gen_load_const(-1);
            let lower = ctx.builder.gen_binop(TacOp::Less, neg_one, index);
            let upper = ctx.builder.gen_binop(TacOp::Less, index, length);
            let test = ctx.builder.gen_binop(TacOp::And, lower, upper);
            ctx.builder.gen_ifz(test, &label_halt);

            let var_size = ctx.builder.gen_load_const(WORD_SIZE);
            let offset = ctx.builder.gen_binop(TacOp::Mul, index, var_size);
            let addr = ctx.builder.gen_binop(TacOp::Add, array, offset);
            ctx.builder.gen_goto(&label_after);

            ctx.builder.gen_label(&label_halt);
            let message = ctx.builder.gen_load_string(ERR_ARR_OUT_OF_BOUNDS);
            ctx.builder
                .gen_builtin_call(BuiltIn::PrintString, Some(message), None);
            ctx.builder.gen_builtin_call(BuiltIn::Halt, None, None);
            ctx.builder.gen_label(&label_after);

            Place::Indirect {
                base: addr,
                offset: 0,
            }
        }

        other => panic!("assignment target is not an lvalue: {:?}", other),
    }
}

/// Read a place's current value.
pub fn read_place(ctx: &mut LowerContext, place: &Place) -> Loc {
    match place {
        Place::Value(loc) => *loc,
        Place::Indirect { base, offset } => ctx.builder.gen_load(*base, *offset),
    }
}

/// Write `src` into a place.
pub fn assign_place(ctx: &mut LowerContext, place: &Place, src: Loc) {
    match place {
        Place::Value(dst) => ctx.builder.gen_assign(*dst, src),
        Place::Indirect { base, offset } => ctx.builder.gen_store(*base, src, *offset),
    }
}
