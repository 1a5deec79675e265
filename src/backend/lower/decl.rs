//! Declaration lowering: globals, functions, classes and their vtables.

use crate::backend::lower::context::LowerContext;
use crate::backend::lower::stmt::lower_block;
use crate::backend::tac::TacProgram;
use crate::common::tast::{TDecl, TFunction, TProgram};

/// Lower a checked program to its TAC stream.
///
/// Declarations lower in source order: a global materializes its slot, a
/// class lowers its methods and then writes its vtable, a function lowers
/// its body between a `BeginFunc`/`EndFunc` pair.
pub fn lower_program(program: &TProgram) -> TacProgram {
    let mut ctx = LowerContext::new();

    for decl in &program.decls {
        match decl {
            TDecl::Global(global) => {
                let loc = ctx.builder.global_var(&global.name);
                ctx.bind_global(&global.name, loc);
            }
            TDecl::Class(class) => {
                for method in &class.methods {
                    lower_function(&mut ctx, method);
                }
                ctx.builder.gen_vtable(&class.name, class.vtable.clone());
            }
            TDecl::Function(func) => lower_function(&mut ctx, func),
        }
    }

    ctx.finish()
}

pub fn lower_function(ctx: &mut LowerContext, func: &TFunction) {
    ctx.builder.gen_label(&func.label);
    let begin = ctx.builder.gen_begin_func();

    ctx.enter_scope();
    if func.is_method {
        // The receiver slot is reserved ahead of the declared formals
        ctx.builder.param_var("this");
    }
    for param in &func.params {
        let loc = ctx.builder.param_var(&param.name);
        ctx.bind_var(&param.name, loc);
    }
    if let Some(body) = &func.body {
        lower_block(ctx, body);
    }
    ctx.exit_scope();

    ctx.builder.patch_frame_size(begin);
    ctx.builder.gen_end_func();
}
