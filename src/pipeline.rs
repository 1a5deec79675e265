//! Oriole Compiler Pipeline
//!
//! End-to-end compilation from the parsed program to the analyzed TAC
//! stream.
//!
//! # Pipeline Stages
//!
//! ```text
//! AST (Program, from the external parser)
//!     │
//!     ▼ checker
//! Typed AST (TProgram) + Diagnostics
//!     │   (backend gated on zero diagnostics)
//!     ▼ lower
//! TAC (TacProgram)
//!     │
//!     ▼ emit driver (per function: CFG → liveness → register allocation)
//! Target emitter sink, or canonical TAC text when tracing
//! ```

use crate::backend::emit::{process_program, TacPrinter, TargetEmitter};
use crate::backend::lower::lower_program;
use crate::frontend::checker::{check_program, report_all, Diagnostics, SemanticError};
use crate::common::ast::Program;
use crate::common::tast::TProgram;
use std::fmt;

/// Compilation error types
#[derive(Debug)]
pub enum CompileError {
    /// One or more semantic errors; the backend never ran
    Semantic(Vec<SemanticError>),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Semantic(errors) => {
                writeln!(f, "{} semantic error(s):", errors.len())?;
                for error in errors {
                    writeln!(f, "  {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Emission options
#[derive(Clone, Copy, Debug, Default)]
pub struct EmitOptions {
    /// Print the TAC stream textually instead of invoking the target
    /// machine emitter
    pub trace_tac: bool,
}

/// Run semantic analysis only.
///
/// Returns the typed AST, or every collected diagnostic when the program
/// has errors.
pub fn check(program: &Program) -> Result<TProgram, Vec<SemanticError>> {
    let mut diags = Diagnostics::new();
    let tast = check_program(program, &mut diags);
    if diags.is_empty() {
        Ok(tast)
    } else {
        Err(diags.into_errors())
    }
}

/// Compile a program and hand the analyzed TAC stream to `target` — or, with
/// `trace_tac` set, return its canonical text instead.
///
/// Emission is gated: with any semantic error the backend never runs.
pub fn compile(
    program: &Program,
    options: EmitOptions,
    target: &mut dyn TargetEmitter,
) -> Result<Option<String>, CompileError> {
    let tast = check(program).map_err(CompileError::Semantic)?;
    let mut tac = lower_program(&tast);
    if options.trace_tac {
        let mut printer = TacPrinter::new();
        process_program(&mut tac, &mut printer);
        Ok(Some(printer.into_text()))
    } else {
        process_program(&mut tac, target);
        Ok(None)
    }
}

/// Compile a program to the canonical TAC text.
///
/// This is the `trace_tac` path packaged for callers (and tests) that only
/// want the text.
pub fn compile_to_tac(program: &Program) -> Result<String, CompileError> {
    let tast = check(program).map_err(CompileError::Semantic)?;
    let mut tac = lower_program(&tast);
    let mut printer = TacPrinter::new();
    process_program(&mut tac, &mut printer);
    Ok(printer.into_text())
}

/// Compile and pretty-print any semantic errors with source context.
#[allow(clippy::result_unit_err)]
pub fn compile_and_report(
    filename: &str,
    source: &str,
    program: &Program,
) -> Result<String, ()> {
    match compile_to_tac(program) {
        Ok(tac) => Ok(tac),
        Err(CompileError::Semantic(errors)) => {
            report_all(filename, source, &errors);
            Err(())
        }
    }
}
