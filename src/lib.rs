//! Oriole compiler middle-end.
//!
//! Oriole is a small statically-typed, class-based object-oriented language
//! with single inheritance, interfaces, arrays, and the primitive types
//! int, double, bool, and string. This crate takes the decorated AST an
//! external parser produces and lowers it to three-address code for a
//! 32-bit word target, running semantic analysis, control-flow
//! construction, live-variable analysis, and graph-coloring register
//! allocation on the way. Machine-code emission is the business of an
//! external [`backend::TargetEmitter`].
//!
//! ```text
//! ast::Program ─▶ checker ─▶ tast::TProgram ─▶ lower ─▶ TAC ─▶ analyses ─▶ emitter
//! ```
//!
//! The [`pipeline`] module ties the stages together.

pub mod backend;
pub mod common;
pub mod frontend;
pub mod pipeline;
