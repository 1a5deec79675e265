//! Frontend of the Oriole middle-end.
//!
//! The lexer and parser are external collaborators; this module begins at
//! the decorated AST and covers semantic analysis.

pub mod checker;
