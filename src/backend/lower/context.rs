//! Lowering context for typed-AST to TAC translation.
//!
//! Tracks the state lowering threads through the walk: the TAC builder, the
//! name-to-slot maps for materialized variables, and the after-labels of the
//! enclosing loops for `break`.

use crate::backend::tac::{Loc, TacBuilder, TacProgram};
use std::collections::HashMap;

pub struct LowerContext {
    /// The TAC builder
    pub builder: TacBuilder,

    /// Global variable slots, materialized in declaration order
    globals: HashMap<String, Loc>,

    /// Per-function scope stack mapping names to their materialized slots
    scopes: Vec<HashMap<String, Loc>>,

    /// After-labels of the enclosing loops, innermost last
    loop_afters: Vec<String>,
}

impl LowerContext {
    pub fn new() -> Self {
        Self {
            builder: TacBuilder::new(),
            globals: HashMap::new(),
            scopes: Vec::new(),
            loop_afters: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Variable slots
    // ------------------------------------------------------------------

    pub fn bind_global(&mut self, name: &str, loc: Loc) {
        self.globals.insert(name.to_string(), loc);
    }

    /// Bind a name in the innermost scope.
    pub fn bind_var(&mut self, name: &str, loc: Loc) {
        self.scopes
            .last_mut()
            .expect("no scope to bind in")
            .insert(name.to_string(), loc);
    }

    /// Resolve a materialized slot: innermost scope outward, then globals.
    pub fn lookup_var(&self, name: &str) -> Loc {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.globals.get(name))
            .copied()
            .unwrap_or_else(|| panic!("undefined variable during lowering: {}", name))
    }

    // ------------------------------------------------------------------
    // Scope management
    // ------------------------------------------------------------------

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop().expect("no scope to exit");
    }

    // ------------------------------------------------------------------
    // Loop labels
    // ------------------------------------------------------------------

    pub fn push_loop(&mut self, after_label: String) {
        self.loop_afters.push(after_label);
    }

    pub fn pop_loop(&mut self) {
        self.loop_afters.pop().expect("no loop to pop");
    }

    /// After-label of the nearest enclosing loop, the target of `break`.
    pub fn current_loop_after(&self) -> &str {
        self.loop_afters.last().expect("break outside any loop")
    }

    pub fn finish(self) -> TacProgram {
        self.builder.finish()
    }
}

impl Default for LowerContext {
    fn default() -> Self {
        Self::new()
    }
}
