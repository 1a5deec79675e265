//! Checking context: the diagnostics sink, per-scope symbol tables, and the
//! class/interface registry with inheritance-aware lookup and layout.
//!
//! Name resolution comes in three disciplines:
//! - local: one table only (`SymbolTable::lookup_local`)
//! - scope chain: innermost block outward, then program scope
//!   (`ScopeChain::lookup`, completed by the caller with the globals table)
//! - class chain: a class's own members, then its base's, without ever
//!   escaping into program scope (`ClassRegistry::lookup_member`)

use crate::common::span::Span;
use crate::common::types::{Type, WORD_SIZE};
use crate::frontend::checker::error::SemanticError;
use std::collections::{HashMap, HashSet};

/// Append-only sink for the errors found during checking.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<SemanticError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, error: SemanticError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<SemanticError> {
        self.errors
    }
}

/// A function's checked signature, shared by call checking, override
/// checking, and vtable construction.
#[derive(Clone, Debug)]
pub struct FnSig {
    pub name: String,
    pub return_ty: Type,
    pub formals: Vec<Type>,
    /// Code label: `_<name>` / bare `main` / `_<Class>.<method>`
    pub label: String,
    pub is_method: bool,
}

impl FnSig {
    /// Signature match as required for overriding: same name, equivalent
    /// return type, same arity with position-wise equivalent formals.
    pub fn matches(&self, other: &FnSig) -> bool {
        if self.name != other.name {
            return false;
        }
        if !self.return_ty.is_equivalent_to(&other.return_ty) {
            return false;
        }
        if self.formals.len() != other.formals.len() {
            return false;
        }
        self.formals
            .iter()
            .zip(&other.formals)
            .all(|(a, b)| a.is_equivalent_to(b))
    }
}

#[derive(Clone, Debug)]
pub enum Symbol {
    Var { ty: Type },
    Fn(FnSig),
    Class,
    Interface,
}

/// One scope's name-to-declaration map. Keys are unique; on a duplicate the
/// first occurrence wins and the caller reports the conflict.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    map: im::HashMap<String, (Symbol, Span)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a binding. On a duplicate the table is left unchanged and the
    /// previous declaration's span is returned.
    pub fn declare(&mut self, name: &str, symbol: Symbol, span: Span) -> Result<(), Span> {
        if let Some((_, prev_span)) = self.map.get(name) {
            return Err(*prev_span);
        }
        self.map.insert(name.to_string(), (symbol, span));
        Ok(())
    }

    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.map.get(name).map(|(sym, _)| sym)
    }

    pub fn lookup_local_with_span(&self, name: &str) -> Option<&(Symbol, Span)> {
        self.map.get(name)
    }
}

/// Stack of block scopes for one function body (innermost last).
#[derive(Debug, Default)]
pub struct ScopeChain {
    stack: Vec<SymbolTable>,
}

impl ScopeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self) {
        self.stack.push(SymbolTable::new());
    }

    pub fn exit(&mut self) {
        self.stack.pop().expect("no scope to exit");
    }

    /// Declare in the innermost scope.
    pub fn declare(&mut self, name: &str, symbol: Symbol, span: Span) -> Result<(), Span> {
        self.stack
            .last_mut()
            .expect("no scope to declare in")
            .declare(name, symbol, span)
    }

    /// Walk the chain from the innermost scope outward.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.stack
            .iter()
            .rev()
            .find_map(|table| table.lookup_local(name))
    }
}

/// One vtable slot. Slot indices are inherited from the base in order;
/// overriding replaces a slot in place, new methods append.
#[derive(Clone, Debug)]
pub struct VtableSlot {
    pub method: String,
    pub label: String,
    pub sig: FnSig,
}

#[derive(Clone, Debug)]
pub struct ClassInfo {
    pub name: String,
    pub span: Span,
    /// Stripped when unresolved or cyclic, so checking can continue
    pub extends: Option<String>,
    pub implements: Vec<(String, Span)>,
    /// Own members only; inherited members resolve through the chain
    pub members: SymbolTable,
    /// Own fields and methods in declaration order
    pub field_order: Vec<String>,
    pub method_order: Vec<String>,
    /// Filled by `assign_layout`
    pub field_offsets: HashMap<String, i32>,
    /// Zero until layout has run; layout is memoized on it being nonzero
    pub instance_size: i32,
    pub vtable: Vec<VtableSlot>,
}

impl ClassInfo {
    pub fn new(name: String, span: Span) -> Self {
        Self {
            name,
            span,
            extends: None,
            implements: Vec::new(),
            members: SymbolTable::new(),
            field_order: Vec::new(),
            method_order: Vec::new(),
            field_offsets: HashMap::new(),
            instance_size: 0,
            vtable: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct InterfaceInfo {
    pub name: String,
    pub span: Span,
    pub members: SymbolTable,
    pub method_order: Vec<String>,
}

impl InterfaceInfo {
    pub fn new(name: String, span: Span) -> Self {
        Self {
            name,
            span,
            members: SymbolTable::new(),
            method_order: Vec::new(),
        }
    }
}

/// All classes and interfaces of the program, with hierarchy queries and
/// layout assignment.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassInfo>,
    interfaces: HashMap<String, InterfaceInfo>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, info: ClassInfo) {
        self.classes.entry(info.name.clone()).or_insert(info);
    }

    pub fn add_interface(&mut self, info: InterfaceInfo) {
        self.interfaces.entry(info.name.clone()).or_insert(info);
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn class_mut(&mut self, name: &str) -> Option<&mut ClassInfo> {
        self.classes.get_mut(name)
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceInfo> {
        self.interfaces.get(name)
    }

    pub fn class_names(&self) -> impl Iterator<Item = &String> {
        self.classes.keys()
    }

    /// Drop a class's `extends` link (unresolved or cyclic base).
    pub fn strip_extends(&mut self, name: &str) {
        if let Some(info) = self.classes.get_mut(name) {
            info.extends = None;
        }
    }

    fn base_of(&self, name: &str) -> Option<&ClassInfo> {
        let info = self.classes.get(name)?;
        let base = info.extends.as_deref()?;
        self.classes.get(base)
    }

    /// True when `derived` is `base` or transitively extends it. Guarded
    /// against cycles that have not been stripped yet.
    pub fn is_derived_from(&self, derived: &str, base: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = derived;
        loop {
            if current == base {
                return true;
            }
            if !visited.insert(current.to_string()) {
                return false;
            }
            match self.base_of(current) {
                Some(next) => current = &next.name,
                None => return false,
            }
        }
    }

    /// True when `class` or an ancestor lists `interface` in its implements
    /// clause.
    pub fn class_implements(&self, class: &str, interface: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = class;
        loop {
            if !visited.insert(current.to_string()) {
                return false;
            }
            let Some(info) = self.classes.get(current) else {
                return false;
            };
            if info.implements.iter().any(|(name, _)| name == interface) {
                return true;
            }
            match &info.extends {
                Some(base) => current = base,
                None => return false,
            }
        }
    }

    /// Class-chain member lookup: own members, then the base chain. Never
    /// escapes into program scope.
    pub fn lookup_member(&self, class: &str, name: &str) -> Option<&Symbol> {
        self.lookup_member_entry(class, name).map(|(sym, _)| sym)
    }

    /// As [`Self::lookup_member`], also yielding the declaration span.
    pub fn lookup_member_entry(&self, class: &str, name: &str) -> Option<&(Symbol, Span)> {
        let mut visited = HashSet::new();
        let mut current = class;
        loop {
            if !visited.insert(current.to_string()) {
                return None;
            }
            let info = self.classes.get(current)?;
            if let Some(entry) = info.members.lookup_local_with_span(name) {
                return Some(entry);
            }
            current = info.extends.as_deref()?;
        }
    }

    /// Word offset of `field` resolved through the class chain.
    pub fn field_offset(&self, class: &str, field: &str) -> Option<i32> {
        let mut visited = HashSet::new();
        let mut current = class;
        loop {
            if !visited.insert(current.to_string()) {
                return None;
            }
            let info = self.classes.get(current)?;
            if let Some(offset) = info.field_offsets.get(field) {
                return Some(*offset);
            }
            current = info.extends.as_deref()?;
        }
    }

    /// Byte offset of `method`'s slot in `class`'s vtable.
    pub fn vtable_offset(&self, class: &str, method: &str) -> Option<i32> {
        let info = self.classes.get(class)?;
        info.vtable
            .iter()
            .position(|slot| slot.method == method)
            .map(|index| index as i32 * WORD_SIZE)
    }

    /// Full convertibility `from -> to`: the hierarchy-free rules, plus
    /// derived-to-base and class-to-implemented-interface.
    pub fn is_convertible(&self, from: &Type, to: &Type) -> bool {
        if from.is_convertible_basic(to) {
            return true;
        }
        match (from, to) {
            (Type::Named(a), Type::Named(b)) => {
                if self.classes.contains_key(b.as_str()) {
                    self.is_derived_from(a, b)
                } else if self.interfaces.contains_key(b.as_str()) {
                    self.class_implements(a, b)
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Compute instance size, field offsets, and the vtable for `class`,
    /// recursing into the base first. Memoized via the nonzero instance
    /// size; cycles must have been stripped before this runs.
    pub fn assign_layout(&mut self, class: &str) {
        let Some(info) = self.classes.get(class) else {
            return;
        };
        if info.instance_size > 0 {
            return;
        }

        let base = info.extends.clone();
        if let Some(base_name) = &base {
            self.assign_layout(base_name);
        }

        let (base_size, base_vtable) = match base.as_deref().and_then(|b| self.classes.get(b)) {
            Some(base_info) => (base_info.instance_size, base_info.vtable.clone()),
            // One word reserved for the vtable pointer
            None => (WORD_SIZE, Vec::new()),
        };

        let info = self
            .classes
            .get_mut(class)
            .expect("class vanished during layout");

        let mut size = base_size;
        for field in &info.field_order {
            info.field_offsets.insert(field.clone(), size);
            size += WORD_SIZE;
        }
        info.instance_size = size;

        let mut vtable = base_vtable;
        for method in info.method_order.clone() {
            let Some(Symbol::Fn(sig)) = info.members.lookup_local(&method) else {
                continue;
            };
            let sig = sig.clone();
            // Overriding replaces the slot in place, keeping its index;
            // otherwise the method appends as a new slot
            if let Some(slot) = vtable.iter_mut().find(|slot| sig.matches(&slot.sig)) {
                slot.method = method;
                slot.label = sig.label.clone();
                slot.sig = sig;
            } else {
                vtable.push(VtableSlot {
                    method,
                    label: sig.label.clone(),
                    sig,
                });
            }
        }
        info.vtable = vtable;
    }
}
