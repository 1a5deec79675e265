//! TAC operand locations.
//!
//! A location describes where a value lives at runtime: in the stack frame
//! (fp-relative) or in the global segment (gp-relative), at a fixed byte
//! offset. Locations are identity tokens: two entries with the same segment
//! and offset are still distinct variables for liveness — fresh temporaries
//! never alias, and repeated reads of `this` each get their own entry.

use crate::backend::regalloc::regs::Reg;
use std::fmt;

/// Segment a location's offset is measured against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Relative to the current function's frame pointer
    FpRelative,
    /// Relative to the process's global pointer
    GpRelative,
}

/// Stable identity of a location, in allocation order. Liveness sets and the
/// interference graph key on this id, never on name or offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Loc(pub u32);

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "loc{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct LocationData {
    pub name: String,
    pub segment: Segment,
    pub offset: i32,
    /// Filled by the register allocator; `None` means memory-resident
    pub reg: Option<Reg>,
}

/// Arena of every location allocated while lowering a program.
#[derive(Clone, Debug, Default)]
pub struct LocationTable {
    entries: Vec<LocationData>,
}

impl LocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, name: impl Into<String>, segment: Segment, offset: i32) -> Loc {
        let id = Loc(self.entries.len() as u32);
        self.entries.push(LocationData {
            name: name.into(),
            segment,
            offset,
            reg: None,
        });
        id
    }

    pub fn get(&self, loc: Loc) -> &LocationData {
        &self.entries[loc.0 as usize]
    }

    pub fn get_mut(&mut self, loc: Loc) -> &mut LocationData {
        &mut self.entries[loc.0 as usize]
    }

    pub fn name(&self, loc: Loc) -> &str {
        &self.get(loc).name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
