//! Three-address code: operand locations, the instruction model, and the
//! stateful builder that lowering drives.

pub mod builder;
pub mod instr;
pub mod location;

pub use builder::{BuiltIn, TacBuilder, OFFSET_TO_FIRST_GLOBAL, OFFSET_TO_FIRST_LOCAL, OFFSET_TO_FIRST_PARAM};
pub use instr::{Instruction, TacOp};
pub use location::{Loc, LocationData, LocationTable, Segment};

/// A lowered program: the linear instruction list plus the location arena
/// its operands index into.
#[derive(Clone, Debug, Default)]
pub struct TacProgram {
    pub instrs: Vec<Instruction>,
    pub locs: LocationTable,
}

impl TacProgram {
    /// Canonical text rendering of the whole stream, in emission order.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for instr in &self.instrs {
            instr.print_to(&self.locs, &mut out);
        }
        out
    }
}
