//! Per-function emission driver.
//!
//! One scan over the instruction list: non-function instructions (globals,
//! vtables) flush as they are passed; at each `EndFunc` the function range
//! gets its control-flow graph, its live sets, and its register assignment
//! before being flushed. The sink is either the external target-machine
//! emitter or the TAC text printer when tracing is on.

use crate::backend::dataflow::{analyze, collect_labels, Cfg};
use crate::backend::regalloc::allocate_function;
use crate::backend::tac::{Instruction, LocationTable, TacProgram};

/// Consumer of the finished TAC stream. The machine-code emitter lives
/// outside this crate and implements this trait.
pub trait TargetEmitter {
    fn emit(&mut self, instr: &Instruction, locs: &LocationTable);
}

/// Textual sink used when the `tac` trace flag is set.
#[derive(Debug, Default)]
pub struct TacPrinter {
    out: String,
}

impl TacPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_text(self) -> String {
        self.out
    }
}

impl TargetEmitter for TacPrinter {
    fn emit(&mut self, instr: &Instruction, locs: &LocationTable) {
        instr.print_to(locs, &mut self.out);
    }
}

/// Run the per-function analyses and feed the whole stream to `sink` in
/// emission order.
pub fn process_program(prog: &mut TacProgram, sink: &mut dyn TargetEmitter) {
    let labels = collect_labels(&prog.instrs);

    let mut cursor = 0;
    let mut begin = 0;
    let len = prog.instrs.len();

    for index in 0..len {
        if prog.instrs[index].is_begin_func() {
            // Top-level code accumulated since the previous function has no
            // per-function analysis
            flush(prog, cursor..index, sink);
            begin = index;
            cursor = index;
        } else if prog.instrs[index].is_end_func() {
            let cfg = Cfg::build(&prog.instrs, &labels, begin, index);
            let liveness = analyze(&prog.instrs, &cfg, begin, index);
            let prog_ref = &mut *prog;
            allocate_function(&prog_ref.instrs, &mut prog_ref.locs, &liveness, begin, index);
            flush(prog, begin..index, sink);
            cursor = index;
        }
    }
    flush(prog, cursor..len, sink);
}

fn flush(prog: &TacProgram, range: std::ops::Range<usize>, sink: &mut dyn TargetEmitter) {
    for index in range {
        sink.emit(&prog.instrs[index], &prog.locs);
    }
}
