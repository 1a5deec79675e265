//! Live-variable analysis.
//!
//! Standard backward fixed point over the per-instruction Gen/Kill sets:
//!
//! - out(i) = union of in(s) over the successors s of i
//! - in(i)  = gen(i) ∪ (out(i) \ kill(i))
//!
//! Sets are exact on [`Loc`] identity: two temporaries sharing a frame slot
//! remain distinct variables. Termination follows from the sets being
//! finite and the transfer function monotone.

use crate::backend::dataflow::cfg::Cfg;
use crate::backend::tac::{Instruction, Loc};
use std::collections::HashSet;

/// Per-instruction live sets for one function range `[begin, end)`.
#[derive(Clone, Debug)]
pub struct Liveness {
    begin: usize,
    end: usize,
    live_in: Vec<HashSet<Loc>>,
    live_out: Vec<HashSet<Loc>>,
}

impl Liveness {
    pub fn live_in(&self, index: usize) -> &HashSet<Loc> {
        &self.live_in[index - self.begin]
    }

    pub fn live_out(&self, index: usize) -> &HashSet<Loc> {
        &self.live_out[index - self.begin]
    }

    /// One transfer step for the instruction at `index`; true when either
    /// set changed. Exposed so tests can verify the fixed point.
    pub fn update(&mut self, instrs: &[Instruction], cfg: &Cfg, index: usize) -> bool {
        let mut out = HashSet::new();
        for &succ in cfg.succs(index) {
            if succ < self.end {
                out.extend(self.live_in[succ - self.begin].iter().copied());
            }
        }

        let instr = &instrs[index];
        let mut live_in: HashSet<Loc> = out.clone();
        for loc in instr.kill() {
            live_in.remove(&loc);
        }
        for loc in instr.gen() {
            live_in.insert(loc);
        }

        let slot = index - self.begin;
        let changed = live_in != self.live_in[slot] || out != self.live_out[slot];
        self.live_in[slot] = live_in;
        self.live_out[slot] = out;
        changed
    }
}

/// Iterate the transfer function over `[begin, end)` until no set changes.
pub fn analyze(instrs: &[Instruction], cfg: &Cfg, begin: usize, end: usize) -> Liveness {
    let len = end - begin;
    let mut liveness = Liveness {
        begin,
        end,
        live_in: vec![HashSet::new(); len],
        live_out: vec![HashSet::new(); len],
    };

    let mut changed = true;
    while changed {
        changed = false;
        for index in begin..end {
            if liveness.update(instrs, cfg, index) {
                changed = true;
            }
        }
    }
    liveness
}
