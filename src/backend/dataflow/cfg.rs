//! Control-flow construction over the linear TAC stream.
//!
//! Successors are instruction indices into the program's instruction
//! vector. Within a function range, every instruction falls through to the
//! next; `Goto` replaces the fall-through with its target, `IfZ` keeps both,
//! and `Return` has no successors.

use crate::backend::tac::Instruction;
use std::collections::HashMap;

/// Program-wide label-to-index map, built once after emission.
pub fn collect_labels(instrs: &[Instruction]) -> HashMap<String, usize> {
    let mut labels = HashMap::new();
    for (index, instr) in instrs.iter().enumerate() {
        if let Instruction::Label { name } = instr {
            labels.entry(name.clone()).or_insert(index);
        }
    }
    labels
}

/// Successor lists for one function range `[begin, end)`, where `begin` is
/// the `BeginFunc` index and `end` the matching `EndFunc` index.
#[derive(Clone, Debug)]
pub struct Cfg {
    begin: usize,
    succs: Vec<Vec<usize>>,
}

impl Cfg {
    pub fn build(
        instrs: &[Instruction],
        labels: &HashMap<String, usize>,
        begin: usize,
        end: usize,
    ) -> Cfg {
        let resolve = |target: &str| -> usize {
            *labels
                .get(target)
                .unwrap_or_else(|| panic!("undefined label: {}", target))
        };

        let mut succs = Vec::with_capacity(end - begin);
        for index in begin..end {
            let list = match &instrs[index] {
                Instruction::Goto { target } => vec![resolve(target)],
                Instruction::IfZ { target, .. } => vec![index + 1, resolve(target)],
                Instruction::Return { .. } | Instruction::EndFunc => Vec::new(),
                _ => vec![index + 1],
            };
            succs.push(list);
        }
        Cfg { begin, succs }
    }

    /// Successors of the instruction at absolute index `index`.
    pub fn succs(&self, index: usize) -> &[usize] {
        &self.succs[index - self.begin]
    }
}
