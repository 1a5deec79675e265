//! TAC instructions.
//!
//! Each variant is a small record over [`Loc`] operands. Instructions answer
//! two dataflow queries, [`Instruction::gen`] and [`Instruction::kill`], and
//! render themselves into the canonical TAC text via
//! [`Instruction::print_to`]. Successor lists and live sets live in the
//! per-function analysis structures, keyed by instruction index.

use crate::backend::tac::location::{Loc, LocationTable};
use std::fmt;

/// Operators of the three-address `BinOp` instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TacOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Less,
    Equal,
    And,
    Or,
}

impl fmt::Display for TacOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tok = match self {
            TacOp::Add => "+",
            TacOp::Sub => "-",
            TacOp::Mul => "*",
            TacOp::Div => "/",
            TacOp::Mod => "%",
            TacOp::Less => "<",
            TacOp::Equal => "==",
            TacOp::And => "&&",
            TacOp::Or => "||",
        };
        write!(f, "{}", tok)
    }
}

#[derive(Clone, Debug)]
pub enum Instruction {
    LoadConst {
        dst: Loc,
        value: i32,
    },
    LoadStringConst {
        dst: Loc,
        value: String,
    },
    LoadLabel {
        dst: Loc,
        label: String,
    },
    Assign {
        dst: Loc,
        src: Loc,
    },
    /// dst = *(src + offset)
    Load {
        dst: Loc,
        src: Loc,
        offset: i32,
    },
    /// *(dst + offset) = src
    Store {
        dst: Loc,
        src: Loc,
        offset: i32,
    },
    BinOp {
        op: TacOp,
        dst: Loc,
        a: Loc,
        b: Loc,
    },
    Label {
        name: String,
    },
    Goto {
        target: String,
    },
    IfZ {
        cond: Loc,
        target: String,
    },
    /// Frame size is backpatched once the function body has been emitted
    BeginFunc {
        frame_size: i32,
    },
    EndFunc,
    Return {
        value: Option<Loc>,
    },
    PushParam {
        param: Loc,
    },
    PopParams {
        bytes: i32,
    },
    LCall {
        label: String,
        dst: Option<Loc>,
    },
    ACall {
        addr: Loc,
        dst: Option<Loc>,
    },
    /// Per-class table of method code labels, in slot order
    VTable {
        class: String,
        methods: Vec<String>,
    },
}

impl Instruction {
    /// Locations this instruction reads.
    ///
    /// A store writes through a pointer: it reads both the address operand
    /// and the value, and defines nothing. A return consumes its value as a
    /// last use.
    pub fn gen(&self) -> Vec<Loc> {
        match self {
            Instruction::Assign { src, .. } => vec![*src],
            Instruction::Load { src, .. } => vec![*src],
            Instruction::Store { dst, src, .. } => vec![*dst, *src],
            Instruction::BinOp { a, b, .. } => vec![*a, *b],
            Instruction::IfZ { cond, .. } => vec![*cond],
            Instruction::PushParam { param } => vec![*param],
            Instruction::ACall { addr, .. } => vec![*addr],
            Instruction::Return { value } => value.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Locations this instruction defines.
    pub fn kill(&self) -> Vec<Loc> {
        match self {
            Instruction::LoadConst { dst, .. } => vec![*dst],
            Instruction::LoadStringConst { dst, .. } => vec![*dst],
            Instruction::LoadLabel { dst, .. } => vec![*dst],
            Instruction::Assign { dst, .. } => vec![*dst],
            Instruction::Load { dst, .. } => vec![*dst],
            Instruction::BinOp { dst, .. } => vec![*dst],
            Instruction::LCall { dst, .. } => dst.iter().copied().collect(),
            Instruction::ACall { dst, .. } => dst.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    /// True for the instructions that delimit a function range.
    pub fn is_begin_func(&self) -> bool {
        matches!(self, Instruction::BeginFunc { .. })
    }

    pub fn is_end_func(&self) -> bool {
        matches!(self, Instruction::EndFunc)
    }

    /// Render the canonical text form of this instruction, with a trailing
    /// newline. Labels sit flush left; everything else is indented.
    pub fn print_to(&self, locs: &LocationTable, out: &mut String) {
        let name = |loc: &Loc| locs.name(*loc).to_string();
        match self {
            Instruction::Label { name } => {
                out.push_str(name);
                out.push_str(":\n");
                return;
            }
            Instruction::VTable { class, methods } => {
                out.push_str(&format!("VTable {} =\n", class));
                for method in methods {
                    out.push_str(&format!("  {}\n", method));
                }
                return;
            }
            _ => {}
        }

        out.push_str("  ");
        match self {
            Instruction::LoadConst { dst, value } => {
                out.push_str(&format!("{} = {}", name(dst), value));
            }
            Instruction::LoadStringConst { dst, value } => {
                out.push_str(&format!("{} = \"{}\"", name(dst), escape(value)));
            }
            Instruction::LoadLabel { dst, label } => {
                out.push_str(&format!("{} = {}", name(dst), label));
            }
            Instruction::Assign { dst, src } => {
                out.push_str(&format!("{} = {}", name(dst), name(src)));
            }
            Instruction::Load { dst, src, offset } => {
                if *offset != 0 {
                    out.push_str(&format!("{} = *({} + {})", name(dst), name(src), offset));
                } else {
                    out.push_str(&format!("{} = *({})", name(dst), name(src)));
                }
            }
            Instruction::Store { dst, src, offset } => {
                if *offset != 0 {
                    out.push_str(&format!("*({} + {}) = {}", name(dst), offset, name(src)));
                } else {
                    out.push_str(&format!("*({}) = {}", name(dst), name(src)));
                }
            }
            Instruction::BinOp { op, dst, a, b } => {
                out.push_str(&format!("{} = {} {} {}", name(dst), name(a), op, name(b)));
            }
            Instruction::Goto { target } => {
                out.push_str(&format!("Goto {}", target));
            }
            Instruction::IfZ { cond, target } => {
                out.push_str(&format!("IfZ {} Goto {}", name(cond), target));
            }
            Instruction::BeginFunc { frame_size } => {
                out.push_str(&format!("BeginFunc {}", frame_size));
            }
            Instruction::EndFunc => {
                out.push_str("EndFunc");
            }
            Instruction::Return { value } => match value {
                Some(value) => out.push_str(&format!("Return {}", name(value))),
                None => out.push_str("Return"),
            },
            Instruction::PushParam { param } => {
                out.push_str(&format!("PushParam {}", name(param)));
            }
            Instruction::PopParams { bytes } => {
                out.push_str(&format!("PopParams {}", bytes));
            }
            Instruction::LCall { label, dst } => match dst {
                Some(dst) => out.push_str(&format!("{} = LCall {}", name(dst), label)),
                None => out.push_str(&format!("LCall {}", label)),
            },
            Instruction::ACall { addr, dst } => match dst {
                Some(dst) => out.push_str(&format!("{} = ACall {}", name(dst), name(addr))),
                None => out.push_str(&format!("ACall {}", name(addr))),
            },
            Instruction::Label { .. } | Instruction::VTable { .. } => unreachable!(),
        }
        out.push('\n');
    }
}

/// Escape a string constant for the text rendering.
fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
        .replace('"', "\\\"")
}
