//! TAC builder.
//!
//! The builder owns the growing instruction list, the location table, and
//! the naming/slot counters. Label and temporary counters are program-wide;
//! the parameter and local counters reset at every `gen_end_func`, which is
//! what gives each function its own frame.

use crate::backend::tac::instr::{Instruction, TacOp};
use crate::backend::tac::location::{Loc, LocationTable, Segment};
use crate::backend::tac::TacProgram;
use crate::common::types::WORD_SIZE;

/// Frame offset of the first parameter (the receiver, for methods).
pub const OFFSET_TO_FIRST_PARAM: i32 = 4;
/// Frame offset of the first local or temporary slot.
pub const OFFSET_TO_FIRST_LOCAL: i32 = -8;
/// Global-segment offset of the first global slot.
pub const OFFSET_TO_FIRST_GLOBAL: i32 = 0;

/// Runtime support routines of the target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltIn {
    Alloc,
    ReadLine,
    ReadInteger,
    StringEqual,
    PrintInt,
    PrintString,
    PrintBool,
    Halt,
}

impl BuiltIn {
    pub fn label(self) -> &'static str {
        match self {
            BuiltIn::Alloc => "_Alloc",
            BuiltIn::ReadLine => "_ReadLine",
            BuiltIn::ReadInteger => "_ReadInteger",
            BuiltIn::StringEqual => "_StringEqual",
            BuiltIn::PrintInt => "_PrintInt",
            BuiltIn::PrintString => "_PrintString",
            BuiltIn::PrintBool => "_PrintBool",
            BuiltIn::Halt => "_Halt",
        }
    }

    pub fn num_args(self) -> usize {
        match self {
            BuiltIn::Alloc | BuiltIn::PrintInt | BuiltIn::PrintString | BuiltIn::PrintBool => 1,
            BuiltIn::StringEqual => 2,
            BuiltIn::ReadLine | BuiltIn::ReadInteger | BuiltIn::Halt => 0,
        }
    }

    pub fn has_return(self) -> bool {
        matches!(
            self,
            BuiltIn::Alloc | BuiltIn::ReadLine | BuiltIn::ReadInteger | BuiltIn::StringEqual
        )
    }
}

#[derive(Debug, Default)]
pub struct TacBuilder {
    instrs: Vec<Instruction>,
    locs: LocationTable,
    label_counter: u32,
    temp_counter: u32,
    global_counter: i32,
    param_counter: i32,
    local_counter: i32,
}

impl TacBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes of frame space used by the current function's locals and
    /// temporaries, for backpatching `BeginFunc`.
    pub fn frame_size(&self) -> i32 {
        WORD_SIZE * self.local_counter
    }

    /// Fresh branch label, `_L<n>`.
    pub fn new_label(&mut self) -> String {
        let label = format!("_L{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    // ------------------------------------------------------------------
    // Slot allocation
    // ------------------------------------------------------------------

    /// Fresh frame slot for a temporary, named `_tmp<n>`.
    pub fn temp_var(&mut self) -> Loc {
        let name = format!("_tmp{}", self.temp_counter);
        self.temp_counter += 1;
        let offset = OFFSET_TO_FIRST_LOCAL - WORD_SIZE * self.local_counter;
        self.local_counter += 1;
        self.locs.alloc(name, Segment::FpRelative, offset)
    }

    pub fn local_var(&mut self, name: &str) -> Loc {
        let offset = OFFSET_TO_FIRST_LOCAL - WORD_SIZE * self.local_counter;
        self.local_counter += 1;
        self.locs.alloc(name, Segment::FpRelative, offset)
    }

    pub fn global_var(&mut self, name: &str) -> Loc {
        let offset = OFFSET_TO_FIRST_GLOBAL + WORD_SIZE * self.global_counter;
        self.global_counter += 1;
        self.locs.alloc(name, Segment::GpRelative, offset)
    }

    pub fn param_var(&mut self, name: &str) -> Loc {
        let offset = OFFSET_TO_FIRST_PARAM + WORD_SIZE * self.param_counter;
        self.param_counter += 1;
        self.locs.alloc(name, Segment::FpRelative, offset)
    }

    /// A read of the receiver slot. Every use gets a fresh location over the
    /// same frame slot; identities stay distinct for liveness.
    pub fn this_var(&mut self) -> Loc {
        self.locs
            .alloc("this", Segment::FpRelative, OFFSET_TO_FIRST_PARAM)
    }

    // ------------------------------------------------------------------
    // Instruction emission
    // ------------------------------------------------------------------

    pub fn gen_load_const(&mut self, value: i32) -> Loc {
        let dst = self.temp_var();
        self.instrs.push(Instruction::LoadConst { dst, value });
        dst
    }

    pub fn gen_load_string(&mut self, value: &str) -> Loc {
        let dst = self.temp_var();
        self.instrs.push(Instruction::LoadStringConst {
            dst,
            value: value.to_string(),
        });
        dst
    }

    pub fn gen_load_label(&mut self, label: &str) -> Loc {
        let dst = self.temp_var();
        self.instrs.push(Instruction::LoadLabel {
            dst,
            label: label.to_string(),
        });
        dst
    }

    pub fn gen_assign(&mut self, dst: Loc, src: Loc) {
        self.instrs.push(Instruction::Assign { dst, src });
    }

    pub fn gen_load(&mut self, src: Loc, offset: i32) -> Loc {
        let dst = self.temp_var();
        self.instrs.push(Instruction::Load { dst, src, offset });
        dst
    }

    pub fn gen_store(&mut self, dst: Loc, src: Loc, offset: i32) {
        self.instrs.push(Instruction::Store { dst, src, offset });
    }

    pub fn gen_binop(&mut self, op: TacOp, a: Loc, b: Loc) -> Loc {
        let dst = self.temp_var();
        self.instrs.push(Instruction::BinOp { op, dst, a, b });
        dst
    }

    pub fn gen_label(&mut self, name: &str) {
        self.instrs.push(Instruction::Label {
            name: name.to_string(),
        });
    }

    pub fn gen_goto(&mut self, target: &str) {
        self.instrs.push(Instruction::Goto {
            target: target.to_string(),
        });
    }

    pub fn gen_ifz(&mut self, cond: Loc, target: &str) {
        self.instrs.push(Instruction::IfZ {
            cond,
            target: target.to_string(),
        });
    }

    pub fn gen_return(&mut self, value: Option<Loc>) {
        self.instrs.push(Instruction::Return { value });
    }

    /// Emit a `BeginFunc` placeholder and return its index for frame-size
    /// backpatching.
    pub fn gen_begin_func(&mut self) -> usize {
        self.instrs.push(Instruction::BeginFunc { frame_size: 0 });
        self.instrs.len() - 1
    }

    /// Backpatch the frame size recorded by [`Self::gen_begin_func`].
    pub fn patch_frame_size(&mut self, begin_index: usize) {
        let size = self.frame_size();
        match &mut self.instrs[begin_index] {
            Instruction::BeginFunc { frame_size } => *frame_size = size,
            other => panic!("frame-size patch target is {:?}, not BeginFunc", other),
        }
    }

    /// Close the current function and reset its frame counters.
    pub fn gen_end_func(&mut self) {
        self.instrs.push(Instruction::EndFunc);
        self.local_counter = 0;
        self.param_counter = 0;
    }

    pub fn gen_push_param(&mut self, param: Loc) {
        self.instrs.push(Instruction::PushParam { param });
    }

    pub fn gen_pop_params(&mut self, bytes: i32) {
        assert!(bytes >= 0 && bytes % WORD_SIZE == 0, "bad param pop: {}", bytes);
        if bytes > 0 {
            self.instrs.push(Instruction::PopParams { bytes });
        }
    }

    pub fn gen_lcall(&mut self, label: &str, has_return: bool) -> Option<Loc> {
        let dst = has_return.then(|| self.temp_var());
        self.instrs.push(Instruction::LCall {
            label: label.to_string(),
            dst,
        });
        dst
    }

    pub fn gen_acall(&mut self, addr: Loc, has_return: bool) -> Option<Loc> {
        let dst = has_return.then(|| self.temp_var());
        self.instrs.push(Instruction::ACall { addr, dst });
        dst
    }

    /// Call a runtime builtin. Arguments are pushed second-first so the
    /// leftmost ends up on top of the parameter stack.
    pub fn gen_builtin_call(
        &mut self,
        builtin: BuiltIn,
        arg1: Option<Loc>,
        arg2: Option<Loc>,
    ) -> Option<Loc> {
        let num_args = builtin.num_args();
        assert!(
            (num_args == 0 && arg1.is_none() && arg2.is_none())
                || (num_args == 1 && arg1.is_some() && arg2.is_none())
                || (num_args == 2 && arg1.is_some() && arg2.is_some()),
            "wrong arguments for builtin {}",
            builtin.label()
        );
        if let Some(arg2) = arg2 {
            self.gen_push_param(arg2);
        }
        if let Some(arg1) = arg1 {
            self.gen_push_param(arg1);
        }
        let result = self.gen_lcall(builtin.label(), builtin.has_return());
        self.gen_pop_params(WORD_SIZE * num_args as i32);
        result
    }

    pub fn gen_vtable(&mut self, class: &str, methods: Vec<String>) {
        self.instrs.push(Instruction::VTable {
            class: class.to_string(),
            methods,
        });
    }

    pub fn finish(self) -> TacProgram {
        TacProgram {
            instrs: self.instrs,
            locs: self.locs,
        }
    }
}
