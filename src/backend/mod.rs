//! Backend of the Oriole middle-end.
//!
//! Translates the typed AST into three-address code and prepares it for the
//! external target-machine emitter.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌──────────────────────┐
//! │   Typed AST     │────▶│  TAC Lowering   │────▶│  Per-function passes │
//! │   (TProgram)    │     │  (TacBuilder)   │     │  CFG → live → color  │
//! └─────────────────┘     └─────────────────┘     └──────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `tac`: locations, instructions, and the TAC builder
//! - `lower`: typed-AST to TAC translation
//! - `dataflow`: control-flow construction and live-variable analysis
//! - `regalloc`: interference graph and k-coloring over the register pool
//! - `emit`: the driver interleaving analysis and emission

pub mod dataflow;
pub mod emit;
pub mod lower;
pub mod regalloc;
pub mod tac;

// Re-export commonly used types
pub use emit::{process_program, TacPrinter, TargetEmitter};
pub use lower::lower_program;
pub use tac::{Instruction, Loc, LocationTable, TacBuilder, TacProgram};
