//! Emission: the per-function analysis driver and the TAC text printer.

mod emitter;

pub use emitter::{process_program, TacPrinter, TargetEmitter};
