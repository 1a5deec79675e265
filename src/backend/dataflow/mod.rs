//! Per-function dataflow: control-flow construction and live-variable
//! analysis over the linear TAC stream.

pub mod cfg;
pub mod liveness;

pub use cfg::{collect_labels, Cfg};
pub use liveness::{analyze, Liveness};
