//! Register Definitions
//!
//! This module defines the general-purpose register pool of the 32-bit
//! target that the allocator colors against. Machine emission itself is the
//! target emitter's business; the middle-end only records which pool
//! register, if any, a location was assigned.

use std::fmt;

/// General-purpose registers available to the allocator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg {
    T0,
    T1,
    T2,
    T3,
    T4,
    T5,
    T6,
    T7,
    T8,
    T9,
    S0,
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
}

impl Reg {
    /// Registers available for allocation, in color order: color c maps to
    /// `ALLOCATABLE[c - 1]`, color 0 means memory-resident.
    pub const ALLOCATABLE: &'static [Reg] = &[
        Reg::T0,
        Reg::T1,
        Reg::T2,
        Reg::T3,
        Reg::T4,
        Reg::T5,
        Reg::T6,
        Reg::T7,
        Reg::T8,
        Reg::T9,
        Reg::S0,
        Reg::S1,
        Reg::S2,
        Reg::S3,
        Reg::S4,
        Reg::S5,
        Reg::S6,
        Reg::S7,
    ];

    /// Size of the allocatable pool (the k in k-coloring)
    pub const NUM_GENERAL_PURPOSE: usize = Self::ALLOCATABLE.len();
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Reg::T0 => "$t0",
            Reg::T1 => "$t1",
            Reg::T2 => "$t2",
            Reg::T3 => "$t3",
            Reg::T4 => "$t4",
            Reg::T5 => "$t5",
            Reg::T6 => "$t6",
            Reg::T7 => "$t7",
            Reg::T8 => "$t8",
            Reg::T9 => "$t9",
            Reg::S0 => "$s0",
            Reg::S1 => "$s1",
            Reg::S2 => "$s2",
            Reg::S3 => "$s3",
            Reg::S4 => "$s4",
            Reg::S5 => "$s5",
            Reg::S6 => "$s6",
            Reg::S7 => "$s7",
        };
        write!(f, "{}", name)
    }
}
