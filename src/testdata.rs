/*
This code is part of the FlowNet drainage-network analysis library.
Created: 17/03/2025
Last Modified: 14/07/2025
License: MIT
*/

//! Shared fixtures: a 4x5 reference grid expressed in all three drainage
//! encodings, with its known successor array and upstream cell counts.
//!
//! The grid drains like this (row-major cell ids, sink at 16):
//!
//! ```text
//!  0  1  2  3  4
//!  5  6  7  8  9
//! 10 11 12 13 14
//! 15 16 17 18 19
//! ```

use crate::network::{DomainMask, RiverNetwork};

pub const D8_CODES: [u8; 20] = [
    2, 2, 2, 1, 1, //
    2, 2, 2, 1, 1, //
    3, 2, 1, 4, 4, //
    6, 5, 4, 4, 4,
];

pub const CAMA_DX: [i32; 20] = [
    0, 0, 0, -1, -1, //
    0, 0, 0, -1, -1, //
    1, 0, -1, -1, -1, //
    1, -999, -1, -1, -1,
];

pub const CAMA_DY: [i32; 20] = [
    1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, //
    1, 1, 1, 0, 0, //
    0, -999, 0, 0, 0,
];

pub const CAMA_NEXTX: [i32; 20] = [
    1, 2, 3, 3, 4, //
    1, 2, 3, 3, 4, //
    2, 2, 2, 3, 4, //
    2, -10, 2, 3, 4,
];

pub const CAMA_NEXTY: [i32; 20] = [
    2, 2, 2, 2, 2, //
    3, 3, 3, 3, 3, //
    4, 4, 4, 3, 3, //
    4, -10, 4, 4, 4,
];

/// The successor array all three encodings decode to; 20 is the sink
/// sentinel.
pub const DOWNSTREAM: [usize; 20] = [
    5, 6, 7, 7, 8, 10, 11, 12, 12, 13, 16, 16, 16, 12, 13, 16, 20, 16, 17, 18,
];

/// `flow_downstream(Sum, ones)` on the reference grid.
pub const UPSTREAM_POINTS: [i64; 20] = [
    1, 1, 1, 1, 1, 2, 2, 3, 2, 1, 3, 3, 9, 3, 1, 1, 20, 3, 2, 1,
];

pub fn network4x5() -> RiverNetwork {
    RiverNetwork::from_downstream(DOWNSTREAM.to_vec(), DomainMask::full(4, 5)).unwrap()
}

/// A pure chain 0 -> 1 -> ... -> n-1, the last node a sink.
pub fn chain(n: usize) -> RiverNetwork {
    let downstream: Vec<usize> = (1..=n).collect();
    RiverNetwork::from_downstream(downstream, DomainMask::full(1, n)).unwrap()
}
