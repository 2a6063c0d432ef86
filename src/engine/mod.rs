/*
This code is part of the FlowNet drainage-network analysis library.
Created: 17/03/2025
Last Modified: 21/07/2025
License: MIT
*/

use crate::field::{Element, NodeField};
use crate::network::RiverNetwork;

/// The direction of a grouped sweep, named after the direction of flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Sources towards sinks; predecessors of a node are visited strictly
    /// before it.
    Downstream,
    /// Sinks towards sources; the successor of a node is finalised before
    /// the node is visited.
    Upstream,
}

/// The single point of control for every operator: one monotone pass over
/// the topological groups, applying a node-wise kernel to each group. The
/// last group holds the sinks and is skipped in both directions - sinks
/// have no successor edge to write through, and reverse kernels read them
/// as already-final boundary values.
///
/// Within one group, distinct nodes may share a downstream target, so
/// kernels that write through the successor edge must combine collisions
/// with an associative, commutative reduction. That is the only contract
/// the engine imposes.
pub fn sweep<T, F>(net: &RiverNetwork, field: &mut NodeField<T>, direction: Direction, mut kernel: F)
where
    F: FnMut(&RiverNetwork, &mut NodeField<T>, &[usize]),
{
    let groups = net.groups();
    let count = groups.count();
    if count < 2 {
        // nothing upstream of the sinks
        return;
    }
    match direction {
        Direction::Downstream => {
            for level in 0..count - 1 {
                kernel(net, field, groups.group(level));
            }
        }
        Direction::Upstream => {
            for level in (0..count - 1).rev() {
                kernel(net, field, groups.group(level));
            }
        }
    }
}

/// The reduction applied where several values land on one cell. Kept as a
/// tagged variant so callers can match on it once per group and run a
/// monomorphic inner loop, rather than paying for dispatch per element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reducer {
    Sum,
    Product,
    Max,
    Min,
}

impl Reducer {
    /// The value that leaves the reduction unchanged: 0, 1, -inf/MIN,
    /// +inf/MAX respectively.
    pub fn identity<T: Element>(self) -> T {
        match self {
            Reducer::Sum => T::zero(),
            Reducer::Product => T::one(),
            Reducer::Max => T::max_identity(),
            Reducer::Min => T::min_identity(),
        }
    }

    /// Folds one incoming value into the current one. Max and Min
    /// propagate NaN explicitly so the NaN fast path for missing values
    /// behaves like the arithmetic reducers.
    #[inline]
    pub fn apply<T: Element>(self, current: T, incoming: T) -> T {
        match self {
            Reducer::Sum => current + incoming,
            Reducer::Product => current * incoming,
            Reducer::Max => {
                if incoming.is_nan() {
                    incoming
                } else if incoming > current {
                    incoming
                } else {
                    current
                }
            }
            Reducer::Min => {
                if incoming.is_nan() {
                    incoming
                } else if incoming < current {
                    incoming
                } else {
                    current
                }
            }
        }
    }
}
