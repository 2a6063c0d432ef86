/*
This code is part of the FlowNet drainage-network analysis library.
Created: 17/03/2025
Last Modified: 21/07/2025
License: MIT
*/

use super::{check_node_field, check_weights};
use crate::engine::{sweep, Direction, Reducer};
use crate::error::Result;
use crate::field::{check_missing, is_missing, Element, NodeField};
use crate::network::RiverNetwork;

/// The per-call configuration of an accumulation sweep. Additive weights
/// turn the reduction into a path-length recurrence: with `Min` and a
/// weight array `w`, a forward sweep computes
/// `field[d] = min(field[d], field[i] + w[i])`.
pub struct AccumulateOptions<'a, T> {
    pub op: Reducer,
    pub weights: Option<&'a NodeField<T>>,
    pub accept_missing: bool,
}

impl<'a, T> Default for AccumulateOptions<'a, T> {
    fn default() -> AccumulateOptions<'a, T> {
        AccumulateOptions {
            op: Reducer::Sum,
            weights: None,
            accept_missing: false,
        }
    }
}

/// Accumulates a field from sources towards sinks: every node folds its
/// value into its single downstream neighbour, group by group, so each
/// node ends up holding the reduction over everything that drains to it
/// (itself included, for `Sum` on a field of ones this is the upstream
/// cell count).
///
/// The field is consumed and returned; callers that need the input
/// afterwards clone it first.
///
/// Missing values: a NaN sentinel rides through the arithmetic untouched
/// (the fast path). Any other sentinel engages an explicit per-group
/// discipline in which an accumulation that consumes or targets a missing
/// cell yields a missing cell.
pub fn flow_downstream<T: Element>(
    net: &RiverNetwork,
    field: NodeField<T>,
    mv: T,
    opts: &AccumulateOptions<T>,
) -> Result<NodeField<T>> {
    flow(net, field, mv, opts, Direction::Downstream)
}

/// The reverse accumulation: every node folds its downstream neighbour's
/// value (plus its own additive weight) into itself. With `Min` this is
/// the second phase of shortest-path-length computation.
pub fn flow_upstream<T: Element>(
    net: &RiverNetwork,
    field: NodeField<T>,
    mv: T,
    opts: &AccumulateOptions<T>,
) -> Result<NodeField<T>> {
    flow(net, field, mv, opts, Direction::Upstream)
}

fn flow<T: Element>(
    net: &RiverNetwork,
    mut field: NodeField<T>,
    mv: T,
    opts: &AccumulateOptions<T>,
    direction: Direction,
) -> Result<NodeField<T>> {
    check_node_field(net, &field)?;
    if let Some(weights) = opts.weights {
        check_weights(net, weights)?;
    }
    let missing = check_missing(&field, mv, opts.accept_missing)?;
    let use_sentinel = missing && !mv.is_nan();

    let mut flags: Vec<bool> = Vec::new();
    sweep(net, &mut field, direction, |net, field, group| {
        if use_sentinel {
            accumulate_group_sentinel(net, field, group, mv, opts, direction, &mut flags);
        } else {
            accumulate_group(net, field, group, opts, direction);
        }
    });
    Ok(field)
}

fn accumulate_group<T: Element>(
    net: &RiverNetwork,
    field: &mut NodeField<T>,
    group: &[usize],
    opts: &AccumulateOptions<T>,
    direction: Direction,
) {
    // hoist the operator match out of the per-element loop
    match opts.op {
        Reducer::Sum => fold_group(net, field, group, opts.weights, direction, |a, b| a + b),
        Reducer::Product => fold_group(net, field, group, opts.weights, direction, |a, b| a * b),
        Reducer::Max => fold_group(net, field, group, opts.weights, direction, |a, b| {
            if b.is_nan() {
                b
            } else if b > a {
                b
            } else {
                a
            }
        }),
        Reducer::Min => fold_group(net, field, group, opts.weights, direction, |a, b| {
            if b.is_nan() {
                b
            } else if b < a {
                b
            } else {
                a
            }
        }),
    }
}

#[inline]
fn fold_group<T: Element, F: Fn(T, T) -> T>(
    net: &RiverNetwork,
    field: &mut NodeField<T>,
    group: &[usize],
    weights: Option<&NodeField<T>>,
    direction: Direction,
    combine: F,
) {
    let lanes = field.lanes();
    let downstream = net.downstream();
    for &i in group {
        let d = downstream[i];
        debug_assert!(d != net.n_nodes(), "sink in a non-terminal group");
        let w = weights.map(|w| w.at(i, 0));
        for lane in 0..lanes {
            match direction {
                Direction::Downstream => {
                    let mut v = field.at(i, lane);
                    if let Some(w) = w {
                        v = v + w;
                    }
                    field.set(d, lane, combine(field.at(d, lane), v));
                }
                Direction::Upstream => {
                    let mut v = field.at(d, lane);
                    if let Some(w) = w {
                        v = v + w;
                    }
                    field.set(i, lane, combine(field.at(i, lane), v));
                }
            }
        }
    }
}

/// The non-NaN sentinel discipline. Flags are decided for the whole group
/// from pre-update values, then the reduction runs, then flagged targets
/// are stamped with the sentinel, so two nodes sharing a target cannot
/// re-enter the reduction with a freshly written sentinel.
fn accumulate_group_sentinel<T: Element>(
    net: &RiverNetwork,
    field: &mut NodeField<T>,
    group: &[usize],
    mv: T,
    opts: &AccumulateOptions<T>,
    direction: Direction,
    flags: &mut Vec<bool>,
) {
    let lanes = field.lanes();
    let downstream = net.downstream();

    flags.clear();
    flags.resize(group.len() * lanes, false);
    for (gi, &i) in group.iter().enumerate() {
        let d = downstream[i];
        for lane in 0..lanes {
            flags[gi * lanes + lane] =
                is_missing(field.at(i, lane), mv) || is_missing(field.at(d, lane), mv);
        }
    }

    accumulate_group(net, field, group, opts, direction);

    for (gi, &i) in group.iter().enumerate() {
        let d = downstream[i];
        let target = match direction {
            Direction::Downstream => d,
            Direction::Upstream => i,
        };
        for lane in 0..lanes {
            if flags[gi * lanes + lane] {
                field.set(target, lane, mv);
            }
        }
    }
}

/// The number of nodes draining through each node, itself included:
/// a sum accumulation over a field of ones.
pub fn upstream_points(net: &RiverNetwork) -> Result<NodeField<i64>> {
    let ones = NodeField::filled(net.n_nodes(), 1, 1i64);
    flow_downstream(net, ones, i64::MIN, &AccumulateOptions::default())
}
