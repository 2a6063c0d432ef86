/*
This code is part of the FlowNet drainage-network analysis library.
Created: 18/03/2025
Last Modified: 14/07/2025
License: MIT
*/

use super::check_node_field;
use crate::engine::Reducer;
use crate::error::Result;
use crate::field::{check_missing, is_missing, Element, NodeField};
use crate::network::RiverNetwork;

/// Moves every value one step with the flow: each node of the output holds
/// the reduction of its immediate upstream neighbours' values. The output
/// is a fresh zero-initialised field; sources stay at zero. A single pass
/// suffices because values travel exactly one edge.
pub fn move_downstream<T: Element>(
    net: &RiverNetwork,
    field: &NodeField<T>,
    mv: T,
    op: Reducer,
    accept_missing: bool,
) -> Result<NodeField<T>> {
    check_node_field(net, field)?;
    let missing = check_missing(field, mv, accept_missing)?;

    let n = net.n_nodes();
    let lanes = field.lanes();
    let downstream = net.downstream();
    let mut out = NodeField::filled(n, lanes, T::zero());

    match op {
        Reducer::Sum => shift_down(field, &mut out, downstream, n, |a, b| a + b),
        Reducer::Product => shift_down(field, &mut out, downstream, n, |a, b| a * b),
        Reducer::Max => shift_down(field, &mut out, downstream, n, |a, b| {
            if b.is_nan() {
                b
            } else if b > a {
                b
            } else {
                a
            }
        }),
        Reducer::Min => shift_down(field, &mut out, downstream, n, |a, b| {
            if b.is_nan() {
                b
            } else if b < a {
                b
            } else {
                a
            }
        }),
    }

    if missing && !mv.is_nan() {
        // a missing contributor poisons its target
        for i in 0..n {
            let d = downstream[i];
            if d == n {
                continue;
            }
            for lane in 0..lanes {
                if is_missing(field.at(i, lane), mv) {
                    out.set(d, lane, mv);
                }
            }
        }
    }
    Ok(out)
}

#[inline]
fn shift_down<T: Element, F: Fn(T, T) -> T>(
    field: &NodeField<T>,
    out: &mut NodeField<T>,
    downstream: &[usize],
    n: usize,
    combine: F,
) {
    let lanes = field.lanes();
    for i in 0..n {
        let d = downstream[i];
        if d == n {
            continue;
        }
        for lane in 0..lanes {
            out.set(d, lane, combine(out.at(d, lane), field.at(i, lane)));
        }
    }
}

/// Moves every value one step against the flow: each node of the output
/// takes its downstream neighbour's value. Sinks have nothing downstream
/// and stay at zero.
pub fn move_upstream<T: Element>(
    net: &RiverNetwork,
    field: &NodeField<T>,
    mv: T,
    accept_missing: bool,
) -> Result<NodeField<T>> {
    check_node_field(net, field)?;
    check_missing(field, mv, accept_missing)?;

    let n = net.n_nodes();
    let lanes = field.lanes();
    let downstream = net.downstream();
    let mut out = NodeField::filled(n, lanes, T::zero());
    for i in 0..n {
        let d = downstream[i];
        if d == n {
            continue;
        }
        for lane in 0..lanes {
            out.set(i, lane, field.at(d, lane));
        }
    }
    Ok(out)
}
