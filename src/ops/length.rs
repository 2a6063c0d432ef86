/*
This code is part of the FlowNet drainage-network analysis library.
Created: 20/03/2025
Last Modified: 21/07/2025
License: MIT
*/

use super::accumulation::{flow_downstream, flow_upstream, AccumulateOptions};
use super::check_weights;
use crate::engine::Reducer;
use crate::error::{FlowError, Result};
use crate::field::NodeField;
use crate::network::RiverNetwork;

/// Shortest weighted path length from a set of starting nodes. Each start
/// is seeded with its own weight; travelling through node `i` adds `w[i]`
/// (default 1). Direction flags choose whether lengths run with the flow,
/// against it, or both. Nodes no path reaches come back as `mv`.
pub fn min_length(
    net: &RiverNetwork,
    points: &[usize],
    weights: Option<&NodeField<f64>>,
    downstream: bool,
    upstream: bool,
    mv: f64,
) -> Result<NodeField<f64>> {
    path_length(net, points, weights, downstream, upstream, mv, Reducer::Min)
}

/// Longest weighted path length from a set of starting nodes. Lengths in
/// both directions at once are not defined for the maximum (a path could
/// double back through a confluence), so that combination is rejected.
pub fn max_length(
    net: &RiverNetwork,
    points: &[usize],
    weights: Option<&NodeField<f64>>,
    downstream: bool,
    upstream: bool,
    mv: f64,
) -> Result<NodeField<f64>> {
    if downstream && upstream {
        return Err(FlowError::Unsupported(
            "maximum path length in both directions is not implemented".to_string(),
        ));
    }
    path_length(net, points, weights, downstream, upstream, mv, Reducer::Max)
}

fn path_length(
    net: &RiverNetwork,
    points: &[usize],
    weights: Option<&NodeField<f64>>,
    downstream: bool,
    upstream: bool,
    mv: f64,
    op: Reducer,
) -> Result<NodeField<f64>> {
    let n = net.n_nodes();
    if let Some(w) = weights {
        check_weights(net, w)?;
    }
    for &p in points {
        if p >= n {
            return Err(FlowError::InvalidStation(p));
        }
    }

    let ones;
    let w = match weights {
        Some(w) => w,
        None => {
            ones = NodeField::filled(n, 1, 1.0);
            &ones
        }
    };

    let mut field = NodeField::filled(n, 1, op.identity::<f64>());
    for &p in points {
        field.set(p, 0, w.at(p, 0));
    }

    let opts = AccumulateOptions {
        op,
        weights: Some(w),
        accept_missing: true,
    };
    if downstream {
        field = flow_downstream(net, field, f64::NAN, &opts)?;
    }
    if upstream {
        field = flow_upstream(net, field, f64::NAN, &opts)?;
    }

    // anything still at the reducer identity was never reached
    for v in field.data_mut() {
        if v.is_infinite() {
            *v = mv;
        }
    }
    Ok(field)
}
