/*
This code is part of the FlowNet drainage-network analysis library.
Created: 17/03/2025
Last Modified: 21/07/2025
License: MIT
*/

pub mod accumulation;
pub mod catchment;
pub mod catchment_metric;
pub mod distance;
pub mod length;
pub mod metrics;
pub mod movement;
pub mod streamorder;
pub mod zonal;

pub use self::accumulation::{flow_downstream, flow_upstream, upstream_points, AccumulateOptions};
pub use self::catchment::{fill_catchments, find_catchments, find_subcatchments, FillMode};
pub use self::catchment_metric::{calculate_catchment_metric, calculate_subcatchment_metric};
pub use self::distance::compute_distance;
pub use self::length::{max_length, min_length};
pub use self::metrics::{calculate_upstream_metric, Metric};
pub use self::movement::{move_downstream, move_upstream};
pub use self::streamorder::compute_streamorder;
pub use self::zonal::calculate_metric_for_labels;

use crate::error::{FlowError, Result};
use crate::field::{Element, NodeField};
use crate::network::RiverNetwork;

/// Every operator starts by pinning the field's node axis to the network.
pub(crate) fn check_node_field<T: Element>(
    net: &RiverNetwork,
    field: &NodeField<T>,
) -> Result<()> {
    if field.nodes() != net.n_nodes() {
        return Err(FlowError::ShapeMismatch {
            expected: (net.n_nodes(), field.lanes()),
            found: (field.nodes(), field.lanes()),
        });
    }
    Ok(())
}

/// Per-node weights are a single lane broadcast over the field's lanes.
pub(crate) fn check_weights<T: Element>(
    net: &RiverNetwork,
    weights: &NodeField<T>,
) -> Result<()> {
    if weights.nodes() != net.n_nodes() || weights.lanes() != 1 {
        return Err(FlowError::ShapeMismatch {
            expected: (net.n_nodes(), 1),
            found: (weights.nodes(), weights.lanes()),
        });
    }
    Ok(())
}
