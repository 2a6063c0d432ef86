/*
This code is part of the FlowNet drainage-network analysis library.
Created: 21/03/2025
Last Modified: 21/07/2025
License: MIT
*/

use super::catchment::find_subcatchments;
use super::metrics::{calculate_upstream_metric, Metric};
use super::zonal::calculate_metric_for_labels;
use crate::error::{FlowError, Result};
use crate::field::{Element, NodeField};
use crate::network::RiverNetwork;
use std::collections::BTreeMap;

fn check_stations(net: &RiverNetwork, stations: &[usize]) -> Result<()> {
    for &s in stations {
        if s >= net.n_nodes() {
            return Err(FlowError::InvalidStation(s));
        }
    }
    Ok(())
}

/// The upstream metric read off at a set of station nodes: one value per
/// station, reduced over everything draining through it.
pub fn calculate_catchment_metric<T: Element>(
    net: &RiverNetwork,
    field: &NodeField<T>,
    stations: &[usize],
    metric: Metric,
    weights: Option<&NodeField<f64>>,
    mv: T,
    accept_missing: bool,
) -> Result<BTreeMap<usize, f64>> {
    check_stations(net, stations)?;
    if field.lanes() != 1 {
        return Err(FlowError::ShapeMismatch {
            expected: (net.n_nodes(), 1),
            found: (field.nodes(), field.lanes()),
        });
    }
    let upstream = calculate_upstream_metric(net, field, metric, weights, mv, accept_missing)?;
    Ok(stations.iter().map(|&s| (s, upstream.at(s, 0))).collect())
}

/// The metric reduced over each station's subcatchment: the nodes that
/// drain to the station without passing another station first. Stations
/// are turned into labels, labelled upstream with the non-overwriting
/// fill, and reduced zonally.
pub fn calculate_subcatchment_metric<T: Element>(
    net: &RiverNetwork,
    field: &NodeField<T>,
    stations: &[usize],
    metric: Metric,
    weights: Option<&NodeField<f64>>,
    mv: T,
    accept_missing: bool,
) -> Result<BTreeMap<usize, f64>> {
    check_stations(net, stations)?;
    let mut points = NodeField::filled(net.n_nodes(), 1, 0i64);
    for (k, &s) in stations.iter().enumerate() {
        points.set(s, 0, (k + 1) as i64);
    }
    let labels = find_subcatchments(net, points, 0)?;
    let by_label = calculate_metric_for_labels(
        field,
        &labels,
        metric,
        weights,
        Some(0),
        mv,
        accept_missing,
    )?;
    Ok(stations
        .iter()
        .enumerate()
        .map(|(k, &s)| {
            let value = by_label
                .get(&((k + 1) as i64))
                .copied()
                .unwrap_or(f64::NAN);
            (s, value)
        })
        .collect())
}
