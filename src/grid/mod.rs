/*
This code is part of the FlowNet drainage-network analysis library.
Created: 24/03/2025
Last Modified: 21/07/2025
License: MIT
*/

//! The 2-D operator surface. Every function here is the same two-stage
//! composition: pull the masked cells into node space, run the node-space
//! operator, write the result back into a domain-shaped array with `mv`
//! in the non-masked cells.

use crate::engine::Reducer;
use crate::error::Result;
use crate::field::{extract, inflate, Element, GridField};
use crate::network::RiverNetwork;
use crate::ops;
use crate::ops::{AccumulateOptions, FillMode, Metric};
use std::collections::BTreeMap;

pub fn flow_downstream<T: Element>(
    net: &RiverNetwork,
    grid: &GridField<T>,
    mv: T,
    opts: &AccumulateOptions<T>,
) -> Result<GridField<T>> {
    let nodes = extract(net, grid)?;
    let out = ops::flow_downstream(net, nodes, mv, opts)?;
    Ok(inflate(net, &out, mv))
}

pub fn flow_upstream<T: Element>(
    net: &RiverNetwork,
    grid: &GridField<T>,
    mv: T,
    opts: &AccumulateOptions<T>,
) -> Result<GridField<T>> {
    let nodes = extract(net, grid)?;
    let out = ops::flow_upstream(net, nodes, mv, opts)?;
    Ok(inflate(net, &out, mv))
}

pub fn move_downstream<T: Element>(
    net: &RiverNetwork,
    grid: &GridField<T>,
    mv: T,
    op: Reducer,
    accept_missing: bool,
) -> Result<GridField<T>> {
    let nodes = extract(net, grid)?;
    let out = ops::move_downstream(net, &nodes, mv, op, accept_missing)?;
    Ok(inflate(net, &out, mv))
}

pub fn move_upstream<T: Element>(
    net: &RiverNetwork,
    grid: &GridField<T>,
    mv: T,
    accept_missing: bool,
) -> Result<GridField<T>> {
    let nodes = extract(net, grid)?;
    let out = ops::move_upstream(net, &nodes, mv, accept_missing)?;
    Ok(inflate(net, &out, mv))
}

pub fn fill_catchments<T: Element>(
    net: &RiverNetwork,
    grid: &GridField<T>,
    mv: T,
    mode: FillMode,
) -> Result<GridField<T>> {
    let nodes = extract(net, grid)?;
    let out = ops::fill_catchments(net, nodes, mv, mode)?;
    Ok(inflate(net, &out, mv))
}

pub fn find_catchments<T: Element>(
    net: &RiverNetwork,
    grid: &GridField<T>,
    mv: T,
) -> Result<GridField<T>> {
    fill_catchments(net, grid, mv, FillMode::Overwrite)
}

pub fn find_subcatchments<T: Element>(
    net: &RiverNetwork,
    grid: &GridField<T>,
    mv: T,
) -> Result<GridField<T>> {
    fill_catchments(net, grid, mv, FillMode::Preserve)
}

pub fn calculate_upstream_metric<T: Element>(
    net: &RiverNetwork,
    grid: &GridField<T>,
    metric: Metric,
    weights: Option<&GridField<f64>>,
    mv: T,
    accept_missing: bool,
) -> Result<GridField<f64>> {
    let nodes = extract(net, grid)?;
    let node_weights = match weights {
        Some(w) => Some(extract(net, w)?),
        None => None,
    };
    let out = ops::calculate_upstream_metric(
        net,
        &nodes,
        metric,
        node_weights.as_ref(),
        mv,
        accept_missing,
    )?;
    Ok(inflate(net, &out, mv.to_f64().unwrap_or(f64::NAN)))
}

pub fn compute_distance<T: Element>(
    net: &RiverNetwork,
    grid: &GridField<T>,
    mv: T,
    allow_downstream: bool,
    allow_upstream: bool,
) -> Result<GridField<T>> {
    let nodes = extract(net, grid)?;
    let out = ops::compute_distance(net, nodes, mv, allow_downstream, allow_upstream)?;
    Ok(inflate(net, &out, mv))
}

pub fn compute_streamorder(net: &RiverNetwork, mv: i64) -> Result<GridField<i64>> {
    let out = ops::compute_streamorder(net)?;
    Ok(inflate(net, &out, mv))
}

/// Maps (row, col) station coordinates onto node ids, silently dropping
/// stations that fall outside the mask.
fn stations_to_nodes(net: &RiverNetwork, stations: &[(usize, usize)]) -> Vec<(usize, usize, usize)> {
    let (_, cols) = net.shape();
    let renumber = net.mask().renumber();
    stations
        .iter()
        .filter_map(|&(row, col)| {
            let cell = row * cols + col;
            if net.mask().cell(cell) {
                Some((row, col, renumber[cell]))
            } else {
                None
            }
        })
        .collect()
}

pub fn calculate_catchment_metric<T: Element>(
    net: &RiverNetwork,
    grid: &GridField<T>,
    stations: &[(usize, usize)],
    metric: Metric,
    weights: Option<&GridField<f64>>,
    mv: T,
    accept_missing: bool,
) -> Result<BTreeMap<(usize, usize), f64>> {
    let nodes = extract(net, grid)?;
    let node_weights = match weights {
        Some(w) => Some(extract(net, w)?),
        None => None,
    };
    let located = stations_to_nodes(net, stations);
    let ids: Vec<usize> = located.iter().map(|&(_, _, id)| id).collect();
    let by_node = ops::calculate_catchment_metric(
        net,
        &nodes,
        &ids,
        metric,
        node_weights.as_ref(),
        mv,
        accept_missing,
    )?;
    Ok(located
        .into_iter()
        .map(|(row, col, id)| ((row, col), by_node[&id]))
        .collect())
}

pub fn calculate_subcatchment_metric<T: Element>(
    net: &RiverNetwork,
    grid: &GridField<T>,
    stations: &[(usize, usize)],
    metric: Metric,
    weights: Option<&GridField<f64>>,
    mv: T,
    accept_missing: bool,
) -> Result<BTreeMap<(usize, usize), f64>> {
    let nodes = extract(net, grid)?;
    let node_weights = match weights {
        Some(w) => Some(extract(net, w)?),
        None => None,
    };
    let located = stations_to_nodes(net, stations);
    let ids: Vec<usize> = located.iter().map(|&(_, _, id)| id).collect();
    let by_node = ops::calculate_subcatchment_metric(
        net,
        &nodes,
        &ids,
        metric,
        node_weights.as_ref(),
        mv,
        accept_missing,
    )?;
    Ok(located
        .into_iter()
        .map(|(row, col, id)| ((row, col), by_node[&id]))
        .collect())
}
