/*
This code is part of the FlowNet drainage-network analysis library.
Created: 11/03/2025
Last Modified: 21/07/2025
License: MIT
*/

// private sub-module defined in another file
mod value;

pub use self::value::{is_missing, Element};

use crate::error::{FlowError, Result};
use crate::network::RiverNetwork;
use log::warn;

/// A dense field in node space. The buffer is node-major: node `i` owns the
/// contiguous slice `data[i * lanes..(i + 1) * lanes]`, where `lanes` is the
/// flattened product of the caller's trailing batch axes. Plain 1-D fields
/// have `lanes == 1`.
///
/// The engine borrows fields, optionally writes them in place, and never
/// retains a reference past the call.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeField<T> {
    data: Vec<T>,
    lanes: usize,
}

impl<T: Element> NodeField<T> {
    /// Wraps a plain 1-D field, one value per node.
    pub fn from_vec(data: Vec<T>) -> NodeField<T> {
        NodeField { data, lanes: 1 }
    }

    /// Wraps a node-major buffer with `lanes` values per node.
    pub fn with_lanes(data: Vec<T>, lanes: usize) -> Result<NodeField<T>> {
        if lanes == 0 || data.len() % lanes != 0 {
            return Err(FlowError::ShapeMismatch {
                expected: (data.len(), 1),
                found: (data.len(), lanes),
            });
        }
        Ok(NodeField { data, lanes })
    }

    pub fn filled(nodes: usize, lanes: usize, value: T) -> NodeField<T> {
        NodeField {
            data: vec![value; nodes * lanes],
            lanes,
        }
    }

    pub fn nodes(&self) -> usize {
        if self.lanes == 0 {
            0
        } else {
            self.data.len() / self.lanes
        }
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    #[inline]
    pub fn at(&self, node: usize, lane: usize) -> T {
        self.data[node * self.lanes + lane]
    }

    #[inline]
    pub fn set(&mut self, node: usize, lane: usize, value: T) {
        self.data[node * self.lanes + lane] = value;
    }

    /// The contiguous lane slice of one node.
    pub fn node(&self, node: usize) -> &[T] {
        &self.data[node * self.lanes..(node + 1) * self.lanes]
    }
}

/// A dense field in the 2-D domain view: `[batch, rows, cols]`, row-major,
/// with the batch axes flattened in front. The two trailing axes must match
/// the network's domain shape before the field can enter the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct GridField<T> {
    data: Vec<T>,
    batch: usize,
    rows: usize,
    cols: usize,
}

impl<T: Element> GridField<T> {
    /// Wraps a flat row-major buffer. Any leading batch axes must already
    /// be flattened; they are inferred from the buffer length.
    pub fn new(data: Vec<T>, rows: usize, cols: usize) -> Result<GridField<T>> {
        let cells = rows * cols;
        if cells == 0 || data.len() % cells != 0 {
            return Err(FlowError::ShapeMismatch {
                expected: (rows, cols),
                found: (data.len(), 1),
            });
        }
        let batch = data.len() / cells;
        Ok(GridField {
            data,
            batch,
            rows,
            cols,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn batch(&self) -> usize {
        self.batch
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    #[inline]
    pub fn value(&self, batch: usize, row: usize, col: usize) -> T {
        self.data[(batch * self.rows + row) * self.cols + col]
    }

    #[inline]
    pub fn set_value(&mut self, batch: usize, row: usize, col: usize, value: T) {
        self.data[(batch * self.rows + row) * self.cols + col] = value;
    }
}

/// Pulls the masked cells of a domain field out into node space. Batch axes
/// become lanes. The trailing shape must match the network's domain.
pub fn extract<T: Element>(net: &RiverNetwork, grid: &GridField<T>) -> Result<NodeField<T>> {
    if grid.shape() != net.shape() {
        return Err(FlowError::ShapeMismatch {
            expected: net.shape(),
            found: grid.shape(),
        });
    }
    let cells = grid.rows * grid.cols;
    let lanes = grid.batch;
    let mask = net.mask().cells();
    let mut data = vec![T::zero(); net.n_nodes() * lanes];
    let mut node = 0;
    for k in 0..cells {
        if mask[k] {
            for b in 0..lanes {
                data[node * lanes + b] = grid.data[b * cells + k];
            }
            node += 1;
        }
    }
    Ok(NodeField { data, lanes })
}

/// Writes a node-space field back into a fresh domain-shaped array, filling
/// non-masked cells with `mv`.
pub fn inflate<T: Element>(net: &RiverNetwork, field: &NodeField<T>, mv: T) -> GridField<T> {
    let (rows, cols) = net.shape();
    let cells = rows * cols;
    let lanes = field.lanes;
    let mask = net.mask().cells();
    let mut data = vec![mv; cells * lanes];
    let mut node = 0;
    for k in 0..cells {
        if mask[k] {
            for b in 0..lanes {
                data[b * cells + k] = field.data[node * lanes + b];
            }
            node += 1;
        }
    }
    GridField {
        data,
        batch: lanes,
        rows,
        cols,
    }
}

/// Scans a field for missing values, rejecting them unless the caller
/// opted in. Returns whether any were found.
pub fn check_missing<T: Element>(field: &NodeField<T>, mv: T, accept_missing: bool) -> Result<bool> {
    let present = field.data.iter().any(|&v| is_missing(v, mv));
    if present {
        if !accept_missing {
            return Err(FlowError::UnexpectedMissing);
        }
        warn!("missing values present in input field");
    }
    Ok(present)
}

/// Converts a field to f64 working precision with missing entries replaced
/// by NaN, so that downstream arithmetic stays branch-free.
pub fn missing_to_nan<T: Element>(field: &NodeField<T>, mv: T) -> NodeField<f64> {
    let data = field
        .data
        .iter()
        .map(|&v| {
            if is_missing(v, mv) {
                f64::NAN
            } else {
                v.to_f64().unwrap_or(f64::NAN)
            }
        })
        .collect();
    NodeField {
        data,
        lanes: field.lanes,
    }
}

/// Undoes [`missing_to_nan`]: every NaN becomes the caller's sentinel.
pub fn nan_to_missing(field: &mut NodeField<f64>, mv: f64) {
    if mv.is_nan() {
        return;
    }
    for v in field.data.iter_mut() {
        if v.is_nan() {
            *v = mv;
        }
    }
}
