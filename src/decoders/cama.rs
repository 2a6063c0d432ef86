/*
This code is part of the FlowNet drainage-network analysis library.
Created: 12/03/2025
Last Modified: 14/07/2025
License: MIT
*/

use super::{offset_target, DecodedGrid};
use crate::error::{FlowError, Result};

const CAMA_MISSING: i32 = -9999;
const CAMA_SINK_OFFSETS: [i32; 2] = [-999, -1000];
const CAMA_SINK_COORDS: [i32; 2] = [-9, -10];

/// Decodes CaMa-Flood downxy drainage: two grids of signed per-cell
/// offsets `(dx, dy)`. The sentinel -9999 marks a missing cell and
/// -999/-1000 mark sinks; the sentinels live in the dx grid, mirroring the
/// dy grid.
pub fn decode_cama_downxy(
    dx: &[i32],
    dy: &[i32],
    rows: usize,
    cols: usize,
) -> Result<DecodedGrid> {
    if dx.len() != dy.len() {
        return Err(FlowError::ShapeMismatch {
            expected: (dx.len(), 1),
            found: (dy.len(), 1),
        });
    }
    if dx.len() != rows * cols {
        return Err(FlowError::ShapeMismatch {
            expected: (rows, cols),
            found: (dx.len(), 1),
        });
    }

    let mut upstream = Vec::new();
    let mut downstream = Vec::new();
    let mut mask = vec![false; dx.len()];

    for (cell, (&x, &y)) in dx.iter().zip(dy.iter()).enumerate() {
        if x == CAMA_MISSING {
            continue;
        }
        mask[cell] = true;
        if CAMA_SINK_OFFSETS.contains(&x) {
            continue;
        }
        if let Some(target) = offset_target(cell, x as isize, y as isize, rows, cols) {
            upstream.push(cell);
            downstream.push(target);
        }
    }

    Ok(DecodedGrid {
        rows,
        cols,
        upstream,
        downstream,
        mask,
    })
}

/// Decodes CaMa-Flood nextxy drainage: two grids of 1-based absolute
/// target coordinates `(x, y)`. The sentinel -9999 marks a missing cell
/// and -9/-10 mark sinks. A target outside the grid is rejected as
/// [`FlowError::BadEncoding`].
pub fn decode_cama_nextxy(
    x: &[i32],
    y: &[i32],
    rows: usize,
    cols: usize,
) -> Result<DecodedGrid> {
    if x.len() != y.len() {
        return Err(FlowError::ShapeMismatch {
            expected: (x.len(), 1),
            found: (y.len(), 1),
        });
    }
    if x.len() != rows * cols {
        return Err(FlowError::ShapeMismatch {
            expected: (rows, cols),
            found: (x.len(), 1),
        });
    }

    let mut upstream = Vec::new();
    let mut downstream = Vec::new();
    let mut mask = vec![false; x.len()];

    for (cell, (&tx, &ty)) in x.iter().zip(y.iter()).enumerate() {
        if tx == CAMA_MISSING {
            continue;
        }
        mask[cell] = true;
        if CAMA_SINK_COORDS.contains(&tx) {
            continue;
        }
        if tx < 1 || tx as usize > cols || ty < 1 || ty as usize > rows {
            return Err(FlowError::BadEncoding {
                code: tx as i64,
                index: cell,
            });
        }
        upstream.push(cell);
        downstream.push((ty as usize - 1) * cols + (tx as usize - 1));
    }

    Ok(DecodedGrid {
        rows,
        cols,
        upstream,
        downstream,
        mask,
    })
}
