/*
This code is part of the FlowNet drainage-network analysis library.
Created: 12/03/2025
Last Modified: 14/07/2025
License: MIT
*/

use super::{offset_target, DecodedGrid};
use crate::error::{FlowError, Result};

const D8_MISSING: u8 = 255;
const D8_SINK: u8 = 5;

// Numpad drain-direction convention, indexed by code 1..=9:
// 7 8 9
// 4 5 6      5 is a sink
// 1 2 3
// The encoding's y axis points north, so a positive dy steps to a lower
// row index.
const D8_DX: [isize; 10] = [0, -1, 0, 1, -1, 0, 1, -1, 0, 1];
const D8_DY: [isize; 10] = [0, -1, -1, -1, 0, 0, 0, 1, 1, 1];

/// Decodes a PCRaster-style D8 drain-direction grid. Code 5 marks a sink,
/// 255 a missing cell; any other value outside 1..=9 is rejected as
/// [`FlowError::BadEncoding`].
pub fn decode_d8(codes: &[u8], rows: usize, cols: usize) -> Result<DecodedGrid> {
    if codes.len() != rows * cols {
        return Err(FlowError::ShapeMismatch {
            expected: (rows, cols),
            found: (codes.len(), 1),
        });
    }

    let mut upstream = Vec::new();
    let mut downstream = Vec::new();
    let mut mask = vec![false; codes.len()];

    for (cell, &code) in codes.iter().enumerate() {
        match code {
            D8_MISSING => {}
            D8_SINK => {
                mask[cell] = true;
            }
            1..=9 => {
                mask[cell] = true;
                let dx = D8_DX[code as usize];
                let dy = -D8_DY[code as usize]; // north-positive to row order
                if let Some(target) = offset_target(cell, dx, dy, rows, cols) {
                    upstream.push(cell);
                    downstream.push(target);
                }
                // a pointer that leaves the domain leaves the cell a sink
            }
            _ => {
                return Err(FlowError::BadEncoding {
                    code: code as i64,
                    index: cell,
                });
            }
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
