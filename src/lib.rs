/*
This code is part of the FlowNet drainage-network analysis library.
Created: 11/03/2025
Last Modified: 21/07/2025
License: MIT
*/

//! FlowNet builds river networks from raster drainage maps and propagates
//! fields along them: accumulation, one-step movement, catchment
//! labelling, upstream and zonal metrics, path lengths and stream order.
//!
//! A network is a directed graph in which every cell of the raster domain
//! either drains into exactly one neighbour or is a sink. Construction
//! renumbers the non-missing cells, assigns every node its longest-path
//! distance from a source, and buckets nodes by that level into a
//! topologically ordered group table. Every operator is then a single
//! monotone sweep over the groups, forwards or backwards, which is what
//! keeps the library usable on domains of 10^6 to 10^8 cells.
//!
//! ```
//! use flownet::decoders::decode_d8;
//! use flownet::field::NodeField;
//! use flownet::network::RiverNetwork;
//! use flownet::ops::{flow_downstream, AccumulateOptions};
//!
//! # fn main() -> flownet::Result<()> {
//! // a 2x3 grid whose top row drains straight down onto a row of sinks
//! let codes = vec![2u8, 2, 2, 5, 5, 5];
//! let network = RiverNetwork::from_decoded(decode_d8(&codes, 2, 3)?)?;
//!
//! let ones = NodeField::from_vec(vec![1.0f64; network.n_nodes()]);
//! let acc = flow_downstream(&network, ones, f64::NAN, &AccumulateOptions::default())?;
//! assert_eq!(acc.data()[3], 2.0);
//! # Ok(())
//! # }
//! ```

pub mod decoders;
pub mod engine;
pub mod error;
pub mod field;
pub mod grid;
pub mod network;
pub mod ops;

#[cfg(test)]
pub(crate) mod testdata;

pub use crate::error::{FlowError, Result};
pub use crate::field::{GridField, NodeField};
pub use crate::network::{DomainMask, RiverNetwork};
