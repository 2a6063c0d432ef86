/*
This code is part of the FlowNet drainage-network analysis library.
Created: 14/03/2025
Last Modified: 21/07/2025
License: MIT
*/

// private sub-modules defined in other files
mod groups;
mod io;
mod labels;

pub use self::groups::GroupIndex;
pub use self::io::{load_network, save_network};

use crate::decoders::DecodedGrid;
use crate::error::{FlowError, Result};

/// The boolean domain mask: true for every raster cell that carries a node.
/// Node ids are a pure renumbering of the true cells in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainMask {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl DomainMask {
    pub fn new(rows: usize, cols: usize, cells: Vec<bool>) -> Result<DomainMask> {
        if cells.len() != rows * cols {
            return Err(FlowError::ShapeMismatch {
                expected: (rows, cols),
                found: (cells.len(), 1),
            });
        }
        Ok(DomainMask { rows, cols, cells })
    }

    /// A mask with every cell present, for hand-built networks.
    pub fn full(rows: usize, cols: usize) -> DomainMask {
        DomainMask {
            rows,
            cols,
            cells: vec![true; rows * cols],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, index: usize) -> bool {
        self.cells[index]
    }

    /// Number of nodes, i.e. true cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// The cell -> node id table: prefix sum of the mask on true cells,
    /// the node-count sentinel on false cells.
    pub fn renumber(&self) -> Vec<usize> {
        let n = self.count();
        let mut table = vec![n; self.cells.len()];
        let mut next = 0;
        for (k, &present) in self.cells.iter().enumerate() {
            if present {
                table[k] = next;
                next += 1;
            }
        }
        table
    }
}

/// An immutable river network: the renumbered drainage graph plus the
/// topologically ordered grouping every operator sweeps over.
///
/// `downstream[i]` holds the single successor of node `i`, or the sentinel
/// `n_nodes` for a sink. The relation is guaranteed acyclic at
/// construction; every constructor rejects cyclic input with
/// [`FlowError::CycleDetected`] and exposes no partial network.
#[derive(Clone, Debug)]
pub struct RiverNetwork {
    n_nodes: usize,
    downstream: Vec<usize>,
    sources: Vec<usize>,
    sinks: Vec<usize>,
    levels: Vec<usize>,
    groups: GroupIndex,
    mask: DomainMask,
}

impl RiverNetwork {
    /// Builds a network from decoded raster drainage: renumbers the
    /// non-missing cells 0..N-1 and scatters the upstream/downstream cell
    /// pairs into the successor array. A pair whose target cell is missing
    /// leaves its upstream cell a sink.
    pub fn from_decoded(grid: DecodedGrid) -> Result<RiverNetwork> {
        let mask = DomainMask::new(grid.rows, grid.cols, grid.mask)?;
        let renumber = mask.renumber();
        let n = mask.count();
        let mut downstream = vec![n; n];
        for (&u, &d) in grid.upstream.iter().zip(grid.downstream.iter()) {
            downstream[renumber[u]] = renumber[d];
        }
        RiverNetwork::from_parts(downstream, mask)
    }

    /// Builds a network directly from a successor array, using the
    /// node-count sentinel for sinks. The mask must carry exactly as many
    /// true cells as there are nodes.
    pub fn from_downstream(downstream: Vec<usize>, mask: DomainMask) -> Result<RiverNetwork> {
        if mask.count() != downstream.len() {
            return Err(FlowError::ShapeMismatch {
                expected: (mask.count(), 1),
                found: (downstream.len(), 1),
            });
        }
        RiverNetwork::from_parts(downstream, mask)
    }

    fn from_parts(downstream: Vec<usize>, mask: DomainMask) -> Result<RiverNetwork> {
        let n = downstream.len();
        for (i, &d) in downstream.iter().enumerate() {
            if d > n {
                return Err(FlowError::BadEncoding {
                    code: d as i64,
                    index: i,
                });
            }
            if d == i {
                // a self-loop is the smallest cycle
                return Err(FlowError::CycleDetected);
            }
        }

        let sinks: Vec<usize> = (0..n).filter(|&i| downstream[i] == n).collect();

        let mut has_upstream = vec![false; n];
        for &d in &downstream {
            if d != n {
                has_upstream[d] = true;
            }
        }
        let sources: Vec<usize> = (0..n).filter(|&i| !has_upstream[i]).collect();

        let levels = labels::compute_topological_labels(&downstream, &sources, &sinks)?;
        let groups = GroupIndex::from_levels(&levels);

        Ok(RiverNetwork {
            n_nodes: n,
            downstream,
            sources,
            sinks,
            levels,
            groups,
            mask,
        })
    }

    /// Reassembles a network from previously validated parts (the
    /// precomputed-blob loader). Groups are rebuilt from the stored levels;
    /// the level invariant is re-checked so a corrupt blob cannot smuggle
    /// in a cycle.
    pub(crate) fn assemble(
        downstream: Vec<usize>,
        levels: Vec<usize>,
        sources: Vec<usize>,
        sinks: Vec<usize>,
        mask: DomainMask,
    ) -> Result<RiverNetwork> {
        let n = downstream.len();
        if levels.len() != n || mask.count() != n {
            return Err(FlowError::InvalidBlob(
                "array lengths disagree with node count".to_string(),
            ));
        }
        for (i, &d) in downstream.iter().enumerate() {
            if d > n {
                return Err(FlowError::InvalidBlob(format!(
                    "downstream entry {} out of range at node {}",
                    d, i
                )));
            }
            if d != n && levels[d] <= levels[i] {
                return Err(FlowError::CycleDetected);
            }
        }
        let groups = GroupIndex::from_levels(&levels);
        Ok(RiverNetwork {
            n_nodes: n,
            downstream,
            sources,
            sinks,
            levels,
            groups,
            mask,
        })
    }

    /// An auxiliary view of the same topology regrouped by caller-supplied
    /// levels. Used to traverse predecessors through the standard forward
    /// sweep (stream ordering).
    pub(crate) fn with_levels(&self, levels: Vec<usize>) -> RiverNetwork {
        let groups = GroupIndex::from_levels(&levels);
        RiverNetwork {
            n_nodes: self.n_nodes,
            downstream: self.downstream.clone(),
            sources: self.sources.clone(),
            sinks: self.sinks.clone(),
            levels,
            groups,
            mask: self.mask.clone(),
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// The sink sentinel, equal to [`RiverNetwork::n_nodes`].
    pub fn sentinel(&self) -> usize {
        self.n_nodes
    }

    pub fn downstream(&self) -> &[usize] {
        &self.downstream
    }

    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    pub fn sinks(&self) -> &[usize] {
        &self.sinks
    }

    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    pub fn groups(&self) -> &GroupIndex {
        &self.groups
    }

    pub fn mask(&self) -> &DomainMask {
        &self.mask
    }

    pub fn shape(&self) -> (usize, usize) {
        self.mask.shape()
    }

    pub fn is_sink(&self, node: usize) -> bool {
        self.downstream[node] == self.n_nodes
    }
}

#[cfg(test)]
mod test {
    use super::{DomainMask, RiverNetwork};
    use crate::decoders::decode_d8;
    use crate::error::FlowError;
    use crate::testdata::{network4x5, DOWNSTREAM};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_sources_and_sinks() {
        let net = network4x5();
        assert_eq!(net.sources(), &[0, 1, 2, 3, 4, 9, 14, 15, 19]);
        assert_eq!(net.sinks(), &[16]);
        assert!(net.is_sink(16));
        assert!(!net.is_sink(0));
    }

    #[test]
    fn test_levels_strictly_increase_downstream() {
        let net = network4x5();
        let n = net.n_nodes();
        for i in 0..n {
            let d = net.downstream()[i];
            if d != n {
                assert!(net.levels()[d] > net.levels()[i]);
            }
        }
        assert_eq!(
            net.levels(),
            &[0, 0, 0, 0, 0, 1, 1, 1, 1, 0, 2, 2, 2, 1, 0, 0, 3, 2, 1, 0]
        );
    }

    #[test]
    fn test_groups_partition_with_sinks_last() {
        let net = network4x5();
        let groups = net.groups();
        let total: usize = groups.iter().map(|g| g.len()).sum();
        assert_eq!(total, net.n_nodes());
        assert_eq!(groups.group(groups.count() - 1), net.sinks());
        let mut seen = vec![false; net.n_nodes()];
        for group in groups.iter() {
            for &i in group {
                assert!(!seen[i]);
                seen[i] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_renumbering_skips_missing_cells() {
        // 2x3 grid, centre of top row missing; remaining cells drain east
        // into a sink at the end of each row
        let codes = vec![6u8, 255, 5, 6, 6, 5];
        let grid = decode_d8(&codes, 2, 3).unwrap();
        let net = RiverNetwork::from_decoded(grid).unwrap();
        assert_eq!(net.n_nodes(), 5);
        // cell 0 points at the missing cell and so becomes a sink
        assert_eq!(net.downstream(), &[5, 5, 3, 4, 5]);
        assert_eq!(net.sinks(), &[0, 1, 4]);
    }

    #[test]
    fn test_three_cycle_is_rejected() {
        let result = RiverNetwork::from_downstream(vec![1, 2, 0], DomainMask::full(1, 3));
        assert!(matches!(result, Err(FlowError::CycleDetected)));
    }

    #[test]
    fn test_self_loop_is_rejected() {
        let result = RiverNetwork::from_downstream(vec![0, 2], DomainMask::full(1, 2));
        assert!(matches!(result, Err(FlowError::CycleDetected)));
    }

    #[test]
    fn test_out_of_range_downstream_is_rejected() {
        let result = RiverNetwork::from_downstream(vec![1, 7], DomainMask::full(1, 2));
        assert!(matches!(result, Err(FlowError::BadEncoding { .. })));
    }

    #[test]
    fn test_empty_network() {
        let net = RiverNetwork::from_downstream(Vec::new(), DomainMask::full(0, 0)).unwrap();
        assert_eq!(net.n_nodes(), 0);
        assert_eq!(net.groups().count(), 0);
    }

    #[test]
    fn test_fixture_downstream_matches() {
        let net = network4x5();
        assert_eq!(net.downstream(), &DOWNSTREAM[..]);
    }

    #[test]
    fn test_random_forests_satisfy_invariants() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for _ in 0..25 {
            let n = rng.gen_range(1, 60);
            // forcing every edge to point at a higher id guarantees a DAG
            let downstream: Vec<usize> = (0..n).map(|i| rng.gen_range(i + 1, n + 1)).collect();
            let net =
                RiverNetwork::from_downstream(downstream, DomainMask::full(1, n)).unwrap();
            for i in 0..n {
                let d = net.downstream()[i];
                if d != n {
                    assert!(net.levels()[d] > net.levels()[i]);
                } else {
                    assert!(net.sinks().contains(&i));
                }
            }
            let groups = net.groups();
            assert_eq!(groups.group(groups.count() - 1), net.sinks());
        }
    }
}
