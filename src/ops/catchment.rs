/*
This code is part of the FlowNet drainage-network analysis library.
Created: 18/03/2025
Last Modified: 14/07/2025
License: MIT
*/

use super::check_node_field;
use crate::engine::{sweep, Direction};
use crate::error::Result;
use crate::field::{is_missing, Element, NodeField};
use crate::network::RiverNetwork;

/// How the reverse fill treats a node that already carries a label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillMode {
    /// Replace whatever is there whenever the downstream neighbour is
    /// labelled (catchments of labelled sinks).
    Overwrite,
    /// Only fill nodes still holding the missing value, leaving pre-set
    /// labels as interior boundaries (subcatchments).
    Preserve,
}

/// Propagates labels against the flow: a reverse sweep in which every node
/// adopts its downstream neighbour's label unless that neighbour is
/// unlabelled. Nodes with no labelled descendant keep `mv`.
pub fn fill_catchments<T: Element>(
    net: &RiverNetwork,
    mut labels: NodeField<T>,
    mv: T,
    mode: FillMode,
) -> Result<NodeField<T>> {
    check_node_field(net, &labels)?;
    let lanes = labels.lanes();
    sweep(net, &mut labels, Direction::Upstream, |net, field, group| {
        let downstream = net.downstream();
        for &i in group {
            let d = downstream[i];
            for lane in 0..lanes {
                let label = field.at(d, lane);
                if is_missing(label, mv) {
                    continue;
                }
                if mode == FillMode::Preserve && !is_missing(field.at(i, lane), mv) {
                    continue;
                }
                field.set(i, lane, label);
            }
        }
    });
    Ok(labels)
}

/// Labels every node with the label of the sink it drains to, given a
/// field of labelled sinks. Pre-set labels upstream are overwritten.
pub fn find_catchments<T: Element>(
    net: &RiverNetwork,
    labels: NodeField<T>,
    mv: T,
) -> Result<NodeField<T>> {
    fill_catchments(net, labels, mv, FillMode::Overwrite)
}

/// Labels every node with the first labelled node encountered on its way
/// downstream. Pre-set labels are never overwritten, so interior labels
/// carve out their own subcatchments.
pub fn find_subcatchments<T: Element>(
    net: &RiverNetwork,
    labels: NodeField<T>,
    mv: T,
) -> Result<NodeField<T>> {
    fill_catchments(net, labels, mv, FillMode::Preserve)
}

#[cfg(test)]
mod test {
    use super::{find_catchments, find_subcatchments};
    use crate::field::NodeField;
    use crate::testdata::network4x5;

    #[test]
    fn test_subcatchments_from_interior_labels() {
        let net = network4x5();
        let mut labels = NodeField::filled(20, 1, 0i64);
        labels.set(10, 0, 1);
        labels.set(12, 0, 2);
        labels.set(18, 0, 3);
        let filled = find_subcatchments(&net, labels, 0).unwrap();
        assert_eq!(
            filled.data(),
            &[1, 0, 2, 2, 0, 1, 0, 2, 0, 2, 1, 0, 2, 2, 2, 0, 0, 0, 3, 3]
        );
    }

    #[test]
    fn test_subcatchment_fill_is_idempotent() {
        let net = network4x5();
        let mut labels = NodeField::filled(20, 1, 0i64);
        labels.set(10, 0, 1);
        labels.set(12, 0, 2);
        labels.set(18, 0, 3);
        let once = find_subcatchments(&net, labels, 0).unwrap();
        let twice = find_subcatchments(&net, once.clone(), 0).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_subcatchments_never_overwrite() {
        let net = network4x5();
        let labels = NodeField::from_vec((1..=20).collect::<Vec<i64>>());
        let filled = find_subcatchments(&net, labels.clone(), 0).unwrap();
        assert_eq!(filled, labels);
    }

    #[test]
    fn test_catchments_fill_from_sink() {
        let net = network4x5();
        let mut labels = NodeField::filled(20, 1, 0i64);
        labels.set(16, 0, 9);
        let filled = find_catchments(&net, labels, 0).unwrap();
        // the fixture drains entirely through the single sink
        assert!(filled.data().iter().all(|&l| l == 9));
    }

    #[test]
    fn test_catchments_overwrite_interior_labels() {
        let net = network4x5();
        let mut labels = NodeField::filled(20, 1, 0i64);
        labels.set(16, 0, 9);
        labels.set(12, 0, 4); // swallowed by the sink's catchment
        let filled = find_catchments(&net, labels, 0).unwrap();
        assert!(filled.data().iter().all(|&l| l == 9));
    }

    #[test]
    fn test_catchments_agree_with_subcatchments_on_sink_labels() {
        let net = network4x5();
        let mut labels = NodeField::filled(20, 1, 0i64);
        labels.set(16, 0, 5);
        let a = find_catchments(&net, labels.clone(), 0).unwrap();
        let b = find_subcatchments(&net, labels, 0).unwrap();
        assert_eq!(a, b);
    }
}
