/*
This code is part of the FlowNet drainage-network analysis library.
Created: 20/03/2025
Last Modified: 14/07/2025
License: MIT
*/

use super::check_node_field;
use crate::engine::{sweep, Direction};
use crate::error::Result;
use crate::field::{is_missing, Element, NodeField};
use crate::network::RiverNetwork;

/// Shortest hop-count distance from the cells already holding a distance.
/// The caller seeds the field (typically zeros at the starting cells and
/// `mv` everywhere else); one forward sweep pushes distances with the flow
/// and one reverse sweep pulls them against it. Because the network never
/// bifurcates, the two passes together cover every path between a node and
/// the seeded cells.
pub fn compute_distance<T: Element>(
    net: &RiverNetwork,
    mut field: NodeField<T>,
    mv: T,
    allow_downstream: bool,
    allow_upstream: bool,
) -> Result<NodeField<T>> {
    check_node_field(net, &field)?;
    let lanes = field.lanes();

    if allow_downstream {
        sweep(net, &mut field, Direction::Downstream, |net, field, group| {
            let downstream = net.downstream();
            for &i in group {
                let d = downstream[i];
                for lane in 0..lanes {
                    let here = field.at(i, lane);
                    if is_missing(here, mv) {
                        continue;
                    }
                    let candidate = here + T::one();
                    let there = field.at(d, lane);
                    if is_missing(there, mv) || candidate < there {
                        field.set(d, lane, candidate);
                    }
                }
            }
        });
    }
    if allow_upstream {
        sweep(net, &mut field, Direction::Upstream, |net, field, group| {
            let downstream = net.downstream();
            for &i in group {
                let d = downstream[i];
                for lane in 0..lanes {
                    let there = field.at(d, lane);
                    if is_missing(there, mv) {
                        continue;
                    }
                    let candidate = there + T::one();
                    let here = field.at(i, lane);
                    if is_missing(here, mv) || candidate < here {
                        field.set(i, lane, candidate);
                    }
                }
            }
        });
    }
    Ok(field)
}

#[cfg(test)]
mod test {
    use super::compute_distance;
    use crate::field::NodeField;
    use crate::testdata::network4x5;

    #[test]
    fn test_distance_to_sink() {
        let net = network4x5();
        let mut field = NodeField::filled(20, 1, -1i64);
        field.set(16, 0, 0);
        let dist = compute_distance(&net, field, -1, false, true).unwrap();
        assert_eq!(
            dist.data(),
            &[3, 3, 3, 3, 3, 2, 2, 2, 2, 3, 1, 1, 1, 2, 3, 1, 0, 1, 2, 3]
        );
    }

    #[test]
    fn test_distance_downstream_only_follows_the_path() {
        let net = network4x5();
        let mut field = NodeField::filled(20, 1, -1i64);
        field.set(0, 0, 0);
        let dist = compute_distance(&net, field, -1, true, false).unwrap();
        // node 0 drains 0 -> 5 -> 10 -> 16; everything else is unreached
        assert_eq!(dist.data()[0], 0);
        assert_eq!(dist.data()[5], 1);
        assert_eq!(dist.data()[10], 2);
        assert_eq!(dist.data()[16], 3);
        for &i in &[1usize, 2, 3, 4, 6, 7, 8, 9, 11, 12, 13, 14, 15, 17, 18, 19] {
            assert_eq!(dist.data()[i], -1);
        }
    }

    #[test]
    fn test_both_directions_reach_side_branches() {
        let net = network4x5();
        let mut field = NodeField::filled(20, 1, -1i64);
        field.set(0, 0, 0);
        let dist = compute_distance(&net, field, -1, true, true).unwrap();
        // down to the sink, then back up a neighbouring branch
        assert_eq!(dist.data()[16], 3);
        assert_eq!(dist.data()[15], 4);
        assert_eq!(dist.data()[11], 4);
        assert_eq!(dist.data()[6], 5);
    }
}
