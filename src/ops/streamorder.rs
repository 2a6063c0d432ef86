/*
This code is part of the FlowNet drainage-network analysis library.
Created: 20/03/2025
Last Modified: 21/07/2025
License: MIT
*/

use super::distance::compute_distance;
use crate::engine::{sweep, Direction};
use crate::error::Result;
use crate::field::NodeField;
use crate::network::RiverNetwork;
use std::collections::HashMap;

/// Strahler stream order. Sources are order 1; a confluence takes the
/// maximum order of its tributaries, bumped by one when two or more
/// tributaries tie at that maximum.
///
/// The kernel needs all predecessors of a node finalised and visible in a
/// single group, which the standard source-distance grouping does not
/// give. Regrouping by distance-to-sink does: every predecessor of a node
/// sits exactly one step further from the sink, so predecessors share a
/// group and the ordinary forward sweep visits them before their
/// confluence.
pub fn compute_streamorder(net: &RiverNetwork) -> Result<NodeField<i64>> {
    let n = net.n_nodes();
    if n == 0 {
        return Ok(NodeField::from_vec(Vec::new()));
    }

    let mut to_sink = NodeField::filled(n, 1, -1i64);
    for &s in net.sinks() {
        to_sink.set(s, 0, 0);
    }
    let to_sink = compute_distance(net, to_sink, -1, false, true)?;
    debug_assert!(to_sink.data().iter().all(|&d| d >= 0));

    let max_dist = to_sink.data().iter().copied().max().unwrap_or(0);
    let levels: Vec<usize> = to_sink
        .data()
        .iter()
        .map(|&d| (max_dist - d) as usize)
        .collect();
    let aux = net.with_levels(levels);

    let mut order = NodeField::filled(n, 1, 0i64);
    for &s in net.sources() {
        order.set(s, 0, 1);
    }

    let mut confluences: HashMap<usize, (i64, u32)> = HashMap::new();
    sweep(&aux, &mut order, Direction::Downstream, |aux, field, group| {
        confluences.clear();
        for &i in group {
            let d = aux.downstream()[i];
            let v = field.at(i, 0);
            confluences
                .entry(d)
                .and_modify(|(max, ties)| {
                    if v > *max {
                        *max = v;
                        *ties = 1;
                    } else if v == *max {
                        *ties += 1;
                    }
                })
                .or_insert((v, 1));
        }
        for (&d, &(max, ties)) in confluences.iter() {
            field.set(d, 0, max + i64::from(ties >= 2));
        }
    });
    Ok(order)
}

#[cfg(test)]
mod test {
    use super::compute_streamorder;
    use crate::network::{DomainMask, RiverNetwork};
    use crate::testdata::{chain, network4x5};

    #[test]
    fn test_reference_orders() {
        let net = network4x5();
        let order = compute_streamorder(&net).unwrap();
        assert_eq!(
            order.data(),
            &[1, 1, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 3, 2, 1, 1, 3, 1, 1, 1]
        );
    }

    #[test]
    fn test_chain_stays_first_order() {
        let net = chain(6);
        let order = compute_streamorder(&net).unwrap();
        assert!(order.data().iter().all(|&o| o == 1));
    }

    #[test]
    fn test_tie_at_confluence_bumps_order() {
        // two first-order branches meeting: 0 -> 2, 1 -> 2, 2 -> 3 (sink)
        let net =
            RiverNetwork::from_downstream(vec![2, 2, 3, 4], DomainMask::full(1, 4)).unwrap();
        let order = compute_streamorder(&net).unwrap();
        assert_eq!(order.data(), &[1, 1, 2, 2]);
    }

    #[test]
    fn test_unequal_tributaries_keep_the_larger_order() {
        // a second-order stream joined by a first-order one
        // 0 -> 2, 1 -> 2, 2 -> 4, 3 -> 4, 4 -> 5 (sink)
        let net = RiverNetwork::from_downstream(
            vec![2, 2, 4, 4, 5, 6],
            DomainMask::full(1, 6),
        )
        .unwrap();
        let order = compute_streamorder(&net).unwrap();
        assert_eq!(order.data()[2], 2);
        assert_eq!(order.data()[4], 2);
        assert_eq!(order.data()[5], 2);
    }
}
