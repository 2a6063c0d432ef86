/*
This code is part of the FlowNet drainage-network analysis library.
Created: 19/03/2025
Last Modified: 21/07/2025
License: MIT
*/

use super::accumulation::{flow_downstream, AccumulateOptions};
use super::{check_node_field, check_weights};
use crate::engine::Reducer;
use crate::error::{FlowError, Result};
use crate::field::{check_missing, missing_to_nan, nan_to_missing, Element, NodeField};
use crate::network::RiverNetwork;

/// The reductions understood by the metric calculators. Anything that
/// divides (`Mean`, `Var`, `Stdev`) promotes integer input to floating
/// point output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Sum,
    Mean,
    Max,
    Min,
    Product,
    Var,
    Stdev,
}

impl Metric {
    pub fn parse(name: &str) -> Result<Metric> {
        match name {
            "sum" => Ok(Metric::Sum),
            "mean" => Ok(Metric::Mean),
            "max" => Ok(Metric::Max),
            "min" => Ok(Metric::Min),
            "product" => Ok(Metric::Product),
            "var" => Ok(Metric::Var),
            "stdev" => Ok(Metric::Stdev),
            other => Err(FlowError::UnknownMetric(other.to_string())),
        }
    }

    pub(crate) fn reducer(self) -> Reducer {
        match self {
            Metric::Sum | Metric::Mean | Metric::Var | Metric::Stdev => Reducer::Sum,
            Metric::Max => Reducer::Max,
            Metric::Min => Reducer::Min,
            Metric::Product => Reducer::Product,
        }
    }

    pub(crate) fn divides(self) -> bool {
        matches!(self, Metric::Mean | Metric::Var | Metric::Stdev)
    }
}

/// Reduces, for every node, the field over all nodes draining to it (the
/// node itself included). Computation runs in f64 with missing entries
/// bridged to NaN, so a catchment containing a missing cell reduces to the
/// missing value. Optional weights multiply the field (and serve as the
/// denominator for the dividing metrics); without weights the denominator
/// is the upstream cell count.
///
/// Variance is computed as E[x^2] - mean^2 over the weighted upstream set;
/// stdev is its square root.
pub fn calculate_upstream_metric<T: Element>(
    net: &RiverNetwork,
    field: &NodeField<T>,
    metric: Metric,
    weights: Option<&NodeField<f64>>,
    mv: T,
    accept_missing: bool,
) -> Result<NodeField<f64>> {
    check_node_field(net, field)?;
    if let Some(w) = weights {
        check_weights(net, w)?;
    }
    check_missing(field, mv, accept_missing)?;
    let mv_out = mv.to_f64().unwrap_or(f64::NAN);

    let base = missing_to_nan(field, mv);
    let lanes = base.lanes();

    let mut weighted = base.clone();
    if let Some(w) = weights {
        for i in 0..net.n_nodes() {
            for lane in 0..lanes {
                let v = weighted.at(i, lane) * w.at(i, 0);
                weighted.set(i, lane, v);
            }
        }
    }

    let opts = AccumulateOptions {
        op: metric.reducer(),
        weights: None,
        accept_missing: true,
    };
    let mut acc = flow_downstream(net, weighted, f64::NAN, &opts)?;

    if !metric.divides() {
        nan_to_missing(&mut acc, mv_out);
        return Ok(acc);
    }

    let denominator = match weights {
        Some(w) => {
            let mut values = Vec::with_capacity(net.n_nodes());
            for i in 0..net.n_nodes() {
                values.push(w.at(i, 0));
            }
            NodeField::from_vec(values)
        }
        None => NodeField::filled(net.n_nodes(), 1, 1.0),
    };
    let counts = flow_downstream(
        net,
        denominator,
        f64::NAN,
        &AccumulateOptions {
            accept_missing: true,
            ..AccumulateOptions::default()
        },
    )?;

    let mut mean = acc;
    for i in 0..net.n_nodes() {
        for lane in 0..lanes {
            let v = mean.at(i, lane) / counts.at(i, 0);
            mean.set(i, lane, v);
        }
    }
    if metric == Metric::Mean {
        nan_to_missing(&mut mean, mv_out);
        return Ok(mean);
    }

    // accumulate the weighted second moment for var / stdev
    let mut squares = base;
    for i in 0..net.n_nodes() {
        for lane in 0..lanes {
            let x = squares.at(i, lane);
            let w = weights.map(|w| w.at(i, 0)).unwrap_or(1.0);
            squares.set(i, lane, w * x * x);
        }
    }
    let second = flow_downstream(
        net,
        squares,
        f64::NAN,
        &AccumulateOptions {
            accept_missing: true,
            ..AccumulateOptions::default()
        },
    )?;

    let mut out = mean;
    for i in 0..net.n_nodes() {
        for lane in 0..lanes {
            let m = out.at(i, lane);
            let mut var = second.at(i, lane) / counts.at(i, 0) - m * m;
            if var < 0.0 {
                // round-off can push a tiny variance below zero
                var = 0.0;
            }
            let v = if metric == Metric::Stdev { var.sqrt() } else { var };
            out.set(i, lane, v);
        }
    }
    nan_to_missing(&mut out, mv_out);
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::{calculate_upstream_metric, Metric};
    use crate::error::FlowError;
    use crate::field::NodeField;
    use crate::ops::accumulation::upstream_points;
    use crate::testdata::{chain, network4x5};

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert!(matches!(Metric::parse("mean"), Ok(Metric::Mean)));
        assert!(matches!(
            Metric::parse("median"),
            Err(FlowError::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_mean_is_sum_over_count() {
        let net = network4x5();
        let field = NodeField::from_vec((1..=20).map(|v| v as f64).collect::<Vec<_>>());
        let sum =
            calculate_upstream_metric(&net, &field, Metric::Sum, None, f64::NAN, false).unwrap();
        let mean =
            calculate_upstream_metric(&net, &field, Metric::Mean, None, f64::NAN, false).unwrap();
        let counts = upstream_points(&net).unwrap();
        for i in 0..20 {
            let expected = sum.data()[i] / counts.data()[i] as f64;
            assert!((mean.data()[i] - expected).abs() < 1e-12);
        }
        assert!((mean.data()[16] - 10.5).abs() < 1e-12);
    }

    #[test]
    fn test_integer_input_promotes_for_mean() {
        let net = chain(2);
        let field = NodeField::from_vec(vec![1i64, 2]);
        let mean = calculate_upstream_metric(&net, &field, Metric::Mean, None, i64::MIN, false)
            .unwrap();
        assert!((mean.data()[1] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_var_and_stdev_on_a_chain() {
        let net = chain(3);
        let field = NodeField::from_vec(vec![1.0f64, 2.0, 3.0]);
        let var =
            calculate_upstream_metric(&net, &field, Metric::Var, None, f64::NAN, false).unwrap();
        let stdev =
            calculate_upstream_metric(&net, &field, Metric::Stdev, None, f64::NAN, false).unwrap();
        assert!((var.data()[1] - 0.25).abs() < 1e-12);
        assert!((var.data()[2] - 2.0 / 3.0).abs() < 1e-12);
        assert!((stdev.data()[2] - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_mean() {
        let net = chain(2);
        let field = NodeField::from_vec(vec![10.0f64, 20.0]);
        let weights = NodeField::from_vec(vec![1.0f64, 3.0]);
        let mean = calculate_upstream_metric(
            &net,
            &field,
            Metric::Mean,
            Some(&weights),
            f64::NAN,
            false,
        )
        .unwrap();
        // (10*1 + 20*3) / (1 + 3)
        assert!((mean.data()[1] - 17.5).abs() < 1e-12);
    }

    #[test]
    fn test_missing_poisons_the_catchment_metric() {
        let net = network4x5();
        let mut values: Vec<f64> = (1..=20).map(|v| v as f64).collect();
        values[0] = -1.0;
        let field = NodeField::from_vec(values);
        let mean =
            calculate_upstream_metric(&net, &field, Metric::Mean, None, -1.0, true).unwrap();
        // node 0 drains through 5, 10 and the sink 16
        assert_eq!(mean.data()[0], -1.0);
        assert_eq!(mean.data()[5], -1.0);
        assert_eq!(mean.data()[10], -1.0);
        assert_eq!(mean.data()[16], -1.0);
        // a branch untouched by the missing cell keeps its mean
        assert!((mean.data()[6] - (2.0 + 7.0) / 2.0).abs() < 1e-12);
    }
}
