/*
This code is part of the FlowNet drainage-network analysis library.
Created: 19/03/2025
Last Modified: 21/07/2025
License: MIT
*/

use super::metrics::Metric;
use crate::error::{FlowError, Result};
use crate::field::{check_missing, Element, NodeField};
use num_traits::PrimInt;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Per-label accumulator. Which parts are read depends on the metric.
struct ZoneState {
    acc: f64,
    weight_sum: f64,
    square_sum: f64,
}

/// Reduces a field by a per-node integer label in a single pass, returning
/// one value per distinct label. Weights apply to the averaging metrics
/// (`Sum`, `Mean`, `Var`, `Stdev`); `Max`, `Min` and `Product` reduce the
/// raw values. Labels equal to `label_mv` are left out of the result.
///
/// Only the NaN missing-value algebra is implemented for zonal reductions;
/// any other sentinel with missing data present is reported as
/// [`FlowError::UnsupportedMissingValue`].
pub fn calculate_metric_for_labels<T: Element, L: Element + PrimInt + Debug>(
    field: &NodeField<T>,
    labels: &NodeField<L>,
    metric: Metric,
    weights: Option<&NodeField<f64>>,
    label_mv: Option<L>,
    mv: T,
    accept_missing: bool,
) -> Result<BTreeMap<L, f64>> {
    if labels.nodes() != field.nodes() || labels.lanes() != 1 || field.lanes() != 1 {
        return Err(FlowError::ShapeMismatch {
            expected: (field.nodes(), 1),
            found: (labels.nodes(), labels.lanes()),
        });
    }
    if let Some(w) = weights {
        if w.nodes() != field.nodes() || w.lanes() != 1 {
            return Err(FlowError::ShapeMismatch {
                expected: (field.nodes(), 1),
                found: (w.nodes(), w.lanes()),
            });
        }
    }
    let missing = check_missing(field, mv, accept_missing)?;
    if missing && !mv.is_nan() {
        return Err(FlowError::UnsupportedMissingValue(format!("{:?}", mv)));
    }

    let mut zones: BTreeMap<L, ZoneState> = BTreeMap::new();
    for i in 0..field.nodes() {
        let label = labels.at(i, 0);
        if label_mv == Some(label) {
            continue;
        }
        let x = field.at(i, 0).to_f64().unwrap_or(f64::NAN);
        let w = weights.map(|w| w.at(i, 0)).unwrap_or(1.0);
        let state = zones.entry(label).or_insert_with(|| ZoneState {
            acc: metric.reducer().identity::<f64>(),
            weight_sum: 0.0,
            square_sum: 0.0,
        });
        match metric {
            Metric::Sum | Metric::Mean | Metric::Var | Metric::Stdev => {
                state.acc += w * x;
                state.weight_sum += w;
                state.square_sum += w * x * x;
            }
            Metric::Max | Metric::Min | Metric::Product => {
                state.acc = metric.reducer().apply(state.acc, x);
            }
        }
    }

    let result = zones
        .into_iter()
        .map(|(label, state)| {
            let value = match metric {
                Metric::Sum | Metric::Max | Metric::Min | Metric::Product => state.acc,
                Metric::Mean => state.acc / state.weight_sum,
                Metric::Var | Metric::Stdev => {
                    let mean = state.acc / state.weight_sum;
                    let mut var = state.square_sum / state.weight_sum - mean * mean;
                    if var < 0.0 {
                        var = 0.0;
                    }
                    if metric == Metric::Stdev {
                        var.sqrt()
                    } else {
                        var
                    }
                }
            };
            (label, value)
        })
        .collect();
    Ok(result)
}
