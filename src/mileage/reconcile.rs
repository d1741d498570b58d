//! Reconciliation of attributed mileage against a reference total.

use tracing::debug;

use super::attribution::Attribution;
use crate::config::{ReconciliationConfig, ReferenceTotal};
use crate::error::{MileageError, Result};
use crate::models::{CalculationResult, Region, StateDistanceMap};

/// Shape an attribution into the externally visible result.
///
/// Values are scaled by `reference / kept_sum` when that ratio strays more
/// than `rescale_threshold` from 1, or whenever mileage was omitted (dropped
/// unresolved miles or states under `min_state_miles`). Otherwise they pass
/// through and the echoed total is their own sum. Either way the output
/// values sum to the output total.
pub fn reconcile(
    attribution: Attribution,
    reference_total: f64,
    include_unresolved: bool,
    config: &ReconciliationConfig,
) -> Result<CalculationResult> {
    let measured = attribution.total();
    let degraded_segments = attribution.degraded_segments;

    let target = match config.reference {
        ReferenceTotal::Provider => reference_total,
        ReferenceTotal::Polyline => measured,
    };

    let mut omitted = 0.0;
    let mut kept: Vec<(Region, f64)> = Vec::with_capacity(attribution.distances.len());
    for (region, miles) in attribution.distances {
        let keep = match &region {
            Region::Unresolved => include_unresolved,
            Region::State(_) => miles >= config.min_state_miles,
        };
        if keep {
            kept.push((region, miles));
        } else {
            debug!("Omitting {:.3} mi in {}", miles, region);
            omitted += miles;
        }
    }

    let kept_sum: f64 = kept.iter().map(|(_, miles)| miles).sum();

    if !kept_sum.is_finite() {
        let result = build_result(kept, 1.0, degraded_segments, config.decimals);
        return Err(MileageError::Unreliable {
            reason: format!("attributed distance is not finite ({})", kept_sum),
            result: Box::new(result),
        });
    }

    if kept_sum <= 0.0 {
        let result = build_result(kept, 1.0, degraded_segments, config.decimals);
        if target > 0.0 {
            return Err(MileageError::Unreliable {
                reason: format!(
                    "route attributed no distance but reference total is {:.3} mi",
                    target
                ),
                result: Box::new(result),
            });
        }
        return Ok(result);
    }

    let ratio = target / kept_sum;
    let rescale = omitted > 0.0 || (ratio - 1.0).abs() > config.rescale_threshold;
    let scale = if rescale { ratio } else { 1.0 };

    debug!(
        "Reconciling {:.3} mi (measured {:.3}, omitted {:.3}) against {:.3} mi: scale {:.4}",
        kept_sum, measured, omitted, target, scale
    );

    let result = build_result(kept, scale, degraded_segments, config.decimals);

    let max = config.max_scale_ratio;
    if !ratio.is_finite() || ratio > max || ratio < 1.0 / max {
        return Err(MileageError::Unreliable {
            reason: format!(
                "scale ratio {:.2} outside [{:.2}, {:.2}] (attributed {:.3} mi, reference {:.3} mi)",
                ratio,
                1.0 / max,
                max,
                kept_sum,
                target
            ),
            result: Box::new(result),
        });
    }

    Ok(result)
}

fn build_result(
    kept: Vec<(Region, f64)>,
    scale: f64,
    degraded_segments: usize,
    decimals: Option<u32>,
) -> CalculationResult {
    let round = |value: f64| match decimals {
        Some(d) => {
            let factor = 10f64.powi(d as i32);
            (value * factor).round() / factor
        }
        None => value,
    };

    let state_distances: StateDistanceMap = kept
        .into_iter()
        .map(|(region, miles)| (region.key().to_string(), round(miles * scale)))
        .collect();

    let total_distance = round(state_distances.values().fold(0.0, |acc, v| acc + v));

    CalculationResult {
        state_distances,
        total_distance,
        degraded_segments,
    }
}
