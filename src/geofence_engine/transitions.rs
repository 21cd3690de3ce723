//! Per-zone state machine
//!
//! One call advances a single device×zone pair by one fix. ENTER and EXIT are
//! edge-triggered on the containment flag; PREDICTED_CROSSING is only
//! considered while outside and is debounced per zone.

use tracing::debug;

use crate::error::GeofenceError;
use crate::events::{CrossingKind, EventMetadata};
use crate::fixes::LocationFix;
use crate::geometry::contains_point;
use crate::prediction::BoundaryPredictor;
use crate::zones::Zone;

use super::zone_state::ZoneRuntimeState;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Transition {
    pub kind: CrossingKind,
    pub metadata: EventMetadata,
}

/// Advance `state` by `fix`
///
/// A geometry error is returned before `state` is touched. Motion errors only
/// suppress the prediction; containment and `last_fix` are still updated.
pub(crate) fn advance(
    state: &mut ZoneRuntimeState,
    zone: &Zone,
    fix: &LocationFix,
    predictor: &BoundaryPredictor,
) -> Result<Option<Transition>, GeofenceError> {
    let is_inside = contains_point(fix.coordinate, &zone.shape)?;
    let now = fix.timestamp_millis;

    let transition = if is_inside && !state.last_containment {
        state.entered_at_millis = Some(now);
        Some(Transition {
            kind: CrossingKind::Enter,
            metadata: EventMetadata::default(),
        })
    } else if !is_inside && state.last_containment {
        Some(Transition {
            kind: CrossingKind::Exit,
            metadata: EventMetadata {
                duration_ms: state.entered_at_millis.map(|entered| now.saturating_sub(entered)),
                ..Default::default()
            },
        })
    } else if !is_inside && zone.predictive_alerts {
        predict(state, zone, fix, predictor)?
    } else {
        None
    };

    state.last_containment = is_inside;
    state.last_fix = Some(fix.clone());
    Ok(transition)
}

fn predict(
    state: &mut ZoneRuntimeState,
    zone: &Zone,
    fix: &LocationFix,
    predictor: &BoundaryPredictor,
) -> Result<Option<Transition>, GeofenceError> {
    let Some(previous) = state.last_fix.as_ref() else {
        return Ok(None);
    };

    let prediction = match predictor.predict(fix, previous, zone) {
        Ok(prediction) => prediction,
        Err(e) if e.is_motion_error() => {
            debug!("Skipping prediction for zone {}: {}", zone.id, e);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    if !prediction.will_cross {
        return Ok(None);
    }

    let now = fix.timestamp_millis;
    let debounce_ms = i64::try_from(zone.debounce_ms).unwrap_or(i64::MAX);
    let debounced = state
        .last_transition_at_millis
        .is_some_and(|last| now.saturating_sub(last) < debounce_ms);
    if debounced {
        debug!(
            "Predicted crossing of zone {} suppressed, last alert at {:?}",
            zone.id, state.last_transition_at_millis
        );
        return Ok(None);
    }

    state.last_transition_at_millis = Some(now);
    Ok(Some(Transition {
        kind: CrossingKind::PredictedCrossing,
        metadata: EventMetadata {
            eta_ms: Some(prediction.eta_ms),
            speed_mps: Some(prediction.speed_mps),
            ..Default::default()
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShapeDefect;
    use crate::fixes::Coordinate;
    use crate::geometry::distance::destination_point;

    const CENTER: Coordinate = Coordinate::new(48.8566, 2.3522);

    fn zone() -> Zone {
        Zone::circle("paris", CENTER, 500.0).with_predictive_alerts(true)
    }

    /// Fix `meters` north of the center at `ts`
    fn fix_at(meters: f64, ts: i64) -> LocationFix {
        LocationFix::new(destination_point(CENTER, 0.0, meters), 5.0, ts)
    }

    fn step(state: &mut ZoneRuntimeState, zone: &Zone, fix: LocationFix) -> Option<CrossingKind> {
        advance(state, zone, &fix, &BoundaryPredictor::default())
            .unwrap()
            .map(|t| t.kind)
    }

    #[test]
    fn test_enter_then_exit_reports_duration() {
        let zone = zone();
        let mut state = ZoneRuntimeState::default();

        let enter = advance(&mut state, &zone, &fix_at(0.0, 0), &BoundaryPredictor::default())
            .unwrap()
            .unwrap();
        assert_eq!(enter.kind, CrossingKind::Enter);
        assert_eq!(state.entered_at_millis, Some(0));

        let exit = advance(
            &mut state,
            &zone,
            &fix_at(2_000.0, 12_000),
            &BoundaryPredictor::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(exit.kind, CrossingKind::Exit);
        assert_eq!(exit.metadata.duration_ms, Some(12_000));
        assert!(!state.last_containment);
    }

    #[test]
    fn test_staying_inside_is_silent() {
        let zone = zone();
        let mut state = ZoneRuntimeState::default();
        assert_eq!(step(&mut state, &zone, fix_at(0.0, 0)), Some(CrossingKind::Enter));
        assert_eq!(step(&mut state, &zone, fix_at(10.0, 5_000)), None);
        assert_eq!(step(&mut state, &zone, fix_at(20.0, 10_000)), None);
    }

    #[test]
    fn test_first_outside_fix_has_nothing_to_predict_from() {
        let zone = zone();
        let mut state = ZoneRuntimeState::default();
        assert_eq!(step(&mut state, &zone, fix_at(750.0, 10_000)), None);
        assert!(state.last_fix.is_some());
    }

    #[test]
    fn test_prediction_is_debounced() {
        let zone = zone().with_debounce_ms(60_000);
        let mut state = ZoneRuntimeState::default();

        step(&mut state, &zone, fix_at(850.0, 0));
        assert_eq!(
            step(&mut state, &zone, fix_at(750.0, 10_000)),
            Some(CrossingKind::PredictedCrossing)
        );
        assert_eq!(state.last_transition_at_millis, Some(10_000));

        // Still approaching at 10 m/s, inside the debounce window
        assert_eq!(step(&mut state, &zone, fix_at(650.0, 20_000)), None);
        assert_eq!(state.last_transition_at_millis, Some(10_000));

        // Window elapsed, still outside and still closing in
        let mut far = state.clone();
        far.last_fix = Some(fix_at(800.0, 60_000));
        assert_eq!(
            step(&mut far, &zone, fix_at(700.0, 70_000)),
            Some(CrossingKind::PredictedCrossing)
        );
    }

    #[test]
    fn test_prediction_disabled_for_zone() {
        let zone = zone().with_predictive_alerts(false);
        let mut state = ZoneRuntimeState::default();
        step(&mut state, &zone, fix_at(850.0, 0));
        assert_eq!(step(&mut state, &zone, fix_at(750.0, 10_000)), None);
    }

    #[test]
    fn test_motion_error_still_updates_state() {
        let zone = zone();
        let mut state = ZoneRuntimeState::default();
        step(&mut state, &zone, fix_at(850.0, 10_000));

        // 500 ms later: below the minimum interval
        assert_eq!(step(&mut state, &zone, fix_at(845.0, 10_500)), None);
        assert_eq!(state.last_fix.as_ref().unwrap().timestamp_millis, 10_500);
        assert!(state.last_transition_at_millis.is_none());
    }

    #[test]
    fn test_geometry_error_leaves_state_untouched() {
        let broken = Zone::circle("broken", CENTER, 0.0);
        let mut state = ZoneRuntimeState::default();

        let result = advance(&mut state, &broken, &fix_at(0.0, 0), &BoundaryPredictor::default());
        assert_eq!(
            result,
            Err(GeofenceError::InvalidShape(ShapeDefect::NonPositiveRadius(0.0)))
        );
        assert_eq!(state, ZoneRuntimeState::default());
    }
}
