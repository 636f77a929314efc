//! Pulse-echo ultrasonic reads.

use core::time::Duration;

use hoverkart_faults::{FaultKind, FaultReporter};
use tracing::debug;

use crate::{DistanceReading, InvalidReason, SensorConfig, SensorId, UltrasonicTransducer};

/// Trigger one transducer and convert its echo to a distance.
///
/// Waits at most [`SensorConfig::echo_timeout`]. A missing or zero-width
/// echo yields [`InvalidReason::Timeout`] and a `Sensor` fault; a pin error
/// yields [`InvalidReason::Transport`] and a `Sensor` fault. Valid distances
/// are truncated to whole centimeters and clamped to the configured range.
pub fn read_ultrasonic<U>(
    sensor: SensorId,
    transducer: &mut U,
    config: &SensorConfig,
    faults: &mut FaultReporter,
) -> DistanceReading
where
    U: UltrasonicTransducer + ?Sized,
{
    let echo = transducer
        .trigger()
        .and_then(|()| transducer.measure_echo(config.echo_timeout()));

    match echo {
        Ok(Some(width)) if !width.is_zero() => {
            DistanceReading::valid(sensor, echo_to_cm(width, config))
        }
        Ok(_) => {
            debug!(sensor = %sensor, "ultrasonic echo timed out");
            faults.report(
                FaultKind::Sensor,
                &format!("{sensor} ultrasonic sensor timeout"),
            );
            DistanceReading::invalid(sensor, InvalidReason::Timeout)
        }
        Err(e) => {
            debug!(sensor = %sensor, error = %e, "ultrasonic transport error");
            faults.report(
                FaultKind::Sensor,
                &format!("{sensor} ultrasonic sensor error: {e}"),
            );
            DistanceReading::invalid(sensor, InvalidReason::Transport)
        }
    }
}

fn echo_to_cm(width: Duration, config: &SensorConfig) -> u16 {
    let cm = width.as_micros() as f64 * config.speed_of_sound_cm_per_us / 2.0;
    let max = f64::from(config.ultrasonic_max_cm);
    if cm >= max {
        config.ultrasonic_max_cm
    } else {
        // NaN and negative widths map to 0
        u16::try_from(cm.trunc() as i64).unwrap_or(0)
    }
}
