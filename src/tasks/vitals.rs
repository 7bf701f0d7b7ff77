// PalmCare — Vitals Measurement Task
//
// One sequential measurement cycle: object temperature, a 150-sample PPG
// window (blocking ~2.25 s), estimation, last-known-good bookkeeping, and a
// report to the presentation task.  Sensors are probed once at startup; an
// absent device stays absent for the process lifetime.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::config::*;
use crate::drivers::bus::{BusError, SharedBus};
use crate::drivers::max30102::Max30102;
use crate::drivers::mlx90614::Mlx90614;
use crate::estimator::{self, SampleWindow, Tuning, VitalsEstimate};
use crate::events::{CycleReport, VitalsDisplay};
use crate::net;

/// Last successful estimate, kept across cycles as the display fallback.
/// 0.0 is the "no data yet" sentinel; only a valid estimate overwrites it.
#[derive(Debug, Default)]
pub struct VitalsState {
    last_hr: f32,
    last_spo2: f32,
}

impl VitalsState {
    fn record(&mut self, estimate: &VitalsEstimate) {
        self.last_hr = estimate.heart_rate_bpm;
        self.last_spo2 = estimate.spo2_percent;
    }

    /// Display state for a cycle that produced no fresh estimate.
    fn fallback_display(&self) -> VitalsDisplay {
        if self.last_hr > 0.0 {
            VitalsDisplay::Measured {
                heart_rate_bpm: self.last_hr,
                spo2_percent: self.last_spo2,
                fresh: false,
            }
        } else {
            VitalsDisplay::AwaitingContact
        }
    }
}

pub fn vitals_task(bus: SharedBus, report_tx: Sender<CycleReport>) {
    log::info!("Vitals task started");

    let thermometer = Mlx90614::new(bus);
    let thermometer_ok = thermometer.is_connected();
    if thermometer_ok {
        log::info!("MLX90614 detected");
    } else {
        log::error!("MLX90614 not found — temperature disabled");
    }

    let ppg = Max30102::new(bus);
    let mut ppg_ok = ppg.is_connected();
    if ppg_ok {
        log::info!("MAX30102 detected");
        if let Err(e) = ppg.configure() {
            log::error!("MAX30102 configuration failed: {e} — vitals disabled");
            ppg_ok = false;
        }
    } else {
        log::error!("MAX30102 not found — check VCC, GND, SDA, SCL");
    }

    let tuning = Tuning::default();
    let mut state = VitalsState::default();
    let pause = Duration::from_millis(CYCLE_PAUSE_MS);

    loop {
        let report = run_cycle(&thermometer, thermometer_ok, &ppg, ppg_ok, &tuning, &mut state);
        if report_tx.send(report).is_err() {
            log::warn!("Report channel closed — exiting vitals task");
            return;
        }
        thread::sleep(pause);
    }
}

fn run_cycle(
    thermometer: &Mlx90614,
    thermometer_ok: bool,
    ppg: &Max30102,
    ppg_ok: bool,
    tuning: &Tuning,
    state: &mut VitalsState,
) -> CycleReport {
    let temp_c = if thermometer_ok {
        match thermometer.read_object_temp_c() {
            Ok(t) => Some(t),
            Err(e) => {
                log::warn!("Temperature read failed: {e}");
                None
            }
        }
    } else {
        None
    };

    let vitals = if !ppg_ok {
        VitalsDisplay::SensorOffline
    } else {
        match acquire_window(ppg) {
            Ok(window) => match estimator::estimate(&window, tuning) {
                Some(est) => {
                    state.record(&est);
                    VitalsDisplay::Measured {
                        heart_rate_bpm: est.heart_rate_bpm,
                        spo2_percent: est.spo2_percent,
                        fresh: true,
                    }
                }
                // Weak or pulseless signal — expected when no finger is on
                // the sensor.  Keep showing the previous values.
                None => state.fallback_display(),
            },
            Err(e) => {
                // Communication failure, not a signal-quality verdict.
                log::warn!("PPG window acquisition failed: {e}");
                state.fallback_display()
            }
        }
    };

    CycleReport {
        temp_c,
        vitals,
        timestamp: net::current_timestamp(),
        location: LOCATION_LABEL,
    }
}

/// Acquire one estimation window: `WINDOW_SAMPLES` reads with a fixed
/// `SAMPLE_INTERVAL_MS` pause after each.  Blocks the calling thread for
/// the full ~2.25 s; there is no partial-window result.
fn acquire_window(ppg: &Max30102) -> Result<SampleWindow, BusError> {
    let interval = Duration::from_millis(SAMPLE_INTERVAL_MS);
    let mut window = SampleWindow::new();

    for i in 0..WINDOW_SAMPLES {
        let reading = ppg.read_sample()?;
        window.red[i] = reading.red;
        window.ir[i] = reading.ir;
        thread::sleep(interval);
    }

    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_starts_awaiting_contact() {
        let state = VitalsState::default();
        assert!(matches!(
            state.fallback_display(),
            VitalsDisplay::AwaitingContact
        ));
    }

    #[test]
    fn fallback_keeps_last_known_good() {
        let mut state = VitalsState::default();
        state.record(&VitalsEstimate {
            heart_rate_bpm: 120.0,
            spo2_percent: 90.0,
        });

        // A later weak-signal cycle must surface the same values, marked stale.
        match state.fallback_display() {
            VitalsDisplay::Measured {
                heart_rate_bpm,
                spo2_percent,
                fresh,
            } => {
                assert_eq!(heart_rate_bpm, 120.0);
                assert_eq!(spo2_percent, 90.0);
                assert!(!fresh);
            }
            other => panic!("expected retained values, got {other:?}"),
        }
    }
}
