// PalmCare — Report Task
//
// Consumes cycle reports and renders the serial health block.  With the
// `telemetry` feature, each report is also pushed to the dashboard server
// as JSON over a WebSocket.

use std::sync::mpsc::Receiver;

use crate::config::*;
use crate::events::{CycleReport, VitalsDisplay};

pub fn report_task(report_rx: Receiver<CycleReport>) {
    log::info!("Report task started");

    #[cfg(feature = "telemetry")]
    let mut publisher = telemetry::Publisher::connect();

    loop {
        let report = match report_rx.recv() {
            Ok(r) => r,
            Err(_) => {
                log::warn!("Report channel closed — exiting report task");
                return;
            }
        };

        print_report(&report);

        #[cfg(feature = "telemetry")]
        if let Some(publisher) = publisher.as_mut() {
            publisher.publish(&report);
        }
    }
}

/// Serial output block, one per cycle.  This block is the primary product
/// surface on the bench, so it goes straight to stdout rather than through
/// the logger.
fn print_report(report: &CycleReport) {
    println!("============== HEALTH DATA ==============");

    match report.temp_c {
        Some(t) => println!("Temperature : {t:.2} °C"),
        None => println!("Temperature : MLX90614 not detected."),
    }

    match report.vitals {
        VitalsDisplay::Measured {
            heart_rate_bpm,
            spo2_percent,
            fresh,
        } => {
            println!("SpO2        : {spo2_percent:.1} %");
            println!("Heart Rate  : {heart_rate_bpm:.1} BPM");
            if !fresh {
                println!("Note: weak signal, showing last valid values.");
            }
        }
        VitalsDisplay::AwaitingContact | VitalsDisplay::SensorOffline => {
            println!("SpO2        : (place finger properly on MAX30102)");
            println!("Heart Rate  : (place finger properly on MAX30102)");
        }
    }

    println!("Location    : {}", report.location);

    match &report.timestamp {
        Some(ts) => println!("Date & Time : {ts} ({TZ_LABEL})"),
        None => println!("Date & Time : Time not available (check Wi-Fi/NTP)."),
    }

    println!("=========================================\n");
}

#[cfg(feature = "telemetry")]
mod telemetry {
    //! WebSocket push of each cycle to the companion dashboard server.

    use std::time::Duration;

    use esp_idf_svc::ws::client::{EspWebSocketClient, EspWebSocketClientConfig};
    use esp_idf_svc::ws::FrameType;

    use crate::config::*;
    use crate::events::{CycleReport, VitalsDisplay};

    /// Shape expected by the dashboard server: absent readings are `null`.
    #[derive(serde::Serialize)]
    struct Payload {
        heart: Option<f32>,
        spo2: Option<f32>,
        temp_c: Option<f32>,
    }

    pub struct Publisher {
        client: EspWebSocketClient<'static>,
    }

    impl Publisher {
        /// Best-effort connect; telemetry must never disturb the measurement
        /// loop, so a failure just disables it for this boot.
        pub fn connect() -> Option<Self> {
            let config = EspWebSocketClientConfig::default();
            let timeout = Duration::from_millis(TELEMETRY_CONNECT_TIMEOUT_MS);

            match EspWebSocketClient::new(TELEMETRY_WS_URL, &config, timeout, |_event| {}) {
                Ok(client) => {
                    log::info!("Telemetry connected to {TELEMETRY_WS_URL}");
                    Some(Self { client })
                }
                Err(e) => {
                    log::warn!("Telemetry disabled — ws connect failed: {e}");
                    None
                }
            }
        }

        pub fn publish(&mut self, report: &CycleReport) {
            let (heart, spo2) = match report.vitals {
                VitalsDisplay::Measured {
                    heart_rate_bpm,
                    spo2_percent,
                    ..
                } => (Some(heart_rate_bpm), Some(spo2_percent)),
                _ => (None, None),
            };

            let payload = Payload {
                heart,
                spo2,
                temp_c: report.temp_c,
            };
            let json = match serde_json::to_string(&payload) {
                Ok(j) => j,
                Err(e) => {
                    log::warn!("Telemetry payload serialization failed: {e}");
                    return;
                }
            };

            if let Err(e) = self.client.send(FrameType::Text(false), json.as_bytes()) {
                log::warn!("Telemetry send failed: {e}");
            }
        }
    }
}
