// PalmCare — Hardware & System Configuration
// Target: ESP32 DevKit (Xtensa) with MAX30102 + MLX90614 on a shared I2C bus

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_I2C_SDA: i32 = 32; // I2C data line
pub const PIN_I2C_SCL: i32 = 33; // I2C clock line

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MAX30102: u8 = 0x57;
pub const I2C_ADDR_MLX90614: u8 = 0x5A;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks — bounds every transaction

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_VITALS: usize = 8192;
pub const STACK_REPORT: usize = 4096;

// ---------------------------------------------------------------------------
// Measurement Timing (milliseconds)
// ---------------------------------------------------------------------------
// WINDOW_SAMPLES and SAMPLE_INTERVAL_MS are coupled: 150 samples at 15 ms is
// a ~2.25 s window at ~66 Hz, and the heart-rate conversion constant in
// `estimator` was tuned against exactly this cadence.  Change one and the
// calibration is off.
pub const WINDOW_SAMPLES: usize = 150;
pub const SAMPLE_INTERVAL_MS: u64 = 15;
pub const CYCLE_PAUSE_MS: u64 = 3000; // idle gap between measurement cycles
pub const RESET_SETTLE_MS: u64 = 100; // MAX30102 soft-reset settling time

// ---------------------------------------------------------------------------
// Estimator Tuning
// ---------------------------------------------------------------------------
// Empirical noise floor for the window's mean intensity — below this the
// sensor is reading ambient light, not a finger.
pub const MIN_DC_LEVEL: f64 = 300.0;
// A sample must exceed the window mean by 3 % to count as a pulse peak.
pub const PEAK_THRESHOLD_FACTOR: f64 = 1.03;
// SpO2 reporting thresholds — see `estimator::clamp_spo2` for the semantics.
pub const SPO2_NOMINAL_THRESHOLD: f32 = 86.0;
pub const SPO2_NOMINAL: f32 = 90.0;
pub const SPO2_CEILING: f32 = 100.0;

// ---------------------------------------------------------------------------
// Network & Time
// ---------------------------------------------------------------------------
pub const WIFI_SSID: &str = ""; // set before flashing
pub const WIFI_PASSWORD: &str = "";
pub const SNTP_SYNC_TRIES: u32 = 40;
pub const SNTP_POLL_MS: u64 = 250;
pub const GMT_OFFSET_SECS: i64 = 19800; // IST = UTC+5:30
pub const TZ_LABEL: &str = "IST";
pub const LOCATION_LABEL: &str = "Bangalore, India";

// ---------------------------------------------------------------------------
// Telemetry (feature "telemetry")
// ---------------------------------------------------------------------------
#[cfg(feature = "telemetry")]
pub const TELEMETRY_WS_URL: &str = "ws://192.168.1.100:3000";
#[cfg(feature = "telemetry")]
pub const TELEMETRY_CONNECT_TIMEOUT_MS: u64 = 10_000;
