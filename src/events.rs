// PalmCare — System Events & Data Types

// ---------------------------------------------------------------------------
// Channel Reading (one decoded MAX30102 FIFO sample)
// ---------------------------------------------------------------------------
/// Paired red / infrared intensities from a single FIFO read, already masked
/// to the device's 18-bit ADC resolution (0..=262143).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelReading {
    pub red: u32,
    pub ir: u32,
}

// ---------------------------------------------------------------------------
// Vitals Display State
// ---------------------------------------------------------------------------
/// What the presentation layer should show for HR/SpO2 this cycle.
#[derive(Debug, Clone, Copy)]
pub enum VitalsDisplay {
    /// We have values to show.  `fresh` is false when this cycle's window was
    /// rejected and the values are the last-known-good fallback.
    Measured {
        heart_rate_bpm: f32,
        spo2_percent: f32,
        fresh: bool,
    },
    /// Sensor answered the probe but no window has passed the validity gates
    /// yet (typically: no finger on the sensor).
    AwaitingContact,
    /// Sensor did not answer the boot-time probe; all driver calls are
    /// skipped for the rest of the process lifetime.
    SensorOffline,
}

// ---------------------------------------------------------------------------
// Cycle Report — sent to the report task via channel
// ---------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Object temperature in °C, `None` when the thermometer is absent or the
    /// read failed this cycle.
    pub temp_c: Option<f32>,
    pub vitals: VitalsDisplay,
    /// Formatted local timestamp, `None` until SNTP has synced.
    pub timestamp: Option<String>,
    pub location: &'static str,
}
