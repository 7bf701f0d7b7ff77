// PalmCare — Shared I2C Bus Transport
//
// Thin register-transport layer over the shared bus mutex.  Knows nothing
// about sensor semantics; register meaning belongs to the drivers.

use std::sync::Mutex;

use esp_idf_hal::i2c::I2cDriver;
use esp_idf_sys::EspError;

use crate::config::*;

/// Thread-safe handle to a shared I2C bus.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

/// Transport-level failure.  Kept distinct from signal-quality verdicts:
/// this means "communication failed", never "signal ambiguous".
#[derive(Debug, thiserror::Error)]
#[error("i2c {op} @ 0x{addr:02x} failed: {source}")]
pub struct BusError {
    op: &'static str,
    addr: u8,
    #[source]
    source: EspError,
}

/// Zero-length write — true when the device acks its address.
pub fn probe(bus: SharedBus, addr: u8) -> bool {
    let mut bus = bus.lock().unwrap();
    bus.write(addr, &[], I2C_TIMEOUT_TICKS).is_ok()
}

/// Write a single `value` byte to `reg`.
pub fn write_register(bus: SharedBus, addr: u8, reg: u8, value: u8) -> Result<(), BusError> {
    let mut bus = bus.lock().unwrap();
    bus.write(addr, &[reg, value], I2C_TIMEOUT_TICKS).map_err(|source| BusError {
        op: "write",
        addr,
        source,
    })
}

/// Select `reg` (repeated start, bus held) and burst-read into `buf`.
///
/// The select-then-read sequence runs under one bus lock and either fills
/// `buf` completely or fails — a partial transfer surfaces as an error
/// instead of leaving stale bytes behind.  The tick timeout bounds every
/// transaction, so a wedged device reports an error rather than hanging.
pub fn read_block(bus: SharedBus, addr: u8, reg: u8, buf: &mut [u8]) -> Result<(), BusError> {
    let mut bus = bus.lock().unwrap();
    bus.write_read(addr, &[reg], buf, I2C_TIMEOUT_TICKS).map_err(|source| BusError {
        op: "read",
        addr,
        source,
    })
}
