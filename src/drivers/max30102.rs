// PalmCare — MAX30102 Pulse Oximeter Driver
//
// Register-level driver over the shared I2C bus, dual-channel (red + IR)
// SpO2 acquisition.  FIFO decoding is a pure function so the byte layout is
// testable off-target.

use std::thread;
use std::time::Duration;

use crate::config::*;
use crate::drivers::bus::{self, BusError, SharedBus};
use crate::events::ChannelReading;

// MAX30102 register addresses
const REG_FIFO_WR_PTR: u8 = 0x04;
const REG_OVF_COUNTER: u8 = 0x05;
const REG_FIFO_RD_PTR: u8 = 0x06;
const REG_FIFO_DATA: u8 = 0x07;
const REG_FIFO_CONFIG: u8 = 0x08;
const REG_MODE_CONFIG: u8 = 0x09;
const REG_SPO2_CONFIG: u8 = 0x0A;
const REG_LED1_PA: u8 = 0x0C; // red LED current
const REG_LED2_PA: u8 = 0x0D; // IR LED current

const MODE_RESET: u8 = 0x40;
const MODE_SPO2: u8 = 0x03; // red + IR dual-channel acquisition
const FIFO_CONFIG_VAL: u8 = 0x4F; // 4-sample averaging, near-full threshold 15
const SPO2_CONFIG_VAL: u8 = 0x27; // 4096 nA range, 100 sps, 411 µs pulses (18-bit)
const LED_CURRENT_VAL: u8 = 0x24; // ~7.2 mA, both channels driven equally

/// One FIFO entry: 3 bytes red + 3 bytes IR.
const FIFO_SAMPLE_BYTES: usize = 6;
/// The ADC resolves 18 bits; the top 6 bits of each 24-bit field stay zero.
const ADC_MASK: u32 = 0x3FFFF;

pub struct Max30102 {
    bus: SharedBus,
}

impl Max30102 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    /// Verify the device acks its address.  Must be true before
    /// `configure`/`read_sample` are called; neither re-checks presence.
    pub fn is_connected(&self) -> bool {
        bus::probe(self.bus, I2C_ADDR_MAX30102)
    }

    /// Reset the device and bring it up in dual-channel SpO2 mode.
    ///
    /// Order matters: the soft reset must come first (and needs ~100 ms to
    /// settle), and the mode-control write must follow the FIFO pointer
    /// clear so acquisition starts from a clean buffer.
    pub fn configure(&self) -> Result<(), BusError> {
        self.write(REG_MODE_CONFIG, MODE_RESET)?;
        thread::sleep(Duration::from_millis(RESET_SETTLE_MS));

        self.write(REG_FIFO_CONFIG, FIFO_CONFIG_VAL)?;

        // FIFO pointers: write, overflow counter, read
        self.write(REG_FIFO_WR_PTR, 0x00)?;
        self.write(REG_OVF_COUNTER, 0x00)?;
        self.write(REG_FIFO_RD_PTR, 0x00)?;

        self.write(REG_MODE_CONFIG, MODE_SPO2)?;
        self.write(REG_SPO2_CONFIG, SPO2_CONFIG_VAL)?;

        self.write(REG_LED1_PA, LED_CURRENT_VAL)?;
        self.write(REG_LED2_PA, LED_CURRENT_VAL)?;

        log::info!("MAX30102 configured (SpO2 mode, 100 sps, 18-bit)");
        Ok(())
    }

    /// Burst-read one FIFO entry and decode it.
    pub fn read_sample(&self) -> Result<ChannelReading, BusError> {
        let mut raw = [0u8; FIFO_SAMPLE_BYTES];
        bus::read_block(self.bus, I2C_ADDR_MAX30102, REG_FIFO_DATA, &mut raw)?;
        Ok(decode_fifo_sample(&raw))
    }

    fn write(&self, reg: u8, value: u8) -> Result<(), BusError> {
        bus::write_register(self.bus, I2C_ADDR_MAX30102, reg, value)
    }
}

/// Split a 6-byte FIFO block into the two channel intensities: bytes 0..3
/// are the red channel, bytes 3..6 the IR channel, each a big-endian 24-bit
/// value masked down to the ADC's 18 significant bits.
pub fn decode_fifo_sample(raw: &[u8; FIFO_SAMPLE_BYTES]) -> ChannelReading {
    let red = u32::from(raw[0]) << 16 | u32::from(raw[1]) << 8 | u32::from(raw[2]);
    let ir = u32::from(raw[3]) << 16 | u32::from(raw[4]) << 8 | u32::from(raw[5]);

    ChannelReading {
        red: red & ADC_MASK,
        ir: ir & ADC_MASK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_big_endian_channels() {
        let raw = [0x00, 0x01, 0x02, 0x00, 0x03, 0x04];
        let reading = decode_fifo_sample(&raw);
        assert_eq!(reading.red, 0x0102);
        assert_eq!(reading.ir, 0x0304);
    }

    #[test]
    fn masks_to_18_bits() {
        // Top 6 bits of each 24-bit field must be stripped.
        let raw = [0xFF; 6];
        let reading = decode_fifo_sample(&raw);
        assert_eq!(reading.red, 0x3FFFF);
        assert_eq!(reading.ir, 0x3FFFF);
    }

    #[test]
    fn decode_is_pure() {
        let raw = [0x01, 0x23, 0x45, 0x02, 0x46, 0x8A];
        assert_eq!(decode_fifo_sample(&raw), decode_fifo_sample(&raw));
    }
}
