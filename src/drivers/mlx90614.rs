// PalmCare — MLX90614 Infrared Thermometer Driver
//
// Non-contact object temperature via a single SMBus RAM-word read.

use crate::config::*;
use crate::drivers::bus::{self, SharedBus};

const REG_TOBJ1: u8 = 0x07; // object temperature, channel 1

pub struct Mlx90614 {
    bus: SharedBus,
}

impl Mlx90614 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    pub fn is_connected(&self) -> bool {
        bus::probe(self.bus, I2C_ADDR_MLX90614)
    }

    /// Read the object temperature in °C.
    ///
    /// The RAM word arrives LSB first with a trailing PEC byte; the raw
    /// value is in units of 0.02 K.  Bit 15 set means the sensor flagged
    /// the measurement as invalid.
    pub fn read_object_temp_c(&self) -> anyhow::Result<f32> {
        let mut raw = [0u8; 3];
        bus::read_block(self.bus, I2C_ADDR_MLX90614, REG_TOBJ1, &mut raw)?;

        let word = u16::from_le_bytes([raw[0], raw[1]]);
        if word & 0x8000 != 0 {
            anyhow::bail!("MLX90614 flagged the reading as invalid (0x{word:04x})");
        }

        Ok(raw_to_celsius(word))
    }
}

fn raw_to_celsius(word: u16) -> f32 {
    f32::from(word) * 0.02 - 273.15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_body_temperature() {
        // 0x3C1C = 15388 → 307.76 K → 34.61 °C
        let c = raw_to_celsius(0x3C1C);
        assert!((c - 34.61).abs() < 0.01);
    }

    #[test]
    fn absolute_zero_maps_to_minus_273() {
        assert!((raw_to_celsius(0) + 273.15).abs() < 1e-4);
    }
}
