// PalmCare — Firmware Entry Point
//
// Boot sequence:
//   1. Bring up logging and the shared I2C bus.
//   2. Connect Wi-Fi and start SNTP (best-effort; failure means the report
//      shows a time placeholder instead of a timestamp).
//   3. Spawn the vitals measurement task and the report task.
//
// The measurement core runs sequentially on the vitals task: each cycle
// blocks for one full PPG window (~2.25 s) plus a 3 s inter-cycle pause.

mod config;
mod drivers;
mod estimator;
mod events;
mod net;
mod tasks;

use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::prelude::*;

use crate::config::*;
use crate::drivers::bus::SharedBus;

fn main() -> anyhow::Result<()> {
    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("PalmCare firmware starting…");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;

    // ---- I2C bus (shared between MAX30102 and MLX90614) -------------------
    // 100 kHz: the MLX90614 tops out there, and the MAX30102 is fine with it.
    let i2c_config = I2cConfig::new().baudrate(100u32.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio32, // SDA
        peripherals.pins.gpio33, // SCL
        &i2c_config,
    )?;
    // SAFETY: The I2C peripheral is a singleton obtained from `Peripherals::take()`.
    // It will live for the entire programme duration (embedded firmware never exits).
    let i2c_bus: SharedBus = Box::leak(Box::new(Mutex::new(unsafe { core::mem::transmute(i2c) })));

    // ---- Network + time (best-effort) -------------------------------------
    let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
    let nvs = esp_idf_svc::nvs::EspDefaultNvsPartition::take()?;
    let _net = match net::connect(peripherals.modem, sysloop, nvs) {
        Ok(stack) => Some(stack),
        Err(e) => {
            log::error!("Network bring-up failed: {e} — continuing offline");
            None
        }
    };

    // ---- Channels ----------------------------------------------------------
    let (report_tx, report_rx) = mpsc::channel();

    // ---- Spawn tasks (map to FreeRTOS tasks via std::thread) ---------------

    // Vitals task — owns both sensors and the sequential measurement cycle.
    let vitals_bus = i2c_bus;
    thread::Builder::new()
        .name("vitals".into())
        .stack_size(STACK_VITALS)
        .spawn(move || {
            tasks::vitals::vitals_task(vitals_bus, report_tx);
        })?;

    // Report task — serial health block (+ optional telemetry).
    thread::Builder::new()
        .name("report".into())
        .stack_size(STACK_REPORT)
        .spawn(move || {
            tasks::report::report_task(report_rx);
        })?;

    // Main thread has nothing left to do — park it forever.
    // (All work happens in the spawned FreeRTOS tasks.)
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}
