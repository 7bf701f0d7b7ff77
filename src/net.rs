// PalmCare — Wi-Fi + SNTP Collaborators
//
// Network bring-up is best-effort: every failure downgrades to "no
// timestamp" placeholders and never blocks the measurement loop.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use chrono::{DateTime, Datelike};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sntp::{EspSntp, SyncStatus};
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

use crate::config::*;

/// Owns the live network services; dropping it disconnects the station.
pub struct NetStack {
    _wifi: BlockingWifi<EspWifi<'static>>,
    _sntp: EspSntp<'static>,
}

/// Connect to the configured access point and start SNTP.
pub fn connect(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
) -> anyhow::Result<NetStack> {
    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

    let client_config = ClientConfiguration {
        ssid: WIFI_SSID
            .try_into()
            .map_err(|_| anyhow::anyhow!("Wi-Fi SSID too long"))?,
        password: WIFI_PASSWORD
            .try_into()
            .map_err(|_| anyhow::anyhow!("Wi-Fi password too long"))?,
        auth_method: AuthMethod::WPA2Personal,
        ..Default::default()
    };
    wifi.set_configuration(&Configuration::Client(client_config))?;

    wifi.start()?;
    wifi.connect().context("Wi-Fi association failed")?;
    wifi.wait_netif_up()?;

    let ip = wifi.wifi().sta_netif().get_ip_info()?.ip;
    log::info!("Wi-Fi connected, IP {ip}");

    let sntp = EspSntp::new_default()?;
    wait_for_time_sync(&sntp);

    Ok(NetStack {
        _wifi: wifi,
        _sntp: sntp,
    })
}

/// Poll SNTP for a bounded number of tries, then give up quietly — the
/// clock can still sync later while the firmware runs.
fn wait_for_time_sync(sntp: &EspSntp<'_>) {
    for _ in 0..SNTP_SYNC_TRIES {
        if sntp.get_sync_status() == SyncStatus::Completed {
            log::info!("SNTP time synchronized");
            return;
        }
        thread::sleep(Duration::from_millis(SNTP_POLL_MS));
    }
    log::warn!("SNTP sync still pending — timestamps unavailable for now");
}

/// Current local timestamp, `None` until the wall clock has been set.
pub fn current_timestamp() -> Option<String> {
    let epoch = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    format_epoch(epoch.as_secs() as i64)
}

/// `%Y-%m-%d %H:%M:%S` with the configured zone offset applied.  A wall
/// clock that predates 2020 can only mean "never synced", so it is reported
/// as absent.
fn format_epoch(epoch_secs: i64) -> Option<String> {
    let local = DateTime::from_timestamp(epoch_secs + GMT_OFFSET_SECS, 0)?;
    if local.year() < 2020 {
        return None;
    }
    Some(local.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsynced_clock_yields_no_timestamp() {
        // Fresh boot: the RTC starts near the epoch.
        assert_eq!(format_epoch(0), None);
        assert_eq!(format_epoch(86_400), None);
    }

    #[test]
    fn synced_clock_formats_in_local_time() {
        // 2023-11-14 22:13:20 UTC → 2023-11-15 03:43:20 IST.
        assert_eq!(
            format_epoch(1_700_000_000).as_deref(),
            Some("2023-11-15 03:43:20")
        );
    }
}
