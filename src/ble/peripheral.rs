//! Advertising and connection lifecycle (Peripheral role).
//!
//! Advertises until a central connects, serves GATT on that link until it
//! drops, then advertises again. A failed advertising attempt restarts
//! advertising after a short back-off.

use crate::ble::adv_payload::{advertising_data, scan_response};
use crate::ble::connection::{ConnectOutcome, ConnectStatus, CONN_HANDLE_NONE};
use crate::ble::context::SensorContext;
use crate::ble::server::{GattServer, SoftdeviceLink};
use crate::config;
use defmt::{info, warn};
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::peripheral::{self, AdvertiseError};
use nrf_softdevice::ble::gatt_server;
use nrf_softdevice::Softdevice;

fn status_code(e: &AdvertiseError) -> u32 {
    match e {
        AdvertiseError::Timeout => 0,
        AdvertiseError::NoFreeConn => 1,
        AdvertiseError::Raw(raw) => *raw as u32,
    }
}

/// Advertise, serve one connection at a time, repeat forever.
pub async fn run(
    sd: &'static Softdevice,
    server: &GattServer,
    link: &SoftdeviceLink,
    ctx: &'static SensorContext,
) -> ! {
    let adv_data = advertising_data(config::DEVICE_NAME);
    let scan_data = scan_response(&[config::SENSOR_SERVICE_UUID]);
    let adv_config = peripheral::Config {
        interval: config::BLE_ADV_INTERVAL,
        ..Default::default()
    };

    loop {
        info!("BLE advertising as {}", config::DEVICE_NAME);
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &adv_data,
            scan_data: &scan_data,
        };

        let conn = match peripheral::advertise_connectable(sd, adv, &adv_config).await {
            Ok(conn) => conn,
            Err(e) => {
                let outcome = ctx
                    .connection
                    .on_connect(CONN_HANDLE_NONE, ConnectStatus::Failed(status_code(&e)));
                warn!("BLE advertising failed: {:?} -> {}", e, outcome);
                Timer::after(Duration::from_millis(config::BLE_ADV_RETRY_MS)).await;
                continue;
            }
        };

        // A link that dropped before we got here has no handle.
        let Some(handle) = conn.handle() else {
            continue;
        };

        match ctx.connection.establish(handle, || link.attach(&conn)) {
            ConnectOutcome::Replaced { previous } => {
                warn!("BLE connection {} replaced stale handle {}", handle, previous)
            }
            _ => info!("BLE client connected, handle={}", handle),
        }

        let e = gatt_server::run(&conn, server, |_| {}).await;

        if let Some(previous) = ctx.connection.release(|| link.detach()) {
            info!("BLE client disconnected, handle={} ({:?})", previous, e);
        }
    }
}
