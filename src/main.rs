//! adc-ble-sensor - nRF52840 firmware entry point.
//!
//! Task layout:
//! - `softdevice_task` runs the SoftDevice event loop.
//! - `ble_task` advertises and serves the GATT table.
//! - `sampler_task` samples the SAADC and publishes the result.
//!
//! All three share the static [`SensorContext`].

#![no_std]
#![no_main]

mod ble;
mod sensor;

use core::mem;

use adc_ble_sensor::{config, error};

use crate::ble::context::SensorContext;
use crate::ble::registration;
use crate::ble::schema::SCHEMA;
use crate::ble::server::{GattServer, SoftdeviceLink, SoftdeviceRegistrar};
use crate::error::Error;
use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::{bind_interrupts, saadc};
use nrf_softdevice::{raw, Softdevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
});

static CONTEXT: SensorContext = SensorContext::new();

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(
    sd: &'static Softdevice,
    server: &'static GattServer,
    link: &'static SoftdeviceLink,
) -> ! {
    ble::peripheral::run(sd, server, link, &CONTEXT).await
}

#[embassy_executor::task]
async fn sampler_task(adc: saadc::Saadc<'static, 1>, link: &'static SoftdeviceLink) -> ! {
    sensor::run(adc, link, &CONTEXT).await
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t {
            att_mtu: config::BLE_ATT_MTU,
        }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: config::BLE_ATTR_TAB_SIZE,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: config::DEVICE_NAME.as_ptr() as _,
            current_len: config::DEVICE_NAME.len() as u16,
            max_len: config::DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("adc-ble-sensor starting");

    // SoftDevice reserves priorities 0, 1 and 4.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    let sd = Softdevice::enable(&softdevice_config());

    // ── GATT table ───────────────────────────────────────────────────────
    let registered: Result<(), Error> =
        registration::register(&SCHEMA, &mut SoftdeviceRegistrar::new(sd), &CONTEXT)
            .map_err(Error::from);
    unwrap!(registered);
    info!("GATT table registered");

    let sd: &'static Softdevice = sd;

    static SERVER: StaticCell<GattServer> = StaticCell::new();
    let server = SERVER.init(GattServer::new(&CONTEXT));
    static LINK: StaticCell<SoftdeviceLink> = StaticCell::new();
    let link: &'static SoftdeviceLink = LINK.init(SoftdeviceLink::new());

    // ── SAADC ────────────────────────────────────────────────────────────
    interrupt::SAADC.set_priority(Priority::P3);
    let mut adc_config = saadc::Config::default();
    adc_config.resolution = saadc::Resolution::_12BIT;
    let mut channel = saadc::ChannelConfig::single_ended(p.P0_02);
    channel.gain = saadc::Gain::GAIN1_6;
    channel.reference = saadc::Reference::INTERNAL;
    let adc = saadc::Saadc::new(p.SAADC, Irqs, adc_config, [channel]);

    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(ble_task(sd, server, link)));
    unwrap!(spawner.spawn(sampler_task(adc, link)));
}
