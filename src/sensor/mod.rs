//! ADC sampling subsystem.
//!
//! The SAADC samples AIN0 single-ended against the internal 0.6 V
//! reference with gain 1/6, giving a 0..3.6 V input range. Each cycle
//! averages a window of conversions, converts the mean to millivolts and
//! hands it to the BLE publisher.

use adc_ble_sensor::sensor::averaging::{raw_to_millivolts, Window};
use crate::ble::context::SensorContext;
use crate::ble::publisher::publish;
use crate::ble::server::SoftdeviceLink;
use crate::config::{
    ADC_FULL_SCALE_MV, ADC_PUBLISH_PAUSE_MS, ADC_RESOLUTION_BITS, ADC_SAMPLES_PER_WINDOW,
    ADC_SAMPLE_INTERVAL_MS,
};
use defmt::{debug, info};
use embassy_nrf::saadc::Saadc;
use embassy_time::{Duration, Timer};

/// Sample, average, publish, pause. Never returns.
pub async fn run(mut saadc: Saadc<'static, 1>, link: &SoftdeviceLink, ctx: &SensorContext) -> ! {
    saadc.calibrate().await;
    info!(
        "ADC sampling: {} samples every {} ms, {} ms pause",
        ADC_SAMPLES_PER_WINDOW, ADC_SAMPLE_INTERVAL_MS, ADC_PUBLISH_PAUSE_MS
    );

    loop {
        let mut window = Window::new();
        for _ in 0..ADC_SAMPLES_PER_WINDOW {
            let mut buf = [0i16; 1];
            saadc.sample(&mut buf).await;
            window.push(buf[0]);
            Timer::after(Duration::from_millis(ADC_SAMPLE_INTERVAL_MS)).await;
        }

        let raw = window.mean().unwrap_or(0);
        let millivolts = raw_to_millivolts(raw, ADC_RESOLUTION_BITS, ADC_FULL_SCALE_MV);
        info!("ADC raw={} voltage={} mV", raw, millivolts);

        let outcome = publish(ctx, link, millivolts);
        debug!("publish outcome: {}", outcome);

        Timer::after(Duration::from_millis(ADC_PUBLISH_PAUSE_MS)).await;
    }
}
