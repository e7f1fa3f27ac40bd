#![allow(dead_code)]

use embedded_hal::delay::DelayNs;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use max1720x_async_rs::{GaugeConfig, Max1720x, Watchdog};

/// Bus address serving registers 0x000..=0x0FF.
pub const LOW_PAGE: u8 = 0x36;
/// Bus address serving registers 0x100..=0x1FF.
pub const HIGH_PAGE: u8 = 0x0B;

pub fn gauge_config() -> GaugeConfig {
    GaugeConfig {
        rsense_milliohm: 10,
        undervoltage_mv: 5000,
        ..GaugeConfig::default()
    }
}

/// Builds a driver over a transaction mock; the returned mock handle is for
/// the final `done()` verification.
pub fn driver_with(
    transactions: &[I2cTransaction],
    config: GaugeConfig,
) -> (Max1720x<I2cMock>, I2cMock) {
    let i2c = I2cMock::new(transactions);
    let driver = Max1720x::new(i2c.clone(), config);
    (driver, i2c)
}

/// The bus script of a default-mode setup against a device that answers
/// immediately with `devname`: identification read, then the full reset.
pub fn default_setup_script(devname: u8) -> Vec<I2cTransaction> {
    vec![
        I2cTransaction::write_read(LOW_PAGE, vec![0x21], vec![devname, 0x00]),
        I2cTransaction::write(LOW_PAGE, vec![0x60, 0x0F, 0x00]),
        I2cTransaction::write(LOW_PAGE, vec![0xBB, 0x01, 0x00]),
    ]
}

/// Delay double that records how long the driver asked to wait.
#[derive(Default)]
pub struct RecordingDelay {
    total_ns: u64,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// Watchdog double counting cooperative refreshes.
#[derive(Default)]
pub struct CountingWatchdog {
    pub refreshes: u32,
}

impl CountingWatchdog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Watchdog for CountingWatchdog {
    fn refresh(&mut self) {
        self.refreshes += 1;
    }
}
