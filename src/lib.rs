#![no_std]

#[cfg(feature = "defmt")]
extern crate defmt;

#[cfg(not(feature = "async"))]
use embedded_hal::{delay::DelayNs, i2c::I2c};
#[cfg(feature = "async")]
use embedded_hal_async::{delay::DelayNs, i2c::I2c};

pub mod alert;
pub mod convert;
pub mod registers;

mod data_types;
mod errors;

pub use data_types::{CellSelector, DeviceType, GaugeConfig, Mode, Readiness};
pub use errors::Error;

use alert::{AlertId, AlertRegistry};
use registers::*;

/// Cooperative watchdog refresh, invoked during the long NV-save waits.
pub trait Watchdog {
    fn refresh(&mut self);
}

/// For boards without a watchdog to feed.
pub struct NoWatchdog;

impl Watchdog for NoWatchdog {
    fn refresh(&mut self) {}
}

/// MAX17201/MAX17205 driver.
///
/// Owns the bus handle and the per-instance driver state; two instances on
/// two buses are independent. All waits go through the `DelayNs` the caller
/// passes in, so the driver itself never blocks on anything but the bus.
pub struct Max1720x<I2C>
where
    I2C: I2c,
{
    i2c: I2C,
    config: GaugeConfig,
    mode: Mode,
    readiness: Readiness,
    device_type: Option<DeviceType>,
    alert_id: Option<AlertId>,
}

impl<I2C> Max1720x<I2C>
where
    I2C: I2c,
{
    /// Creates a new driver instance over `i2c` with the given board
    /// parameters. No bus traffic happens until [`Max1720x::setup`].
    pub fn new(i2c: I2C, config: GaugeConfig) -> Self {
        Self {
            i2c,
            config,
            mode: Mode::Default,
            readiness: Readiness::Uninitialized,
            device_type: None,
            alert_id: None,
        }
    }

    /// Current readiness. Check before trusting measurements: a pack-voltage
    /// read can demote a multi-cell device at any time.
    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    /// Device family detected during the last successful identification.
    pub fn device_type(&self) -> Option<DeviceType> {
        self.device_type
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn bus_address(&self, reg: Register) -> u8 {
        match reg.bank() {
            Bank::Low => self.config.low_page_address,
            Bank::High => self.config.high_page_address,
        }
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "RegisterAccess",),
    async(feature = "async", keep_self)
)]
#[allow(async_fn_in_trait)]
/// Raw 16-bit register access with automatic bank routing.
///
/// Exposed so applications can reach registers the driver has no accessor
/// for, e.g. to clear alert status flags after a dispatch.
pub trait RegisterAccess<E> {
    /// Reads a register word, little-endian on the wire.
    async fn read_register(&mut self, reg: Register) -> Result<u16, Error<E>>;

    /// Writes a register word, little-endian on the wire.
    async fn write_register(&mut self, reg: Register, value: u16) -> Result<(), Error<E>>;
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "Max1720x",),
    async(feature = "async", keep_self)
)]
impl<I2C, E> RegisterAccess<E> for Max1720x<I2C>
where
    I2C: I2c<Error = E>,
{
    async fn read_register(&mut self, reg: Register) -> Result<u16, Error<E>> {
        let device = self.bus_address(reg);
        let mut data = [0u8; 2];
        self.i2c
            .write_read(device, &[reg.offset()], &mut data)
            .await
            .map_err(Error::I2c)?;
        Ok(u16::from_le_bytes(data))
    }

    async fn write_register(&mut self, reg: Register, value: u16) -> Result<(), Error<E>> {
        let device = self.bus_address(reg);
        let [lo, hi] = value.to_le_bytes();
        self.i2c
            .write(device, &[reg.offset(), lo, hi])
            .await
            .map_err(Error::I2c)
    }
}

fn log_alert(pin: u8) {
    #[cfg(feature = "defmt")]
    defmt::info!("max1720x: alert on pin {}", pin);
    #[cfg(not(feature = "defmt"))]
    let _ = pin;
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "Max1720x",),
    async(feature = "async", keep_self)
)]
impl<I2C, E> Max1720x<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Probes, identifies and configures the gauge for `mode`.
    ///
    /// Every call restarts from scratch; nothing survives from a previous
    /// run except what this run overwrites. A handler for the configured
    /// alert pin is registered into `alerts` on the first successful
    /// identification of this instance.
    pub async fn setup(
        &mut self,
        mode: Mode,
        delay: &mut impl DelayNs,
        watchdog: &mut impl Watchdog,
        alerts: Option<&mut AlertRegistry>,
    ) -> Result<(), Error<E>> {
        self.mode = mode;
        self.readiness = Readiness::Failed;
        self.device_type = None;

        // A factory-fresh part can hold an invalid configuration that keeps
        // it from answering at all; that read failure is the trigger for the
        // blank-device recovery path.
        if self.read_register(Register::DevName).await.is_err() {
            self.recover_blank_device(delay, watchdog).await;
        }

        let raw = match self.read_register(Register::DevName).await {
            Ok(raw) => raw,
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::error!("max1720x: no answer on the bus");
                return Err(Error::NotFound);
            }
        };

        let mut device_type = DeviceType::from_devname(raw);
        if device_type.is_none() {
            // One reset may bring a confused part back to a readable state.
            self.full_reset(delay).await?;
            device_type = match self.read_register(Register::DevName).await {
                Ok(raw) => DeviceType::from_devname(raw),
                Err(_) => None,
            };
        }

        let device_type = match device_type {
            Some(device_type) => device_type,
            None => {
                // Below its supply floor the part answers with garbage
                // identification data while otherwise responding. Failed
                // voltage reads classify as undervoltage too.
                let millivolts = self
                    .read_voltage(CellSelector::PackVoltage)
                    .await
                    .unwrap_or(0);
                if millivolts < self.config.undervoltage_mv {
                    #[cfg(feature = "defmt")]
                    defmt::error!(
                        "max1720x: identification failed undervolted, vbat/100 = {}",
                        millivolts / 100
                    );
                    self.readiness = Readiness::Undervoltage;
                    return Err(Error::Undervoltage { millivolts });
                }
                #[cfg(feature = "defmt")]
                defmt::error!("max1720x: no known gauge found, devname = {=u16:#x}", raw);
                return Err(Error::NotFound);
            }
        };
        self.device_type = Some(device_type);

        if let Some(pin) = self.config.alert_pin {
            if let Some(registry) = alerts {
                if self.alert_id.is_none() {
                    self.alert_id = registry.register(pin, log_alert);
                    #[cfg(feature = "defmt")]
                    if self.alert_id.is_none() {
                        defmt::warn!("max1720x: alert registry full, pin {} not wired", pin);
                    }
                }
            }
        }

        self.full_reset(delay).await?;

        match mode {
            Mode::ThreeCellsInternalTemp => {
                let mut cfg = self.read_register(Register::NPackCfg).await?;
                cfg &= !PACKCFG_NCELLS_MASK;
                cfg |= 3;
                cfg &= !PACKCFG_TEMP_MASK;
                cfg |= PACKCFG_TEMP_INTERNAL_DIE;
                cfg &= !PACKCFG_CXEN;
                cfg |= PACKCFG_CHEN | PACKCFG_BTEN | PACKCFG_TDEN;
                self.write_register(Register::NPackCfg, cfg).await?;
                self.write_register(Register::PackCfg, cfg).await?;
            }
            Mode::Default => {}
        }

        self.readiness = Readiness::Ready;
        Ok(())
    }

    /// Blank-device recovery: pre-write the mode's pack configuration and
    /// try to persist it so the part comes up sane after the next reset.
    ///
    /// Nothing here is fatal to setup; the caller proceeds with the in-RAM
    /// configuration whatever happens. Carried over from a bring-up fix that
    /// has not seen broad hardware validation; treat with care.
    async fn recover_blank_device(&mut self, delay: &mut impl DelayNs, watchdog: &mut impl Watchdog) {
        match self.mode {
            Mode::ThreeCellsInternalTemp => {
                let _ = self.write_register(Register::PackCfg, 3).await;
            }
            Mode::Default => {}
        }

        // Each failure kind is reported with its context inside the persist
        // path itself; setup only needs to know it must carry on.
        if self.persist_factory_config(delay, watchdog).await.is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("max1720x: factory configuration not persisted");
        }
    }

    /// Persists the current pack configuration into the wear-limited NV
    /// memory, then resets to apply it.
    ///
    /// Refuses outright when the write budget is down to [`NV_WRITE_FLOOR`]
    /// so recovery can never brick the part; retries the block copy a bounded
    /// number of times otherwise.
    async fn persist_factory_config(
        &mut self,
        delay: &mut impl DelayNs,
        watchdog: &mut impl Watchdog,
    ) -> Result<(), Error<E>> {
        let remaining = match self.remaining_nvm_updates(delay).await {
            Ok(remaining) => remaining,
            Err(err) => {
                // Likely no device at all; settle before the caller probes
                // again.
                delay.delay_ms(NV_SETTLE_MS).await;
                return Err(err);
            }
        };

        if remaining <= NV_WRITE_FLOOR {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "max1720x: {} NV updates left, refusing to burn one",
                remaining
            );
            // The settle time also helps marginal parts identify afterwards.
            delay.delay_ms(NV_SETTLE_MS).await;
            return Err(Error::NvWriteBudgetLow { remaining });
        }

        for _ in 0..NV_SAVE_MAX_TRIES {
            let cleared = self.read_register(Register::CommStat).await? & !COMMSTAT_NVERROR;
            self.write_register(Register::CommStat, cleared).await?;
            self.write_register(Register::Command, CMD_NV_BLOCK_COPY).await?;
            delay.delay_ms(T_RECALL_MS).await;
            for _ in 0..NV_SAVE_SLOTS {
                watchdog.refresh();
                delay.delay_ms(NV_SAVE_SLOT_MS).await;
            }
            let stat = self.read_register(Register::CommStat).await?;
            if stat & COMMSTAT_NVERROR == 0 {
                self.full_reset(delay).await?;
                return Ok(());
            }
        }

        #[cfg(feature = "defmt")]
        defmt::error!(
            "max1720x: NV block copy still failing after {} attempts",
            NV_SAVE_MAX_TRIES
        );
        Err(Error::NvWriteFailed)
    }

    /// Number of NV memory updates the device has left, 1..=7.
    ///
    /// Issues an NV recall first so the wear counter is current.
    pub async fn remaining_nvm_updates(&mut self, delay: &mut impl DelayNs) -> Result<u8, Error<E>> {
        self.write_register(Register::Command, CMD_NV_RECALL).await?;
        delay.delay_ms(T_RECALL_MS).await;
        let raw = self.read_register(Register::NRemainingUpdates).await?;
        match convert::decode_remaining_updates(raw) {
            Some(remaining) => Ok(remaining),
            None => {
                #[cfg(feature = "defmt")]
                defmt::error!(
                    "max1720x: unrecognized remaining-updates pattern {=u16:#x}",
                    raw
                );
                Err(Error::Decode { raw })
            }
        }
    }

    /// Full reset: power-on-reset command, then restart the fuel gauge
    /// through Config2.
    async fn full_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<E>> {
        self.write_register(Register::Command, CMD_FULL_RESET).await?;
        delay.delay_ms(T_POR_MS).await;
        self.write_register(Register::Config2, CONFIG2_POR).await?;
        delay.delay_ms(T_POR_MS).await;
        Ok(())
    }

    /// Temperature in milli-degrees Celsius.
    pub async fn read_temperature(&mut self) -> Result<i32, Error<E>> {
        let raw = self.read_register(Register::Temp).await?;
        Ok(convert::temperature_mc(raw))
    }

    /// Voltage of the selected channel in millivolts.
    ///
    /// Reading [`CellSelector::PackVoltage`] on a multi-cell part demotes
    /// [`Max1720x::readiness`] to [`Readiness::Undervoltage`] when the result
    /// sits below the configured floor; the read itself still succeeds.
    pub async fn read_voltage(&mut self, cell: CellSelector) -> Result<u32, Error<E>> {
        let raw = self.read_register(cell.register()).await?;
        match cell {
            CellSelector::PackVoltage => {
                let millivolts = convert::pack_voltage_mv(raw);
                let multi_cell = self
                    .device_type
                    .is_some_and(DeviceType::is_multi_cell);
                if multi_cell && millivolts < self.config.undervoltage_mv {
                    self.readiness = Readiness::Undervoltage;
                }
                Ok(millivolts)
            }
            _ => Ok(convert::cell_voltage_mv(raw)),
        }
    }

    /// Battery current in microamps; negative while discharging.
    pub async fn read_current(&mut self) -> Result<i32, Error<E>> {
        let raw = self.read_register(Register::Current).await?;
        Ok(convert::current_ua(raw, self.config.rsense_milliohm))
    }

    /// Raw coulomb counter, in the device's native unit. Counts down while
    /// discharging and up while charging.
    pub async fn read_coulomb_counter(&mut self) -> Result<u16, Error<E>> {
        self.read_register(Register::Qh).await
    }
}
