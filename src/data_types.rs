use crate::registers::{Register, DEVNAME_TYPE_MASK, HIGH_PAGE_ADDRESS, LOW_PAGE_ADDRESS};

/// Operating mode requested at setup time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Leave the factory pack configuration untouched.
    #[default]
    Default,
    /// Three series cells, fuel gauge fed from the internal die temperature,
    /// per-cell / pack / thermistor channels enabled.
    ThreeCellsInternalTemp,
}

/// Which voltage channel to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CellSelector {
    Cell1,
    Cell2,
    Cell3,
    Cell4,
    /// CELLX balancing input.
    CellBalance,
    /// Total pack voltage (Batt channel).
    PackVoltage,
}

impl CellSelector {
    pub(crate) const fn register(self) -> Register {
        match self {
            CellSelector::Cell1 => Register::Cell1,
            CellSelector::Cell2 => Register::Cell2,
            CellSelector::Cell3 => Register::Cell3,
            CellSelector::Cell4 => Register::Cell4,
            CellSelector::CellBalance => Register::CellX,
            CellSelector::PackVoltage => Register::Batt,
        }
    }
}

/// Device family, read from the DevName register during identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DeviceType {
    /// MAX17201, single cell.
    Max17201 = 0x01,
    /// MAX17205, multi cell.
    Max17205 = 0x05,
}

impl DeviceType {
    /// Maps a raw DevName word to a known family, if any.
    pub fn from_devname(raw: u16) -> Option<Self> {
        match (raw & DEVNAME_TYPE_MASK) as u8 {
            0x01 => Some(DeviceType::Max17201),
            0x05 => Some(DeviceType::Max17205),
            _ => None,
        }
    }

    /// Multi-cell parts need the full pack voltage to answer reliably.
    pub const fn is_multi_cell(self) -> bool {
        matches!(self, DeviceType::Max17205)
    }
}

/// Driver readiness, as reported by [`crate::Max1720x::readiness`].
///
/// `Undervoltage` can be entered after a successful setup: a pack-voltage
/// read on a multi-cell part demotes the driver when the rail sags below the
/// configured floor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Readiness {
    #[default]
    Uninitialized,
    Ready,
    Failed,
    Undervoltage,
}

/// Board-level parameters of the gauge, handed to the constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GaugeConfig {
    /// Sense resistor value in milliohms.
    pub rsense_milliohm: u32,
    /// Pack voltage below which a multi-cell part is considered
    /// undervolted, in millivolts.
    pub undervoltage_mv: u32,
    /// Board pin wired to ALRT1, if any. Setup registers a logging handler
    /// for it in the supplied [`crate::alert::AlertRegistry`].
    pub alert_pin: Option<u8>,
    /// Slave address serving registers 0x000..=0x0FF.
    pub low_page_address: u8,
    /// Slave address serving registers 0x100..=0x1FF.
    pub high_page_address: u8,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            rsense_milliohm: 10,
            undervoltage_mv: 5000,
            alert_pin: None,
            low_page_address: LOW_PAGE_ADDRESS,
            high_page_address: HIGH_PAGE_ADDRESS,
        }
    }
}
