//! Register map of the MAX17201/MAX17205 gauges.
//!
//! The device exposes 16-bit registers behind two I2C slave addresses:
//! logical addresses below [`BANK_SPLIT`] live on the low page, everything
//! else on the high page. [`bank_of`] is the single place that rule exists.

/// Boundary between the two register pages.
pub const BANK_SPLIT: u16 = 0x100;

/// Default slave address of the low register page (0x000..=0x0FF).
pub const LOW_PAGE_ADDRESS: u8 = 0x36;
/// Default slave address of the high register page (0x100..=0x1FF).
pub const HIGH_PAGE_ADDRESS: u8 = 0x0B;

/// The two bus endpoints a register address can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    /// Registers 0x000..=0x0FF.
    Low,
    /// Registers 0x100..=0x1FF.
    High,
}

/// Bank selection is a pure function of the logical address.
pub const fn bank_of(address: u16) -> Bank {
    if address < BANK_SPLIT {
        Bank::Low
    } else {
        Bank::High
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Register {
    /// Status Register. Alert flags; cleared and interpreted by the
    /// application, never by this driver.
    Status = 0x000,
    /// Temp Register. Die or thermistor temperature, signed, 1/256 degC per LSB.
    Temp = 0x008,
    /// Current Register. Signed voltage across the sense resistor.
    Current = 0x00A,
    /// DevName Register. Device family identification.
    DevName = 0x021,
    /// QH Register. Raw coulomb counter.
    Qh = 0x04D,
    /// Command Register. Entry point for NV recall / block copy / reset commands.
    Command = 0x060,
    /// CommStat Register. Non-volatile operation status.
    CommStat = 0x061,
    /// Config2 Register.
    Config2 = 0x0BB,
    /// PackCfg Register (volatile shadow of nPackCfg).
    PackCfg = 0x0BD,
    /// Cell 4 Voltage
    Cell4 = 0x0D5,
    /// Cell 3 Voltage
    Cell3 = 0x0D6,
    /// Cell 2 Voltage
    Cell2 = 0x0D7,
    /// Cell 1 Voltage
    Cell1 = 0x0D8,
    /// CellX Voltage (balancing input)
    CellX = 0x0D9,
    /// Batt Register. Total pack voltage, 1.25 mV per LSB.
    Batt = 0x0DA,
    /// nPackCfg Register. Non-volatile pack configuration.
    NPackCfg = 0x1B5,
    /// nRemainingUpdates Register. Wear counter of the NV memory, valid
    /// after an NV recall command.
    NRemainingUpdates = 0x1FD,
}

impl Register {
    /// Logical 16-bit address.
    pub const fn address(self) -> u16 {
        self as u16
    }

    /// Which bus endpoint serves this register.
    pub const fn bank(self) -> Bank {
        bank_of(self as u16)
    }

    /// Address byte put on the wire, within the selected bank.
    pub const fn offset(self) -> u8 {
        (self as u16 & 0xFF) as u8
    }
}

// Command register values
pub const CMD_NV_RECALL: u16 = 0xE29B;
pub const CMD_NV_BLOCK_COPY: u16 = 0xE904;
pub const CMD_FULL_RESET: u16 = 0x000F;

/// Written to Config2 after a full reset to restart the fuel gauge.
pub const CONFIG2_POR: u16 = 0x0001;

// CommStat register bit masks
pub const COMMSTAT_NVERROR: u16 = 1 << 2;

// DevName register: the low nibble carries the device family code.
pub const DEVNAME_TYPE_MASK: u16 = 0x000F;

// PackCfg / nPackCfg register bit masks
pub const PACKCFG_NCELLS_MASK: u16 = 0x000F;
pub const PACKCFG_BALCFG_MASK: u16 = 0x00E0;
pub const PACKCFG_CXEN: u16 = 1 << 8;
pub const PACKCFG_BTEN: u16 = 1 << 9;
pub const PACKCFG_CHEN: u16 = 1 << 10;
pub const PACKCFG_TDEN: u16 = 1 << 11;
pub const PACKCFG_A1EN: u16 = 1 << 12;
pub const PACKCFG_TEMP_MASK: u16 = 0xC000;
pub const PACKCFG_TEMP_INTERNAL_DIE: u16 = 0x8000;

// Recovery timing and retry budget. Taken from the reference board bring-up;
// not validated optima. TODO: confirm the NV save poll budget against tBLOCK
// on real silicon.
pub const T_RECALL_MS: u32 = 5;
pub const T_POR_MS: u32 = 15;
pub const NV_SAVE_SLOT_MS: u32 = 100;
pub const NV_SAVE_SLOTS: u32 = 10;
pub const NV_SAVE_MAX_TRIES: u32 = 3;
pub const NV_SETTLE_MS: u32 = 1000;

/// Persisting is refused when this many or fewer NV updates remain.
pub const NV_WRITE_FLOOR: u8 = 5;
