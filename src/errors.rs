/// Represents potential errors when interacting with the MAX1720x gauge.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// An error occurred during I2C communication. Never retried by the
    /// register access layer.
    I2c(E),
    /// No known gauge answered on the bus, even after a full reset.
    NotFound,
    /// Identification failed while the pack voltage sits below the supply
    /// floor of a multi-cell part. Recoverable once the pack is charged.
    Undervoltage {
        /// Pack voltage at the time of the failed identification.
        millivolts: u32,
    },
    /// Too few non-volatile updates remain to risk burning one.
    NvWriteBudgetLow {
        /// Updates the device reports as still available.
        remaining: u8,
    },
    /// The NV block copy kept reporting an error after every retry.
    NvWriteFailed,
    /// The remaining-updates register held a pattern outside the recognized
    /// bit-run family.
    Decode {
        /// Raw register value, before the byte fold.
        raw: u16,
    },
}
