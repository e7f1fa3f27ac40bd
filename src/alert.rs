//! Alert pin notification registry.
//!
//! The application owns one [`AlertRegistry`] and calls [`AlertRegistry::dispatch`]
//! from its rising-edge interrupt handler. Handlers are plain function
//! pointers held in a fixed-capacity ordered sequence; entries are addressed
//! by index identity ([`AlertId`]), never by linked pointers.

/// Called with the pin number that triggered.
pub type AlertHandler = fn(u8);

/// How many handler records a registry can hold.
pub const ALERT_CAPACITY: usize = 4;

/// Index identity of a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertId(usize);

#[derive(Clone, Copy)]
struct AlertEntry {
    pin: u8,
    handler: AlertHandler,
}

/// Fixed-capacity registry of alert handlers.
#[derive(Default)]
pub struct AlertRegistry {
    entries: heapless::Vec<AlertEntry, ALERT_CAPACITY>,
}

impl AlertRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler for `pin`. Returns `None` when the registry is full.
    pub fn register(&mut self, pin: u8, handler: AlertHandler) -> Option<AlertId> {
        let id = AlertId(self.entries.len());
        self.entries.push(AlertEntry { pin, handler }).ok()?;
        Some(id)
    }

    /// Runs every handler registered for `pin`, in registration order, and
    /// returns how many ran.
    pub fn dispatch(&self, pin: u8) -> usize {
        let mut ran = 0;
        for entry in &self.entries {
            if entry.pin == pin {
                (entry.handler)(pin);
                ran += 1;
            }
        }
        ran
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
