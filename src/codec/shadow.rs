//! Shadow registers for write-only devices.
//!
//! Host-side copy of register contents so a single field can be changed
//! without a hardware read. Starts from the device's reset defaults and only
//! follows writes that the device acknowledged.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowRegisters<const N: usize> {
    defaults: [u16; N],
    values: [u16; N],
}

impl<const N: usize> ShadowRegisters<N> {
    pub const fn new(defaults: [u16; N]) -> Self {
        Self {
            defaults,
            values: defaults,
        }
    }

    /// Cached value, or `None` for an address outside the shadowed range.
    #[inline]
    pub fn get(&self, address: u16) -> Option<u16> {
        self.values.get(address as usize).copied()
    }

    /// Record a successful write. Addresses outside the range are ignored.
    #[inline]
    pub fn record(&mut self, address: u16, value: u16) {
        if let Some(slot) = self.values.get_mut(address as usize) {
            *slot = value;
        }
    }

    /// `(cached & !mask) | (bits & mask)`, without storing it.
    #[inline]
    pub fn merged(&self, address: u16, mask: u16, bits: u16) -> Option<u16> {
        self.get(address).map(|v| (v & !mask) | (bits & mask))
    }

    /// Back to reset defaults (after a device soft reset).
    pub fn reset(&mut self) {
        self.values = self.defaults;
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.values.iter().enumerate().map(|(a, &v)| (a as u16, v))
    }
}
