pub mod hd44780;

/// Factory address of most PCF8574T backpacks. Boards built around the PCF8574AT answer at `0x3F`.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x27;

/// I2C address of the backpack, held in its 8-bit transmission form.
///
/// The 7-bit address is shifted left by one when the display is created and only the
/// shifted form is stored. The R/W bit (bit 0) is always clear since the display is never read.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct BusAddress(u8);

impl BusAddress {
    /// Builds the transmission form of a 7-bit address. Returns `None` for addresses above `0x7F`.
    pub const fn from_seven_bit(address: u8) -> Option<Self> {
        if address > 0x7F {
            None
        } else {
            Some(Self(address << 1))
        }
    }

    /// The 8-bit form sent on the wire for a write transfer.
    pub const fn transmission_form(&self) -> u8 {
        self.0
    }

    /// `embedded-hal` I2C implementations take the 7-bit address and append the R/W bit themselves.
    pub(crate) const fn hal_address(&self) -> u8 {
        self.0 >> 1
    }
}

impl Default for BusAddress {
    fn default() -> Self {
        Self(DEFAULT_I2C_ADDRESS << 1)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BusAddress {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=u8:#x}", self.0 >> 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_stored_shifted() {
        let address = BusAddress::from_seven_bit(0x27).unwrap();
        assert_eq!(address.transmission_form(), 0x4E);
        assert_eq!(address.hal_address(), 0x27);

        let address = BusAddress::from_seven_bit(0x3F).unwrap();
        assert_eq!(address.transmission_form(), 0x7E);
    }

    #[test]
    fn test_address_out_of_range() {
        assert!(BusAddress::from_seven_bit(0x7F).is_some());
        assert!(BusAddress::from_seven_bit(0x80).is_none());
        assert!(BusAddress::from_seven_bit(0xFF).is_none());
    }
}
