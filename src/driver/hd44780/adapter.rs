use bitfield::bitfield;
use embedded_hal::{delay::DelayNs, i2c};

use crate::{CharacterDisplayError, DeviceSetupConfig};

/// Number of address probes made before a device is considered absent.
pub const READY_ATTEMPTS: usize = 10;

/// Settle time after every transfer. Covers the slowest ordinary command, so command latency
/// is not tracked per instruction.
pub const SEND_SETTLE_MS: u32 = 5;

// Output byte of the PCF8574T as wired on the common backpack boards
bitfield! {
    pub struct PCF8574TBitField(u8);
    impl Debug;
    impl BitAnd;
    pub rs, set_rs: 0, 0;
    pub rw, set_rw: 1, 1;
    pub enable, set_enable: 2, 2;
    pub backlight, set_backlight: 3, 3;
    pub data, set_data: 7, 4;
}

impl Clone for PCF8574TBitField {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl Copy for PCF8574TBitField {}

/// PCF8574T backpack driving the HD44780 through its 4-bit interface. Only the backlight bit is
/// persistent; RS, EN and the data lines are rebuilt for every transfer.
pub struct PCF8574TAdapter {
    bits: PCF8574TBitField,
}

impl Default for PCF8574TAdapter {
    fn default() -> Self {
        Self {
            bits: PCF8574TBitField(0),
        }
    }
}

impl PCF8574TAdapter {
    pub fn backlight(&self) -> bool {
        self.bits.backlight() != 0
    }

    /// Only updates the stored bit. Nothing reaches the backlight until the next transfer.
    pub fn set_backlight(&mut self, on: bool) {
        self.bits.set_backlight(on as u8);
    }

    /// Encodes one byte as the four-byte burst the backpack expects: upper nibble with EN high,
    /// upper nibble with EN low, then the same for the lower nibble. The falling edge of EN
    /// latches each nibble. If `rs_setting` is `true` the byte goes to the data register,
    /// otherwise to the instruction register.
    pub fn encode(&self, rs_setting: bool, value: u8) -> [u8; 4] {
        let [upper_strobe, upper] = self.nibble_frame(rs_setting, value >> 4);
        let [lower_strobe, lower] = self.nibble_frame(rs_setting, value & 0x0F);
        [upper_strobe, upper, lower_strobe, lower]
    }

    fn nibble_frame(&self, rs_setting: bool, nibble: u8) -> [u8; 2] {
        let mut frame = self.bits;
        frame.set_rs(rs_setting as u8);
        frame.set_rw(0);
        frame.set_data(nibble & 0x0F);
        frame.set_enable(1);
        let strobe = frame.0;
        frame.set_enable(0);
        [strobe, frame.0]
    }

    /// Sends one byte to the controller. The adapter must acknowledge its address within
    /// `READY_ATTEMPTS` probes, otherwise nothing is transmitted. The burst goes out as a single
    /// I2C write and is always followed by the settle delay, whether or not the write succeeded.
    pub fn send<I2C, DELAY>(
        &self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
        rs_setting: bool,
        value: u8,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        Self::wait_until_ready(config)?;

        let burst = self.encode(rs_setting, value);
        let result = config.i2c.write(config.address.hal_address(), &burst);
        config.delay.delay_ms(SEND_SETTLE_MS);

        #[cfg(feature = "defmt")]
        if result.is_err() {
            defmt::warn!("burst write to {} failed", config.address);
        }
        result.map_err(CharacterDisplayError::I2cError)
    }

    /// Probes the adapter address with an address-only write until it is acknowledged.
    fn wait_until_ready<I2C, DELAY>(
        config: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        let address = config.address.hal_address();
        for _ in 0..READY_ATTEMPTS {
            if config.i2c.write(address, &[]).is_ok() {
                return Ok(());
            }
        }
        #[cfg(feature = "defmt")]
        defmt::warn!("device at {} did not acknowledge", config.address);
        Err(CharacterDisplayError::DeviceNotReady)
    }
}
