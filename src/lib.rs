//! This Rust `embedded-hal`-based library drives a [HD44780](https://en.wikipedia.org/wiki/Hitachi_HD44780_LCD_controller)
//! compatible character display through a PCF8574T "I2C backpack" in an embedded, `no_std` environment. These backpacks
//! are ubiquitous on eBay and AliExpress and have no clear branding. The supported wiring is the common one: the display's
//! 4-bit data pins on P4-P7, RS on P0, RW on P1, EN on P2 and the backlight transistor on P3.
//!
//! Key features include:
//! - Convenient high-level API for controlling the display
//! - Backlight control
//! - `core::fmt::Write` implementation for easy use with the `write!` macro
//! - Compatible with the `embedded-hal` traits v1.0 and later
//! - Pluggable delay source through `embedded_hal::delay::DelayNs`
//! - Optional support for the `defmt` and `ufmt` logging frameworks
//!
//! ## Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! hd44780-i2c-lcd = { version = "0.1", features = ["defmt"] }
//! ```
//! The `features = ["defmt"]` line is optional and enables the `defmt` feature, which allows the library's errors to be used
//! with the `defmt` logging framework and emits debug traces from the driver. Another optional feature is `features = ["ufmt"]`,
//! which enables the `ufmt` feature, allowing the `uwriteln!` and `uwrite!` macros to be used.
//!
//! Create the display:
//! ```rust
//! use hd44780_i2c_lcd::{CharacterDisplay, LcdDisplayType};
//!
//! // board setup
//! let i2c = ...; // I2C peripheral
//! let delay = ...; // DelayNs implementation
//!
//! // backpack at the default address 0x27
//! let mut lcd = CharacterDisplay::new(i2c, LcdDisplayType::Lcd16x2, delay);
//! // or at another address, with an explicit geometry
//! let mut lcd = CharacterDisplay::new_with_geometry(i2c, 0x3F, 20, 4, delay)?;
//! ```
//! Initialize the display. This runs the controller's reset handshake and takes a little over 200 ms:
//! ```rust
//! if let Err(e) = lcd.init() {
//!    panic!("Error initializing LCD: {}", e);
//! }
//! ```
//! Use the display:
//! ```rust
//! lcd.backlight(true)?.clear()?.home()?;
//! lcd.print("Hello, world!")?;
//! // can also use the `core::fmt::write!` macro
//! use core::fmt::Write;
//!
//! write!(lcd, "T={}C", 21)?;
//! ```
//! Each method returns a `Result` that wraps the display object in `Ok()`, allowing for easy chaining of commands.
//!
//! ### Timing
//! Every byte is preceded by an address probe of the backpack (up to 10 attempts) and followed by a fixed 5 ms wait,
//! so throughput is bounded to roughly 200 characters per second. The display is never read, so there is no busy flag to poll.
//!
#![no_std]
#![allow(dead_code, non_camel_case_types, non_upper_case_globals)]
use core::fmt::Display;

use embedded_hal::{delay::DelayNs, i2c};

pub use driver::{BusAddress, DEFAULT_I2C_ADDRESS};

mod driver;
#[cfg(test)]
mod test_support;

use driver::hd44780::HD44780;

#[derive(Debug, PartialEq, Copy, Clone)]
/// Errors that can occur when using the LCD backpack
pub enum CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    /// I2C error returned from the underlying I2C implementation while writing a burst
    I2cError(I2C::Error),
    /// The backpack did not acknowledge its address
    DeviceNotReady,
    /// The address does not fit in 7 bits
    InvalidAddress,
    /// Formatting error
    FormattingError(core::fmt::Error),
}

impl<I2C> From<core::fmt::Error> for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn from(err: core::fmt::Error) -> Self {
        CharacterDisplayError::FormattingError(err)
    }
}

impl<I2C> From<&CharacterDisplayError<I2C>> for &'static str
where
    I2C: i2c::I2c,
{
    fn from(err: &CharacterDisplayError<I2C>) -> Self {
        match err {
            CharacterDisplayError::I2cError(_) => "I2C error",
            CharacterDisplayError::DeviceNotReady => "Device not ready",
            CharacterDisplayError::InvalidAddress => "Invalid I2C address",
            CharacterDisplayError::FormattingError(_) => "Formatting error",
        }
    }
}

#[cfg(feature = "defmt")]
impl<I2C> defmt::Format for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl<I2C> ufmt::uDisplay for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl<I2C> Display for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// The type of LCD display. This is used to determine the number of rows and columns.
pub enum LcdDisplayType {
    /// 20x4 display
    Lcd20x4,
    /// 20x2 display
    Lcd20x2,
    /// 16x2 display
    Lcd16x2,
    /// 16x4 display
    Lcd16x4,
    /// 8x2 display
    Lcd8x2,
    /// 40x2 display
    Lcd40x2,
    /// Any other geometry
    Custom { cols: u8, rows: u8 },
}

impl From<&LcdDisplayType> for &'static str {
    fn from(display_type: &LcdDisplayType) -> Self {
        match display_type {
            LcdDisplayType::Lcd20x4 => "20x4",
            LcdDisplayType::Lcd20x2 => "20x2",
            LcdDisplayType::Lcd16x2 => "16x2",
            LcdDisplayType::Lcd16x4 => "16x4",
            LcdDisplayType::Lcd8x2 => "8x2",
            LcdDisplayType::Lcd40x2 => "40x2",
            LcdDisplayType::Custom { .. } => "custom",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LcdDisplayType {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            LcdDisplayType::Custom { cols, rows } => defmt::write!(fmt, "{}x{}", cols, rows),
            _ => {
                let msg: &'static str = From::from(self);
                defmt::write!(fmt, "{}", msg);
            }
        }
    }
}

#[cfg(feature = "ufmt")]
impl ufmt::uDisplay for LcdDisplayType {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        match self {
            LcdDisplayType::Custom { cols, rows } => ufmt::uwrite!(w, "{}x{}", cols, rows),
            _ => {
                let msg: &'static str = From::from(self);
                ufmt::uwrite!(w, "{}", msg)
            }
        }
    }
}

impl Display for LcdDisplayType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LcdDisplayType::Custom { cols, rows } => write!(f, "{}x{}", cols, rows),
            _ => {
                let msg: &'static str = From::from(self);
                write!(f, "{}", msg)
            }
        }
    }
}

impl LcdDisplayType {
    /// Picks the named type for a known geometry, `Custom` otherwise.
    pub const fn from_geometry(cols: u8, rows: u8) -> Self {
        match (cols, rows) {
            (20, 4) => LcdDisplayType::Lcd20x4,
            (20, 2) => LcdDisplayType::Lcd20x2,
            (16, 2) => LcdDisplayType::Lcd16x2,
            (16, 4) => LcdDisplayType::Lcd16x4,
            (8, 2) => LcdDisplayType::Lcd8x2,
            (40, 2) => LcdDisplayType::Lcd40x2,
            (cols, rows) => LcdDisplayType::Custom { cols, rows },
        }
    }

    /// Get the number of rows for the display type
    pub const fn rows(&self) -> u8 {
        match self {
            LcdDisplayType::Lcd20x4 => 4,
            LcdDisplayType::Lcd20x2 => 2,
            LcdDisplayType::Lcd16x2 => 2,
            LcdDisplayType::Lcd16x4 => 4,
            LcdDisplayType::Lcd8x2 => 2,
            LcdDisplayType::Lcd40x2 => 2,
            LcdDisplayType::Custom { rows, .. } => *rows,
        }
    }

    /// Get the number of columns for the display type
    pub const fn cols(&self) -> u8 {
        match self {
            LcdDisplayType::Lcd20x4 => 20,
            LcdDisplayType::Lcd20x2 => 20,
            LcdDisplayType::Lcd16x2 => 16,
            LcdDisplayType::Lcd16x4 => 16,
            LcdDisplayType::Lcd8x2 => 8,
            LcdDisplayType::Lcd40x2 => 40,
            LcdDisplayType::Custom { cols, .. } => *cols,
        }
    }
}

/// Everything the driver needs to reach the display: the bus, the backpack address, the geometry
/// and the delay source.
pub struct DeviceSetupConfig<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    lcd_type: LcdDisplayType,
    i2c: I2C,
    address: BusAddress,
    delay: DELAY,
}

impl<I2C, DELAY> DeviceSetupConfig<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    fn new(
        i2c: I2C,
        address: u8,
        lcd_type: LcdDisplayType,
        delay: DELAY,
    ) -> Result<Self, CharacterDisplayError<I2C>> {
        let address =
            BusAddress::from_seven_bit(address).ok_or(CharacterDisplayError::InvalidAddress)?;
        Ok(Self {
            lcd_type,
            i2c,
            address,
            delay,
        })
    }
}

/// HD44780 character display behind a PCF8574T I2C backpack.
pub struct CharacterDisplay<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    config: DeviceSetupConfig<I2C, DELAY>,
    controller: HD44780,
}

impl<I2C, DELAY> CharacterDisplay<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    /// Create a new character display object with the default I2C address for the backpack.
    pub fn new(i2c: I2C, lcd_type: LcdDisplayType, delay: DELAY) -> Self {
        Self {
            config: DeviceSetupConfig {
                lcd_type,
                i2c,
                address: BusAddress::default(),
                delay,
            },
            controller: HD44780::default(),
        }
    }

    /// Create a new character display object with a specific 7-bit I2C address for the backpack.
    pub fn new_with_address(
        i2c: I2C,
        address: u8,
        lcd_type: LcdDisplayType,
        delay: DELAY,
    ) -> Result<Self, CharacterDisplayError<I2C>> {
        Ok(Self {
            config: DeviceSetupConfig::new(i2c, address, lcd_type, delay)?,
            controller: HD44780::default(),
        })
    }

    /// Create a new character display object from a 7-bit address and a column and row count.
    pub fn new_with_geometry(
        i2c: I2C,
        address: u8,
        cols: u8,
        rows: u8,
        delay: DELAY,
    ) -> Result<Self, CharacterDisplayError<I2C>> {
        Self::new_with_address(i2c, address, LcdDisplayType::from_geometry(cols, rows), delay)
    }

    /// Initialize the display. This must be called before using the display. Backlight, cursor
    /// and entry mode are reset to their defaults: backlight off, cursor hidden and not blinking,
    /// text flowing left to right.
    pub fn init(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.init(&mut self.config)?;
        Ok(self)
    }

    /// Gives back the I2C bus and the delay source.
    pub fn release(self) -> (I2C, DELAY) {
        (self.config.i2c, self.config.delay)
    }

    /// returns a reference to the I2C peripheral. mostly needed for testing
    fn i2c(&mut self) -> &mut I2C {
        &mut self.config.i2c
    }

    /// returns the `LcdDisplayType` used to create the display
    pub fn display_type(&self) -> LcdDisplayType {
        self.config.lcd_type
    }

    pub fn cols(&self) -> u8 {
        self.config.lcd_type.cols()
    }

    pub fn rows(&self) -> u8 {
        self.config.lcd_type.rows()
    }

    /// The backpack address, in its 8-bit transmission form.
    pub fn address(&self) -> BusAddress {
        self.config.address
    }

    pub fn backlight_on(&self) -> bool {
        self.controller.backlight_on()
    }

    /// Current cursor and blink flags, as they appear in the display control instruction.
    pub fn display_control(&self) -> u8 {
        self.controller.display_control()
    }

    //--------------------------------------------------------------------------------------------------
    // high level commands, for the user!
    //--------------------------------------------------------------------------------------------------

    /// Clear the display
    pub fn clear(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.clear(&mut self.config)?;
        Ok(self)
    }

    /// Set the cursor to the home position.
    pub fn home(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.home(&mut self.config)?;
        Ok(self)
    }

    /// Set the cursor position at specified column and row. Columns and rows are zero-indexed.
    /// A row outside the display is ignored and nothing is sent.
    pub fn set_cursor(
        &mut self,
        col: u8,
        row: u8,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.set_cursor(&mut self.config, col, row)?;
        Ok(self)
    }

    /// Set the cursor visibility.
    pub fn show_cursor(
        &mut self,
        show_cursor: bool,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.show_cursor(&mut self.config, show_cursor)?;
        Ok(self)
    }

    /// Set the cursor blinking.
    pub fn blink_cursor(
        &mut self,
        blink_cursor: bool,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.blink_cursor(&mut self.config, blink_cursor)?;
        Ok(self)
    }

    /// Scroll the display to the left.
    pub fn scroll_display_left(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.scroll_display_left(&mut self.config)?;
        Ok(self)
    }

    /// Scroll the display to the right.
    pub fn scroll_display_right(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.scroll_display_right(&mut self.config)?;
        Ok(self)
    }

    /// Set the text flow direction to left to right.
    pub fn left_to_right(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.left_to_right(&mut self.config)?;
        Ok(self)
    }

    /// Set the text flow direction to right to left.
    pub fn right_to_left(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.right_to_left(&mut self.config)?;
        Ok(self)
    }

    /// Set the auto scroll mode.
    pub fn autoscroll(
        &mut self,
        autoscroll: bool,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.autoscroll(&mut self.config, autoscroll)?;
        Ok(self)
    }

    /// Prints a string to the LCD at the current cursor position. Printing ends at the first NUL
    /// character, or at the first character the backpack fails to take.
    pub fn print(&mut self, text: &str) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.print(&mut self.config, text)?;
        Ok(self)
    }

    /// Turn the backlight on or off
    pub fn backlight(&mut self, on: bool) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.backlight(&mut self.config, on)?;
        Ok(self)
    }

    /// Sends a raw instruction byte. Normally users do not need to call this directly.
    pub fn command(&mut self, command: u8) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.send_command(&mut self.config, command)?;
        Ok(self)
    }

    /// Writes a raw data byte at the current cursor position. Normally users do not need to call this directly.
    pub fn write_data(&mut self, data: u8) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.write_data(&mut self.config, data)?;
        Ok(self)
    }
}

/// Implement the `core::fmt::Write` trait for the LCD backpack, allowing it to be used with the `write!` macro.
/// This is a convenience method for printing to the display.
impl<I2C, DELAY> core::fmt::Write for CharacterDisplay<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
        if let Err(_e) = self.print(s) {
            return Err(core::fmt::Error);
        }
        Ok(())
    }
}

#[cfg(feature = "ufmt")]
/// Implement the `ufmt::uWrite` trait for the LCD backpack, allowing it to be used with the `uwriteln!` and `uwrite!` macros.
/// This is a convenience method for printing to the display.
impl<I2C, DELAY> ufmt::uWrite for CharacterDisplay<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    fn write_str(&mut self, s: &str) -> Result<(), CharacterDisplayError<I2C>> {
        self.print(s)?;
        Ok(())
    }

    type Error = CharacterDisplayError<I2C>;
}
