// HD44780 Support
// This module holds the HD44780 instruction set and the controller state that persists between
// operations: the display control flags and the entry mode flags. Every instruction and every
// character is handed to the PCF8574TAdapter, which owns the backlight bit and frames each byte
// as a nibble pair for the controller's 4-bit interface.
//

pub mod adapter;

use embedded_hal::{delay::DelayNs, i2c};

use crate::{driver::hd44780::adapter::PCF8574TAdapter, CharacterDisplayError, DeviceSetupConfig};

// commands
pub const LCD_CMD_CLEARDISPLAY: u8 = 0x01; //  Clear display, set cursor position to zero
pub const LCD_CMD_RETURNHOME: u8 = 0x02; //  Set cursor position to zero
pub const LCD_CMD_ENTRYMODESET: u8 = 0x04; //  Sets the entry mode
pub const LCD_CMD_DISPLAYCONTROL: u8 = 0x08; //  Controls the display; does stuff like turning it off and on
pub const LCD_CMD_CURSORSHIFT: u8 = 0x10; //  Lets you move the cursor
pub const LCD_CMD_FUNCTIONSET: u8 = 0x20; //  Used to send the function to set to the display
pub const LCD_CMD_SETDDRAMADDR: u8 = 0x80; //  Used to set the DDRAM (Display Data RAM)

// flags for display entry mode
pub const LCD_FLAG_ENTRYRIGHT: u8 = 0x00; //  Used to set text to flow from right to left
pub const LCD_FLAG_ENTRYLEFT: u8 = 0x02; //  Used to set text to flow from left to right
pub const LCD_FLAG_ENTRYSHIFTINCREMENT: u8 = 0x01; //  Used to 'right justify' text from the cursor
pub const LCD_FLAG_ENTRYSHIFTDECREMENT: u8 = 0x00; //  Used to 'left justify' text from the cursor

// flags for display on/off control
pub const LCD_FLAG_DISPLAYON: u8 = 0x04; //  Turns the display on
pub const LCD_FLAG_DISPLAYOFF: u8 = 0x00; //  Turns the display off
pub const LCD_FLAG_CURSORON: u8 = 0x02; //  Turns the cursor on
pub const LCD_FLAG_CURSOROFF: u8 = 0x00; //  Turns the cursor off
pub const LCD_FLAG_BLINKON: u8 = 0x01; //  Turns on the blinking cursor
pub const LCD_FLAG_BLINKOFF: u8 = 0x00; //  Turns off the blinking cursor

// flags for display/cursor shift
pub const LCD_FLAG_DISPLAYMOVE: u8 = 0x08; //  Flag for moving the display
pub const LCD_FLAG_MOVERIGHT: u8 = 0x04; //  Flag for moving right
pub const LCD_FLAG_MOVELEFT: u8 = 0x00; //  Flag for moving left

// flags for function set
pub const LCD_FLAG_8BITMODE: u8 = 0x10; //  LCD 8 bit mode
pub const LCD_FLAG_4BITMODE: u8 = 0x00; //  LCD 4 bit mode
pub const LCD_FLAG_2LINE: u8 = 0x08; //  LCD 2 line mode
pub const LCD_FLAG_5x8_DOTS: u8 = 0x00; //  8 pixel high font mode

/// DDRAM base address of each row. Fixed by the HD44780 2-line addressing scheme; 4-row panels
/// continue line 1 and line 2 past the visible width.
pub const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Power-on settle time before the first instruction.
pub const POWER_ON_DELAY_MS: u32 = 50;
/// Extra wait after clear and return home, on top of the per-transfer settle time.
pub const CLEAR_HOME_DELAY_MS: u32 = 2;

pub struct HD44780 {
    adapter: PCF8574TAdapter,
    display_control: u8,
    display_mode: u8,
}

impl Default for HD44780 {
    fn default() -> Self {
        Self {
            adapter: PCF8574TAdapter::default(),
            display_control: LCD_FLAG_CURSOROFF | LCD_FLAG_BLINKOFF,
            display_mode: LCD_FLAG_ENTRYLEFT | LCD_FLAG_ENTRYSHIFTDECREMENT,
        }
    }
}

impl HD44780 {
    /// Cursor and blink flags. Display-on is not stored; it is added to every display control
    /// instruction sent.
    pub fn display_control(&self) -> u8 {
        self.display_control
    }

    pub fn display_mode(&self) -> u8 {
        self.display_mode
    }

    pub fn backlight_on(&self) -> bool {
        self.adapter.backlight()
    }

    /// Runs the reset handshake that moves the controller from an unknown state into 4-bit,
    /// 2-line mode with the display on. The controller does not acknowledge anything during the
    /// handshake, so a failed step does not stop the sequence. All steps are attempted and the
    /// first failure, if any, is returned at the end.
    pub fn init<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        #[cfg(feature = "defmt")]
        defmt::debug!("Initializing HD44780 at {}", config.address);

        *self = Self::default();

        // (instruction, wait after it in ms)
        let handshake: [(u8, u32); 8] = [
            // 8-bit mode asserted twice, a single assertion is not enough from an unknown state
            (LCD_CMD_FUNCTIONSET | LCD_FLAG_8BITMODE, 5),
            (LCD_CMD_FUNCTIONSET | LCD_FLAG_8BITMODE, 120),
            // from here on the controller expects nibble pairs
            (LCD_CMD_FUNCTIONSET | LCD_FLAG_4BITMODE, 0),
            (
                LCD_CMD_FUNCTIONSET | LCD_FLAG_4BITMODE | LCD_FLAG_5x8_DOTS | LCD_FLAG_2LINE,
                0,
            ),
            (
                LCD_CMD_DISPLAYCONTROL | LCD_FLAG_DISPLAYOFF | LCD_FLAG_CURSOROFF | LCD_FLAG_BLINKOFF,
                0,
            ),
            (LCD_CMD_CLEARDISPLAY, CLEAR_HOME_DELAY_MS),
            (
                LCD_CMD_ENTRYMODESET | self.display_mode,
                0,
            ),
            (
                LCD_CMD_DISPLAYCONTROL | LCD_FLAG_DISPLAYON | self.display_control,
                0,
            ),
        ];

        config.delay.delay_ms(POWER_ON_DELAY_MS);
        let mut first_error = None;
        for (command, wait_ms) in handshake {
            if let Err(e) = self.send_command(config, command) {
                first_error.get_or_insert(e);
            }
            if wait_ms > 0 {
                config.delay.delay_ms(wait_ms);
            }
        }

        match first_error {
            Some(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("HD44780 init incomplete: {}", e);
                Err(e)
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::debug!("HD44780 init complete");
                Ok(())
            }
        }
    }

    pub fn send_command<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
        command: u8,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        self.adapter.send(config, false, command)
    }

    pub fn write_data<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
        data: u8,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        self.adapter.send(config, true, data)
    }

    pub fn clear<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        self.send_command(config, LCD_CMD_CLEARDISPLAY)?;
        config.delay.delay_ms(CLEAR_HOME_DELAY_MS);
        Ok(())
    }

    pub fn home<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        self.send_command(config, LCD_CMD_RETURNHOME)?;
        config.delay.delay_ms(CLEAR_HOME_DELAY_MS);
        Ok(())
    }

    /// Sets the backlight bit and sends an empty instruction so the new bit reaches the backpack.
    pub fn backlight<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
        on: bool,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        self.adapter.set_backlight(on);
        self.send_command(config, 0x00)
    }

    pub fn show_cursor<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
        show_cursor: bool,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        if show_cursor {
            self.display_control |= LCD_FLAG_CURSORON;
        } else {
            self.display_control &= !LCD_FLAG_CURSORON;
        }
        self.send_display_control(config)
    }

    pub fn blink_cursor<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
        blink_cursor: bool,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        if blink_cursor {
            self.display_control |= LCD_FLAG_BLINKON;
        } else {
            self.display_control &= !LCD_FLAG_BLINKON;
        }
        self.send_display_control(config)
    }

    // the controller has no partial update, the whole control byte goes out every time
    fn send_display_control<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        self.send_command(
            config,
            LCD_CMD_DISPLAYCONTROL | LCD_FLAG_DISPLAYON | self.display_control,
        )
    }

    /// Moves the cursor to a zero-indexed column and row. Rows beyond the configured geometry are
    /// ignored without touching the bus. The row is then clamped to the four entries of the
    /// offset table, which only matters for geometries taller than four rows. The column is not
    /// checked.
    pub fn set_cursor<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
        col: u8,
        row: u8,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        if row >= config.lcd_type.rows() {
            #[cfg(feature = "defmt")]
            defmt::debug!("ignoring cursor row {} on a {} display", row, config.lcd_type);
            return Ok(());
        }
        let row = row.min(ROW_OFFSETS.len() as u8 - 1);

        self.send_command(
            config,
            LCD_CMD_SETDDRAMADDR | col.wrapping_add(ROW_OFFSETS[row as usize]),
        )
    }

    pub fn scroll_display_left<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        self.send_command(
            config,
            LCD_CMD_CURSORSHIFT | LCD_FLAG_DISPLAYMOVE | LCD_FLAG_MOVELEFT,
        )
    }

    pub fn scroll_display_right<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        self.send_command(
            config,
            LCD_CMD_CURSORSHIFT | LCD_FLAG_DISPLAYMOVE | LCD_FLAG_MOVERIGHT,
        )
    }

    pub fn left_to_right<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        self.display_mode |= LCD_FLAG_ENTRYLEFT;
        self.send_command(config, LCD_CMD_ENTRYMODESET | self.display_mode)
    }

    pub fn right_to_left<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        self.display_mode &= !LCD_FLAG_ENTRYLEFT;
        self.send_command(
            config,
            LCD_CMD_ENTRYMODESET | LCD_FLAG_ENTRYRIGHT | self.display_mode,
        )
    }

    pub fn autoscroll<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
        autoscroll: bool,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        if autoscroll {
            self.display_mode |= LCD_FLAG_ENTRYSHIFTINCREMENT;
        } else {
            self.display_mode &= !LCD_FLAG_ENTRYSHIFTINCREMENT;
        }
        self.send_command(config, LCD_CMD_ENTRYMODESET | self.display_mode)
    }

    /// Writes each character as a data byte, stopping at the first NUL. The first failed transfer
    /// ends the print and nothing after it is attempted.
    pub fn print<I2C, DELAY>(
        &mut self,
        config: &mut DeviceSetupConfig<I2C, DELAY>,
        text: &str,
    ) -> Result<(), CharacterDisplayError<I2C>>
    where
        I2C: i2c::I2c,
        DELAY: DelayNs,
    {
        for c in text.chars().take_while(|&c| c != '\0') {
            self.write_data(config, c as u8)?;
        }
        Ok(())
    }
}
