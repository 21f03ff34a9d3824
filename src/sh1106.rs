// Minimal SH1106 OLED driver (128x64 monochrome, I2C).
// Works with esp-hal (no_std) and embedded-graphics.
//
// Protocol:
//   Every I2C write begins with a control byte, then the payload.
//   0x00 -> payload is a command stream
//   0x40 -> payload is display RAM data
// Geometry: the controller has 132 columns of RAM, the 128 visible ones start
// at column 2. RAM is organised in 8 pages of 8 rows; bit 0 is the top row.

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
};
use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::ui::Panel;

pub const SH1106_ADDR: u8 = 0x3C;
pub const SH1106_WIDTH: u32 = 128;
pub const SH1106_HEIGHT: u32 = 64;

const PAGES: usize = (SH1106_HEIGHT / 8) as usize;
const FB_LEN: usize = SH1106_WIDTH as usize * PAGES;
const COLUMN_OFFSET: u8 = 2;

const CTRL_CMD: u8 = 0x00;
const CTRL_DATA: u8 = 0x40;

// Power-up sequence, command bytes only
const INIT_SEQUENCE: [u8; 23] = [
    0xAE,       // display off
    0xD5, 0x80, // clock divide / oscillator
    0xA8, 0x3F, // multiplex 1/64
    0xD3, 0x00, // display offset
    0x40,       // start line 0
    0xAD, 0x8B, // DC-DC on
    0xA1,       // segment remap
    0xC8,       // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xFF, // contrast
    0xD9, 0x1F, // pre-charge
    0xDB, 0x40, // VCOMH
    0x33,       // pump 9V
    0xA4,       // follow RAM
    0xA6,       // normal (not inverted)
];

/// A very small SH1106 driver with a local framebuffer.
/// Drawing only touches RAM; `flush` pushes all 8 pages.
pub struct Sh1106<I2C> {
    i2c: I2C,
    address: u8,
    fb: [u8; FB_LEN],
}

impl<I2C> Sh1106<I2C>
where
    I2C: I2c,
{
    /// Create + init the panel. Call once at startup.
    pub fn new(i2c: I2C, address: u8, delay: &mut impl DelayNs) -> Result<Self, I2C::Error> {
        let mut this = Self {
            i2c,
            address,
            fb: [0; FB_LEN],
        };

        this.cmd(&INIT_SEQUENCE)?;
        this.flush_frame()?;
        this.cmd(&[0xAF])?; // display on
        delay.delay_ms(100);

        Ok(this)
    }

    fn cmd(&mut self, bytes: &[u8]) -> Result<(), I2C::Error> {
        let mut buf: heapless::Vec<u8, 32> = heapless::Vec::new();
        let _ = buf.push(CTRL_CMD);
        let _ = buf.extend_from_slice(bytes);
        self.i2c.write(self.address, &buf)
    }

    /// Push the framebuffer to the panel.
    pub fn flush_frame(&mut self) -> Result<(), I2C::Error> {
        let mut data = [0u8; SH1106_WIDTH as usize + 1];
        data[0] = CTRL_DATA;
        for page in 0..PAGES {
            // page address, column low nibble, column high nibble
            self.cmd(&[0xB0 | page as u8, COLUMN_OFFSET & 0x0F, 0x10 | (COLUMN_OFFSET >> 4)])?;
            let row = &self.fb[page * SH1106_WIDTH as usize..(page + 1) * SH1106_WIDTH as usize];
            data[1..].copy_from_slice(row);
            self.i2c.write(self.address, &data)?;
        }
        Ok(())
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= SH1106_WIDTH || y >= SH1106_HEIGHT {
            return false;
        }
        let idx = x as usize + (y as usize / 8) * SH1106_WIDTH as usize;
        self.fb[idx] & (1 << (y % 8)) != 0
    }
}

impl<I2C> OriginDimensions for Sh1106<I2C> {
    fn size(&self) -> Size {
        Size::new(SH1106_WIDTH, SH1106_HEIGHT)
    }
}

impl<I2C> DrawTarget for Sh1106<I2C>
where
    I2C: I2c,
{
    type Color = BinaryColor;
    type Error = I2C::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if p.x < 0 || p.y < 0 || p.x >= SH1106_WIDTH as i32 || p.y >= SH1106_HEIGHT as i32 {
                continue;
            }
            let idx = p.x as usize + (p.y as usize / 8) * SH1106_WIDTH as usize;
            let bit = 1u8 << (p.y % 8);
            if color.is_on() {
                self.fb[idx] |= bit;
            } else {
                self.fb[idx] &= !bit;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        self.fb.fill(fill);
        Ok(())
    }
}

impl<I2C> Panel for Sh1106<I2C>
where
    I2C: I2c,
{
    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flush_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    fn page_writes(fb: &[u8; FB_LEN]) -> Vec<I2cTrans> {
        let mut out = Vec::new();
        for page in 0..PAGES {
            out.push(I2cTrans::write(SH1106_ADDR, vec![CTRL_CMD, 0xB0 | page as u8, 0x02, 0x10]));
            let mut data = vec![CTRL_DATA];
            data.extend_from_slice(&fb[page * 128..(page + 1) * 128]);
            out.push(I2cTrans::write(SH1106_ADDR, data));
        }
        out
    }

    fn init_writes() -> Vec<I2cTrans> {
        let mut seq = vec![CTRL_CMD];
        seq.extend_from_slice(&INIT_SEQUENCE);
        let mut out = vec![I2cTrans::write(SH1106_ADDR, seq)];
        out.extend(page_writes(&[0; FB_LEN]));
        out.push(I2cTrans::write(SH1106_ADDR, vec![CTRL_CMD, 0xAF]));
        out
    }

    #[test]
    fn init_clears_ram_and_turns_on() {
        let mut i2c = I2cMock::new(&init_writes());
        let oled = Sh1106::new(i2c.clone(), SH1106_ADDR, &mut NoopDelay::new()).unwrap();
        assert_eq!(oled.size(), Size::new(128, 64));
        i2c.done();
    }

    #[test]
    fn pixels_map_to_page_bits() {
        let mut expectations = init_writes();
        let mut fb = [0u8; FB_LEN];
        fb[5] = 0b0000_0001; // (5, 0)
        fb[128 + 127] = 0b1000_0000; // (127, 15)
        fb[7 * 128] = 0b1000_0000; // (0, 63)
        expectations.extend(page_writes(&fb));

        let mut i2c = I2cMock::new(&expectations);
        let mut oled = Sh1106::new(i2c.clone(), SH1106_ADDR, &mut NoopDelay::new()).unwrap();

        let on = BinaryColor::On;
        oled.draw_iter([
            Pixel(Point::new(5, 0), on),
            Pixel(Point::new(127, 15), on),
            Pixel(Point::new(0, 63), on),
            Pixel(Point::new(200, 5), on), // off-panel, dropped
            Pixel(Point::new(-1, 5), on),
        ])
        .unwrap();
        assert!(oled.pixel(5, 0));
        assert!(oled.pixel(127, 15));
        assert!(!oled.pixel(6, 0));

        oled.flush().unwrap();
        i2c.done();
    }

    #[test]
    fn clear_fills_the_whole_buffer() {
        let mut i2c = I2cMock::new(&init_writes());
        let mut oled = Sh1106::new(i2c.clone(), SH1106_ADDR, &mut NoopDelay::new()).unwrap();

        oled.clear(BinaryColor::On).unwrap();
        assert!(oled.pixel(0, 0) && oled.pixel(127, 63));
        oled.clear(BinaryColor::Off).unwrap();
        assert!(!oled.pixel(64, 32));
        i2c.done();
    }
}
