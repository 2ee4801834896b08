//! Display control module for PineTime

use chrono::NaiveDateTime;
use display_interface_spi::SPIInterface;
use embassy_nrf::{
    gpio::Output,
    peripherals::{P0_18, P0_25, P0_26},
    spim::{self, Spim},
};
use embassy_time::Delay;
use embedded_graphics::{pixelcolor::Rgb565, prelude::*, primitives::Rectangle};
use mipidsi::{models::ST7789, Builder, Orientation};
use pinetime_ringface::ui::{Canvas, Palette, WatchFace};

use super::backlight::{self, Backlight};

const LCD_W: u16 = 240;
const LCD_H: u16 = 240;

type Lcd<'a, SPI> = mipidsi::Display<
    SPIInterface<Spim<'a, SPI>, Output<'a, P0_18>, Output<'a, P0_25>>,
    ST7789,
    Output<'a, P0_26>,
>;

pub struct Display<SPI>
where
    SPI: spim::Instance,
{
    /// Display instance
    lcd: Lcd<'static, SPI>,
    /// Backlight pins
    backlight: Backlight<'static>,
    /// Watch face colours
    palette: Palette<Rgb565>,
}

impl<SPI> Display<SPI>
where
    SPI: spim::Instance,
{
    /// Configure display settings on boot
    pub fn init(
        spim: Spim<'static, SPI>,
        cs_pin: Output<'static, P0_25>,
        dc_pin: Output<'static, P0_18>,
        rst_pin: Output<'static, P0_26>,
        backlight: Backlight<'static>,
        palette: Palette<Rgb565>,
    ) -> Result<Self, Error> {
        let lcd = Builder::st7789(SPIInterface::new(spim, dc_pin, cs_pin))
            .with_display_size(LCD_W, LCD_H)
            .with_orientation(Orientation::Portrait(false))
            .init(&mut Delay, Some(rst_pin))
            .map_err(|_| Error::Init)?;

        Ok(Self {
            lcd,
            backlight,
            palette,
        })
    }

    /// Area available to the watch face
    pub fn bounds(&self) -> Rectangle {
        self.lcd.bounding_box()
    }

    /// Set the backlight brightness (0–7)
    pub fn set_brightness(&mut self, level: u8) -> Result<(), backlight::Error> {
        self.backlight.set(level)?;
        defmt::info!("Backlight at level {}", self.backlight.brightness());
        Ok(())
    }

    /// Draw the whole watch face
    pub fn render<W>(&mut self, face: &mut W, now: &NaiveDateTime) -> Result<(), mipidsi::Error>
    where
        W: WatchFace,
    {
        let mut canvas = Canvas::new(&mut self.lcd, self.palette);
        face.render(&mut canvas, now)
    }
}

#[derive(Debug, defmt::Format)]
pub enum Error {
    /// The controller didn't come up
    Init,
}
