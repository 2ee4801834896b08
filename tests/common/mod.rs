#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::Rectangle,
};
use pinetime_ringface::{
    message::{DictionaryWriter, KEY_TEMPERATURE},
    ui::Palette,
};

// Init logger for tests
#[ctor::ctor]
fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub const PALETTE: Palette<Rgb565> = Palette {
    background: Rgb565::BLACK,
    dial: Rgb565::WHITE,
    ink: Rgb565::BLACK,
    text: Rgb565::WHITE,
};

/// In-memory stand-in for the LCD.
pub struct FrameBuffer {
    size: Size,
    pixels: Vec<Rgb565>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            pixels: vec![Rgb565::RED; (width * height) as usize],
        }
    }

    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    pub fn count(&self, color: Rgb565) -> usize {
        self.pixels.iter().filter(|&&c| c == color).count()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(point, color) in pixels {
            if bounds.contains(point) {
                let index = point.y as u32 * self.size.width + point.x as u32;
                self.pixels[index as usize] = color;
            }
        }
        Ok(())
    }
}

pub fn screen() -> Rectangle {
    Rectangle::new(Point::zero(), Size::new(240, 240))
}

pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Encode a message carrying `degrees` under the temperature key.
pub fn temperature_message(degrees: i32) -> Vec<u8> {
    let mut buf = [0; 32];
    let mut writer = DictionaryWriter::new(&mut buf).unwrap();
    writer.write_i32(KEY_TEMPERATURE, degrees).unwrap();
    let len = writer.finish();
    buf[..len].to_vec()
}
