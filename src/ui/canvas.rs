//! embedded-graphics backend for the watch face

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    prelude::*,
    primitives::{Circle, PrimitiveStyle, Rectangle, Triangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

use super::ring::{Fill, RingSurface, WedgePath};

/// Colours of the watch face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette<C> {
    /// Window background
    pub background: C,
    /// Dial behind the ring
    pub dial: C,
    /// Wedges and centre hole
    pub ink: C,
    /// Labels
    pub text: C,
}

impl<C: Copy> Palette<C> {
    pub fn fill(&self, fill: Fill) -> C {
        match fill {
            Fill::Dial => self.dial,
            Fill::Ink => self.ink,
        }
    }
}

/// Draws the watch face onto any [`DrawTarget`].
pub struct Canvas<'a, D>
where
    D: DrawTarget,
{
    target: &'a mut D,
    palette: Palette<D::Color>,
}

impl<'a, D> Canvas<'a, D>
where
    D: DrawTarget,
{
    pub fn new(target: &'a mut D, palette: Palette<D::Color>) -> Self {
        Self { target, palette }
    }

    /// Paint the whole target with the background colour.
    pub fn clear(&mut self) -> Result<(), D::Error> {
        self.target.clear(self.palette.background)
    }

    /// Draw `text` at the top of `area`, aligned horizontally.
    pub fn draw_label(
        &mut self,
        text: &str,
        area: Rectangle,
        font: &MonoFont<'_>,
        alignment: Alignment,
    ) -> Result<(), D::Error> {
        if text.is_empty() {
            return Ok(());
        }

        let x = match alignment {
            Alignment::Left => area.top_left.x,
            Alignment::Center => area.center().x,
            Alignment::Right => area.top_left.x + area.size.width as i32 - 1,
        };
        let character_style = MonoTextStyle::new(font, self.palette.text);
        let text_style = TextStyleBuilder::new()
            .alignment(alignment)
            .baseline(Baseline::Top)
            .build();

        Text::with_text_style(
            text,
            Point::new(x, area.top_left.y),
            character_style,
            text_style,
        )
        .draw(self.target)?;
        Ok(())
    }
}

impl<D> RingSurface for Canvas<'_, D>
where
    D: DrawTarget,
{
    type Error = D::Error;

    fn fill_wedge(&mut self, wedge: &WedgePath, fill: Fill) -> Result<(), Self::Error> {
        let [apex, left, right] = wedge.points();
        Triangle::new(apex, left, right)
            .into_styled(PrimitiveStyle::with_fill(self.palette.fill(fill)))
            .draw(self.target)
    }

    fn fill_circle(&mut self, center: Point, radius: u32, fill: Fill) -> Result<(), Self::Error> {
        Circle::with_center(center, radius * 2 + 1)
            .into_styled(PrimitiveStyle::with_fill(self.palette.fill(fill)))
            .draw(self.target)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ui::ring::{Angle, RingGeometry, RingLayer, RingVariant};
    use chrono::NaiveTime;
    use core::convert::Infallible;
    use embedded_graphics::pixelcolor::BinaryColor;

    struct Pixels {
        size: Size,
        data: Vec<BinaryColor>,
    }

    impl Pixels {
        fn new(width: u32, height: u32) -> Self {
            Self {
                size: Size::new(width, height),
                data: vec![BinaryColor::Off; (width * height) as usize],
            }
        }

        fn get(&self, point: Point) -> BinaryColor {
            self.data[(point.y as u32 * self.size.width + point.x as u32) as usize]
        }
    }

    impl OriginDimensions for Pixels {
        fn size(&self) -> Size {
            self.size
        }
    }

    impl DrawTarget for Pixels {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Infallible>
        where
            I: IntoIterator<Item = Pixel<BinaryColor>>,
        {
            for Pixel(point, color) in pixels {
                if self.bounding_box().contains(point) {
                    let index = (point.y as u32 * self.size.width + point.x as u32) as usize;
                    self.data[index] = color;
                }
            }
            Ok(())
        }
    }

    const PALETTE: Palette<BinaryColor> = Palette {
        background: BinaryColor::Off,
        dial: BinaryColor::On,
        ink: BinaryColor::Off,
        text: BinaryColor::On,
    };

    #[test]
    fn test_ring_pixels() {
        let mut pixels = Pixels::new(144, 168);
        let mut ring = RingLayer::new(
            RingVariant::Hours,
            RingGeometry::COMPACT,
            Rectangle::new(Point::zero(), Size::new(144, 168)),
        );

        // 03:00 blackens the first quarter of the dial between the hole and the rim
        let mut canvas = Canvas::new(&mut pixels, PALETTE);
        ring.draw(&mut canvas, &NaiveTime::from_hms_opt(3, 0, 0).unwrap())
            .unwrap();

        let center = Point::new(72, 84);
        // Centre hole
        assert_eq!(pixels.get(center), BinaryColor::Off);
        // Just past 1 o'clock, inside the rim: covered by a wedge
        assert_eq!(pixels.get(center + Point::new(38, -49)), BinaryColor::Off);
        // Same radius at 9 o'clock: dial still showing
        assert_eq!(pixels.get(center + Point::new(-62, 0)), BinaryColor::On);
        // 6 o'clock, inside the rim: dial still showing
        assert_eq!(pixels.get(center + Point::new(0, 62)), BinaryColor::On);
        // Outside the dial
        assert_eq!(pixels.get(Point::new(0, 0)), BinaryColor::Off);
    }

    #[test]
    fn test_wedge_fill_uses_palette() {
        let mut pixels = Pixels::new(20, 20);
        let mut canvas = Canvas::new(&mut pixels, PALETTE);
        let mut wedge = WedgePath::new(8, Angle::from_degrees(15));
        wedge.move_to(Point::new(10, 10));
        canvas.fill_wedge(&wedge, Fill::Dial).unwrap();
        assert_eq!(pixels.get(Point::new(10, 5)), BinaryColor::On);
        assert_eq!(pixels.get(Point::new(10, 15)), BinaryColor::Off);
    }

    #[test]
    fn test_label_alignment() {
        let mut pixels = Pixels::new(60, 20);
        let mut canvas = Canvas::new(&mut pixels, PALETTE);
        let area = Rectangle::new(Point::zero(), Size::new(60, 20));
        canvas
            .draw_label("", area, &embedded_graphics::mono_font::ascii::FONT_6X10, Alignment::Right)
            .unwrap();
        assert!(pixels.data.iter().all(|c| *c == BinaryColor::Off));

        let mut canvas = Canvas::new(&mut pixels, PALETTE);
        canvas
            .draw_label("88", area, &embedded_graphics::mono_font::ascii::FONT_6X10, Alignment::Right)
            .unwrap();
        let lit_columns: Vec<i32> = (0..60)
            .filter(|x| (0..10).any(|y| pixels.get(Point::new(*x, y)) == BinaryColor::On))
            .collect();
        assert!(!lit_columns.is_empty());
        assert!(lit_columns.iter().all(|x| *x >= 40));
    }
}
