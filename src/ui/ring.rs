//! Ring progress layer
//!
//! A dial that fills in wedge by wedge as the hour (or the day) goes by. The wedges are
//! rotated copies of one fixed isoceles triangle, rasterized through a [`RingSurface`].

use core::f32::consts::PI;

use chrono::Timelike;
use embedded_graphics::{geometry::Point, primitives::Rectangle};
use libm::{cosf, roundf, sinf, tanf};

/// Fixed-point angle in tenths of a degree, clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Angle(u32);

impl Angle {
    pub const ZERO: Angle = Angle(0);
    pub const FULL: Angle = Angle(3600);

    pub const fn from_degrees(degrees: u32) -> Self {
        Self(degrees * 10)
    }

    pub const fn from_decidegrees(decidegrees: u32) -> Self {
        Self(decidegrees)
    }

    pub const fn decidegrees(self) -> u32 {
        self.0
    }

    pub fn to_radians(self) -> f32 {
        self.0 as f32 * (PI / 1800.0)
    }
}

/// Last rotation (exclusive) of the ascending minute ring.
pub const ASCENDING_BOUND: Angle = Angle::from_degrees(354);

/// Direction in which wedges are laid down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sweep {
    /// From the swept angle back down to the first increment
    Descending,
    /// From the swept angle up to `bound`
    Ascending { bound: Angle },
}

/// Which time field drives the ring, and how finely it is divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingVariant {
    /// One 15° wedge per elapsed hour of the day
    Hours,
    /// One 6° wedge per remaining minute of the hour
    Minutes,
    /// One 2.5° wedge per elapsed ten minutes of the day
    TenMinutes,
}

impl RingVariant {
    /// Angle covered by a single wedge.
    pub const fn increment(self) -> Angle {
        match self {
            RingVariant::Hours => Angle::from_degrees(15),
            RingVariant::Minutes => Angle::from_degrees(6),
            RingVariant::TenMinutes => Angle::from_decidegrees(25),
        }
    }

    pub const fn sweep(self) -> Sweep {
        match self {
            RingVariant::Minutes => Sweep::Ascending {
                bound: ASCENDING_BOUND,
            },
            RingVariant::Hours | RingVariant::TenMinutes => Sweep::Descending,
        }
    }

    /// The time field counted by this ring.
    pub fn field<T: Timelike>(self, time: &T) -> u32 {
        match self {
            RingVariant::Hours => time.hour(),
            RingVariant::Minutes => time.minute(),
            RingVariant::TenMinutes => (time.hour() * 60 + time.minute()) / 10,
        }
    }

    /// Total angle for `time`. Always below a full circle.
    pub fn swept_angle<T: Timelike>(self, time: &T) -> Angle {
        let total = Angle(self.field(time) * self.increment().0);
        debug_assert!(total < Angle::FULL);
        total
    }

    /// Rotations of the wedges to draw for `time`.
    pub fn wedge_angles<T: Timelike>(self, time: &T) -> WedgeAngles {
        WedgeAngles {
            next: self.swept_angle(time).0,
            step: self.increment().0,
            sweep: self.sweep(),
        }
    }
}

/// Iterator over wedge rotations, see [`RingVariant::wedge_angles`].
#[derive(Debug, Clone)]
pub struct WedgeAngles {
    next: u32,
    step: u32,
    sweep: Sweep,
}

impl Iterator for WedgeAngles {
    type Item = Angle;

    fn next(&mut self) -> Option<Angle> {
        let current = self.next;
        match self.sweep {
            Sweep::Descending => {
                if current == 0 {
                    return None;
                }
                self.next = current.saturating_sub(self.step);
            }
            Sweep::Ascending { bound } => {
                if current >= bound.0 {
                    return None;
                }
                self.next = current + self.step;
            }
        }
        Some(Angle(current))
    }
}

/// Radii of the ring, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingGeometry {
    /// Distance from the centre to the base of a wedge
    pub wedge_radius: u32,
    /// Dial circle painted before the wedges
    pub clear_radius: u32,
    /// Centre hole painted after the wedges
    pub hole_radius: u32,
}

impl RingGeometry {
    /// Proportions of the 144 px wide display the face was designed for.
    pub const COMPACT: RingGeometry = RingGeometry {
        wedge_radius: 68,
        clear_radius: 65,
        hole_radius: 60,
    };

    /// Scale [`RingGeometry::COMPACT`] to a display `diameter` pixels wide.
    pub const fn for_diameter(diameter: u32) -> Self {
        Self {
            wedge_radius: diameter * Self::COMPACT.wedge_radius / 144,
            clear_radius: diameter * Self::COMPACT.clear_radius / 144,
            hole_radius: diameter * Self::COMPACT.hole_radius / 144,
        }
    }
}

impl Default for RingGeometry {
    fn default() -> Self {
        Self::COMPACT
    }
}

/// The wedge shape: apex at the origin, base `radius` pixels towards 12 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct WedgePath {
    outline: [Point; 3],
    offset: Point,
    rotation: Angle,
}

impl WedgePath {
    /// Build a wedge for `increment`. The half-width of the base is `radius * tan(increment)`.
    pub fn new(radius: u32, increment: Angle) -> Self {
        let half_width = roundf(radius as f32 * tanf(increment.to_radians())) as i32;
        let radius = radius as i32;

        Self {
            outline: [
                Point::zero(),
                Point::new(-half_width, -radius),
                Point::new(half_width, -radius),
            ],
            offset: Point::zero(),
            rotation: Angle::ZERO,
        }
    }

    /// Place the apex at `offset`.
    pub fn move_to(&mut self, offset: Point) {
        self.offset = offset;
    }

    pub fn rotate_to(&mut self, rotation: Angle) {
        self.rotation = rotation;
    }

    pub fn rotation(&self) -> Angle {
        self.rotation
    }

    /// Unrotated outline relative to the apex.
    pub fn outline(&self) -> &[Point; 3] {
        &self.outline
    }

    /// Outline after rotation and translation.
    pub fn points(&self) -> [Point; 3] {
        let angle = self.rotation.to_radians();
        let (sin, cos) = (sinf(angle), cosf(angle));

        self.outline.map(|point| {
            let (x, y) = (point.x as f32, point.y as f32);
            Point::new(
                roundf(x * cos - y * sin) as i32,
                roundf(x * sin + y * cos) as i32,
            ) + self.offset
        })
    }
}

/// Colour role of a filled shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fill {
    /// Dial face behind the wedges
    Dial,
    /// Wedges and centre hole
    Ink,
}

/// Drawing primitives the ring needs from the host.
pub trait RingSurface {
    type Error;

    /// Rasterize `wedge` at its current rotation.
    fn fill_wedge(&mut self, wedge: &WedgePath, fill: Fill) -> Result<(), Self::Error>;

    fn fill_circle(&mut self, center: Point, radius: u32, fill: Fill) -> Result<(), Self::Error>;
}

/// Ring layer state, alive while the watch face is loaded.
#[derive(Debug, Clone)]
pub struct RingLayer {
    variant: RingVariant,
    geometry: RingGeometry,
    bounds: Rectangle,
    wedge: WedgePath,
}

impl RingLayer {
    pub fn new(variant: RingVariant, geometry: RingGeometry, bounds: Rectangle) -> Self {
        let mut wedge = WedgePath::new(geometry.wedge_radius, variant.increment());
        wedge.move_to(bounds.center());

        Self {
            variant,
            geometry,
            bounds,
            wedge,
        }
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Redraw the whole ring for `time` and return the number of wedges drawn.
    ///
    /// The dial circle goes down first so a shrinking ring leaves nothing behind.
    pub fn draw<S, T>(&mut self, surface: &mut S, time: &T) -> Result<usize, S::Error>
    where
        S: RingSurface,
        T: Timelike,
    {
        let center = self.center();
        surface.fill_circle(center, self.geometry.clear_radius, Fill::Dial)?;

        let mut wedges = 0;
        for angle in self.variant.wedge_angles(time) {
            self.wedge.rotate_to(angle);
            surface.fill_wedge(&self.wedge, Fill::Ink)?;
            wedges += 1;
        }

        surface.fill_circle(center, self.geometry.hole_radius, Fill::Ink)?;
        Ok(wedges)
    }
}
