//! Ring progress watch face

use chrono::{NaiveDateTime, Timelike};
use embedded_graphics::{
    geometry::{Point, Size},
    mono_font::{iso_8859_1::FONT_10X20, MonoFont},
    prelude::DrawTarget,
    primitives::Rectangle,
    text::Alignment,
};
use profont::PROFONT_24_POINT;

use super::canvas::Canvas;
use super::label::{
    write_battery, write_temperature, write_time, Label, BATTERY_LABEL_LEN,
    TEMPERATURE_LABEL_LEN, TIME_LABEL_LEN,
};
use super::ring::{RingGeometry, RingLayer};
use super::{Event, Response, WatchFace};
use crate::battery::BatteryChargeState;
use crate::clock::ClockStyle;
use crate::config::{FaceConfig, WatchfaceConfig};
use crate::message::{Dictionary, OutboundMessage, KEY_TEMPERATURE};

/// Height of the layout the face was designed for.
const DESIGN_HEIGHT: u32 = 168;

/// Fonts used by the labels.
#[derive(Clone, Copy)]
pub struct Fonts {
    pub time: &'static MonoFont<'static>,
    pub small: &'static MonoFont<'static>,
}

impl Fonts {
    pub const DEFAULT: Fonts = Fonts {
        time: &PROFONT_24_POINT,
        small: &FONT_10X20,
    };
}

/// Label positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub time: Rectangle,
    pub battery: Rectangle,
    pub temperature: Rectangle,
}

impl Layout {
    /// Scale the 144x168 design to `bounds`.
    pub fn for_bounds(bounds: Rectangle) -> Self {
        let width = bounds.size.width;
        let scale = |v: u32| v * bounds.size.height / DESIGN_HEIGHT;
        let row = |y: u32, height: u32| {
            Rectangle::new(
                bounds.top_left + Point::new(0, scale(y) as i32),
                Size::new(width, scale(height)),
            )
        };

        Self {
            time: row(55, 50),
            battery: row(0, 24),
            temperature: row(100, 30),
        }
    }
}

/// Layers and text buffers, alive between `load` and `unload`.
struct FaceContext {
    ring: RingLayer,
    layout: Layout,
    time_label: Label<TIME_LABEL_LEN>,
    battery_label: Label<BATTERY_LABEL_LEN>,
    temperature_label: Label<TEMPERATURE_LABEL_LEN>,
}

/// Digital clock on top of a progress ring, with an optional battery or temperature readout.
pub struct RingWatchface {
    face: FaceConfig,
    clock_style: ClockStyle,
    geometry: RingGeometry,
    fonts: Fonts,
    /// Last state reported by the battery service
    battery: Option<BatteryChargeState>,
    context: Option<FaceContext>,
}

impl RingWatchface {
    pub fn new(config: &WatchfaceConfig) -> Self {
        Self {
            face: config.face,
            clock_style: config.clock_style,
            geometry: config.geometry,
            fonts: Fonts::DEFAULT,
            battery: None,
            context: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.context.is_some()
    }

    pub fn time_text(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.time_label.as_str())
    }

    pub fn battery_text(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.battery_label.as_str())
    }

    pub fn temperature_text(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.temperature_label.as_str())
    }

    /// Rewrite the time label without any other minute tick side effects.
    pub fn refresh_time(&mut self, now: &NaiveDateTime) -> Response {
        let Some(context) = self.context.as_mut() else {
            debug!("Time refresh while unloaded");
            return Response::none();
        };

        if let Err(e) = write_time(&mut context.time_label, now, self.clock_style) {
            warn!("Failed to format time: {:?}", e);
        }
        Response::redraw()
    }

    fn handle_minute_tick(&mut self, now: &NaiveDateTime) -> Response {
        let mut response = self.refresh_time(now);
        let Some(context) = self.context.as_mut() else {
            return response;
        };

        if self.face.show_battery {
            if let Some(state) = self.battery {
                if let Err(e) = write_battery(&mut context.battery_label, state.charge_percent) {
                    warn!("Failed to format battery: {:?}", e);
                }
            }
        }

        let poll = self.face.weather_poll_minutes;
        if self.face.show_temperature && poll != 0 && now.minute() % poll == 0 {
            info!("Requesting temperature");
            response.outbox = Some(OutboundMessage::temperature_request());
        }

        response
    }

    fn handle_battery(&mut self, state: BatteryChargeState) -> Response {
        self.battery = Some(state);
        if !self.face.show_battery {
            return Response::none();
        }
        let Some(context) = self.context.as_mut() else {
            return Response::none();
        };

        match write_battery(&mut context.battery_label, state.charge_percent) {
            Ok(()) => Response::redraw(),
            Err(e) => {
                warn!("Failed to format battery: {:?}", e);
                Response::none()
            }
        }
    }

    fn handle_inbox(&mut self, dictionary: &Dictionary<'_>) -> Response {
        let Some(context) = self.context.as_mut() else {
            warn!("Message received while unloaded");
            return Response::none();
        };

        let mut changed = false;
        for tuple in dictionary {
            match tuple.key {
                KEY_TEMPERATURE => match tuple.value.as_i32() {
                    Some(degrees) => {
                        match write_temperature(&mut context.temperature_label, degrees) {
                            Ok(()) => changed = true,
                            Err(e) => warn!("Failed to format temperature: {:?}", e),
                        }
                    }
                    None => warn!("Temperature is not an integer"),
                },
                key => error!("Key {} not recognized!", key),
            }
        }

        if changed && self.face.show_temperature {
            Response::redraw()
        } else {
            Response::none()
        }
    }
}

impl WatchFace for RingWatchface {
    fn load(&mut self, bounds: Rectangle, now: &NaiveDateTime) {
        let mut context = FaceContext {
            ring: RingLayer::new(self.face.ring, self.geometry, bounds),
            layout: Layout::for_bounds(bounds),
            time_label: Label::new(),
            battery_label: Label::new(),
            temperature_label: Label::new(),
        };
        if let Err(e) = write_time(&mut context.time_label, now, self.clock_style) {
            warn!("Failed to format time: {:?}", e);
        }
        if let (true, Some(state)) = (self.face.show_battery, self.battery) {
            if let Err(e) = write_battery(&mut context.battery_label, state.charge_percent) {
                warn!("Failed to format battery: {:?}", e);
            }
        }

        self.context = Some(context);
        info!("Watch face loaded");
    }

    fn unload(&mut self) {
        if self.context.take().is_some() {
            info!("Watch face unloaded");
        }
    }

    fn handle_event(&mut self, event: Event<'_>) -> Response {
        match event {
            Event::MinuteTick(now) => self.handle_minute_tick(&now),
            Event::BatteryChanged(state) => self.handle_battery(state),
            Event::InboxReceived(dictionary) => self.handle_inbox(&dictionary),
            Event::InboxDropped(reason) => {
                error!("Message dropped: {:?}", reason);
                Response::none()
            }
            Event::OutboxFailed(reason) => {
                error!("Outbox send failed: {:?}", reason);
                Response::none()
            }
            Event::OutboxSent => {
                info!("Outbox send success!");
                Response::none()
            }
        }
    }

    fn render<D>(&mut self, canvas: &mut Canvas<'_, D>, now: &NaiveDateTime) -> Result<(), D::Error>
    where
        D: DrawTarget,
    {
        let Some(context) = self.context.as_mut() else {
            debug!("Render while unloaded");
            return Ok(());
        };

        canvas.clear()?;
        context.ring.draw(canvas, now)?;

        let layout = context.layout;
        canvas.draw_label(
            context.time_label.as_str(),
            layout.time,
            self.fonts.time,
            Alignment::Center,
        )?;
        if self.face.show_battery {
            canvas.draw_label(
                context.battery_label.as_str(),
                layout.battery,
                self.fonts.small,
                Alignment::Right,
            )?;
        }
        if self.face.show_temperature {
            canvas.draw_label(
                context.temperature_label.as_str(),
                layout.temperature,
                self.fonts.small,
                Alignment::Center,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn bounds() -> Rectangle {
        Rectangle::new(Point::zero(), Size::new(240, 240))
    }

    fn now(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 3)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_layout_scaling() {
        let layout = Layout::for_bounds(Rectangle::new(Point::zero(), Size::new(144, 168)));
        assert_eq!(layout.time, Rectangle::new(Point::new(0, 55), Size::new(144, 50)));
        assert_eq!(layout.battery, Rectangle::new(Point::zero(), Size::new(144, 24)));
        assert_eq!(
            layout.temperature,
            Rectangle::new(Point::new(0, 100), Size::new(144, 30))
        );

        let layout = Layout::for_bounds(bounds());
        assert_eq!(layout.time.top_left, Point::new(0, 78));
        assert_eq!(layout.temperature.top_left, Point::new(0, 142));
    }

    #[test]
    fn test_load_unload_lifecycle() {
        let mut face = RingWatchface::new(&WatchfaceConfig::default());
        assert!(!face.is_loaded());
        assert_eq!(face.time_text(), None);
        assert_eq!(face.handle_event(Event::MinuteTick(now(9, 5))), Response::none());

        face.load(bounds(), &now(9, 5));
        assert!(face.is_loaded());
        assert_eq!(face.time_text(), Some("09:05"));
        assert_eq!(face.temperature_text(), Some(""));

        face.unload();
        assert!(!face.is_loaded());
        assert_eq!(face.temperature_text(), None);
    }

    #[test]
    fn test_battery_remembered_across_load() {
        let config = WatchfaceConfig::new(FaceConfig::time_battery());
        let mut face = RingWatchface::new(&config);
        assert_eq!(
            face.handle_event(Event::BatteryChanged(BatteryChargeState {
                charge_percent: 40,
                ..Default::default()
            })),
            Response::none()
        );
        face.load(bounds(), &now(12, 0));
        assert_eq!(face.battery_text(), Some("40%"));
    }

    #[test]
    fn test_hidden_battery_is_not_redrawn() {
        let mut face = RingWatchface::new(&WatchfaceConfig::default());
        face.load(bounds(), &now(12, 0));
        let response = face.handle_event(Event::BatteryChanged(BatteryChargeState {
            charge_percent: 40,
            ..Default::default()
        }));
        assert!(!response.redraw);
        assert_eq!(face.battery_text(), Some(""));
    }
}
