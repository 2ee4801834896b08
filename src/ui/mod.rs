//! UI definitions module
//! Based on: https://github.com/lupyuen/pinetime-watchface/blob/master/src/lib.rs

use chrono::NaiveDateTime;
use embedded_graphics::{prelude::DrawTarget, primitives::Rectangle};

use crate::battery::BatteryChargeState;
use crate::message::{AppMessageResult, Dictionary, OutboundMessage};

pub mod canvas;
pub mod label;
pub mod ring;
mod watchface;

pub use canvas::{Canvas, Palette};
pub use watchface::{Layout, RingWatchface};

/// Host callbacks, delivered one at a time.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// A new minute started (local time)
    MinuteTick(NaiveDateTime),
    BatteryChanged(BatteryChargeState),
    InboxReceived(Dictionary<'a>),
    InboxDropped(AppMessageResult),
    OutboxFailed(AppMessageResult),
    OutboxSent,
}

/// What the host should do after an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// The face changed and needs to be rendered
    pub redraw: bool,
    /// Message to hand to the transport
    pub outbox: Option<OutboundMessage>,
}

impl Response {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redraw() -> Self {
        Self {
            redraw: true,
            outbox: None,
        }
    }
}

pub trait WatchFace {
    /// Create the layers for a window of size `bounds`.
    fn load(&mut self, bounds: Rectangle, now: &NaiveDateTime);

    /// Release everything created by `load`.
    fn unload(&mut self);

    /// Update watchface state with an event
    fn handle_event(&mut self, event: Event<'_>) -> Response;

    /// Draw the whole face
    fn render<D>(&mut self, canvas: &mut Canvas<'_, D>, now: &NaiveDateTime) -> Result<(), D::Error>
    where
        D: DrawTarget;
}
