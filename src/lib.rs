//! Ring progress watch face for the PineTime
//!
//! Everything that doesn't touch hardware lives here so it can be tested on the host: the
//! ring renderer, label formatting, the message codec and the watch face controller. The
//! firmware binary in `main.rs` is the host adapter that feeds events into
//! [`ui::RingWatchface`] and draws it on the LCD.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod battery;
pub mod clock;
pub mod config;
pub mod message;
pub mod ui;
