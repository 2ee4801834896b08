#![no_std]
#![no_main]

mod peripherals;
mod system;

// Panic handler and debugging
use defmt::unwrap;

use defmt_rtt as _;
use panic_probe as _;

// Device
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::{
    bind_interrupts,
    gpio::{Input, Level, Output, OutputDrive, Pull},
    interrupt::{self, InterruptExt, Priority},
    peripherals::SPI2,
    saadc::{self, ChannelConfig, Resolution, Saadc},
    spim,
};
use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, channel::Channel};
use embassy_time::{Duration, Timer};
use heapless::Vec;
use nrf_softdevice::{
    ble::{gatt_server, peripheral},
    Softdevice,
};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<SPI2>;
});

// Crate
use peripherals::{backlight::Backlight, battery::Battery, display::Display};
use system::{
    bluetooth::{
        self, AppMessageServiceEvent, CurrentTimeServiceEvent, Server, ServerEvent,
        INBOX_CAPACITY,
    },
    config::{SystemConfig, BATTERY_POLL_SECS, BRIGHTNESS, PALETTE, WATCHFACE},
    time::{TimeManager, TimeReference},
};

// Others
use chrono::NaiveDateTime;
use pinetime_ringface::{
    battery::BatteryChargeState,
    clock::{parse_current_time, secs_until_next_minute, MinuteTracker},
    message::{AppMessageResult, Dictionary, OutboundMessage},
    ui::{Event, Response, RingWatchface, WatchFace},
};

// Include current UTC epoch at compile time
include!(concat!(env!("OUT_DIR"), "/utc.rs"));

/// Everything the watch face task reacts to besides the minute timer.
enum HostEvent {
    Battery(BatteryChargeState),
    Inbox(Vec<u8, INBOX_CAPACITY>),
    OutboxSent,
    OutboxFailed(AppMessageResult),
    /// Local wall clock time written by the phone
    TimeSync(NaiveDateTime),
}

// Communication channels
static HOST_EVENTS: Channel<ThreadModeRawMutex, HostEvent, 8> = Channel::new();
static OUTBOX: Channel<ThreadModeRawMutex, OutboundMessage, 1> = Channel::new();

static SERVER: StaticCell<Server> = StaticCell::new();

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Advertise, serve GATT requests and forward the outbox while connected.
#[embassy_executor::task(pool_size = 1)]
async fn bluetooth_task(sd: &'static Softdevice, server: &'static Server) {
    let config = peripheral::Config::default();
    loop {
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &bluetooth::ADV_DATA,
            scan_data: &bluetooth::SCAN_DATA,
        };

        let conn = match select(
            peripheral::advertise_connectable(sd, adv, &config),
            OUTBOX.receive(),
        )
        .await
        {
            Either::First(Ok(conn)) => conn,
            Either::First(Err(e)) => {
                defmt::warn!("Advertising failed: {:?}", e);
                Timer::after(Duration::from_secs(1)).await;
                continue;
            }
            Either::Second(_) => {
                HOST_EVENTS
                    .send(HostEvent::OutboxFailed(AppMessageResult::NotConnected))
                    .await;
                continue;
            }
        };
        defmt::info!("Phone connected");

        let gatt = gatt_server::run(&conn, server, |e| match e {
            ServerEvent::Bas(_) => {}
            ServerEvent::App(AppMessageServiceEvent::InboxWrite(bytes)) => {
                if HOST_EVENTS.try_send(HostEvent::Inbox(bytes)).is_err() {
                    defmt::warn!("Event queue full, message dropped");
                }
            }
            ServerEvent::App(AppMessageServiceEvent::OutboxCccdWrite { notifications }) => {
                defmt::debug!("Outbox notifications: {}", notifications);
            }
            ServerEvent::Cts(CurrentTimeServiceEvent::CurrentTimeWrite(bytes)) => {
                match parse_current_time(&bytes) {
                    Some(local) => {
                        if HOST_EVENTS.try_send(HostEvent::TimeSync(local)).is_err() {
                            defmt::warn!("Event queue full, time sync dropped");
                        }
                    }
                    None => defmt::warn!("Invalid current time value"),
                }
            }
            ServerEvent::Cts(CurrentTimeServiceEvent::CurrentTimeCccdWrite { .. }) => {}
        });

        let outbox = async {
            loop {
                let message = OUTBOX.receive().await;
                let event = match server.send_outbox(&conn, &message) {
                    Ok(()) => HostEvent::OutboxSent,
                    Err(reason) => HostEvent::OutboxFailed(reason),
                };
                HOST_EVENTS.send(event).await;
            }
        };

        if let Either::First(e) = select(gatt, outbox).await {
            defmt::info!("Phone disconnected: {:?}", e);
        }
    }
}

/// Sample the battery and report changes.
#[embassy_executor::task(pool_size = 1)]
async fn battery_task(mut battery: Battery, server: &'static Server) {
    let mut last: Option<BatteryChargeState> = None;
    loop {
        match battery.state().await {
            Ok(state) if last != Some(state) => {
                defmt::info!("Battery status: {}", state);
                last = Some(state);
                if let Err(e) = server.bas.battery_level_set(&state.charge_percent) {
                    defmt::warn!("Failed to update battery level: {:?}", e);
                }
                HOST_EVENTS.send(HostEvent::Battery(state)).await;
            }
            Ok(_) => {}
            Err(e) => defmt::warn!("Battery measurement failed: {:?}", e),
        }

        Timer::after(Duration::from_secs(BATTERY_POLL_SECS)).await;
    }
}

/// Drive the watch face: minute ticks, host events and redraws.
#[embassy_executor::task(pool_size = 1)]
async fn watchface_task(mut display: Display<SPI2>, mut clock: TimeManager) {
    let mut face = RingWatchface::new(&WATCHFACE);
    face.load(display.bounds(), &clock.local());
    redraw(&mut display, &mut face, &clock.local());

    let mut minutes = MinuteTracker::new(&clock.local());
    loop {
        let wait = secs_until_next_minute(&clock.local());
        let event = match select(
            Timer::after(Duration::from_secs(wait as u64)),
            HOST_EVENTS.receive(),
        )
        .await
        {
            Either::First(()) => None,
            Either::Second(event) => Some(event),
        };

        let mut dirty = false;
        if let Some(event) = event {
            let response = dispatch(&mut face, &mut clock, event);
            dirty |= forward(&mut face, response);
        }
        let now = clock.local();
        if minutes.poll(&now) {
            let response = face.handle_event(Event::MinuteTick(now));
            dirty |= forward(&mut face, response);
        }
        if dirty {
            redraw(&mut display, &mut face, &clock.local());
        }
    }
}

/// Queue the outbound message of a response, returns whether a redraw was asked for.
fn forward(face: &mut RingWatchface, response: Response) -> bool {
    if let Some(message) = response.outbox {
        if OUTBOX.try_send(message).is_err() {
            face.handle_event(Event::OutboxFailed(AppMessageResult::Busy));
        }
    }
    response.redraw
}

fn dispatch(face: &mut RingWatchface, clock: &mut TimeManager, event: HostEvent) -> Response {
    match event {
        HostEvent::Battery(state) => face.handle_event(Event::BatteryChanged(state)),
        HostEvent::Inbox(bytes) => match Dictionary::parse(&bytes) {
            Ok(dictionary) => face.handle_event(Event::InboxReceived(dictionary)),
            Err(e) => {
                defmt::warn!("Malformed message: {:?}", e);
                face.handle_event(Event::InboxDropped(AppMessageResult::InvalidArgument))
            }
        },
        HostEvent::OutboxSent => face.handle_event(Event::OutboxSent),
        HostEvent::OutboxFailed(reason) => face.handle_event(Event::OutboxFailed(reason)),
        HostEvent::TimeSync(local) => {
            clock.set_local(local);
            defmt::info!("Clock synchronized");
            face.refresh_time(&clock.local())
        }
    }
}

fn redraw(display: &mut Display<SPI2>, face: &mut RingWatchface, now: &NaiveDateTime) {
    if let Err(e) = display.render(face, now) {
        defmt::warn!("Failed to draw watch face: {:?}", defmt::Debug2Format(&e));
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(SystemConfig::new());
    defmt::info!("Initializing");

    // Priorities 0, 1 and 4 belong to the SoftDevice
    interrupt::SAADC.set_priority(Priority::P3);
    interrupt::SPIM2_SPIS2_SPI2.set_priority(Priority::P3);

    // Initialize SAADC
    let mut saadc_config = saadc::Config::default();
    // Set resolution to 12bit, necessary for correct battery status calculation
    saadc_config.resolution = Resolution::_12BIT;
    // Pin P0.31: Voltage level
    let channel_config = ChannelConfig::single_ended(p.P0_31);
    let saadc = Saadc::new(p.SAADC, Irqs, saadc_config, [channel_config]);
    saadc.calibrate().await;

    // Initialize battery
    let battery = Battery::init(
        saadc,
        Input::new(p.P0_12, Pull::None),
        Input::new(p.P0_19, Pull::None),
    );

    // Initialize backlight
    let backlight = Backlight::init(
        Output::new(p.P0_14, Level::High, OutputDrive::Standard),
        Output::new(p.P0_22, Level::High, OutputDrive::Standard),
        Output::new(p.P0_23, Level::High, OutputDrive::Standard),
    );

    // Initialize SPI
    let mut spim_config = spim::Config::default();
    // Use SPI at 8MHz (the fastest clock available on the nRF52832),
    // otherwise refreshing will be super slow.
    spim_config.frequency = spim::Frequency::M8;
    // SPI must be used in mode 3. Mode 0 (the default) won't work.
    spim_config.mode = spim::MODE_3;

    let spim = spim::Spim::new(p.SPI2, Irqs, p.P0_02, p.P0_04, p.P0_03, spim_config);

    // Initialize LCD
    let mut display = unwrap!(Display::init(
        spim,
        Output::new(p.P0_25, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_18, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_26, Level::Low, OutputDrive::Standard),
        backlight,
        PALETTE,
    ));
    unwrap!(display.set_brightness(BRIGHTNESS));

    // Seed the clock with the build time until the phone writes the current time
    let reference = TimeReference::from_timestamp(UTC_EPOCH).unwrap_or_default();
    let clock = TimeManager::init(reference, WATCHFACE.utc_offset_secs);

    // Initialize Bluetooth
    let sd = Softdevice::enable(&bluetooth::generate_config());
    let server: &'static Server = SERVER.init(unwrap!(Server::new(sd)));
    let sd: &'static Softdevice = sd;

    defmt::info!("Initialization finished");

    // Schedule tasks
    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(bluetooth_task(sd, server)));
    unwrap!(spawner.spawn(battery_task(battery, server)));
    unwrap!(spawner.spawn(watchface_task(display, clock)));
}
