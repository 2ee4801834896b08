//! Bluetooth module

// Core
use core::mem;

// BLE
use heapless::Vec;
use nrf_softdevice::{
    self,
    ble::{
        advertisement_builder::{
            Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList,
            ServiceUuid16,
        },
        Connection,
    },
    raw, Config,
};

// Others
use pinetime_ringface::message::{AppMessageResult, OutboundMessage, OUTBOX_CAPACITY};

/// Largest inbound message accepted by the inbox characteristic
pub const INBOX_CAPACITY: usize = 64;

/// Length of a Current Time Service value
pub const CURRENT_TIME_LEN: usize = 10;

pub static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_16(ServiceList::Complete, &[ServiceUuid16::BATTERY])
    .full_name("PineTime")
    .build();

pub static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .services_16(ServiceList::Complete, &[ServiceUuid16::BATTERY])
    .build();

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub bas: BatteryService,
    pub app: AppMessageService,
    pub cts: CurrentTimeService,
}

#[nrf_softdevice::gatt_service(uuid = "180f")]
pub struct BatteryService {
    #[characteristic(uuid = "2a19", read, notify)]
    pub battery_level: u8,
}

/// Key/value messages with the companion app
#[nrf_softdevice::gatt_service(uuid = "8f2b0001-5c3a-4f8e-9a1d-4b7e2c6d0a10")]
pub struct AppMessageService {
    /// Written by the phone
    #[characteristic(uuid = "8f2b0002-5c3a-4f8e-9a1d-4b7e2c6d0a10", write)]
    pub inbox: Vec<u8, INBOX_CAPACITY>,
    /// Notified to the phone
    #[characteristic(uuid = "8f2b0003-5c3a-4f8e-9a1d-4b7e2c6d0a10", read, notify)]
    pub outbox: Vec<u8, OUTBOX_CAPACITY>,
}

#[nrf_softdevice::gatt_service(uuid = "1805")]
pub struct CurrentTimeService {
    #[characteristic(uuid = "2a2b", read, write, notify)]
    pub current_time: Vec<u8, CURRENT_TIME_LEN>,
}

impl Server {
    /// Notify an outbound message to the connected phone.
    pub fn send_outbox(
        &self,
        conn: &Connection,
        message: &OutboundMessage,
    ) -> Result<(), AppMessageResult> {
        let value: Vec<u8, OUTBOX_CAPACITY> =
            Vec::from_slice(message.as_bytes()).map_err(|_| AppMessageResult::BufferOverflow)?;
        self.app.outbox_notify(conn, &value).map_err(|e| {
            defmt::warn!("Outbox notify failed: {:?}", e);
            AppMessageResult::SendRejected
        })
    }
}

pub fn generate_config() -> Config {
    Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_XTAL as u8,
            rc_ctiv: 0,
            rc_temp_ctiv: 0,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_20_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 128 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: b"PineTime" as *const u8 as _,
            current_len: 8,
            max_len: 8,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}
