//! BLE temperature sensor adapter.
//!
//! Implements [`SensorDevice`] for an Inkbird IBS-TH1, which broadcasts
//! its readings in manufacturer-specific advertisement data under the
//! local name `sps`.  A "subscription" is an active GAP scan; the first
//! matching advertisement completes the subscriber's signal and stops the
//! scan.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid GAP scanning via raw `esp_idf_svc::sys` calls.
//! - **all other targets**: simulation that completes every subscription
//!   immediately with a fixed reading.
//!
//! ## Manufacturer data layout (IBS-TH1)
//!
//! | Offset | Size | Field                                 |
//! |--------|------|---------------------------------------|
//! | 0      | 2    | temperature, °C × 100, LE `i16`       |
//! | 2      | 2    | humidity, % × 100, LE `u16` (unused)  |
//! | 4      | 1    | external probe flag (unused)          |
//! | 5      | 2    | CRC (unused)                          |
//! | 7      | 1    | battery, %                            |

use std::sync::Arc;

use log::info;

use crate::app::ports::{SampleSignal, SensorDevice, SensorReading};
use crate::error::{CommsError, SensorError};

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

/// Local name advertised by the IBS-TH1.
pub const SENSOR_LOCAL_NAME: &str = "sps";

const AD_TYPE_NAME_SHORT: u8 = 0x08;
const AD_TYPE_NAME_COMPLETE: u8 = 0x09;
const AD_TYPE_MANUFACTURER: u8 = 0xFF;

const MANUFACTURER_FRAME_LEN: usize = 8;
const BATTERY_OFFSET: usize = 7;

/// Rated range of the probe, with margin.  Anything outside is a bad frame.
const MIN_TEMP_C: f32 = -50.0;
const MAX_TEMP_C: f32 = 100.0;

// ───────────────────────────────────────────────────────────────
// Advertisement decoding
// ───────────────────────────────────────────────────────────────

/// Find the payload of the first AD structure of `ad_type`.
///
/// Advertisement data is a sequence of `[len, type, payload(len - 1)]`
/// structures; a zero length ends the sequence early.
pub fn find_ad_field(adv: &[u8], ad_type: u8) -> Option<&[u8]> {
    let mut rest = adv;
    while let Some((&len, tail)) = rest.split_first() {
        let len = usize::from(len);
        if len == 0 || len > tail.len() {
            return None;
        }
        let (field, next) = tail.split_at(len);
        if field[0] == ad_type {
            return Some(&field[1..]);
        }
        rest = next;
    }
    None
}

/// Decode the IBS-TH1 manufacturer data into a reading in °F.
pub fn decode_manufacturer_data(data: &[u8]) -> Result<SensorReading, SensorError> {
    if data.len() < MANUFACTURER_FRAME_LEN {
        return Err(SensorError::PayloadTooShort);
    }
    let centi_c = i16::from_le_bytes([data[0], data[1]]);
    let celsius = f32::from(centi_c) / 100.0;
    let battery = data[BATTERY_OFFSET];
    if !(MIN_TEMP_C..=MAX_TEMP_C).contains(&celsius) || battery > 100 {
        return Err(SensorError::OutOfRange);
    }
    Ok(SensorReading {
        temperature_f: celsius_to_fahrenheit(celsius),
        battery,
    })
}

/// Decode a raw advertisement.  `None` when it is not from the sensor.
pub fn decode_advertisement(adv: &[u8]) -> Option<Result<SensorReading, SensorError>> {
    let name = find_ad_field(adv, AD_TYPE_NAME_COMPLETE)
        .or_else(|| find_ad_field(adv, AD_TYPE_NAME_SHORT))?;
    if name != SENSOR_LOCAL_NAME.as_bytes() {
        return None;
    }
    Some(match find_ad_field(adv, AD_TYPE_MANUFACTURER) {
        Some(data) => decode_manufacturer_data(data),
        None => Err(SensorError::PayloadTooShort),
    })
}

pub fn celsius_to_fahrenheit(c: f32) -> f32 {
    c * 9.0 / 5.0 + 32.0
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF scan state
// ───────────────────────────────────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures.  The current subscriber is parked here for the GAP callback.
// GAP callbacks run in the Bluedroid task (not ISR), so std Mutex is safe.

#[cfg(target_os = "espidf")]
static SUBSCRIBER: std::sync::Mutex<Option<Arc<SampleSignal>>> = std::sync::Mutex::new(None);

#[cfg(target_os = "espidf")]
fn take_subscriber() -> Option<Arc<SampleSignal>> {
    SUBSCRIBER
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .take()
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_SCAN_PARAM_SET_COMPLETE_EVT => {
            log::debug!("BLE GAP: scan parameters set");
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_SCAN_RESULT_EVT => {
            // SAFETY: Bluedroid passes a valid param block for the event's lifetime.
            let rst = unsafe { &(*param).scan_rst };
            if rst.search_evt != esp_gap_search_evt_t_ESP_GAP_SEARCH_INQ_RES_EVT {
                return;
            }
            let len = usize::from(rst.adv_data_len) + usize::from(rst.scan_rsp_len);
            let adv = &rst.ble_adv[..len.min(rst.ble_adv.len())];
            match decode_advertisement(adv) {
                None => {}
                Some(Ok(reading)) => {
                    if let Some(signal) = take_subscriber() {
                        signal.signal(reading);
                        // SAFETY: plain Bluedroid call, valid from the GAP callback.
                        unsafe { esp_ble_gap_stop_scanning() };
                    }
                }
                Some(Err(e)) => log::warn!("BLE: ignoring sensor frame ({})", e),
            }
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_SCAN_STOP_COMPLETE_EVT => {
            log::debug!("BLE GAP: scan stopped");
        }
        _ => {}
    }
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct BleSensor {
    started: bool,
    /// Simulation: value handed to every subscriber.
    #[cfg(not(target_os = "espidf"))]
    sim_reading: Option<SensorReading>,
}

impl BleSensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring up the controller and Bluedroid and register the GAP handler.
    #[cfg(target_os = "espidf")]
    pub fn start(&mut self) -> Result<(), CommsError> {
        use esp_idf_svc::sys::*;

        // SAFETY: called once from the main task before any scan; every
        // pointer passed lives for the duration of its call.
        unsafe {
            // Release classic BT memory (BLE-only mode saves ~30 KB).
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            if esp_bt_controller_init(&mut bt_cfg) != ESP_OK as i32 {
                return Err(CommsError::BleInitFailed);
            }
            if esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE) != ESP_OK as i32 {
                return Err(CommsError::BleInitFailed);
            }
            if esp_bluedroid_init() != ESP_OK as i32 {
                return Err(CommsError::BleInitFailed);
            }
            if esp_bluedroid_enable() != ESP_OK as i32 {
                return Err(CommsError::BleInitFailed);
            }
            if esp_ble_gap_register_callback(Some(ble_gap_event_handler)) != ESP_OK as i32 {
                return Err(CommsError::BleInitFailed);
            }

            let mut scan_params = esp_ble_scan_params_t {
                scan_type: esp_ble_scan_type_t_BLE_SCAN_TYPE_ACTIVE,
                own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
                scan_filter_policy: esp_ble_scan_filter_t_BLE_SCAN_FILTER_ALLOW_ALL,
                scan_interval: 0x50,
                scan_window: 0x30,
                scan_duplicate: esp_ble_scan_duplicate_t_BLE_SCAN_DUPLICATE_DISABLE,
            };
            if esp_ble_gap_set_scan_params(&mut scan_params) != ESP_OK as i32 {
                return Err(CommsError::BleScanFailed);
            }
        }

        self.started = true;
        info!("BLE(espidf): scanner ready for '{}'", SENSOR_LOCAL_NAME);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn start(&mut self) -> Result<(), CommsError> {
        self.started = true;
        info!("BLE(sim): scanner ready for '{}'", SENSOR_LOCAL_NAME);
        Ok(())
    }

    /// Simulation: set the reading delivered to subscribers.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_reading(&mut self, reading: SensorReading) {
        self.sim_reading = Some(reading);
    }
}

#[cfg(target_os = "espidf")]
impl SensorDevice for BleSensor {
    fn subscribe_realtime(&mut self, completion: Arc<SampleSignal>) {
        if !self.started {
            log::warn!("BLE: subscribe before start, sample will never arrive");
            return;
        }
        *SUBSCRIBER
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(completion);
        // SAFETY: plain Bluedroid call; 0 scans until stopped.
        let ret = unsafe { esp_idf_svc::sys::esp_ble_gap_start_scanning(0) };
        if ret != esp_idf_svc::sys::ESP_OK as i32 {
            log::warn!("BLE: start scanning failed ({}): {}", ret, CommsError::BleScanFailed);
        }
    }

    fn unsubscribe_realtime(&mut self) {
        if take_subscriber().is_some() {
            // SAFETY: plain Bluedroid call.
            unsafe { esp_idf_svc::sys::esp_ble_gap_stop_scanning() };
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl SensorDevice for BleSensor {
    fn subscribe_realtime(&mut self, completion: Arc<SampleSignal>) {
        if !self.started {
            log::warn!("BLE(sim): subscribe before start, sample will never arrive");
            return;
        }
        let reading = self.sim_reading.unwrap_or(SensorReading {
            temperature_f: 0.0,
            battery: 100,
        });
        log::debug!("BLE(sim): delivering {:.2}F", reading.temperature_f);
        completion.signal(reading);
    }

    fn unsubscribe_realtime(&mut self) {}
}
