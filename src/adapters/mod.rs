//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter       | Implements   | Connects to                      |
//! |---------------|--------------|----------------------------------|
//! | `ble_sensor`  | SensorDevice | Bluedroid GAP scan (sensor ads)  |
//! | `outlet`      | (worker)     | Smart-outlet HTTP endpoint       |
//! | `log_sink`    | EventSink    | Serial log output                |
//! | `time`        | ClockPort    | System wall clock (SNTP-backed)  |
//! | `http_server` |              | `/sensor_state` `/metrics` `/health` |
//! | `wifi`        |              | ESP-IDF WiFi STA                 |
//! | `task_pin`    |              | FreeRTOS core-pinned threads     |
//!
//! The executor-backed `OutletPort` lives in [`crate::runtime`].

pub mod ble_sensor;
pub mod http_server;
pub mod log_sink;
pub mod outlet;
pub mod task_pin;
pub mod time;
pub mod wifi;
