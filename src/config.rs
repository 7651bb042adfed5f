//! System configuration parameters
//!
//! Thresholds and timing are compiled-in constants; they are not tunable at
//! runtime.  Only the outlet endpoint and the WiFi credentials come from the
//! environment.

use core::fmt;
use core::time::Duration;

use serde::{Deserialize, Serialize};

// --- Compiled-in thresholds ---

/// Temperature (°F) above which a sample counts as "over".
pub const TRIGGER_TEMP_F: f32 = 20.0;
/// Number of consecutive over-temperature samples required to trigger.
pub const TRIGGER_MINUTES: u32 = 5;
/// Minimum gap between two outlet power cycles.
pub const COOLDOWN_MINUTES: u32 = 60;
/// How long the outlet stays off before re-powering.
pub const POWER_CYCLE_WAIT_MINUTES: u32 = 15;

// --- Compiled-in timing / capacities ---

/// Idle ticks before a new sensor subscription is opened.
pub const CONNECT_THRESHOLD_TICKS: u32 = 60;
/// Period of one duty-loop tick.
pub const TICK_PERIOD_MS: u32 = 1000;
/// Capacity of the rolling temperature history (one per nominal minute).
pub const SAMPLE_CAPACITY: usize = 60;
/// Capacity of the reset-event log.
pub const RESET_HISTORY_CAPACITY: usize = 1000;
/// TCP port of the status / metrics HTTP server.
pub const HTTP_PORT: u16 = 3000;

/// Duty-loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    // --- Trigger ---
    /// Over-temperature threshold (°F), strict `>` comparison.
    pub trigger_temp_f: f32,
    /// Trailing sample count that must all exceed the threshold.
    /// Also read as minutes by the post-reset debounce gate.
    pub trigger_minutes: u32,

    // --- Power cycle ---
    /// Minimum minutes between two resets.
    pub cooldown_minutes: u32,
    /// Minutes the outlet stays off.
    pub power_cycle_wait_minutes: u32,

    // --- Timing ---
    /// Idle ticks before reconnecting to the sensor.
    pub connect_threshold_ticks: u32,
    /// Tick period (milliseconds).
    pub tick_period_ms: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            trigger_temp_f: TRIGGER_TEMP_F,
            trigger_minutes: TRIGGER_MINUTES,
            cooldown_minutes: COOLDOWN_MINUTES,
            power_cycle_wait_minutes: POWER_CYCLE_WAIT_MINUTES,
            connect_threshold_ticks: CONNECT_THRESHOLD_TICKS,
            tick_period_ms: TICK_PERIOD_MS,
        }
    }
}

impl MonitorConfig {
    pub fn cooldown(&self) -> Duration {
        minutes(self.cooldown_minutes)
    }

    /// `trigger_minutes` interpreted as a wall-clock duration.
    pub fn trigger_duration(&self) -> Duration {
        minutes(self.trigger_minutes)
    }

    pub fn power_cycle_wait(&self) -> Duration {
        minutes(self.power_cycle_wait_minutes)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_period_ms))
    }

    /// Range-check the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.trigger_temp_f.is_finite() {
            return Err(ConfigError::ValidationFailed("trigger_temp_f must be finite"));
        }
        if self.trigger_minutes == 0 || self.trigger_minutes as usize > SAMPLE_CAPACITY {
            return Err(ConfigError::ValidationFailed(
                "trigger_minutes must be within 1..=sample capacity",
            ));
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_period_ms must be non-zero"));
        }
        if self.power_cycle_wait_minutes == 0 {
            return Err(ConfigError::ValidationFailed(
                "power_cycle_wait_minutes must be non-zero",
            ));
        }
        Ok(())
    }
}

fn minutes(m: u32) -> Duration {
    Duration::from_secs(u64::from(m) * 60)
}

// ───────────────────────────────────────────────────────────────
// Outlet endpoint
// ───────────────────────────────────────────────────────────────

/// Remote smart-outlet endpoint.  Not validated at startup: an empty field
/// surfaces as an outlet failure when a request is made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutletConfig {
    pub url: String,
    pub api_key: String,
    pub device: String,
}

impl OutletConfig {
    /// Read `OUTLET_URL`, `OUTLET_API_KEY` and `OUTLET_DEVICE_NAME`.
    ///
    /// The process environment wins; on the device there is none, so the
    /// values baked in at build time are used instead.
    pub fn from_env() -> Self {
        Self {
            url: env_or_baked("OUTLET_URL", option_env!("OUTLET_URL")),
            api_key: env_or_baked("OUTLET_API_KEY", option_env!("OUTLET_API_KEY")),
            device: env_or_baked("OUTLET_DEVICE_NAME", option_env!("OUTLET_DEVICE_NAME")),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.url.is_empty() && !self.api_key.is_empty() && !self.device.is_empty()
    }
}

fn env_or_baked(key: &str, baked: Option<&'static str>) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| baked.map(str::to_owned))
        .unwrap_or_default()
}

// ───────────────────────────────────────────────────────────────
// WiFi credentials
// ───────────────────────────────────────────────────────────────

const MAX_SSID_LEN: usize = 32;
const MIN_WPA2_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 64;

/// Station credentials, baked in at build time (`WIFI_SSID`, `WIFI_PASS`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::new(
            option_env!("WIFI_SSID").unwrap_or_default(),
            option_env!("WIFI_PASS").unwrap_or_default(),
        )
    }

    /// Validate and copy credentials.  An empty password selects an open network.
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConfigError> {
        if ssid.is_empty() || ssid.len() > MAX_SSID_LEN || !is_printable_ascii(ssid) {
            return Err(ConfigError::ValidationFailed("SSID must be 1-32 printable ASCII bytes"));
        }
        if !password.is_empty()
            && (password.len() < MIN_WPA2_PASSWORD_LEN || password.len() > MAX_PASSWORD_LEN)
        {
            return Err(ConfigError::ValidationFailed("password must be 8-64 bytes or empty"));
        }
        let mut creds = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        creds
            .ssid
            .push_str(ssid)
            .map_err(|_| ConfigError::ValidationFailed("SSID too long"))?;
        creds
            .password
            .push_str(password)
            .map_err(|_| ConfigError::ValidationFailed("password too long"))?;
        Ok(creds)
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
